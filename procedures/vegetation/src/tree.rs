pub mod meshes;
pub mod params;
pub mod stalk;

use crate::error::VegetationError;
use bevy::prelude::*;
use comproc::RandomSource;
use meshes::{branch::BranchMesh, canopy::FoliageCap, trunk::TrunkMesh, vines::VineStrip};
use params::{TreeParams, TreeShape};
use render_item::{MeshAssembler, RenderItem};
use stalk::{BranchAnchorPlanner, TrunkProfile};
use std::f32::consts::FRAC_PI_2;

/// Foliage at a branch tip is this fraction of the branch length.
pub const BRANCH_FOLIAGE_SCALE: f32 = 0.56;

/// Counts of what one build appended.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TreeStats {
	pub anchors: u32,
	pub branches: u32,
	pub skipped_branches: u32,
	pub caps: u32,
	pub vines: u32,
	pub vertices: u32,
}

impl std::ops::AddAssign for TreeStats {
	fn add_assign(&mut self, other: Self) {
		self.anchors += other.anchors;
		self.branches += other.branches;
		self.skipped_branches += other.skipped_branches;
		self.caps += other.caps;
		self.vines += other.vines;
		self.vertices += other.vertices;
	}
}

/// A single tree: its parameters, the bend frequency drawn at construction and its placement.
///
/// Geometry is generated with +Z up; the model transform turns it into a +Y-up world and moves
/// it to its placement.
#[derive(Debug, Clone, PartialEq)]
pub struct Tree {
	params: TreeParams,
	bend_frequency: f32,
	model: Mat4,
}

impl Tree {
	pub fn new(params: TreeParams, rng: &mut impl RandomSource) -> Result<Self, VegetationError> {
		params.validate()?;

		let bend_frequency = 1.0 + rng.next_uniform() * 2.0 + rng.next_uniform();
		let model = Mat4::from_rotation_x(-FRAC_PI_2) * Mat4::from_translation(params.placement);

		Ok(Self { params, bend_frequency, model })
	}

	pub fn params(&self) -> &TreeParams {
		&self.params
	}

	pub fn bend_frequency(&self) -> f32 {
		self.bend_frequency
	}

	pub fn model(&self) -> Mat4 {
		self.model
	}

	pub fn profile(&self) -> TrunkProfile {
		TrunkProfile {
			shape: self.params.shape,
			bend: self.params.bend,
			funnel: self.params.funnel,
			base_radius: self.params.dimensions.base_radius,
			height: self.params.dimensions.height,
			bend_frequency: self.bend_frequency,
		}
	}

	pub fn planner(&self) -> BranchAnchorPlanner {
		BranchAnchorPlanner::from(&self.params.dimensions)
	}

	pub fn foliage(&self) -> FoliageCap {
		FoliageCap::new(self.params.foliage, self.params.leaf_layout)
	}

	/// Size of the cap on top of the trunk.
	pub fn crown_size(&self) -> f32 {
		let height = self.params.dimensions.height;
		match self.params.shape {
			TreeShape::Canopy => height,
			TreeShape::Normal | TreeShape::Evergreen => height / 2.0,
		}
	}

	/// Appends the trunk, its crown, then every branch with its cap and vines.
	pub fn build(&self, assembler: &mut MeshAssembler) -> TreeStats {
		let first = assembler.next_index();
		let profile = self.profile();
		let planner = self.planner();
		let anchors = planner.plan(&profile);
		let foliage = self.foliage();
		let vines = VineStrip::default();

		let mut stats = TreeStats { anchors: anchors.len() as u32, ..Default::default() };

		let trunk = TrunkMesh::new(&profile, &anchors).emit(assembler, self.model);
		if foliage.emit(assembler, self.model, trunk.tip, 0.0, self.crown_size()) {
			stats.caps += 1;
		}

		for (i, anchor) in anchors.iter().enumerate() {
			match self.params.shape {
				TreeShape::Evergreen => {
					let angle = planner.ring_angle(i);
					let position = anchor.position();
					if foliage.emit(assembler, self.model, position, angle, anchor.length) {
						stats.caps += 1;
					}
				}
				TreeShape::Normal | TreeShape::Canopy => {
					let angle = planner.branch_angle(i);
					let branch = BranchMesh::new(
						*anchor,
						angle,
						self.params.dimensions.branch_lift,
						self.params.branch_lift,
					);
					let Some(tube) = branch.emit(assembler, self.model) else {
						stats.skipped_branches += 1;
						continue;
					};
					stats.branches += 1;

					let fsize = anchor.length * BRANCH_FOLIAGE_SCALE;
					if foliage.emit(assembler, self.model, tube.tip, angle, fsize) {
						stats.caps += 1;
					}
					if vines.emit(assembler, self.model, &tube.underside) > 0 {
						stats.vines += 1;
					}
				}
			}
		}

		stats.vertices = assembler.next_index() - first;
		log::debug!("Built {} {} tree: {:?}", self.params.shape, self.params.foliage, stats);

		stats
	}
}

impl RenderItem for Tree {
	fn assemble(&self, assembler: &mut MeshAssembler) {
		self.build(assembler);
	}
}
