use super::tube::{TubeFrame, TubeMeshBuilder, TubeOutput, TubeRing};
use crate::tree::params::BranchLift;
use crate::tree::stalk::{TrunkAnchor, MIN_RADIUS};
use bevy::prelude::*;
use render_item::MeshAssembler;

pub const BRANCH_RADIAL_STEPS: u32 = 6;
/// Quad bands along every branch, regardless of its length.
pub const BRANCH_SEGMENTS: u32 = 5 + 3;
/// Branches shorter than this are not built.
pub const MIN_BRANCH_LENGTH: f32 = 2.0;

/// Sweeps one branch out of its trunk anchor.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BranchMesh {
	pub anchor: TrunkAnchor,
	/// Rotation about +Z; the unrotated branch reaches along +Y.
	pub angle: f32,
	/// Scale applied to the anchor lift.
	pub lift_scale: f32,
	pub lift_style: BranchLift,
}

impl BranchMesh {
	pub fn new(anchor: TrunkAnchor, angle: f32, lift_scale: f32, lift_style: BranchLift) -> Self {
		Self { anchor, angle, lift_scale, lift_style }
	}

	pub fn is_degenerate(&self) -> bool {
		self.anchor.length < MIN_BRANCH_LENGTH || self.anchor.radius() < MIN_RADIUS
	}

	pub fn frame(&self) -> TubeFrame {
		TubeFrame::rotated_z(self.angle)
	}

	/// Centerline point at normalized position `t` along the branch.
	pub fn center_at(&self, t: f32) -> Vec3 {
		let rise = self.anchor.lift * self.lift_style.curve(t) * self.lift_scale;
		self.anchor.position() + self.frame().along * (self.anchor.length * t) + Vec3::Z * rise
	}

	pub fn rings(&self) -> Vec<TubeRing> {
		let ring_count = BRANCH_SEGMENTS + 1;
		(0..ring_count)
			.map(|k| {
				let t = k as f32 / ring_count as f32;
				let radius = (self.anchor.radius() * (1.0 - t)).max(MIN_RADIUS);
				TubeRing { center: self.center_at(t), radius }
			})
			.collect()
	}

	pub fn tip(&self) -> Vec3 {
		self.center_at(1.0)
	}

	/// Emits the branch tube, or nothing when the anchor is too short or thin.
	pub fn emit(&self, assembler: &mut MeshAssembler, model: Mat4) -> Option<TubeOutput> {
		if self.is_degenerate() {
			log::debug!(
				"Skipping branch at {} (length {}, radius {})",
				self.anchor.position(),
				self.anchor.length,
				self.anchor.radius()
			);
			return None;
		}

		let builder = TubeMeshBuilder::new(BRANCH_RADIAL_STEPS, self.frame(), model);
		Some(builder.build(assembler, &self.rings(), self.tip()))
	}
}
