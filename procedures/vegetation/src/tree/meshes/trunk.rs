use super::tube::{TubeFrame, TubeMeshBuilder, TubeOutput, TubeRing};
use crate::tree::stalk::{TrunkAnchor, TrunkProfile};
use bevy::prelude::*;
use render_item::MeshAssembler;

pub const TRUNK_RADIAL_STEPS: u32 = 7;
/// Widening of the base ring.
pub const BASE_FLARE: f32 = 1.5;
/// Depth of the base ring below the ground.
pub const BASE_SINK: f32 = 2.0;

/// Trunk tube with one ring per branch root, closed at the top of the profile.
#[derive(Debug, Clone, Copy)]
pub struct TrunkMesh<'a> {
	pub profile: &'a TrunkProfile,
	pub anchors: &'a [TrunkAnchor],
}

impl<'a> TrunkMesh<'a> {
	pub fn new(profile: &'a TrunkProfile, anchors: &'a [TrunkAnchor]) -> Self {
		Self { profile, anchors }
	}

	pub fn rings(&self) -> Vec<TubeRing> {
		let base = self.profile.at(0.0);
		let base_ring = TubeRing {
			center: base.truncate() - Vec3::Z * BASE_SINK,
			radius: base.w * BASE_FLARE,
		};

		std::iter::once(base_ring)
			.chain(
				self.anchors
					.iter()
					.map(|anchor| TubeRing { center: anchor.position(), radius: anchor.radius() }),
			)
			.collect()
	}

	pub fn tip(&self) -> Vec3 {
		self.profile.at(1.0).truncate()
	}

	pub fn emit(&self, assembler: &mut MeshAssembler, model: Mat4) -> TubeOutput {
		let builder = TubeMeshBuilder::new(TRUNK_RADIAL_STEPS, TubeFrame::vertical(), model);
		builder.build(assembler, &self.rings(), self.tip())
	}
}
