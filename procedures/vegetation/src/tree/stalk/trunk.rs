use super::MIN_RADIUS;
use crate::tree::params::{TreeShape, TrunkBend};
use bevy::prelude::*;

/// Centerline and radius of the trunk as a function of normalized height.
///
/// The same profile places trunk rings, the trunk tip and every branch root.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TrunkProfile {
	pub shape: TreeShape,
	pub bend: TrunkBend,
	pub funnel: bool,
	pub base_radius: f32,
	pub height: f32,
	pub bend_frequency: f32,
}

impl TrunkProfile {
	/// Returns `(x, y, z, radius)` at normalized height `h` in `[0, 1]`.
	pub fn at(&self, h: f32) -> Vec4 {
		let delta = if self.funnel { 1.0 - (1.0 - h) * (1.0 - h) } else { h };

		let taper = match self.shape {
			TreeShape::Canopy => 0.5,
			TreeShape::Normal | TreeShape::Evergreen => 1.0,
		};
		let radius = (self.base_radius * (1.0 - delta * taper)).max(MIN_RADIUS);

		let bend = h * h;
		let (x, y) = match self.bend {
			TrunkBend::Straight => (0.0, 0.0),
			TrunkBend::Bent => (bend * self.height / 3.0, 0.0),
			TrunkBend::Jagged => {
				(bend * self.height / 2.0, (h * self.bend_frequency).sin() * self.height / 3.0)
			}
		};

		Vec4::new(x, y, h * self.height, radius)
	}
}
