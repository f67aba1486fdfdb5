use super::TrunkProfile;
use crate::tree::params::{TreeDimensions, HIGHEST_BRANCH};
use bevy::prelude::*;
use std::f32::consts::{PI, TAU};

/// Where a branch leaves the trunk and how far it reaches.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TrunkAnchor {
	/// `(x, y, z, radius)` on the trunk centerline.
	pub root: Vec4,
	pub length: f32,
	pub lift: f32,
}

impl TrunkAnchor {
	pub fn position(&self) -> Vec3 {
		self.root.truncate()
	}

	pub fn radius(&self) -> f32 {
		self.root.w
	}
}

/// Spreads branch anchors evenly up the trunk.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BranchAnchorPlanner {
	pub count: u32,
	pub lowest: f32,
	pub reach: f32,
	pub angle_offset: f32,
}

impl From<&TreeDimensions> for BranchAnchorPlanner {
	fn from(dimensions: &TreeDimensions) -> Self {
		Self {
			count: dimensions.branch_count,
			lowest: dimensions.lowest_branch,
			reach: dimensions.branch_reach,
			angle_offset: dimensions.angle_offset,
		}
	}
}

impl BranchAnchorPlanner {
	/// Normalized height between consecutive anchors.
	pub fn spacing(&self) -> f32 {
		(HIGHEST_BRANCH - self.lowest) / self.count as f32
	}

	/// Anchors ordered bottom to top.
	pub fn plan(&self, profile: &TrunkProfile) -> Vec<TrunkAnchor> {
		let spacing = self.spacing();
		(0..self.count)
			.map(|i| {
				let root = profile.at(self.lowest + i as f32 * spacing);
				let length = ((profile.height - root.z) * self.reach).min(profile.height / 2.0);
				TrunkAnchor { root, length, lift: length / 2.0 }
			})
			.collect()
	}

	/// Rotation about +Z of branch `i`; each step turns a little past half a circle.
	pub fn branch_angle(&self, i: usize) -> f32 {
		self.angle_offset + i as f32 * (TAU / self.count as f32 + PI)
	}

	/// Rotation of the foliage ring placed at anchor `i` on evergreens.
	pub fn ring_angle(&self, i: usize) -> f32 {
		i as f32 * (TAU / self.count as f32)
	}
}
