use super::CELL_SIZE;
use crate::tree::params::LeafLayout;
use bevy::prelude::*;
use comproc::RandomSource;
use std::f32::consts::TAU;

/// Half-size of the largest leaf decal.
pub const MAX_LEAF_SIZE: f32 = CELL_SIZE / 4.0;

/// One leaf decal in cell-local texels.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Leaf {
	/// Half the side of the decal square.
	pub size: f32,
	pub position: Vec2,
	pub angle: f32,
	pub color: Vec4,
	/// Distance of `position` from the cell center.
	pub distance: f32,
	/// Index of the nearest leaf placed before this one; the first leaf points at itself.
	pub neighbor: usize,
}

impl Leaf {
	/// Decal corners clockwise from the top left, turned `angle` about the leaf position.
	pub fn corners(&self) -> [Vec2; 4] {
		let rotation = Vec2::from_angle(self.angle);
		[Vec2::new(-1.0, -1.0), Vec2::new(1.0, -1.0), Vec2::new(1.0, 1.0), Vec2::new(-1.0, 1.0)]
			.map(|corner| self.position + rotation.rotate(corner * self.size))
	}
}

/// Lays leaves out in one foliage atlas cell.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LeafPlacer {
	pub layout: LeafLayout,
	/// Concentric rings in the fan layout.
	pub rings: u32,
	/// Random leaves added around the central one in the scatter layout.
	pub scatter_draws: u32,
	/// Colour scattered leaves are darkened towards.
	pub shade: Vec3,
	/// Largest fraction of `shade` blended into a leaf.
	pub max_shade: f32,
}

impl LeafPlacer {
	pub fn new(layout: LeafLayout) -> Self {
		Self {
			layout,
			rings: 5,
			scatter_draws: 50,
			shade: Vec3::new(0.0, 0.5, 0.0),
			max_shade: 0.33,
		}
	}

	pub fn with_scatter_draws(mut self, scatter_draws: u32) -> Self {
		self.scatter_draws = scatter_draws;
		self
	}

	pub fn center() -> Vec2 {
		Vec2::splat(CELL_SIZE / 2.0)
	}

	pub fn place(&self, base_color: Vec4, rng: &mut impl RandomSource) -> Vec<Leaf> {
		match self.layout {
			LeafLayout::Fan => self.fan(base_color),
			LeafLayout::Scatter => self.scatter(base_color, rng),
		}
	}

	/// Rings of evenly spaced leaves, fewer and smaller towards the middle.
	fn fan(&self, base_color: Vec4) -> Vec<Leaf> {
		let center = Self::center();
		let mut leaves = Vec::new();

		for ring in 0..self.rings {
			let count = self.rings - ring;
			let size = MAX_LEAF_SIZE / (1.0 + ring as f32);
			for k in 0..count {
				let angle = k as f32 * TAU / count as f32;
				let neighbor = leaves.len();
				leaves.push(Leaf {
					size,
					position: center + Vec2::from_angle(angle) * size,
					angle,
					color: base_color,
					distance: size,
					neighbor,
				});
			}
		}

		leaves
	}

	/// A central leaf plus random leaves shrinking with distance, each linked to its nearest
	/// predecessor.
	fn scatter(&self, base_color: Vec4, rng: &mut impl RandomSource) -> Vec<Leaf> {
		let center = Self::center();
		let max_distance = center.length();
		let leaf = |position: Vec2| {
			let distance = position.distance(center);
			Leaf {
				size: MAX_LEAF_SIZE * (1.0 - distance / max_distance),
				position,
				angle: 0.0,
				color: base_color,
				distance,
				neighbor: 0,
			}
		};

		let mut leaves = Vec::with_capacity(self.scatter_draws as usize + 1);
		leaves.push(leaf(center));
		for _ in 0..self.scatter_draws {
			let u = rng.next_uniform();
			let v = rng.next_uniform();
			leaves.push(leaf(Vec2::new(u, v) * CELL_SIZE));
		}

		// stable, so equal distances keep draw order
		leaves.sort_by(|a, b| a.distance.total_cmp(&b.distance));

		for i in 0..leaves.len() {
			let position = leaves[i].position;
			let neighbor = (0..i)
				.min_by(|&a, &b| {
					position
						.distance_squared(leaves[a].position)
						.total_cmp(&position.distance_squared(leaves[b].position))
				})
				.unwrap_or(i);
			leaves[i].neighbor = neighbor;
			leaves[i].angle = angle_between(position, leaves[neighbor].position);
		}

		for leaf in &mut leaves {
			let blend = rng.next_uniform() * self.max_shade;
			leaf.color = leaf.color.truncate().lerp(self.shade, blend).extend(leaf.color.w);
		}

		leaves
	}
}

/// Angle between two cell-origin position vectors; zero when either is degenerate.
fn angle_between(a: Vec2, b: Vec2) -> f32 {
	let lengths = a.length() * b.length();
	if lengths == 0.0 {
		return 0.0;
	}
	(a.dot(b) / lengths).clamp(-1.0, 1.0).acos()
}
