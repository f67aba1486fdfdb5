pub mod layout;
pub mod leaves;

pub use layout::{AtlasLayout, AtlasSources, DrawCommand};
pub use leaves::{Leaf, LeafPlacer};

use crate::tree::params::LeafLayout;
use bevy::prelude::*;

/// Side of one square atlas cell in texels.
pub const CELL_SIZE: f32 = 256.0;

/// The four side-by-side cells of the tree texture atlas.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AtlasCell {
	Bark,
	FanFoliage,
	Vine,
	ScatterFoliage,
}

impl AtlasCell {
	pub fn index(self) -> u32 {
		match self {
			Self::Bark => 0,
			Self::FanFoliage => 1,
			Self::Vine => 2,
			Self::ScatterFoliage => 3,
		}
	}

	/// The foliage cell a leaf layout is baked into.
	pub fn for_leaves(layout: LeafLayout) -> Self {
		match layout {
			LeafLayout::Fan => Self::FanFoliage,
			LeafLayout::Scatter => Self::ScatterFoliage,
		}
	}

	/// Texture coordinates meshes use to sample this cell.
	///
	/// The bark cell stops short of 0.25 so sampling never bleeds into the foliage beside it.
	pub fn uv_rect(self) -> UvRect {
		let left = self.index() as f32 * 0.25;
		let right = match self {
			Self::Bark => 0.249,
			Self::FanFoliage | Self::Vine | Self::ScatterFoliage => left + 0.25,
		};
		UvRect::new(Vec2::new(left, 0.0), Vec2::new(right, 1.0))
	}

	/// Texel offset of the cell's corner inside the atlas.
	pub fn origin(self) -> Vec2 {
		Vec2::new(self.index() as f32 * CELL_SIZE, 0.0)
	}
}

/// An axis-aligned rectangle in texture space; `min` is the top-left corner.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct UvRect {
	pub min: Vec2,
	pub max: Vec2,
}

impl UvRect {
	pub fn new(min: Vec2, max: Vec2) -> Self {
		Self { min, max }
	}

	pub fn top_left(&self) -> Vec2 {
		self.min
	}

	pub fn top_right(&self) -> Vec2 {
		Vec2::new(self.max.x, self.min.y)
	}

	pub fn bottom_right(&self) -> Vec2 {
		self.max
	}

	pub fn bottom_left(&self) -> Vec2 {
		Vec2::new(self.min.x, self.max.y)
	}

	pub fn center(&self) -> Vec2 {
		self.min.lerp(self.max, 0.5)
	}

	/// Corners clockwise from the top left.
	pub fn corners(&self) -> [Vec2; 4] {
		[self.top_left(), self.top_right(), self.bottom_right(), self.bottom_left()]
	}
}

/// Leaf and bark colours for a climate.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Palette {
	pub leaf: Vec4,
	pub bark: Vec4,
}

impl Default for Palette {
	fn default() -> Self {
		Self::from_climate(0.5, 0.5)
	}
}

/// Below this temperature leaves fade towards the cold tint.
pub const COLD_TEMPERATURE: f32 = 0.45;

impl Palette {
	/// Blends the grass and dirt tables for `moisture` and `temperature`, both in `[0, 1]`.
	pub fn from_climate(moisture: f32, temperature: f32) -> Self {
		let wet_grass = Vec4::new(0.15, 0.7, 0.15, 1.0);
		let dry_grass = Vec4::new(0.85, 0.75, 0.15, 1.0);
		let cold_grass = Vec4::new(0.6, 0.9, 0.8, 1.0);

		let warm_grass = dry_grass.lerp(wet_grass, moisture);
		let leaf = if temperature < COLD_TEMPERATURE {
			cold_grass.lerp(warm_grass, temperature / COLD_TEMPERATURE)
		} else {
			warm_grass
		};

		let dry_dirt = Vec4::new(0.7, 0.35, 0.4, 0.0);
		let wet_dirt = Vec4::new(0.5, 0.45, 0.15, 0.0);
		let cold_dirt = wet_dirt.lerp(Vec4::new(0.7, 0.7, 0.7, 0.0), moisture);
		let warm_dirt = dry_dirt.lerp(wet_dirt, moisture);
		let bark = (cold_dirt.lerp(warm_dirt, temperature) * 0.5).truncate().extend(1.0);

		Self { leaf, bark }
	}
}

/// Dimensions of a source texture; tall textures hold a vertical strip of square frames.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SourceTexture {
	pub width: u32,
	pub height: u32,
}

impl Default for SourceTexture {
	fn default() -> Self {
		Self { width: CELL_SIZE as u32, height: CELL_SIZE as u32 }
	}
}

impl SourceTexture {
	pub fn new(width: u32, height: u32) -> Self {
		Self { width, height }
	}

	pub fn frame_count(&self) -> u32 {
		match self.width {
			0 => 1,
			width => (self.height / width).max(1),
		}
	}

	/// The middle frame; bark always uses frame 0.
	pub fn middle_frame(&self) -> u32 {
		self.frame_count() / 2
	}

	pub fn frame_uv(&self, frame: u32) -> UvRect {
		let size = 1.0 / self.frame_count() as f32;
		UvRect::new(Vec2::new(0.0, frame as f32 * size), Vec2::new(1.0, (frame + 1) as f32 * size))
	}
}
