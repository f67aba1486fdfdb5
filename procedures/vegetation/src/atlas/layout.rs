use super::{AtlasCell, Leaf, LeafPlacer, Palette, SourceTexture, CELL_SIZE};
use crate::tree::params::LeafLayout;
use bevy::prelude::*;
use comproc::RandomSource;

/// One drawing step for the texture baker. Positions are texels local to `cell`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum DrawCommand {
	/// A textured quad, corners clockwise from the top left.
	Quad { cell: AtlasCell, corners: [Vec2; 4], uvs: [Vec2; 4], color: Vec4 },
	/// A one-texel line.
	Line { cell: AtlasCell, from: Vec2, to: Vec2, color: Vec4 },
}

impl DrawCommand {
	pub fn cell(&self) -> AtlasCell {
		match self {
			Self::Quad { cell, .. } | Self::Line { cell, .. } => *cell,
		}
	}
}

/// Sizes of the textures the atlas is baked from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct AtlasSources {
	pub bark: SourceTexture,
	pub leaf: SourceTexture,
	pub vine: SourceTexture,
}

/// The ordered draw list that bakes the tree atlas.
#[derive(Debug, Clone, PartialEq)]
pub struct AtlasLayout {
	commands: Vec<DrawCommand>,
	leaves: Vec<Leaf>,
}

fn full_cell() -> [Vec2; 4] {
	[Vec2::ZERO, Vec2::new(CELL_SIZE, 0.0), Vec2::splat(CELL_SIZE), Vec2::new(0.0, CELL_SIZE)]
}

impl AtlasLayout {
	/// Lays out bark, then the foliage cell of the placer's layout, then the vine.
	pub fn compose(
		palette: &Palette,
		placer: &LeafPlacer,
		sources: &AtlasSources,
		rng: &mut impl RandomSource,
	) -> Self {
		let mut commands = Vec::new();

		commands.push(DrawCommand::Quad {
			cell: AtlasCell::Bark,
			corners: full_cell(),
			uvs: sources.bark.frame_uv(0).corners(),
			color: palette.bark,
		});

		let leaf_cell = AtlasCell::for_leaves(placer.layout);
		let leaves = placer.place(palette.leaf, rng);

		if placer.layout == LeafLayout::Scatter {
			commands.extend(leaves.iter().map(|leaf| DrawCommand::Line {
				cell: leaf_cell,
				from: leaf.position,
				to: leaves[leaf.neighbor].position,
				color: palette.bark,
			}));
		}

		let leaf_uvs = sources.leaf.frame_uv(sources.leaf.middle_frame()).corners();
		commands.extend(leaves.iter().map(|leaf| DrawCommand::Quad {
			cell: leaf_cell,
			corners: leaf.corners(),
			uvs: leaf_uvs,
			color: leaf.color,
		}));

		// vines hang down the cell, so the source is turned a quarter
		let vine = sources.vine.frame_uv(sources.vine.middle_frame());
		commands.push(DrawCommand::Quad {
			cell: AtlasCell::Vine,
			corners: full_cell(),
			uvs: [vine.bottom_left(), vine.top_left(), vine.top_right(), vine.bottom_right()],
			color: palette.leaf,
		});

		log::debug!("Composed atlas with {} leaves in {:?}", leaves.len(), leaf_cell);

		Self { commands, leaves }
	}

	pub fn commands(&self) -> &[DrawCommand] {
		&self.commands
	}

	pub fn leaves(&self) -> &[Leaf] {
		&self.leaves
	}
}
