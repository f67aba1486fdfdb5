pub mod atlas;
pub mod error;
pub mod forest;
pub mod tree;

pub use atlas::{AtlasLayout, LeafPlacer, Palette};
pub use error::VegetationError;
pub use forest::{Forest, ForestConfig, ForestStats};
pub use tree::{
	params::{
		BranchLift, FoliageShape, LeafLayout, TreeConfig, TreeDimensions, TreeParams, TreeShape,
		TrunkBend,
	},
	Tree, TreeStats,
};
