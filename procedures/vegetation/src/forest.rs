use crate::error::VegetationError;
use crate::tree::params::{
	BranchLift, FoliageShape, LeafLayout, TreeDimensions, TreeParams, TreeShape, TrunkBend,
};
use crate::tree::{Tree, TreeStats};
use bevy::prelude::*;
use comproc::noise::config::NoiseConfig;
use comproc::{Mersenne, RandomSource};
use noise::Perlin;
use render_item::{MeshAssembler, RenderItem};

/// Configuration for forest generation
#[derive(Debug, Clone, PartialEq, serde::Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ForestConfig {
	/// Seeds both the placement noise and the tree stream
	pub seed: u32,
	/// Bounds of the forest on the ground plane (min_x, max_x, min_y, max_y)
	pub bounds: (f32, f32, f32, f32),
	/// Grid spacing for tree placement (smaller = denser)
	pub grid_spacing: f32,
	/// Trees are placed where the noise, mapped onto [0, 1], is at least this
	pub placement_threshold: f64,
	/// Frequency of the placement noise
	pub noise_frequency: f32,
	/// Every tree shares one foliage atlas cell
	pub leaf_layout: LeafLayout,
}

impl Default for ForestConfig {
	fn default() -> Self {
		Self {
			seed: 42,
			bounds: (-50.0, 50.0, -50.0, 50.0),
			grid_spacing: 5.0,
			placement_threshold: 0.6,
			noise_frequency: 0.1,
			leaf_layout: LeafLayout::default(),
		}
	}
}

impl ForestConfig {
	pub fn with_seed(mut self, seed: u32) -> Self {
		self.seed = seed;
		self
	}

	pub fn with_bounds(mut self, bounds: (f32, f32, f32, f32)) -> Self {
		self.bounds = bounds;
		self
	}

	pub fn with_grid_spacing(mut self, grid_spacing: f32) -> Self {
		self.grid_spacing = grid_spacing;
		self
	}

	pub fn with_placement_threshold(mut self, placement_threshold: f64) -> Self {
		self.placement_threshold = placement_threshold;
		self
	}

	pub fn with_noise_frequency(mut self, noise_frequency: f32) -> Self {
		self.noise_frequency = noise_frequency;
		self
	}

	pub fn with_leaf_layout(mut self, leaf_layout: LeafLayout) -> Self {
		self.leaf_layout = leaf_layout;
		self
	}

	pub fn validate(&self) -> Result<(), VegetationError> {
		if !self.grid_spacing.is_finite() || self.grid_spacing <= 0.0 {
			return Err(VegetationError::invalid_argument(
				"grid_spacing",
				format!("must be finite and positive, got {}", self.grid_spacing),
			));
		}

		let (min_x, max_x, min_y, max_y) = self.bounds;
		if ![min_x, max_x, min_y, max_y].iter().all(|bound| bound.is_finite())
			|| min_x > max_x
			|| min_y > max_y
		{
			return Err(VegetationError::invalid_argument(
				"bounds",
				format!("must be finite with min <= max, got {:?}", self.bounds),
			));
		}

		if !self.noise_frequency.is_finite() {
			return Err(VegetationError::invalid_argument(
				"noise_frequency",
				format!("must be finite, got {}", self.noise_frequency),
			));
		}

		Ok(())
	}

	/// Grid points covering the bounds, row by row.
	pub fn grid(&self) -> impl Iterator<Item = Vec2> + '_ {
		let (min_x, max_x, min_y, max_y) = self.bounds;
		let columns = ((max_x - min_x) / self.grid_spacing).floor() as u32 + 1;
		let rows = ((max_y - min_y) / self.grid_spacing).floor() as u32 + 1;

		(0..rows).flat_map(move |row| {
			(0..columns).map(move |column| {
				Vec2::new(
					min_x + column as f32 * self.grid_spacing,
					min_y + row as f32 * self.grid_spacing,
				)
			})
		})
	}
}

/// Counts for a whole forest.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ForestStats {
	pub trees: u32,
	pub totals: TreeStats,
}

/// Trees scattered over a noise field, all drawn from one seeded stream.
#[derive(Debug, Clone, PartialEq)]
pub struct Forest {
	trees: Vec<Tree>,
}

impl Forest {
	/// Picks a tree for every grid point where the placement noise clears the threshold.
	pub fn plant(config: &ForestConfig) -> Result<Self, VegetationError> {
		config.validate()?;

		let noise = NoiseConfig::<2, Perlin>::default()
			.with_seed(config.seed)
			.with_frequency(config.noise_frequency);
		let mut rng = Mersenne::new(config.seed);

		let mut trees = Vec::new();
		for point in config.grid() {
			if noise.vec2_on_unit(point) < config.placement_threshold {
				continue;
			}

			let params = TreeParams {
				shape: TreeShape::pick(&mut rng),
				foliage: FoliageShape::pick(&mut rng),
				bend: TrunkBend::pick(&mut rng),
				funnel: rng.next_bounded(2) == 1,
				leaf_layout: config.leaf_layout,
				branch_lift: BranchLift::pick(&mut rng),
				placement: point.extend(0.0),
				dimensions: TreeDimensions::randomized(&mut rng),
			};
			trees.push(Tree::new(params, &mut rng)?);
		}

		Ok(Self { trees })
	}

	/// Plants the forest and appends every tree to `assembler`.
	pub fn build(
		config: &ForestConfig,
		assembler: &mut MeshAssembler,
	) -> Result<ForestStats, VegetationError> {
		let forest = Self::plant(config)?;
		let stats = forest.emit(assembler);
		log::info!(
			"Built forest of {} trees with {} vertices (seed {})",
			stats.trees,
			stats.totals.vertices,
			config.seed
		);
		Ok(stats)
	}

	pub fn trees(&self) -> &[Tree] {
		&self.trees
	}

	pub fn emit(&self, assembler: &mut MeshAssembler) -> ForestStats {
		let mut stats = ForestStats::default();
		for tree in &self.trees {
			stats.totals += tree.build(assembler);
			stats.trees += 1;
		}
		stats
	}
}

impl RenderItem for Forest {
	fn assemble(&self, assembler: &mut MeshAssembler) {
		self.emit(assembler);
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use render_item::Pass;

	fn small() -> ForestConfig {
		ForestConfig::default()
			.with_bounds((-20.0, 20.0, -20.0, 20.0))
			.with_placement_threshold(0.5)
	}

	#[test]
	fn test_grid_covers_bounds() {
		let config =
			ForestConfig::default().with_bounds((0.0, 10.0, 0.0, 4.0)).with_grid_spacing(5.0);
		let points: Vec<_> = config.grid().collect();
		assert_eq!(points.len(), 3);
		assert_eq!(points[2], Vec2::new(10.0, 0.0));

		let config = config.with_grid_spacing(2.0);
		assert_eq!(config.grid().count(), 6 * 3);
	}

	#[test]
	fn test_same_seed_same_forest() {
		let build = |config: &ForestConfig| {
			let mut assembler = MeshAssembler::new();
			let stats = Forest::build(config, &mut assembler).unwrap();
			(stats, assembler.to_bytes())
		};

		let (stats, bytes) = build(&small());
		assert_eq!((stats, bytes.clone()), build(&small()));
		assert_ne!(bytes, build(&small().with_seed(43)).1);
	}

	#[test]
	fn test_zero_threshold_fills_every_grid_point() {
		let config = small().with_placement_threshold(0.0);
		let forest = Forest::plant(&config).unwrap();
		assert_eq!(forest.trees().len(), config.grid().count());

		for (tree, point) in forest.trees().iter().zip(config.grid()) {
			assert_eq!(tree.params().placement, point.extend(0.0));
			assert_eq!(tree.params().leaf_layout, LeafLayout::Fan);
		}
	}

	#[test]
	fn test_unreachable_threshold_plants_nothing() {
		let config = small().with_placement_threshold(1.1);
		let mut assembler = MeshAssembler::new();
		let stats = Forest::build(&config, &mut assembler).unwrap();
		assert_eq!(stats.trees, 0);
		assert!(assembler.is_empty());
	}

	#[test]
	fn test_trees_index_only_their_own_vertices() {
		let forest = Forest::plant(&small().with_placement_threshold(0.0)).unwrap();
		let mut assembler = MeshAssembler::new();

		for tree in forest.trees() {
			let first = assembler.next_index();
			let opaque = assembler.indices(Pass::Opaque).len();
			let alpha = assembler.indices(Pass::Alpha).len();
			tree.build(&mut assembler);
			let end = assembler.next_index();

			for &index in assembler.indices(Pass::Opaque)[opaque..]
				.iter()
				.chain(&assembler.indices(Pass::Alpha)[alpha..])
			{
				assert!((first..end).contains(&index));
			}
		}

		assert!(assembler.validate().is_ok());
	}

	#[test]
	fn test_invalid_configs_are_rejected() {
		for config in [
			ForestConfig::default().with_grid_spacing(0.0),
			ForestConfig::default().with_grid_spacing(f32::NAN),
			ForestConfig::default().with_bounds((10.0, 0.0, 0.0, 10.0)),
			ForestConfig::default().with_bounds((0.0, f32::INFINITY, 0.0, 10.0)),
		] {
			assert!(matches!(
				Forest::plant(&config),
				Err(VegetationError::InvalidArgument { .. })
			));
		}
	}

	#[test]
	fn test_config_from_toml() {
		let config: ForestConfig = toml::from_str(
			r#"
			seed = 9
			bounds = [0.0, 30.0, 0.0, 30.0]
			leaf_layout = "scatter"
			"#,
		)
		.unwrap();
		assert_eq!(config.bounds, (0.0, 30.0, 0.0, 30.0));
		assert_eq!(config.leaf_layout, LeafLayout::Scatter);
		assert_eq!(config.grid_spacing, 5.0);
	}
}
