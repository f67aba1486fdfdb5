use crate::error::VegetationError;
use bevy::prelude::*;
use comproc::RandomSource;
use std::f32::consts::PI;
use std::str::FromStr;

/// Declares a closed parameter enum that parses from its lowercase name or its numeric code.
///
/// Codes follow declaration order.
macro_rules! parameter_enum {
	(
		$(#[$meta:meta])*
		$name:ident as $label:literal {
			$($(#[$variant_meta:meta])* $variant:ident => $text:literal),+ $(,)?
		}
	) => {
		$(#[$meta])*
		#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, serde::Deserialize)]
		#[serde(try_from = "String")]
		pub enum $name {
			$($(#[$variant_meta])* $variant),+
		}

		impl $name {
			pub const ALL: &'static [Self] = &[$(Self::$variant),+];

			pub fn name(self) -> &'static str {
				match self {
					$(Self::$variant => $text),+
				}
			}

			/// Picks a variant uniformly from the random stream.
			pub fn pick(rng: &mut impl RandomSource) -> Self {
				Self::ALL[rng.next_bounded(Self::ALL.len() as u32) as usize]
			}

			fn expected() -> String {
				Self::ALL.iter().map(|variant| variant.name()).collect::<Vec<_>>().join(", ")
			}
		}

		impl std::fmt::Display for $name {
			fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
				f.write_str(self.name())
			}
		}

		impl FromStr for $name {
			type Err = VegetationError;

			fn from_str(value: &str) -> Result<Self, Self::Err> {
				let wanted = value.trim().to_ascii_lowercase();
				Self::ALL.iter().copied().find(|variant| variant.name() == wanted).ok_or_else(|| {
					VegetationError::invalid_argument(
						$label,
						format!("unknown value `{}`, expected one of: {}", value, Self::expected()),
					)
				})
			}
		}

		impl TryFrom<u8> for $name {
			type Error = VegetationError;

			fn try_from(code: u8) -> Result<Self, Self::Error> {
				Self::ALL.get(code as usize).copied().ok_or_else(|| {
					VegetationError::invalid_argument(
						$label,
						format!("unknown code {}, expected 0..{}", code, Self::ALL.len()),
					)
				})
			}
		}

		impl TryFrom<String> for $name {
			type Error = VegetationError;

			fn try_from(value: String) -> Result<Self, Self::Error> {
				value.parse()
			}
		}
	};
}

parameter_enum! {
	/// Overall silhouette of the tree.
	TreeShape as "tree_shape" {
		#[default]
		Normal => "normal",
		/// Wide crown; the trunk tapers at half the normal rate.
		Canopy => "canopy",
		/// Rings of foliage on the trunk instead of branches.
		Evergreen => "evergreen",
	}
}

parameter_enum! {
	/// Fixed-topology mesh used for each cluster of foliage.
	FoliageShape as "foliage_shape" {
		#[default]
		Panel => "panel",
		Shield => "shield",
		Sag => "sag",
		Bowl => "bowl",
		Umbrella => "umbrella",
	}
}

parameter_enum! {
	/// Lateral displacement of the trunk centerline.
	TrunkBend as "trunk_bend" {
		Bent => "bent",
		Jagged => "jagged",
		#[default]
		Straight => "straight",
	}
}

parameter_enum! {
	/// How the leaves are laid out in the foliage atlas cell.
	LeafLayout as "leaf_layout" {
		#[default]
		Fan => "fan",
		Scatter => "scatter",
	}
}

parameter_enum! {
	/// Curve applied to the branch rise along its length.
	BranchLift as "branch_lift" {
		#[default]
		Linear => "linear",
		Out => "out",
		In => "in",
	}
}

impl BranchLift {
	/// Normalized rise at normalized branch position `t`.
	pub fn curve(self, t: f32) -> f32 {
		match self {
			Self::Linear => t,
			Self::Out => t * t,
			Self::In => {
				let inverse = 1.0 - t;
				1.0 - inverse * inverse * inverse
			}
		}
	}
}

/// Highest normalized trunk height a branch may attach at.
pub const HIGHEST_BRANCH: f32 = 0.95;

/// Numeric dimensions of a tree.
#[derive(Debug, Clone, Copy, PartialEq, serde::Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct TreeDimensions {
	/// Trunk height in world units.
	pub height: f32,
	pub branch_count: u32,
	/// Normalized trunk height of the first branch.
	pub lowest_branch: f32,
	pub base_radius: f32,
	/// Branch length as a multiple of the trunk remaining above its root.
	pub branch_reach: f32,
	pub branch_lift: f32,
	/// Rotation of the first branch about the trunk axis, in radians.
	pub angle_offset: f32,
}

impl Default for TreeDimensions {
	fn default() -> Self {
		let height = 12.0;
		Self {
			height,
			branch_count: 4,
			lowest_branch: 3.0 / height + 0.1,
			base_radius: 0.2 + (height / 20.0) * 0.5 + 1.0,
			branch_reach: 1.25,
			branch_lift: 1.5,
			angle_offset: PI,
		}
	}
}

impl TreeDimensions {
	/// Draws a varied set of dimensions.
	///
	/// Draws are taken in a fixed order so the same stream always yields the same tree.
	pub fn randomized(rng: &mut impl RandomSource) -> Self {
		let default_height = 8.0 + rng.next_uniform() * 4.0 + rng.next_uniform() * 4.0;
		let default_branches = 2 + rng.next_bounded(2);
		let default_lowest = 3.0 / default_height;
		let default_radius = 0.2 + (default_height / 20.0) * rng.next_uniform();

		let height = default_height * (0.5 + rng.next_uniform());
		let branch_count = default_branches + rng.next_bounded(3);
		let lowest_branch = default_lowest + rng.next_uniform() * 0.2;
		let base_radius = default_radius + rng.next_bounded(3) as f32;

		let branch_reach = 1.0 + rng.next_uniform() * 0.5;
		let branch_lift = 1.0 + rng.next_uniform();
		let angle_offset = rng.next_uniform() * 2.0 * PI;

		Self {
			height,
			branch_count,
			lowest_branch,
			base_radius,
			branch_reach,
			branch_lift,
			angle_offset,
		}
	}

	pub fn with_height(mut self, height: f32) -> Self {
		self.height = height;
		self
	}

	pub fn with_branch_count(mut self, branch_count: u32) -> Self {
		self.branch_count = branch_count;
		self
	}

	pub fn with_lowest_branch(mut self, lowest_branch: f32) -> Self {
		self.lowest_branch = lowest_branch;
		self
	}

	pub fn with_base_radius(mut self, base_radius: f32) -> Self {
		self.base_radius = base_radius;
		self
	}

	pub fn with_branch_reach(mut self, branch_reach: f32) -> Self {
		self.branch_reach = branch_reach;
		self
	}

	pub fn with_branch_lift(mut self, branch_lift: f32) -> Self {
		self.branch_lift = branch_lift;
		self
	}

	pub fn with_angle_offset(mut self, angle_offset: f32) -> Self {
		self.angle_offset = angle_offset;
		self
	}

	pub fn validate(&self) -> Result<(), VegetationError> {
		for (name, value) in [
			("height", self.height),
			("base_radius", self.base_radius),
			("branch_reach", self.branch_reach),
			("branch_lift", self.branch_lift),
		] {
			if !value.is_finite() || value <= 0.0 {
				return Err(VegetationError::invalid_argument(
					name,
					format!("must be finite and positive, got {value}"),
				));
			}
		}

		if !self.angle_offset.is_finite() {
			return Err(VegetationError::invalid_argument(
				"angle_offset",
				format!("must be finite, got {}", self.angle_offset),
			));
		}

		if !(0.0..HIGHEST_BRANCH).contains(&self.lowest_branch) {
			return Err(VegetationError::invalid_argument(
				"lowest_branch",
				format!("must lie in [0, {HIGHEST_BRANCH}), got {}", self.lowest_branch),
			));
		}

		Ok(())
	}
}

/// Everything needed to build one tree.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct TreeParams {
	pub shape: TreeShape,
	pub foliage: FoliageShape,
	pub bend: TrunkBend,
	/// Tapers the trunk along `1 - (1 - h)^2` instead of linearly.
	pub funnel: bool,
	pub leaf_layout: LeafLayout,
	pub branch_lift: BranchLift,
	/// Position of the trunk base in tree space (+Z up).
	pub placement: Vec3,
	pub dimensions: TreeDimensions,
}

impl TreeParams {
	pub fn with_shape(mut self, shape: TreeShape) -> Self {
		self.shape = shape;
		self
	}

	pub fn with_foliage(mut self, foliage: FoliageShape) -> Self {
		self.foliage = foliage;
		self
	}

	pub fn with_bend(mut self, bend: TrunkBend) -> Self {
		self.bend = bend;
		self
	}

	pub fn with_funnel(mut self, funnel: bool) -> Self {
		self.funnel = funnel;
		self
	}

	pub fn with_leaf_layout(mut self, leaf_layout: LeafLayout) -> Self {
		self.leaf_layout = leaf_layout;
		self
	}

	pub fn with_branch_lift(mut self, branch_lift: BranchLift) -> Self {
		self.branch_lift = branch_lift;
		self
	}

	pub fn with_placement(mut self, placement: Vec3) -> Self {
		self.placement = placement;
		self
	}

	pub fn with_dimensions(mut self, dimensions: TreeDimensions) -> Self {
		self.dimensions = dimensions;
		self
	}

	pub fn validate(&self) -> Result<(), VegetationError> {
		if !self.placement.is_finite() {
			return Err(VegetationError::invalid_argument(
				"placement",
				format!("must be finite, got {}", self.placement),
			));
		}
		self.dimensions.validate()
	}
}

/// File form of [`TreeParams`] plus the seed that drives the build.
#[derive(Debug, Clone, PartialEq, serde::Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct TreeConfig {
	pub seed: u32,
	/// Replaces `dimensions` with a draw from the seeded stream.
	pub randomize: bool,
	pub shape: TreeShape,
	pub foliage: FoliageShape,
	pub bend: TrunkBend,
	pub funnel: bool,
	pub leaf_layout: LeafLayout,
	pub branch_lift: BranchLift,
	pub placement: [f32; 3],
	pub dimensions: TreeDimensions,
}

impl Default for TreeConfig {
	fn default() -> Self {
		Self {
			seed: 5489,
			randomize: false,
			shape: TreeShape::default(),
			foliage: FoliageShape::default(),
			bend: TrunkBend::default(),
			funnel: false,
			leaf_layout: LeafLayout::default(),
			branch_lift: BranchLift::default(),
			placement: [0.0; 3],
			dimensions: TreeDimensions::default(),
		}
	}
}

impl TreeConfig {
	/// Resolves the parameters, drawing dimensions from `rng` when randomizing.
	pub fn params(&self, rng: &mut impl RandomSource) -> TreeParams {
		let dimensions =
			if self.randomize { TreeDimensions::randomized(rng) } else { self.dimensions };

		TreeParams {
			shape: self.shape,
			foliage: self.foliage,
			bend: self.bend,
			funnel: self.funnel,
			leaf_layout: self.leaf_layout,
			branch_lift: self.branch_lift,
			placement: Vec3::from_array(self.placement),
			dimensions,
		}
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use comproc::Mersenne;

	#[test]
	fn test_enums_parse_names_and_codes() {
		assert_eq!("canopy".parse::<TreeShape>().unwrap(), TreeShape::Canopy);
		assert_eq!(" Umbrella ".parse::<FoliageShape>().unwrap(), FoliageShape::Umbrella);
		assert_eq!(TrunkBend::try_from(1).unwrap(), TrunkBend::Jagged);
		assert_eq!(LeafLayout::try_from(1).unwrap(), LeafLayout::Scatter);
		assert_eq!(BranchLift::try_from(2).unwrap(), BranchLift::In);

		for shape in FoliageShape::ALL {
			assert_eq!(shape.name().parse::<FoliageShape>().unwrap(), *shape);
		}
	}

	#[test]
	fn test_unknown_enum_values_are_invalid_arguments() {
		match "willow".parse::<TreeShape>() {
			Err(VegetationError::InvalidArgument { name, reason }) => {
				assert_eq!(name, "tree_shape");
				assert!(reason.contains("willow"));
				assert!(reason.contains("evergreen"));
			}
			other => panic!("unexpected result {other:?}"),
		}

		assert!(matches!(
			FoliageShape::try_from(5),
			Err(VegetationError::InvalidArgument { name: "foliage_shape", .. })
		));
	}

	#[test]
	fn test_lift_curves_meet_at_ends() {
		for lift in BranchLift::ALL {
			assert_eq!(lift.curve(0.0), 0.0);
			assert_eq!(lift.curve(1.0), 1.0);
		}
		assert_eq!(BranchLift::Out.curve(0.5), 0.25);
		assert_eq!(BranchLift::In.curve(0.5), 0.875);
	}

	#[test]
	fn test_default_dimensions() {
		let dimensions = TreeDimensions::default();
		assert_eq!(dimensions.height, 12.0);
		assert_eq!(dimensions.branch_count, 4);
		assert!((dimensions.lowest_branch - 0.35).abs() < 1e-6);
		assert!((dimensions.base_radius - 1.5).abs() < 1e-6);
		assert!(dimensions.validate().is_ok());
	}

	#[test]
	fn test_dimension_validation() {
		let bad = [
			TreeDimensions::default().with_height(0.0),
			TreeDimensions::default().with_height(f32::NAN),
			TreeDimensions::default().with_base_radius(-1.0),
			TreeDimensions::default().with_branch_reach(f32::INFINITY),
			TreeDimensions::default().with_lowest_branch(0.95),
			TreeDimensions::default().with_lowest_branch(-0.1),
			TreeDimensions::default().with_angle_offset(f32::NAN),
		];
		for dimensions in bad {
			assert!(
				matches!(dimensions.validate(), Err(VegetationError::InvalidArgument { .. })),
				"{dimensions:?} should be rejected"
			);
		}
	}

	#[test]
	fn test_randomized_dimensions_are_valid_and_repeatable() {
		for seed in 0..64 {
			let a = TreeDimensions::randomized(&mut Mersenne::new(seed));
			let b = TreeDimensions::randomized(&mut Mersenne::new(seed));
			assert_eq!(a, b);
			assert!(a.validate().is_ok(), "{a:?}");
			assert!((2..=5).contains(&a.branch_count));
		}
	}

	#[test]
	fn test_config_from_toml() {
		let config: TreeConfig = toml::from_str(
			r#"
			seed = 7
			shape = "canopy"
			foliage = "sag"
			funnel = true
			placement = [1.0, 2.0, 0.0]

			[dimensions]
			height = 20.0
			branch_count = 6
			"#,
		)
		.unwrap();

		assert_eq!(config.seed, 7);
		assert_eq!(config.shape, TreeShape::Canopy);
		assert_eq!(config.bend, TrunkBend::Straight);
		assert_eq!(config.dimensions.height, 20.0);
		assert_eq!(config.dimensions.branch_reach, 1.25);

		let params = config.params(&mut Mersenne::new(config.seed));
		assert_eq!(params.placement, Vec3::new(1.0, 2.0, 0.0));
		assert_eq!(params.foliage, FoliageShape::Sag);
		assert!(params.funnel);
	}

	#[test]
	fn test_config_rejects_unknown_shape() {
		let error = toml::from_str::<TreeConfig>(r#"shape = "willow""#).unwrap_err();
		assert!(error.to_string().contains("willow"));
	}
}
