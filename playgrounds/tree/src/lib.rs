use anyhow::{Context, Result};
use clap::Parser;
use comproc::Mersenne;
use render_item::{MeshAssembler, Pass};
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};
use vegetation::atlas::AtlasSources;
use vegetation::{
	AtlasLayout, FoliageShape, Forest, ForestConfig, LeafLayout, LeafPlacer, Palette, Tree,
	TreeConfig, TreeShape, TreeStats, TrunkBend,
};

#[derive(Parser, Debug, Clone)]
#[command(name = "tree-playground")]
#[command(about = "Builds a procedural tree or forest and reports what it made")]
#[command(version)]
pub struct Args {
	/// TOML file with `[tree]` and `[forest]` tables
	#[arg(short, long)]
	pub config: Option<PathBuf>,

	/// Seed for the random stream (overrides the file)
	#[arg(short, long)]
	pub seed: Option<u32>,

	#[arg(long)]
	pub tree_shape: Option<TreeShape>,

	#[arg(long)]
	pub foliage: Option<FoliageShape>,

	#[arg(long)]
	pub bend: Option<TrunkBend>,

	/// Taper the trunk like a funnel
	#[arg(long)]
	pub funnel: bool,

	#[arg(long)]
	pub leaf_layout: Option<LeafLayout>,

	/// Draw the tree dimensions from the seed
	#[arg(long)]
	pub randomize: bool,

	/// Build a forest instead of a single tree
	#[arg(long)]
	pub forest: bool,

	/// Climate moisture in [0, 1] for the atlas palette
	#[arg(long, default_value_t = 0.5)]
	pub moisture: f32,

	/// Climate temperature in [0, 1] for the atlas palette
	#[arg(long, default_value_t = 0.5)]
	pub temperature: f32,

	/// Write the mesh as Wavefront OBJ
	#[arg(long)]
	pub obj: Option<PathBuf>,
}

/// Contents of a playground config file.
#[derive(Debug, Clone, Default, PartialEq, serde::Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct PlaygroundConfig {
	pub tree: TreeConfig,
	pub forest: ForestConfig,
}

impl PlaygroundConfig {
	pub fn load(path: &Path) -> Result<Self> {
		let text = std::fs::read_to_string(path)
			.with_context(|| format!("failed to read config {}", path.display()))?;
		toml::from_str(&text).with_context(|| format!("failed to parse config {}", path.display()))
	}
}

impl Args {
	/// Loads the config file, if any, and lays the flags over it.
	pub fn resolve(&self) -> Result<PlaygroundConfig> {
		let mut config = match &self.config {
			Some(path) => PlaygroundConfig::load(path)?,
			None => PlaygroundConfig::default(),
		};

		if let Some(seed) = self.seed {
			config.tree.seed = seed;
			config.forest.seed = seed;
		}
		if let Some(shape) = self.tree_shape {
			config.tree.shape = shape;
		}
		if let Some(foliage) = self.foliage {
			config.tree.foliage = foliage;
		}
		if let Some(bend) = self.bend {
			config.tree.bend = bend;
		}
		if let Some(leaf_layout) = self.leaf_layout {
			config.tree.leaf_layout = leaf_layout;
			config.forest.leaf_layout = leaf_layout;
		}
		config.tree.funnel |= self.funnel;
		config.tree.randomize |= self.randomize;

		Ok(config)
	}
}

/// What one run produced.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Report {
	pub trees: u32,
	pub stats: TreeStats,
	pub vertices: usize,
	pub opaque_triangles: usize,
	pub alpha_triangles: usize,
	pub leaves: usize,
}

pub fn run(args: &Args) -> Result<Report> {
	let config = args.resolve()?;
	let mut assembler = MeshAssembler::new();

	let (trees, stats, seed, leaf_layout) = if args.forest {
		let planted =
			Forest::build(&config.forest, &mut assembler).context("failed to plant forest")?;
		(planted.trees, planted.totals, config.forest.seed, config.forest.leaf_layout)
	} else {
		let mut rng = Mersenne::new(config.tree.seed);
		let params = config.tree.params(&mut rng);
		let tree = Tree::new(params, &mut rng).context("failed to build tree")?;
		(1, tree.build(&mut assembler), config.tree.seed, config.tree.leaf_layout)
	};

	assembler.validate().context("generated mesh is inconsistent")?;

	let atlas = AtlasLayout::compose(
		&Palette::from_climate(args.moisture, args.temperature),
		&LeafPlacer::new(leaf_layout),
		&AtlasSources::default(),
		&mut Mersenne::new(seed),
	);

	if let Some(path) = &args.obj {
		let file =
			File::create(path).with_context(|| format!("failed to create {}", path.display()))?;
		let mut writer = BufWriter::new(file);
		assembler
			.write_obj(&mut writer, "tree")
			.and_then(|()| writer.flush())
			.with_context(|| format!("failed to write {}", path.display()))?;
		log::info!("Wrote {}", path.display());
	}

	Ok(Report {
		trees,
		stats,
		vertices: assembler.vertex_count(),
		opaque_triangles: assembler.triangle_count(Pass::Opaque),
		alpha_triangles: assembler.triangle_count(Pass::Alpha),
		leaves: atlas.leaves().len(),
	})
}
