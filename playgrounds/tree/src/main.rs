use anyhow::Result;
use clap::Parser;
use tracing_subscriber::EnvFilter;
use tree_playground::{run, Args};

fn main() -> Result<()> {
	tracing_subscriber::fmt()
		.with_env_filter(
			EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
		)
		.init();

	let args = Args::parse();
	let report = run(&args)?;

	log::info!(
		"{} tree(s): {} vertices, {} opaque and {} alpha triangles, {} skipped branches",
		report.trees,
		report.vertices,
		report.opaque_triangles,
		report.alpha_triangles,
		report.stats.skipped_branches
	);
	log::info!("Atlas foliage cell holds {} leaves", report.leaves);

	Ok(())
}
