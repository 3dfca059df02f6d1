use anyhow::Context;
use clap::Parser;
use tracing::trace;
use tree_scatter::prelude::*;
use tree_scatter_cli::{init_tracing, load_density_map, load_heightfield, Cli, GroundSource};

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.log.as_deref())?;

    let job = cli.job()?;
    job.validate().context("invalid job")?;

    let density = match &cli.density_map {
        Some(path) => DensitySampler::with_map(load_density_map(path)?),
        None => DensitySampler::uniform(),
    };

    let ground: Box<dyn GroundResolver> = match cli.ground() {
        GroundSource::Flat(height) => Box::new(FlatGround::new(height)),
        GroundSource::Heightmap {
            path,
            scale,
            offset,
        } => Box::new(load_heightfield(
            &path,
            job.generation.radius,
            scale,
            offset,
        )?),
    };

    let mut instantiator = FnInstantiator::new(|kind: &str, pose: &Pose| {
        trace!("Placed {} at {}.", kind, pose.position);
    });

    let report = job
        .run(ground.as_ref(), density, &mut instantiator)
        .with_context(|| format!("failed to generate '{}'", job.output.path.display()))?;

    println!(
        "{} of {} candidates placed (seed {}), written to {}",
        report.stats.accepted,
        report.stats.requested,
        report.seed,
        report.path.display()
    );
    Ok(())
}
