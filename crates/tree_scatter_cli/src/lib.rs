#![forbid(unsafe_code)]

mod cli;
mod images;

pub use cli::{load_job, Cli, GroundSource};
pub use images::{load_density_map, load_heightfield};

use anyhow::Context;
use tracing_subscriber::EnvFilter;

/// Installs a fmt subscriber. `filter` wins over `RUST_LOG`; the fallback is `info`.
///
/// An explicit `filter` that does not parse is an error; a bad `RUST_LOG` falls back.
pub fn init_tracing(filter: Option<&str>) -> anyhow::Result<()> {
    let env_filter = log_filter(filter)?;
    let _ = tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_target(false)
        .try_init();
    Ok(())
}

fn log_filter(filter: Option<&str>) -> anyhow::Result<EnvFilter> {
    match filter {
        Some(f) => EnvFilter::try_new(f).with_context(|| format!("invalid log filter '{f}'")),
        None => Ok(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"))),
    }
}
