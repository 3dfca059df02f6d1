//! Command-line arguments and job-file loading.
use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::Parser;
use tree_scatter::prelude::{ScatterJob, SurfaceMask};

#[derive(Parser, Debug)]
#[command(name = "tree-scatter")]
#[command(about = "Scatter trees over terrain and export the placements as a JSON scene")]
pub struct Cli {
    /// RON job file; flags below override its fields
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Number of candidates to evaluate
    #[arg(long)]
    pub count: Option<usize>,

    /// Half side length of the square scatter area
    #[arg(long)]
    pub radius: Option<f32>,

    /// Minimum density a candidate needs, in [0, 1]
    #[arg(long)]
    pub threshold: Option<f32>,

    /// Height the downward ground probe starts from
    #[arg(long)]
    pub probe_height: Option<f32>,

    /// Maximum distance the ground probe travels
    #[arg(long)]
    pub probe_distance: Option<f32>,

    /// Bit mask of surface layers the probe may hit
    #[arg(long)]
    pub surface_mask: Option<u32>,

    /// Grayscale image biasing placement density
    #[arg(long)]
    pub density_map: Option<PathBuf>,

    /// 16-bit grayscale heightmap covering the scatter area
    #[arg(long, conflicts_with = "ground_height")]
    pub heightmap: Option<PathBuf>,

    /// Height of full-white heightmap texels above the offset
    #[arg(long, default_value_t = 1000.0)]
    pub height_scale: f32,

    /// Height of black heightmap texels
    #[arg(long, default_value_t = 0.0)]
    pub height_offset: f32,

    /// Height of a flat ground plane (used when no heightmap is given)
    #[arg(long)]
    pub ground_height: Option<f32>,

    /// Destination of the JSON document
    #[arg(long, short)]
    pub output: Option<PathBuf>,

    /// Document name
    #[arg(long)]
    pub name: Option<String>,

    /// Write indented JSON
    #[arg(long)]
    pub pretty: bool,

    /// Version label written to the document
    #[arg(long)]
    pub doc_version: Option<String>,

    /// Seed for reproducible output
    #[arg(long)]
    pub seed: Option<u64>,

    /// Log filter, e.g. `debug` or `tree_scatter=trace`
    #[arg(long)]
    pub log: Option<String>,
}

/// Where ground heights come from.
#[derive(Debug, Clone, PartialEq)]
pub enum GroundSource {
    Flat(f32),
    Heightmap {
        path: PathBuf,
        scale: f32,
        offset: f32,
    },
}

impl Cli {
    /// Loads the job file, if any, and applies flag overrides.
    pub fn job(&self) -> Result<ScatterJob> {
        let mut job = match &self.config {
            Some(path) => load_job(path)?,
            None => ScatterJob::default(),
        };
        self.apply(&mut job);
        Ok(job)
    }

    fn apply(&self, job: &mut ScatterJob) {
        let generation = &mut job.generation;
        if let Some(count) = self.count {
            generation.count = count;
        }
        if let Some(radius) = self.radius {
            generation.radius = radius;
        }
        if let Some(threshold) = self.threshold {
            generation.threshold = threshold;
        }
        if let Some(h) = self.probe_height {
            generation.probe.start_height = h;
        }
        if let Some(d) = self.probe_distance {
            generation.probe.max_distance = d;
        }
        if let Some(mask) = self.surface_mask {
            generation.probe.mask = SurfaceMask(mask);
        }

        let output = &mut job.output;
        if let Some(path) = &self.output {
            output.path = path.clone();
        }
        if let Some(name) = &self.name {
            output.name = name.clone();
        }
        if self.pretty {
            output.pretty_print = true;
        }
        if let Some(version) = &self.doc_version {
            output.version = version.clone();
        }

        if self.seed.is_some() {
            job.seed = self.seed;
        }
    }

    pub fn ground(&self) -> GroundSource {
        match &self.heightmap {
            Some(path) => GroundSource::Heightmap {
                path: path.clone(),
                scale: self.height_scale,
                offset: self.height_offset,
            },
            None => GroundSource::Flat(self.ground_height.unwrap_or(0.0)),
        }
    }
}

/// Reads a [`ScatterJob`] from a RON file.
pub fn load_job(path: &Path) -> Result<ScatterJob> {
    let text = fs::read_to_string(path)
        .with_context(|| format!("failed to read job file '{}'", path.display()))?;
    ron::from_str(&text).with_context(|| format!("failed to parse job file '{}'", path.display()))
}
