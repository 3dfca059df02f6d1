//! Generate-and-save entry point.
//!
//! A [`ScatterJob`] bundles everything one run needs apart from the collaborators
//! (ground resolver, density map, instantiation sink). It is deserializable so that
//! harnesses can read it from configuration files.
use std::path::PathBuf;
use std::time::{SystemTime, UNIX_EPOCH};

use rand::rngs::StdRng;
use rand::SeedableRng;
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::density::DensitySampler;
use crate::document;
use crate::error::{Error, Result};
use crate::events::EventSink;
use crate::generator::{
    CancelFlag, GenerationStats, GeneratorConfig, PlacementGenerator, TreeTemplate,
};
use crate::ground::GroundResolver;
use crate::instancing::InstantiationSink;
use crate::scene::{ReferencePoses, SceneDocument};

/// Where and how the document is written.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    pub path: PathBuf,
    pub name: String,
    pub pretty_print: bool,
    /// Carried into the document verbatim.
    pub version: String,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            path: PathBuf::from("map.json"),
            name: "tree test".into(),
            pretty_print: false,
            version: "1.3".into(),
        }
    }
}

impl OutputConfig {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            ..Default::default()
        }
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    pub fn with_pretty_print(mut self, pretty_print: bool) -> Self {
        self.pretty_print = pretty_print;
        self
    }

    pub fn with_version(mut self, version: impl Into<String>) -> Self {
        self.version = version.into();
        self
    }

    pub fn validate(&self) -> Result<()> {
        if self.path.as_os_str().is_empty() {
            return Err(Error::InvalidConfig("output path must not be empty".into()));
        }
        Ok(())
    }

    /// An empty document carrying this output's metadata.
    pub fn empty_document(&self) -> SceneDocument {
        SceneDocument::new(self.name.clone(), self.version.clone())
            .with_pretty_print(self.pretty_print)
    }
}

/// One generate-and-save run.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScatterJob {
    pub generation: GeneratorConfig,
    pub output: OutputConfig,
    pub template: TreeTemplate,
    pub reference: ReferencePoses,
    /// Explicit seed for reproducible runs; a time-derived seed is used when absent.
    pub seed: Option<u64>,
}

/// What a finished job did.
#[derive(Debug, Clone)]
pub struct JobReport {
    pub seed: u64,
    pub stats: GenerationStats,
    pub path: PathBuf,
}

impl ScatterJob {
    pub fn new(generation: GeneratorConfig, output: OutputConfig) -> Self {
        Self {
            generation,
            output,
            ..Default::default()
        }
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    pub fn with_template(mut self, template: TreeTemplate) -> Self {
        self.template = template;
        self
    }

    pub fn with_reference_poses(mut self, reference: ReferencePoses) -> Self {
        self.reference = reference;
        self
    }

    /// Validates every part of the job, returning the first error.
    pub fn validate(&self) -> Result<()> {
        self.generation.validate()?;
        self.template.validate()?;
        self.output.validate()
    }

    /// Generates, finalizes, and saves the document.
    pub fn run(
        &self,
        ground: &dyn GroundResolver,
        density: DensitySampler,
        instantiator: &mut dyn InstantiationSink,
    ) -> Result<JobReport> {
        self.run_with(ground, density, instantiator, &mut (), &CancelFlag::new())
    }

    /// Like [`ScatterJob::run`], with an event sink and a cancellation flag.
    ///
    /// A cancelled run still saves whatever was accepted before cancellation.
    pub fn run_with(
        &self,
        ground: &dyn GroundResolver,
        density: DensitySampler,
        instantiator: &mut dyn InstantiationSink,
        sink: &mut dyn EventSink,
        cancel: &CancelFlag,
    ) -> Result<JobReport> {
        self.validate()?;

        let seed = resolve_seed(self.seed);
        info!("Using seed {}.", seed);
        let mut rng = StdRng::seed_from_u64(seed);

        let generator = PlacementGenerator::try_new(self.generation.clone(), ground)?
            .with_template(self.template.clone())?
            .with_reference_poses(self.reference)
            .with_density(density);

        let outcome = generator.generate_with(
            self.output.empty_document(),
            &mut rng,
            instantiator,
            sink,
            cancel,
        );

        document::save(&outcome.document, &self.output.path)?;
        info!(
            "Generated {} trees. JSON saved to: {}",
            outcome.document.objects.len(),
            self.output.path.display()
        );

        Ok(JobReport {
            seed,
            stats: outcome.stats,
            path: self.output.path.clone(),
        })
    }
}

/// Returns `seed` if given, otherwise a seed derived from the current time.
pub fn resolve_seed(seed: Option<u64>) -> u64 {
    seed.unwrap_or_else(|| {
        let nanos = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_nanos() as u64)
            .unwrap_or(0);
        mix_u64(nanos ^ 0x9E3779B97F4A7C15)
    })
}

#[inline]
fn mix_u64(mut x: u64) -> u64 {
    x ^= x >> 30;
    x = x.wrapping_mul(0xBF58476D1CE4E5B9);
    x ^= x >> 27;
    x = x.wrapping_mul(0x94D049BB133111EB);
    x ^ (x >> 31)
}
