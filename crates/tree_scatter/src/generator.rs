//! The placement loop: candidate generation, density rejection, ground resolution.
//!
//! Each of the `count` iterations draws one candidate and produces at most one record.
//! Rejections are silent; they show up only in [`GenerationStats`], events, and debug logs.
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use glam::{Vec2, Vec3};
use rand::RngCore;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::density::DensitySampler;
use crate::error::{Error, Result};
use crate::events::{EventSink, GenerationEvent, GenerationEventKind, RejectReason};
use crate::ground::{GroundProbe, GroundResolver};
use crate::instancing::InstantiationSink;
use crate::sampling::{inverse_lerp, rand01, rand_range, CandidateSampling, UniformSquareSampling};
use crate::scene::{AttributeSet, ObjectRecord, Pose, ReferencePoses, SceneDocument, Vec3Def};

pub const DEFAULT_TREE_KIND: &str = "PFB_INS_Savannah_Tree_Short";
pub const DEFAULT_TREE_DISPLAY_NAME: &str = "Savannah Tree Short Green";

/// What every accepted placement looks like, apart from its position and yaw.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TreeTemplate {
    /// Type identifier written to each record.
    pub kind: String,
    #[serde(with = "Vec3Def")]
    pub scale: Vec3,
    /// Yaw is drawn from `[0, max_yaw_deg)`.
    pub max_yaw_deg: f32,
    /// Attributes shared by every placement.
    pub attributes: Arc<AttributeSet>,
}

impl Default for TreeTemplate {
    fn default() -> Self {
        Self {
            kind: DEFAULT_TREE_KIND.into(),
            scale: Vec3::new(1.0, 3.0, 1.0),
            max_yaw_deg: 180.0,
            attributes: Arc::new(AttributeSet::solid(DEFAULT_TREE_DISPLAY_NAME)),
        }
    }
}

impl TreeTemplate {
    pub fn new(kind: impl Into<String>, attributes: AttributeSet) -> Self {
        Self {
            kind: kind.into(),
            attributes: Arc::new(attributes),
            ..Default::default()
        }
    }

    pub fn with_scale(mut self, scale: Vec3) -> Self {
        self.scale = scale;
        self
    }

    pub fn with_max_yaw(mut self, max_yaw_deg: f32) -> Self {
        self.max_yaw_deg = max_yaw_deg;
        self
    }

    pub fn validate(&self) -> Result<()> {
        if !self.scale.is_finite() {
            return Err(Error::InvalidConfig("template scale must be finite".into()));
        }
        if !self.max_yaw_deg.is_finite() || self.max_yaw_deg < 0.0 {
            return Err(Error::InvalidConfig(
                "template max_yaw_deg must be finite and >= 0".into(),
            ));
        }
        Ok(())
    }
}

/// Configuration for a generation run.
#[non_exhaustive]
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneratorConfig {
    /// Number of candidates to evaluate.
    pub count: usize,
    /// Half side length of the square area centered on the origin.
    pub radius: f32,
    /// Minimum density a candidate needs, whatever its random draw.
    pub threshold: f32,
    /// Downward ground probe used for every candidate.
    pub probe: GroundProbe,
    /// Log progress every this many candidates; `0` disables progress logs.
    pub progress_interval: usize,
}

impl Default for GeneratorConfig {
    fn default() -> Self {
        Self {
            count: 100_000,
            radius: 7500.0,
            threshold: 0.1,
            probe: GroundProbe::default(),
            progress_interval: 10_000,
        }
    }
}

impl GeneratorConfig {
    /// Creates a new [`GeneratorConfig`] with the specified candidate count and area radius.
    pub fn new(count: usize, radius: f32) -> Self {
        Self {
            count,
            radius,
            ..Default::default()
        }
    }

    /// Sets the density threshold.
    pub fn with_threshold(mut self, threshold: f32) -> Self {
        self.threshold = threshold;
        self
    }

    /// Sets the ground probe.
    pub fn with_probe(mut self, probe: GroundProbe) -> Self {
        self.probe = probe;
        self
    }

    /// Sets the progress log interval.
    pub fn with_progress_interval(mut self, progress_interval: usize) -> Self {
        self.progress_interval = progress_interval;
        self
    }

    /// Validates the configuration, returning an error if invalid.
    pub fn validate(&self) -> Result<()> {
        if !self.radius.is_finite() || self.radius < 0.0 {
            return Err(Error::InvalidConfig(
                "radius must be finite and >= 0".into(),
            ));
        }
        if !(2.0 * self.radius).is_finite() {
            return Err(Error::InvalidConfig(
                "radius is too large to span a square".into(),
            ));
        }
        if !self.threshold.is_finite() || !(0.0..=1.0).contains(&self.threshold) {
            return Err(Error::InvalidConfig(
                "threshold must be within [0, 1]".into(),
            ));
        }
        self.probe.validate()
    }
}

/// Shared flag checked between candidates; setting it stops the loop early.
#[derive(Clone, Debug, Default)]
pub struct CancelFlag(Arc<AtomicBool>);

impl CancelFlag {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.0.store(true, Ordering::Relaxed);
    }

    #[inline]
    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::Relaxed)
    }
}

/// Counters describing a generation run.
#[non_exhaustive]
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GenerationStats {
    /// Candidates requested by the configuration.
    pub requested: usize,
    /// Candidates actually drawn (less than `requested` only when cancelled).
    pub evaluated: usize,
    /// Candidates rejected by the density test.
    pub rejected_density: usize,
    /// Candidates rejected because no ground was found.
    pub rejected_ground: usize,
    /// Candidates turned into records.
    pub accepted: usize,
    /// Whether the run stopped early.
    pub cancelled: bool,
}

impl GenerationStats {
    pub fn rejected(&self) -> usize {
        self.rejected_density + self.rejected_ground
    }
}

/// Finalized document plus run statistics.
#[derive(Debug, Clone)]
pub struct GenerationOutcome {
    pub document: SceneDocument,
    pub stats: GenerationStats,
}

pub struct PlacementGenerator<'a> {
    /// Run configuration applied to this generator.
    pub config: GeneratorConfig,
    /// Template applied to every accepted placement.
    pub template: TreeTemplate,
    /// Camera and spawn poses written after the loop.
    pub reference: ReferencePoses,
    density: DensitySampler,
    ground: &'a dyn GroundResolver,
    sampling: Box<dyn CandidateSampling>,
}

impl<'a> PlacementGenerator<'a> {
    /// Creates a generator after validating `config`.
    pub fn try_new(config: GeneratorConfig, ground: &'a dyn GroundResolver) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            config,
            template: TreeTemplate::default(),
            reference: ReferencePoses::default(),
            density: DensitySampler::uniform(),
            ground,
            sampling: Box::new(UniformSquareSampling::new()),
        })
    }

    /// Sets the density sampler.
    pub fn with_density(mut self, density: DensitySampler) -> Self {
        self.density = density;
        self
    }

    /// Sets the placement template.
    pub fn with_template(mut self, template: TreeTemplate) -> Result<Self> {
        template.validate()?;
        self.template = template;
        Ok(self)
    }

    /// Sets the camera and spawn poses.
    pub fn with_reference_poses(mut self, reference: ReferencePoses) -> Self {
        self.reference = reference;
        self
    }

    /// Sets the candidate sampling strategy.
    pub fn with_sampling<S: CandidateSampling + 'static>(mut self, sampling: S) -> Self {
        self.sampling = Box::new(sampling);
        self
    }

    /// Runs the loop headless and returns a finalized default-named document.
    pub fn generate(&self, rng: &mut impl RngCore) -> SceneDocument {
        self.generate_with(
            SceneDocument::default(),
            rng,
            &mut (),
            &mut (),
            &CancelFlag::new(),
        )
        .document
    }

    /// Runs the loop, appending to `document` and finalizing its reference records.
    pub fn generate_with(
        &self,
        document: SceneDocument,
        rng: &mut impl RngCore,
        instantiator: &mut dyn InstantiationSink,
        sink: &mut dyn EventSink,
        cancel: &CancelFlag,
    ) -> GenerationOutcome {
        run_generation(self, document, rng, instantiator, sink, cancel)
    }

    /// Normalized density-map coordinates for a candidate.
    ///
    /// Both axes are negated before mapping, so `u = 1` sits at `x = -radius`.
    pub fn density_uv(&self, x: f32, z: f32) -> Vec2 {
        let r = self.config.radius;
        Vec2::new(inverse_lerp(-r, r, -x), inverse_lerp(-r, r, -z))
    }

    /// Density the loop would sample for a candidate at `(x, z)`.
    pub fn density_at(&self, x: f32, z: f32) -> f32 {
        let uv = self.density_uv(x, z);
        self.density.sample(uv.x, uv.y)
    }
}

fn run_generation(
    generator: &PlacementGenerator<'_>,
    mut document: SceneDocument,
    rng: &mut dyn RngCore,
    instantiator: &mut dyn InstantiationSink,
    sink: &mut dyn EventSink,
    cancel: &CancelFlag,
) -> GenerationOutcome {
    let config = &generator.config;
    let template = &generator.template;
    let has_map = generator.density.has_map();

    info!(
        "Generating from {} candidates | radius: {} | density map: {} | threshold: {}.",
        config.count, config.radius, has_map, config.threshold
    );
    if has_map && config.threshold >= 1.0 {
        warn!(
            "Density threshold {} leaves only full-density texels eligible.",
            config.threshold
        );
    }
    if sink.wants(GenerationEventKind::RunStarted) {
        sink.send(GenerationEvent::RunStarted {
            config: config.clone(),
            has_density_map: has_map,
        });
    }

    let mut stats = GenerationStats {
        requested: config.count,
        ..Default::default()
    };

    for index in 0..config.count {
        if cancel.is_cancelled() {
            warn!("Generation cancelled after {} candidates.", index);
            stats.cancelled = true;
            if sink.wants(GenerationEventKind::Cancelled) {
                sink.send(GenerationEvent::Cancelled { evaluated: index });
            }
            break;
        }
        stats.evaluated += 1;
        if progress_due(index, config.progress_interval) {
            debug!(
                "{}/{} candidates evaluated, {} accepted.",
                index + 1,
                config.count,
                stats.accepted
            );
        }

        let candidate = generator.sampling.sample(config.radius, rng);
        let (x, z) = (candidate.x, candidate.y);

        let mut density = None;
        if has_map {
            let d = generator.density_at(x, z);
            density = Some(d);
            let roll = rand01(rng);
            if roll > d || d < config.threshold {
                stats.rejected_density += 1;
                reject(sink, index, x, z, RejectReason::Density, density);
                continue;
            }
        }

        // Non-finite heights cannot be written to the document.
        let Some(y) = generator
            .ground
            .resolve(x, z, &config.probe)
            .filter(|y| y.is_finite())
        else {
            stats.rejected_ground += 1;
            reject(sink, index, x, z, RejectReason::NoGround, density);
            continue;
        };

        let yaw = rand_range(rng, 0.0, template.max_yaw_deg);
        let pose = Pose::new(
            Vec3::new(x, y, z),
            Vec3::new(0.0, yaw, 0.0),
            template.scale,
        );
        let record = ObjectRecord::new(pose, template.kind.clone(), template.attributes.clone());

        instantiator.instantiate(&record.name, &record.pose);
        if sink.wants(GenerationEventKind::PlacementMade) {
            sink.send(GenerationEvent::PlacementMade {
                index,
                record: record.clone(),
            });
        }
        document.push(record);
        stats.accepted += 1;
    }

    document.finalize(generator.reference);

    info!(
        "Accepted {} of {} candidates ({} density rejections, {} without ground).",
        stats.accepted, stats.evaluated, stats.rejected_density, stats.rejected_ground
    );
    if sink.wants(GenerationEventKind::RunFinished) {
        sink.send(GenerationEvent::RunFinished {
            stats: stats.clone(),
        });
    }

    GenerationOutcome { document, stats }
}

/// Whether the candidate at `index` closes a progress interval; 0 disables progress logs.
#[inline]
fn progress_due(index: usize, interval: usize) -> bool {
    interval > 0 && (index + 1) % interval == 0
}

#[inline]
fn reject(
    sink: &mut dyn EventSink,
    index: usize,
    x: f32,
    z: f32,
    reason: RejectReason,
    density: Option<f32>,
) {
    if sink.wants(GenerationEventKind::CandidateRejected) {
        sink.send(GenerationEvent::CandidateRejected {
            index,
            position: Vec2::new(x, z),
            reason,
            density,
        });
    }
}
