#![forbid(unsafe_code)]
//! tree_scatter: density-biased tree scattering over terrain with JSON scene export.
//!
//! Modules:
//! - density: density maps and the sampler that turns them into acceptance probabilities
//! - ground: ground probes and headless ground resolvers
//! - sampling: candidate position generation
//! - generator: the placement loop, statistics, cancellation
//! - events: observer sinks for generation runs
//! - instancing: optional per-placement instantiation sinks
//! - scene: poses, attribute sets, records, and the scene document
//! - document: JSON serialization and atomic persistence
//! - job: validated generate-and-save entry point with seed resolution
pub mod density;
pub mod document;
pub mod error;
pub mod events;
pub mod generator;
pub mod ground;
pub mod instancing;
pub mod job;
pub mod sampling;
pub mod scene;

/// Convenient re-exports for common types. Import with `use tree_scatter::prelude::*;`.
pub mod prelude {
    pub use crate::density::{ConstantDensity, DensityMap, DensitySampler, LuminanceMap};
    pub use crate::document::{load, parse, persist, save, serialize};
    pub use crate::error::{Error, Result};
    pub use crate::events::{
        EventSink, FnSink, GenerationEvent, GenerationEventKind, MultiSink, RejectReason, VecSink,
    };
    pub use crate::generator::{
        CancelFlag, GenerationOutcome, GenerationStats, GeneratorConfig, PlacementGenerator,
        TreeTemplate,
    };
    pub use crate::ground::{
        FlatGround, GroundProbe, GroundResolver, Heightfield, NoGround, SurfaceMask,
    };
    pub use crate::instancing::{FnInstantiator, InstantiationSink, RecordingInstantiator};
    pub use crate::job::{resolve_seed, JobReport, OutputConfig, ScatterJob};
    pub use crate::sampling::{CandidateSampling, UniformSquareSampling};
    pub use crate::scene::{AttributeSet, ObjectRecord, Pose, ReferencePoses, SceneDocument};
}
