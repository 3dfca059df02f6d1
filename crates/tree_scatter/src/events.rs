//! Event types and sinks for observing generation runs.
//!
//! This module defines [`GenerationEvent`] and a set of sinks to emit, collect, or
//! forward events while [`crate::generator::PlacementGenerator`] runs.
use glam::Vec2;

use crate::generator::{GenerationStats, GeneratorConfig};
use crate::scene::ObjectRecord;

/// Why a candidate left no record.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum RejectReason {
    /// Lost the density draw or fell below the density threshold.
    Density,
    /// The ground probe found no surface.
    NoGround,
}

/// Describes events emitted during generation.
#[non_exhaustive]
#[derive(Debug, Clone)]
pub enum GenerationEvent {
    /// Emitted before the first candidate is drawn.
    RunStarted {
        /// The configuration used.
        config: GeneratorConfig,
        /// Whether a density map takes part in acceptance.
        has_density_map: bool,
    },

    /// Emitted for each rejected candidate.
    CandidateRejected {
        /// Index of the candidate in generation order.
        index: usize,
        /// Candidate position as `(x, z)`.
        position: Vec2,
        /// Rejection cause.
        reason: RejectReason,
        /// Sampled density, if a density map was consulted.
        density: Option<f32>,
    },

    /// Emitted when a candidate is accepted.
    PlacementMade {
        /// Index of the candidate in generation order.
        index: usize,
        /// The appended record.
        record: ObjectRecord,
    },

    /// Emitted when the loop stops early on cancellation.
    Cancelled {
        /// Candidates evaluated before stopping.
        evaluated: usize,
    },

    /// Emitted after the reference records are finalized.
    RunFinished {
        /// Aggregated statistics for the run.
        stats: GenerationStats,
    },
}

/// Discriminant of [`GenerationEvent`], used for filtering.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum GenerationEventKind {
    RunStarted,
    CandidateRejected,
    PlacementMade,
    Cancelled,
    RunFinished,
}

impl GenerationEvent {
    pub fn kind(&self) -> GenerationEventKind {
        match self {
            GenerationEvent::RunStarted { .. } => GenerationEventKind::RunStarted,
            GenerationEvent::CandidateRejected { .. } => GenerationEventKind::CandidateRejected,
            GenerationEvent::PlacementMade { .. } => GenerationEventKind::PlacementMade,
            GenerationEvent::Cancelled { .. } => GenerationEventKind::Cancelled,
            GenerationEvent::RunFinished { .. } => GenerationEventKind::RunFinished,
        }
    }
}

/// A generic event sink that accepts [`GenerationEvent`]s.
pub trait EventSink {
    fn send(&mut self, event: GenerationEvent);

    /// Whether events of `kind` should be built at all. Defaults to `true`.
    #[inline]
    fn wants(&self, _kind: GenerationEventKind) -> bool {
        true
    }
}

/// A no-op event sink.
impl EventSink for () {
    #[inline]
    fn send(&mut self, _event: GenerationEvent) {}

    #[inline]
    fn wants(&self, _kind: GenerationEventKind) -> bool {
        false
    }
}

/// An event sink that forwards to a user-provided closure.
pub struct FnSink<F>
where
    F: FnMut(GenerationEvent),
{
    f: F,
}

impl<F> FnSink<F>
where
    F: FnMut(GenerationEvent),
{
    pub fn new(f: F) -> Self {
        Self { f }
    }
}

impl<F> EventSink for FnSink<F>
where
    F: FnMut(GenerationEvent),
{
    #[inline]
    fn send(&mut self, event: GenerationEvent) {
        (self.f)(event);
    }
}

/// An event sink that collects events in a `Vec`, optionally restricted to some kinds.
#[derive(Default)]
pub struct VecSink {
    events: Vec<GenerationEvent>,
    only: Option<Vec<GenerationEventKind>>,
}

impl VecSink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Collects only events whose kind is in `kinds`.
    pub fn only(kinds: impl IntoIterator<Item = GenerationEventKind>) -> Self {
        Self {
            events: Vec::new(),
            only: Some(kinds.into_iter().collect()),
        }
    }

    pub fn into_inner(self) -> Vec<GenerationEvent> {
        self.events
    }

    pub fn as_slice(&self) -> &[GenerationEvent] {
        &self.events
    }

    pub fn clear(&mut self) {
        self.events.clear();
    }

    pub fn len(&self) -> usize {
        self.events.len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }
}

impl EventSink for VecSink {
    #[inline]
    fn send(&mut self, event: GenerationEvent) {
        if self.wants(event.kind()) {
            self.events.push(event);
        }
    }

    fn wants(&self, kind: GenerationEventKind) -> bool {
        self.only.as_ref().is_none_or(|kinds| kinds.contains(&kind))
    }
}

/// Fan-out sink that forwards each event to all contained sinks.
pub struct MultiSink<S: EventSink> {
    pub(crate) sinks: Vec<S>,
}

impl<S: EventSink> MultiSink<S> {
    pub fn new() -> Self {
        Self { sinks: Vec::new() }
    }

    pub fn with_sinks(sinks: Vec<S>) -> Self {
        Self { sinks }
    }

    pub fn push(&mut self, sink: S) {
        self.sinks.push(sink);
    }

    pub fn into_inner(self) -> Vec<S> {
        self.sinks
    }

    pub fn is_empty(&self) -> bool {
        self.sinks.is_empty()
    }

    pub fn len(&self) -> usize {
        self.sinks.len()
    }
}

impl<S: EventSink> Default for MultiSink<S> {
    fn default() -> Self {
        Self::new()
    }
}

impl<S: EventSink> EventSink for MultiSink<S> {
    fn send(&mut self, event: GenerationEvent) {
        let kind = event.kind();
        let Some(last_idx) = self.sinks.iter().rposition(|s| s.wants(kind)) else {
            return;
        };
        for i in 0..last_idx {
            if self.sinks[i].wants(kind) {
                self.sinks[i].send(event.clone());
            }
        }
        self.sinks[last_idx].send(event);
    }

    fn wants(&self, kind: GenerationEventKind) -> bool {
        self.sinks.iter().any(|s| s.wants(kind))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cancelled(evaluated: usize) -> GenerationEvent {
        GenerationEvent::Cancelled { evaluated }
    }

    #[test]
    fn vec_sink_collects_events() {
        let mut sink = VecSink::new();
        assert!(sink.is_empty());
        sink.send(cancelled(1));
        sink.send(cancelled(2));
        assert_eq!(sink.len(), 2);
        sink.clear();
        assert!(sink.is_empty());
    }

    #[test]
    fn vec_sink_filters_by_kind() {
        let mut sink = VecSink::only([GenerationEventKind::PlacementMade]);
        assert!(!sink.wants(GenerationEventKind::Cancelled));
        sink.send(cancelled(1));
        assert!(sink.is_empty());
    }

    #[test]
    fn unit_sink_wants_nothing() {
        assert!(!().wants(GenerationEventKind::RunFinished));
    }

    #[test]
    fn multi_sink_fans_out_events() {
        let mut multi = MultiSink::with_sinks(vec![
            VecSink::new(),
            VecSink::new(),
            VecSink::only([GenerationEventKind::RunStarted]),
        ]);
        multi.send(cancelled(3));
        assert_eq!(multi.len(), 3);
        let sinks = multi.into_inner();
        assert_eq!(sinks[0].len(), 1);
        assert_eq!(sinks[1].len(), 1);
        assert_eq!(sinks[2].len(), 0);
        assert!(matches!(
            sinks[0].as_slice()[0],
            GenerationEvent::Cancelled { evaluated: 3 }
        ));
    }

    #[test]
    fn fn_sink_invokes_callback() {
        let mut count = 0;
        let mut sink = FnSink::new(|_event| {
            count += 1;
        });
        sink.send(cancelled(0));
        drop(sink);
        assert_eq!(count, 1);
    }
}
