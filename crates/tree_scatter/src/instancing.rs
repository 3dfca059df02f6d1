//! Optional sinks that materialize a visual or interactive instance per placement.
//!
//! The placement loop calls [`InstantiationSink::instantiate`] once per accepted record and
//! ignores the outcome. Use `()` to run headless.
use crate::scene::Pose;

/// Capability: create an instance of `kind` at `pose`.
pub trait InstantiationSink {
    fn instantiate(&mut self, kind: &str, pose: &Pose);
}

/// A no-op sink.
impl InstantiationSink for () {
    #[inline]
    fn instantiate(&mut self, _kind: &str, _pose: &Pose) {}
}

/// A sink that forwards to a user-provided closure.
pub struct FnInstantiator<F>
where
    F: FnMut(&str, &Pose),
{
    f: F,
}

impl<F> FnInstantiator<F>
where
    F: FnMut(&str, &Pose),
{
    pub fn new(f: F) -> Self {
        Self { f }
    }
}

impl<F> InstantiationSink for FnInstantiator<F>
where
    F: FnMut(&str, &Pose),
{
    #[inline]
    fn instantiate(&mut self, kind: &str, pose: &Pose) {
        (self.f)(kind, pose);
    }
}

/// A sink that records every instantiation request.
#[derive(Debug, Default)]
pub struct RecordingInstantiator {
    instances: Vec<(String, Pose)>,
}

impl RecordingInstantiator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn as_slice(&self) -> &[(String, Pose)] {
        &self.instances
    }

    pub fn into_inner(self) -> Vec<(String, Pose)> {
        self.instances
    }

    pub fn len(&self) -> usize {
        self.instances.len()
    }

    pub fn is_empty(&self) -> bool {
        self.instances.is_empty()
    }
}

impl InstantiationSink for RecordingInstantiator {
    fn instantiate(&mut self, kind: &str, pose: &Pose) {
        self.instances.push((kind.to_owned(), *pose));
    }
}
