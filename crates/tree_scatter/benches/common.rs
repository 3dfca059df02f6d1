//! Shared criterion settings and fixtures for the placement benches.
use std::time::Duration;

use criterion::{Criterion, Throughput};
use rand::rngs::StdRng;
use rand::SeedableRng;

/// Whole-run benches are slow per iteration; keep the sample count modest.
const SAMPLES: usize = 15;
const WARM_UP: Duration = Duration::from_millis(500);
const MEASURE: Duration = Duration::from_secs(3);

pub fn placement_criterion() -> Criterion {
    Criterion::default()
        .configure_from_args()
        .sample_size(SAMPLES)
        .warm_up_time(WARM_UP)
        .measurement_time(MEASURE)
}

/// Throughput in candidates (or texel lookups) per iteration.
pub fn candidates(n: usize) -> Throughput {
    Throughput::Elements(n.max(1) as u64)
}

/// Deterministic generator per bench case, so runs compare like for like.
pub fn seeded_rng(case: &str, n: usize) -> StdRng {
    let salt = case
        .bytes()
        .fold(0xcbf2_9ce4_8422_2325u64, |h, b| (h ^ b as u64).wrapping_mul(0x0100_0000_01b3));
    StdRng::seed_from_u64(salt ^ n as u64)
}
