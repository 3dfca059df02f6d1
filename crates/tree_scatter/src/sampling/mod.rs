//! Candidate position generation and random helpers shared by the placement loop.
//!
//! All draws go through an explicit `&mut dyn RngCore` so a run is reproducible
//! whenever the caller seeds its own stream.
use mint::Vector2;
use rand::RngCore;

pub mod uniform_square;

pub use uniform_square::UniformSquareSampling;

/// Trait for drawing a single candidate position inside a centered square domain.
///
/// `half_extent` is the area radius: candidates lie in `[-half_extent, half_extent]` on both axes.
pub trait CandidateSampling: Send + Sync {
    fn sample(&self, half_extent: f32, rng: &mut dyn RngCore) -> Vector2<f32>;
}

/// Generate a random float in the range [0, 1).
///
/// Only the top 24 bits are used; every such value is exact in an `f32`, so the result
/// never rounds up to 1.
#[inline]
pub(crate) fn rand01(rng: &mut dyn RngCore) -> f32 {
    (rng.next_u32() >> 8) as f32 / (1u32 << 24) as f32
}

/// Generate a random float in `[lo, hi)`. Returns `lo` for an empty or inverted range.
#[inline]
pub(crate) fn rand_range(rng: &mut dyn RngCore, lo: f32, hi: f32) -> f32 {
    if hi <= lo {
        return lo;
    }
    let v = lo + rand01(rng) * (hi - lo);
    v.clamp(lo, next_down(hi).max(lo))
}

/// Compute the next smaller representable float value.
///
/// Returns a value that is strictly less than the input, useful for
/// ensuring bounds are strictly inside a domain.
#[inline]
pub(crate) fn next_down(val: f32) -> f32 {
    if val.is_nan() {
        return f32::NAN;
    }

    if val == f32::NEG_INFINITY {
        return f32::NEG_INFINITY;
    }

    if val == f32::INFINITY {
        return f32::MAX;
    }

    if val == 0.0 {
        return -f32::MIN_POSITIVE;
    }

    let bits = val.to_bits();
    if val > 0.0 {
        f32::from_bits(bits.saturating_sub(1))
    } else {
        f32::from_bits(bits.saturating_add(1))
    }
}

/// Map `t` from `[a, b]` to `[0, 1]`, clamped. A degenerate range maps everything to 0.
#[inline]
pub fn inverse_lerp(a: f32, b: f32, t: f32) -> f32 {
    if a == b {
        return 0.0;
    }
    ((t - a) / (b - a)).clamp(0.0, 1.0)
}
