//! Uniform random candidate sampling over a centered square.
use mint::Vector2;
use rand::RngCore;

use crate::sampling::{next_down, rand01, CandidateSampling};

/// Uniform i.i.d. random sampling over `[-half_extent, half_extent]²`.
///
/// The x coordinate is drawn before the y coordinate, one candidate per call.
#[derive(Debug, Clone, Copy, Default)]
pub struct UniformSquareSampling;

impl UniformSquareSampling {
    pub fn new() -> Self {
        Self
    }
}

impl CandidateSampling for UniformSquareSampling {
    fn sample(&self, half_extent: f32, rng: &mut dyn RngCore) -> Vector2<f32> {
        if half_extent <= 0.0 {
            return Vector2 { x: 0.0, y: 0.0 };
        }

        let w = half_extent * 2.0;
        // Next representable float below the right/top edge to enforce strict < comparisons
        let max = next_down(half_extent);

        let u = rand01(rng);
        let v = rand01(rng);

        let x = (u * w - half_extent).clamp(-half_extent, max);
        let y = (v * w - half_extent).clamp(-half_extent, max);

        Vector2 { x, y }
    }
}

#[cfg(test)]
mod tests {
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    use super::*;

    #[test]
    fn zero_extent_collapses_to_origin() {
        let mut rng = StdRng::seed_from_u64(1);
        let s = UniformSquareSampling::new();
        for _ in 0..8 {
            let p = s.sample(0.0, &mut rng);
            assert_eq!((p.x, p.y), (0.0, 0.0));
        }
    }

    #[test]
    fn bounds_are_respected() {
        let mut rng = StdRng::seed_from_u64(42);
        let s = UniformSquareSampling::new();
        for _ in 0..500 {
            let p = s.sample(7500.0, &mut rng);
            assert!(p.x >= -7500.0 && p.x < 7500.0);
            assert!(p.y >= -7500.0 && p.y < 7500.0);
        }
    }

    #[test]
    fn determinism_for_same_seed() {
        let s = UniformSquareSampling::new();
        let mut rng_a = StdRng::seed_from_u64(123);
        let mut rng_b = StdRng::seed_from_u64(123);
        let pa: Vec<_> = (0..16).map(|_| s.sample(10.0, &mut rng_a)).collect();
        let pb: Vec<_> = (0..16).map(|_| s.sample(10.0, &mut rng_b)).collect();
        assert_eq!(pa, pb);
    }
}
