//! Density maps and the sampler used to bias candidate acceptance.
//!
//! - Implement [`DensityMap`] for custom sources sampled in normalized `(u, v)` space.
//! - [`LuminanceMap`] holds a grid of luminance values and samples it bilinearly.
//! - [`DensitySampler`] wraps an optional map; without one every position has density `1.0`.
use std::fmt;
use std::sync::Arc;

use glam::Vec2;

use crate::error::{Error, Result};

/// Luminance weights applied to RGB channels when converting pixels to density.
pub const LUMA_WEIGHTS: [f32; 3] = [0.299, 0.587, 0.114];

/// Trait for 2D scalar fields sampled at normalized coordinates in `[0, 1]²`.
/// Implementors must clamp out-of-range coordinates to their edges.
pub trait DensityMap: Send + Sync {
    fn sample(&self, uv: Vec2) -> f32;
}

/// A density map that returns the same value everywhere.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ConstantDensity(pub f32);

impl DensityMap for ConstantDensity {
    #[inline]
    fn sample(&self, _uv: Vec2) -> f32 {
        self.0
    }
}

/// Single-channel grid of luminance values in row-major order.
///
/// Row `0` corresponds to `v = 0` and column `0` to `u = 0`.
#[derive(Clone, Debug, PartialEq)]
pub struct LuminanceMap {
    width: u32,
    height: u32,
    data: Vec<f32>,
}

impl LuminanceMap {
    /// Creates a map from raw luminance values. `data.len()` must equal `width * height`.
    pub fn new(width: u32, height: u32, data: Vec<f32>) -> Result<Self> {
        if width == 0 || height == 0 {
            return Err(Error::InvalidConfig(format!(
                "density map must not be empty (got {width}x{height})"
            )));
        }
        let expected = (width as usize) * (height as usize);
        if data.len() != expected {
            return Err(Error::InvalidConfig(format!(
                "density map of {width}x{height} needs {expected} values, got {}",
                data.len()
            )));
        }
        Ok(Self {
            width,
            height,
            data,
        })
    }

    /// Creates a map from tightly packed RGBA8 pixels, converting each to grayscale.
    pub fn from_rgba8(width: u32, height: u32, pixels: &[u8]) -> Result<Self> {
        let expected = (width as usize) * (height as usize) * 4;
        if pixels.len() != expected {
            return Err(Error::InvalidConfig(format!(
                "expected {expected} RGBA bytes for {width}x{height}, got {}",
                pixels.len()
            )));
        }
        let data = pixels
            .chunks_exact(4)
            .map(|px| {
                let [wr, wg, wb] = LUMA_WEIGHTS;
                (wr * px[0] as f32 + wg * px[1] as f32 + wb * px[2] as f32) / 255.0
            })
            .collect();
        Self::new(width, height, data)
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    #[inline]
    fn texel(&self, x: u32, y: u32) -> f32 {
        self.data[(y as usize) * (self.width as usize) + (x as usize)]
    }

    /// Bilinear sample at normalized coordinates; `(0,0)` and `(1,1)` hit the corner texels exactly.
    pub fn sample_bilinear(&self, uv: Vec2) -> f32 {
        let u = if uv.x.is_nan() { 0.0 } else { uv.x.clamp(0.0, 1.0) };
        let v = if uv.y.is_nan() { 0.0 } else { uv.y.clamp(0.0, 1.0) };

        // Continuous coordinates over texel indices [0..width-1], [0..height-1]
        let x = u * (self.width - 1) as f32;
        let y = v * (self.height - 1) as f32;

        let x0 = x.floor().clamp(0.0, (self.width - 1) as f32) as u32;
        let y0 = y.floor().clamp(0.0, (self.height - 1) as f32) as u32;
        let x1 = (x0 + 1).min(self.width - 1);
        let y1 = (y0 + 1).min(self.height - 1);

        let fx = (x - x0 as f32).clamp(0.0, 1.0);
        let fy = (y - y0 as f32).clamp(0.0, 1.0);

        let v00 = self.texel(x0, y0);
        let v10 = self.texel(x1, y0);
        let v01 = self.texel(x0, y1);
        let v11 = self.texel(x1, y1);

        let vx0 = v00 * (1.0 - fx) + v10 * fx;
        let vx1 = v01 * (1.0 - fx) + v11 * fx;
        vx0 * (1.0 - fy) + vx1 * fy
    }
}

impl DensityMap for LuminanceMap {
    #[inline]
    fn sample(&self, uv: Vec2) -> f32 {
        self.sample_bilinear(uv)
    }
}

/// Turns an optional [`DensityMap`] into acceptance densities in `[0, 1]`.
#[derive(Clone, Default)]
pub struct DensitySampler {
    map: Option<Arc<dyn DensityMap>>,
}

impl DensitySampler {
    /// A sampler with no map: every position has density `1.0`.
    pub fn uniform() -> Self {
        Self { map: None }
    }

    pub fn with_map<M: DensityMap + 'static>(map: M) -> Self {
        Self {
            map: Some(Arc::new(map)),
        }
    }

    pub fn with_map_arc(map: Arc<dyn DensityMap>) -> Self {
        Self { map: Some(map) }
    }

    /// Returns `true` if a density map is configured.
    pub fn has_map(&self) -> bool {
        self.map.is_some()
    }

    /// Samples density at normalized `(u, v)`; out-of-range coordinates clamp to the map edges.
    #[inline]
    pub fn sample(&self, u: f32, v: f32) -> f32 {
        match &self.map {
            Some(map) => {
                let d = map.sample(Vec2::new(u.clamp(0.0, 1.0), v.clamp(0.0, 1.0)));
                if d.is_nan() {
                    0.0
                } else {
                    d.clamp(0.0, 1.0)
                }
            }
            None => 1.0,
        }
    }
}

impl fmt::Debug for DensitySampler {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DensitySampler")
            .field("has_map", &self.has_map())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn approx(a: f32, b: f32) -> bool {
        (a - b).abs() < 1e-5
    }

    #[test]
    fn uniform_sampler_is_always_one() {
        let s = DensitySampler::uniform();
        assert!(!s.has_map());
        assert_eq!(s.sample(0.0, 0.0), 1.0);
        assert_eq!(s.sample(0.3, 0.9), 1.0);
        assert_eq!(s.sample(-4.0, 12.0), 1.0);
    }

    #[test]
    fn constant_map_is_passed_through() {
        let s = DensitySampler::with_map(ConstantDensity(0.25));
        assert!(s.has_map());
        assert_eq!(s.sample(0.5, 0.5), 0.25);
    }

    #[test]
    fn sampler_clamps_out_of_range_map_values() {
        assert_eq!(DensitySampler::with_map(ConstantDensity(3.0)).sample(0.5, 0.5), 1.0);
        assert_eq!(DensitySampler::with_map(ConstantDensity(-1.0)).sample(0.5, 0.5), 0.0);
        assert_eq!(DensitySampler::with_map(ConstantDensity(f32::NAN)).sample(0.5, 0.5), 0.0);
    }

    #[test]
    fn bilinear_interpolates_between_texels() {
        let map = LuminanceMap::new(2, 2, vec![0.0, 1.0, 0.0, 1.0]).expect("valid map");
        assert!(approx(map.sample(Vec2::new(0.0, 0.0)), 0.0));
        assert!(approx(map.sample(Vec2::new(1.0, 0.0)), 1.0));
        assert!(approx(map.sample(Vec2::new(0.5, 0.5)), 0.5));
        assert!(approx(map.sample(Vec2::new(0.25, 0.75)), 0.25));
    }

    #[test]
    fn bilinear_is_continuous_not_stepped() {
        let map = LuminanceMap::new(3, 1, vec![0.0, 1.0, 0.0]).expect("valid map");
        let a = map.sample(Vec2::new(0.24, 0.0));
        let b = map.sample(Vec2::new(0.26, 0.0));
        assert!((a - b).abs() < 0.1, "{a} vs {b}");
        assert!(approx(map.sample(Vec2::new(0.5, 0.0)), 1.0));
    }

    #[test]
    fn out_of_range_coordinates_clamp_to_edges() {
        let map = LuminanceMap::new(2, 1, vec![0.2, 0.8]).expect("valid map");
        assert!(approx(map.sample(Vec2::new(-3.0, 0.0)), 0.2));
        assert!(approx(map.sample(Vec2::new(7.0, 5.0)), 0.8));

        let s = DensitySampler::with_map(map);
        assert!(approx(s.sample(-1.0, -1.0), 0.2));
        assert!(approx(s.sample(2.0, 2.0), 0.8));
    }

    #[test]
    fn single_texel_map_is_constant() {
        let map = LuminanceMap::new(1, 1, vec![0.6]).expect("valid map");
        assert!(approx(map.sample(Vec2::new(0.0, 0.0)), 0.6));
        assert!(approx(map.sample(Vec2::new(0.7, 0.3)), 0.6));
    }

    #[test]
    fn rgba_pixels_convert_to_grayscale() {
        let pixels = [255, 255, 255, 255, 0, 0, 0, 255, 255, 0, 0, 255];
        let map = LuminanceMap::from_rgba8(3, 1, &pixels).expect("valid pixels");
        assert!(approx(map.sample(Vec2::new(0.0, 0.0)), 1.0));
        assert!(approx(map.sample(Vec2::new(0.5, 0.0)), 0.0));
        assert!(approx(map.sample(Vec2::new(1.0, 0.0)), 0.299));
    }

    #[test]
    fn mismatched_dimensions_are_rejected() {
        assert!(matches!(
            LuminanceMap::new(2, 2, vec![0.0; 3]),
            Err(Error::InvalidConfig(_))
        ));
        assert!(matches!(
            LuminanceMap::new(0, 2, Vec::new()),
            Err(Error::InvalidConfig(_))
        ));
        assert!(matches!(
            LuminanceMap::from_rgba8(1, 1, &[0, 0, 0]),
            Err(Error::InvalidConfig(_))
        ));
    }
}
