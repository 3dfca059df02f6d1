//! Ground probes and resolvers.
//!
//! A [`GroundResolver`] answers "where is the ground under `(x, z)`?" for a downward
//! [`GroundProbe`]. The placement loop treats it as a black box: a miss and a broken
//! resolver both read as "no height resolved".
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Bit mask of surface layers a probe may hit.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SurfaceMask(pub u32);

impl SurfaceMask {
    pub const NONE: SurfaceMask = SurfaceMask(0);
    pub const ALL: SurfaceMask = SurfaceMask(u32::MAX);

    /// Mask containing only `layer`. Layers above 31 yield an empty mask.
    pub fn layer(layer: u8) -> Self {
        SurfaceMask(1u32.checked_shl(layer as u32).unwrap_or(0))
    }

    #[inline]
    pub fn contains_layer(self, layer: u8) -> bool {
        self.0 & Self::layer(layer).0 != 0
    }
}

impl Default for SurfaceMask {
    fn default() -> Self {
        Self::ALL
    }
}

/// A downward probe starting at `start_height` and covering at most `max_distance`.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GroundProbe {
    pub start_height: f32,
    pub max_distance: f32,
    pub mask: SurfaceMask,
}

impl Default for GroundProbe {
    fn default() -> Self {
        Self {
            start_height: 3500.0,
            max_distance: 5000.0,
            mask: SurfaceMask::ALL,
        }
    }
}

impl GroundProbe {
    pub fn new(start_height: f32, max_distance: f32) -> Self {
        Self {
            start_height,
            max_distance,
            ..Default::default()
        }
    }

    pub fn with_mask(mut self, mask: SurfaceMask) -> Self {
        self.mask = mask;
        self
    }

    /// Validates the probe, returning an error if invalid.
    pub fn validate(&self) -> Result<()> {
        if !self.start_height.is_finite() {
            return Err(Error::InvalidConfig(
                "probe start height must be finite".into(),
            ));
        }
        if !self.max_distance.is_finite() || self.max_distance < 0.0 {
            return Err(Error::InvalidConfig(
                "probe max distance must be finite and >= 0".into(),
            ));
        }
        Ok(())
    }

    /// Returns `true` if a surface at `height` on `layer` is hit by this probe.
    #[inline]
    pub fn hits(&self, height: f32, layer: u8) -> bool {
        self.mask.contains_layer(layer)
            && height <= self.start_height
            && self.start_height - height <= self.max_distance
    }
}

/// Capability: resolve ground height under a horizontal position.
pub trait GroundResolver {
    fn resolve(&self, x: f32, z: f32, probe: &GroundProbe) -> Option<f32>;
}

impl<F> GroundResolver for F
where
    F: Fn(f32, f32, &GroundProbe) -> Option<f32>,
{
    #[inline]
    fn resolve(&self, x: f32, z: f32, probe: &GroundProbe) -> Option<f32> {
        self(x, z, probe)
    }
}

/// A resolver with no ground anywhere.
#[derive(Clone, Copy, Debug, Default)]
pub struct NoGround;

impl GroundResolver for NoGround {
    #[inline]
    fn resolve(&self, _x: f32, _z: f32, _probe: &GroundProbe) -> Option<f32> {
        None
    }
}

/// An infinite horizontal plane on a single surface layer.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct FlatGround {
    pub height: f32,
    pub layer: u8,
}

impl FlatGround {
    pub fn new(height: f32) -> Self {
        Self { height, layer: 0 }
    }

    pub fn on_layer(mut self, layer: u8) -> Self {
        self.layer = layer;
        self
    }
}

impl GroundResolver for FlatGround {
    #[inline]
    fn resolve(&self, _x: f32, _z: f32, probe: &GroundProbe) -> Option<f32> {
        probe.hits(self.height, self.layer).then_some(self.height)
    }
}

/// A square grid of heights centered on the origin, spanning `[-half_extent, half_extent]²`.
///
/// Column `0` lies at `x = -half_extent`, row `0` at `z = -half_extent`. Positions outside the
/// grid miss. A zero half extent collapses the grid onto the origin, which reads the first
/// sample.
#[derive(Clone, PartialEq)]
pub struct Heightfield {
    width: u32,
    height: u32,
    half_extent: f32,
    heights: Vec<f32>,
    layer: u8,
}

impl Heightfield {
    pub fn new(width: u32, height: u32, half_extent: f32, heights: Vec<f32>) -> Result<Self> {
        if width < 2 || height < 2 {
            return Err(Error::InvalidConfig(format!(
                "heightfield needs at least 2x2 samples (got {width}x{height})"
            )));
        }
        if !(2.0 * half_extent).is_finite() || half_extent < 0.0 {
            return Err(Error::InvalidConfig(
                "heightfield half extent must be finite and >= 0".into(),
            ));
        }
        let expected = (width as usize) * (height as usize);
        if heights.len() != expected {
            return Err(Error::InvalidConfig(format!(
                "heightfield of {width}x{height} needs {expected} heights, got {}",
                heights.len()
            )));
        }
        Ok(Self {
            width,
            height,
            half_extent,
            heights,
            layer: 0,
        })
    }

    pub fn on_layer(mut self, layer: u8) -> Self {
        self.layer = layer;
        self
    }

    pub fn half_extent(&self) -> f32 {
        self.half_extent
    }

    #[inline]
    fn at(&self, ix: u32, iz: u32) -> f32 {
        self.heights[(iz as usize) * (self.width as usize) + (ix as usize)]
    }

    /// Bilinearly interpolated terrain height, or `None` outside the grid.
    pub fn height_at(&self, x: f32, z: f32) -> Option<f32> {
        let he = self.half_extent;
        if !(-he..=he).contains(&x) || !(-he..=he).contains(&z) {
            return None;
        }
        if he == 0.0 {
            return Some(self.at(0, 0));
        }
        let gx = (x + he) / (2.0 * he) * (self.width - 1) as f32;
        let gz = (z + he) / (2.0 * he) * (self.height - 1) as f32;

        let x0 = (gx.floor() as u32).min(self.width - 1);
        let z0 = (gz.floor() as u32).min(self.height - 1);
        let x1 = (x0 + 1).min(self.width - 1);
        let z1 = (z0 + 1).min(self.height - 1);
        let fx = (gx - x0 as f32).clamp(0.0, 1.0);
        let fz = (gz - z0 as f32).clamp(0.0, 1.0);

        let h0 = self.at(x0, z0) * (1.0 - fx) + self.at(x1, z0) * fx;
        let h1 = self.at(x0, z1) * (1.0 - fx) + self.at(x1, z1) * fx;
        Some(h0 * (1.0 - fz) + h1 * fz)
    }
}

impl GroundResolver for Heightfield {
    fn resolve(&self, x: f32, z: f32, probe: &GroundProbe) -> Option<f32> {
        let h = self.height_at(x, z)?;
        probe.hits(h, self.layer).then_some(h)
    }
}

impl fmt::Debug for Heightfield {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Heightfield")
            .field("width", &self.width)
            .field("height", &self.height)
            .field("half_extent", &self.half_extent)
            .field("layer", &self.layer)
            .finish()
    }
}
