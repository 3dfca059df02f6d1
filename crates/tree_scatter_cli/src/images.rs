//! Image-backed density maps and heightfields.
//!
//! Images are flipped vertically on load so that the bottom row maps to `v = 0`
//! (and to `z = -radius` for heightfields), the usual engine texture convention.
use std::path::Path;

use anyhow::{Context, Result};
use image::imageops;
use tracing::info;
use tree_scatter::prelude::{Heightfield, LuminanceMap};

/// Loads an image as a grayscale density map.
pub fn load_density_map(path: &Path) -> Result<LuminanceMap> {
    let img = image::open(path)
        .with_context(|| format!("failed to open density map '{}'", path.display()))?
        .to_rgba8();
    let img = imageops::flip_vertical(&img);
    let (w, h) = img.dimensions();
    info!("Loaded density map {} ({}x{}).", path.display(), w, h);
    LuminanceMap::from_rgba8(w, h, img.as_raw())
        .with_context(|| format!("invalid density map '{}'", path.display()))
}

/// Loads a 16-bit grayscale heightmap spanning `[-half_extent, half_extent]²`.
///
/// Heights are `luma / 65535 * scale + offset`.
pub fn load_heightfield(
    path: &Path,
    half_extent: f32,
    scale: f32,
    offset: f32,
) -> Result<Heightfield> {
    let img = image::open(path)
        .with_context(|| format!("failed to open heightmap '{}'", path.display()))?
        .to_luma16();
    let img = imageops::flip_vertical(&img);
    let (w, h) = img.dimensions();
    let heights = img
        .as_raw()
        .iter()
        .map(|&v| v as f32 / u16::MAX as f32 * scale + offset)
        .collect();
    info!("Loaded heightmap {} ({}x{}).", path.display(), w, h);
    Heightfield::new(w, h, half_extent, heights)
        .with_context(|| format!("invalid heightmap '{}'", path.display()))
}

#[cfg(test)]
mod tests {
    use image::{Luma, Rgba, RgbaImage};
    use tempfile::TempDir;
    use tree_scatter::prelude::{DensityMap, GroundProbe, GroundResolver};

    use super::*;

    #[test]
    fn density_map_bottom_row_is_v_zero() {
        let dir = TempDir::new().expect("tempdir");
        let path = dir.path().join("density.png");
        let mut img = RgbaImage::from_pixel(2, 2, Rgba([0, 0, 0, 255]));
        // Bottom row white.
        img.put_pixel(0, 1, Rgba([255, 255, 255, 255]));
        img.put_pixel(1, 1, Rgba([255, 255, 255, 255]));
        img.save(&path).expect("save png");

        let map = load_density_map(&path).expect("load");
        assert_eq!((map.width(), map.height()), (2, 2));
        assert!((map.sample([0.5, 0.0].into()) - 1.0).abs() < 1e-5);
        assert!(map.sample([0.5, 1.0].into()).abs() < 1e-5);
    }

    #[test]
    fn heightfield_scales_luma() {
        let dir = TempDir::new().expect("tempdir");
        let path = dir.path().join("height.png");
        let img = image::ImageBuffer::from_pixel(2, 2, Luma([u16::MAX]));
        img.save(&path).expect("save png");

        let field = load_heightfield(&path, 10.0, 100.0, -5.0).expect("load");
        let probe = GroundProbe::new(500.0, 1000.0);
        let h = field.resolve(0.0, 0.0, &probe).expect("hit");
        assert!((h - 95.0).abs() < 1e-3);
    }

    #[test]
    fn heightfield_with_zero_radius_resolves_origin() {
        let dir = TempDir::new().expect("tempdir");
        let path = dir.path().join("height.png");
        let img = image::ImageBuffer::from_pixel(3, 3, Luma([u16::MAX]));
        img.save(&path).expect("save png");

        let field = load_heightfield(&path, 0.0, 10.0, 0.0).expect("load");
        let h = field
            .resolve(0.0, 0.0, &GroundProbe::default())
            .expect("hit");
        assert!((h - 10.0).abs() < 1e-3);
    }

    #[test]
    fn missing_file_has_context() {
        let err = load_density_map(Path::new("/definitely/not/here.png")).expect_err("missing");
        assert!(format!("{err:#}").contains("failed to open density map"));
    }
}
