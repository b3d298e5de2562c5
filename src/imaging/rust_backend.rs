//! Pure Rust image engine built on the `image` crate.
//!
//! ## Crate mapping
//!
//! | Operation | Crate / function |
//! |---|---|
//! | Decode (JPEG, PNG, TIFF, WebP, GIF, BMP) | `image::load_from_memory` / `ImageReader` |
//! | Resize | `DynamicImage::resize_exact` with `Lanczos3` filter |
//! | Modulate | per-pixel pass over RGBA8, parallel via `rayon` |
//! | Linear contrast | per-pixel pass over RGBA8, parallel via `rayon` |
//! | Rotate | `DynamicImage::rotate90/180/270` for right angles, bilinear inverse mapping otherwise |
//! | Encode → PNG | `DynamicImage::write_to` with `ImageFormat::Png` |
//!
//! Pixel passes work on 8-bit RGBA. Images without an alpha channel are
//! converted back to RGB8 afterwards so the encoded preview does not gain one.

use super::backend::{BackendError, ImageBackend};
use super::calculations::{normalize_degrees, rotated_bounds};
use super::params::{ContrastStretch, Modulation};
use image::imageops::FilterType;
use image::{DynamicImage, ImageFormat, ImageReader, RgbaImage};
use rayon::prelude::*;
use std::io::Cursor;
use std::path::Path;

/// Fill colour for canvas area uncovered by an oblique rotation.
const ROTATION_BACKGROUND: [u8; 4] = [0, 0, 0, 255];

/// BT.709 luma coefficients used as the saturation pivot.
const LUMA: [f32; 3] = [0.2126, 0.7152, 0.0722];

/// Pure Rust backend using the `image` crate ecosystem.
///
/// See the [module docs](self) for the crate-to-operation mapping.
pub struct RustBackend;

impl RustBackend {
    pub fn new() -> Self {
        Self
    }
}

impl Default for RustBackend {
    fn default() -> Self {
        Self::new()
    }
}

/// Run `f` over every pixel's RGB channels (alpha untouched), in parallel.
fn map_rgb<F>(image: DynamicImage, f: F) -> DynamicImage
where
    F: Fn([f32; 3]) -> [f32; 3] + Sync,
{
    let had_alpha = image.color().has_alpha();
    let mut rgba = image.into_rgba8();

    rgba.par_chunks_exact_mut(4).for_each(|px| {
        let out = f([px[0] as f32, px[1] as f32, px[2] as f32]);
        px[0] = to_channel(out[0]);
        px[1] = to_channel(out[1]);
        px[2] = to_channel(out[2]);
    });

    restore_layout(rgba, had_alpha)
}

fn restore_layout(rgba: RgbaImage, had_alpha: bool) -> DynamicImage {
    let image = DynamicImage::ImageRgba8(rgba);
    if had_alpha {
        image
    } else {
        DynamicImage::ImageRgb8(image.into_rgb8())
    }
}

#[inline]
fn to_channel(v: f32) -> u8 {
    v.round().clamp(0.0, 255.0) as u8
}

/// Brightness scales every channel; saturation then scales each channel's
/// distance from the pixel's luma.
#[inline]
fn modulate_pixel([r, g, b]: [f32; 3], m: Modulation) -> [f32; 3] {
    let (r, g, b) = (r * m.brightness, g * m.brightness, b * m.brightness);
    let gray = LUMA[0] * r + LUMA[1] * g + LUMA[2] * b;
    [
        gray + (r - gray) * m.saturation,
        gray + (g - gray) * m.saturation,
        gray + (b - gray) * m.saturation,
    ]
}

#[inline]
fn linear_pixel(rgb: [f32; 3], s: ContrastStretch) -> [f32; 3] {
    rgb.map(|c| c * s.factor + s.offset)
}

/// Rotate by an arbitrary angle using inverse mapping with bilinear sampling.
///
/// For each destination pixel centre we find the source position that lands
/// there under a clockwise rotation about the image centre. Samples outside
/// the source read as [`ROTATION_BACKGROUND`].
fn rotate_oblique(image: DynamicImage, degrees: f32) -> DynamicImage {
    let had_alpha = image.color().has_alpha();
    let src = image.into_rgba8();
    let (src_w, src_h) = src.dimensions();
    let (dst_w, dst_h) = rotated_bounds(src_w, src_h, degrees);

    let rad = (degrees as f64).to_radians();
    let (sin, cos) = rad.sin_cos();
    let src_cx = src_w as f64 / 2.0;
    let src_cy = src_h as f64 / 2.0;
    let dst_cx = dst_w as f64 / 2.0;
    let dst_cy = dst_h as f64 / 2.0;

    let mut out = vec![0u8; dst_w as usize * dst_h as usize * 4];
    out.par_chunks_mut(dst_w as usize * 4)
        .enumerate()
        .for_each(|(dy, row)| {
            let ty = dy as f64 + 0.5 - dst_cy;
            for dx in 0..dst_w as usize {
                let tx = dx as f64 + 0.5 - dst_cx;
                // Inverse of the clockwise rotation (y axis points down)
                let sx = tx * cos + ty * sin + src_cx - 0.5;
                let sy = -tx * sin + ty * cos + src_cy - 0.5;
                let px = sample_bilinear(&src, sx, sy);
                row[dx * 4..dx * 4 + 4].copy_from_slice(&px);
            }
        });

    let rotated = RgbaImage::from_raw(dst_w, dst_h, out)
        .unwrap_or_else(|| RgbaImage::new(dst_w, dst_h));
    restore_layout(rotated, had_alpha)
}

fn sample_bilinear(src: &RgbaImage, x: f64, y: f64) -> [u8; 4] {
    let x0 = x.floor();
    let y0 = y.floor();
    let fx = (x - x0) as f32;
    let fy = (y - y0) as f32;
    let (x0, y0) = (x0 as i64, y0 as i64);

    let p00 = pixel_or_background(src, x0, y0);
    let p10 = pixel_or_background(src, x0 + 1, y0);
    let p01 = pixel_or_background(src, x0, y0 + 1);
    let p11 = pixel_or_background(src, x0 + 1, y0 + 1);

    let mut result = [0u8; 4];
    for c in 0..4 {
        let top = p00[c] as f32 * (1.0 - fx) + p10[c] as f32 * fx;
        let bottom = p01[c] as f32 * (1.0 - fx) + p11[c] as f32 * fx;
        result[c] = to_channel(top * (1.0 - fy) + bottom * fy);
    }
    result
}

#[inline]
fn pixel_or_background(src: &RgbaImage, x: i64, y: i64) -> [u8; 4] {
    if x < 0 || y < 0 || x >= src.width() as i64 || y >= src.height() as i64 {
        return ROTATION_BACKGROUND;
    }
    src.get_pixel(x as u32, y as u32).0
}

impl ImageBackend for RustBackend {
    fn decode(&self, bytes: &[u8]) -> Result<DynamicImage, BackendError> {
        image::load_from_memory(bytes)
            .map_err(|e| BackendError::ProcessingFailed(format!("Failed to decode image: {}", e)))
    }

    fn open(&self, path: &Path) -> Result<DynamicImage, BackendError> {
        ImageReader::open(path)
            .map_err(BackendError::Io)?
            .with_guessed_format()
            .map_err(BackendError::Io)?
            .decode()
            .map_err(|e| {
                BackendError::ProcessingFailed(format!(
                    "Failed to decode {}: {}",
                    path.display(),
                    e
                ))
            })
    }

    fn resize(
        &self,
        image: DynamicImage,
        width: u32,
        height: u32,
    ) -> Result<DynamicImage, BackendError> {
        if width == 0 || height == 0 {
            return Err(BackendError::ProcessingFailed(format!(
                "Invalid resize target {}x{}",
                width, height
            )));
        }
        if image.width() == width && image.height() == height {
            return Ok(image);
        }
        Ok(image.resize_exact(width, height, FilterType::Lanczos3))
    }

    fn modulate(
        &self,
        image: DynamicImage,
        modulation: Modulation,
    ) -> Result<DynamicImage, BackendError> {
        Ok(map_rgb(image, |rgb| modulate_pixel(rgb, modulation)))
    }

    fn linear(
        &self,
        image: DynamicImage,
        stretch: ContrastStretch,
    ) -> Result<DynamicImage, BackendError> {
        Ok(map_rgb(image, |rgb| linear_pixel(rgb, stretch)))
    }

    fn rotate(&self, image: DynamicImage, degrees: f32) -> Result<DynamicImage, BackendError> {
        let angle = normalize_degrees(degrees);
        let rotated = match angle {
            a if a == 0.0 => image,
            a if a == 90.0 => image.rotate90(),
            a if a == 180.0 => image.rotate180(),
            a if a == 270.0 => image.rotate270(),
            a => rotate_oblique(image, a),
        };
        Ok(rotated)
    }

    fn encode(&self, image: &DynamicImage) -> Result<Vec<u8>, BackendError> {
        let mut buf = Cursor::new(Vec::new());
        image
            .write_to(&mut buf, ImageFormat::Png)
            .map_err(|e| BackendError::ProcessingFailed(format!("PNG encode failed: {}", e)))?;
        Ok(buf.into_inner())
    }
}
