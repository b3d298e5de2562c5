//! Shared test utilities for the pixelmill test suite.
//!
//! Synthetic images with known pixel values, so tests can assert exact
//! outputs without fixture files.
//!
//! # Usage
//!
//! ```rust
//! use crate::test_helpers::*;
//!
//! let bytes = gradient_png(600, 400);
//! let stored = pipeline.ingest(Some(&bytes)).unwrap();
//! let preview = decode_png(&std::fs::read(&stored.path).unwrap());
//! assert_eq!(preview.width(), 300);
//! ```

use image::{DynamicImage, ImageFormat, Rgb, RgbImage};
use std::io::Cursor;

// =========================================================================
// Synthetic images
// =========================================================================

/// RGB image whose red channel ramps along x and green along y.
///
/// Every pixel differs from its neighbours, which makes orientation and
/// resampling mistakes visible.
pub fn gradient_image(width: u32, height: u32) -> DynamicImage {
    let img = RgbImage::from_fn(width, height, |x, y| {
        let r = (x * 255 / width.max(2).saturating_sub(1)).min(255) as u8;
        let g = (y * 255 / height.max(2).saturating_sub(1)).min(255) as u8;
        Rgb([r, g, 128])
    });
    DynamicImage::ImageRgb8(img)
}

/// RGB image filled with one colour.
pub fn solid_image(width: u32, height: u32, rgb: [u8; 3]) -> DynamicImage {
    DynamicImage::ImageRgb8(RgbImage::from_pixel(width, height, Rgb(rgb)))
}

/// [`gradient_image`] encoded as PNG.
pub fn gradient_png(width: u32, height: u32) -> Vec<u8> {
    encode_png(&gradient_image(width, height))
}

// =========================================================================
// Codec shortcuts, panicking on failure
// =========================================================================

pub fn encode_png(img: &DynamicImage) -> Vec<u8> {
    let mut buf = Cursor::new(Vec::new());
    img.write_to(&mut buf, ImageFormat::Png)
        .expect("test image must encode");
    buf.into_inner()
}

pub fn decode_png(bytes: &[u8]) -> DynamicImage {
    image::load_from_memory_with_format(bytes, ImageFormat::Png).expect("output must be PNG")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn gradient_corners_span_full_range() {
        let img = gradient_image(10, 5).to_rgb8();
        assert_eq!(img.get_pixel(0, 0).0, [0, 0, 128]);
        assert_eq!(img.get_pixel(9, 4).0, [255, 255, 128]);
    }

    #[test]
    fn png_helpers_preserve_pixels() {
        let img = solid_image(3, 2, [10, 20, 30]);
        let decoded = decode_png(&encode_png(&img)).to_rgb8();
        assert_eq!(decoded.get_pixel(2, 1).0, [10, 20, 30]);
    }
}
