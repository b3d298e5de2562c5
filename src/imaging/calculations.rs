//! Pure calculation functions for preview geometry and adjustment math.
//!
//! All functions here are pure and testable without any I/O or images.

/// Mid-tone value the contrast stretch pivots on.
pub const CONTRAST_PIVOT: f32 = 128.0;

/// Normalize a requested contrast value into the factor actually applied.
///
/// Values below 1 are shifted up by one (`0.5` → `1.5`, `-0.5` → `0.5`).
/// Values of 1 and above pass through.
///
/// # Examples
/// ```
/// # use pixelmill::imaging::effective_contrast_factor;
/// assert_eq!(effective_contrast_factor(0.5), 1.5);
/// assert_eq!(effective_contrast_factor(2.0), 2.0);
/// ```
pub fn effective_contrast_factor(contrast: f32) -> f32 {
    if contrast < 1.0 {
        contrast + 1.0
    } else {
        contrast
    }
}

/// Offset that keeps [`CONTRAST_PIVOT`] fixed under `out = in * factor + offset`.
pub fn contrast_offset(factor: f32) -> f32 {
    -(CONTRAST_PIVOT * (factor - 1.0))
}

/// Calculate preview dimensions bounded by `max_width`.
///
/// Images already narrower than the bound keep their size (no upscaling).
/// Wider images are scaled down to exactly `max_width` with the height
/// rounded to preserve the aspect ratio (never below 1).
///
/// # Arguments
/// * `source` - Original image dimensions (width, height)
/// * `max_width` - Maximum output width
///
/// # Returns
/// * `(width, height)` - Preview dimensions
pub fn preview_dimensions(source: (u32, u32), max_width: u32) -> (u32, u32) {
    let (src_w, src_h) = source;
    if src_w <= max_width {
        return (src_w, src_h);
    }
    let ratio = max_width as f64 / src_w as f64;
    let h = (src_h as f64 * ratio).round() as u32;
    (max_width, h.max(1))
}

/// Fold any angle into `[0, 360)`.
pub fn normalize_degrees(degrees: f32) -> f32 {
    let normalized = degrees.rem_euclid(360.0);
    // rem_euclid can return exactly 360.0 for tiny negative inputs
    if normalized >= 360.0 { 0.0 } else { normalized }
}

/// Compute the canvas needed to hold an image rotated by `degrees`.
///
/// Right angles swap or keep the dimensions exactly; other angles return the
/// bounding box of the rotated rectangle, rounded up so no corner is clipped.
pub fn rotated_bounds(width: u32, height: u32, degrees: f32) -> (u32, u32) {
    let angle = normalize_degrees(degrees);
    if angle == 0.0 || angle == 180.0 {
        return (width, height);
    }
    if angle == 90.0 || angle == 270.0 {
        return (height, width);
    }

    let rad = (angle as f64).to_radians();
    let cos = rad.cos().abs();
    let sin = rad.sin().abs();
    let w = width as f64;
    let h = height as f64;

    // Trim float noise so exact fits do not round up
    let new_w = ((w * cos + h * sin) - 1e-6).ceil() as u32;
    let new_h = ((w * sin + h * cos) - 1e-6).ceil() as u32;
    (new_w.max(1), new_h.max(1))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn contrast_below_one_adds_one() {
        assert_eq!(effective_contrast_factor(0.5), 1.5);
        assert_eq!(effective_contrast_factor(0.0), 1.0);
    }

    #[test]
    fn contrast_one_and_above_unchanged() {
        assert_eq!(effective_contrast_factor(1.0), 1.0);
        assert_eq!(effective_contrast_factor(2.0), 2.0);
        assert_eq!(effective_contrast_factor(3.5), 3.5);
    }

    #[test]
    fn offset_for_factor_two() {
        assert_eq!(contrast_offset(2.0), -128.0);
    }

    #[test]
    fn offset_for_identity_is_zero() {
        assert_eq!(contrast_offset(1.0), 0.0);
    }

    #[test]
    fn offset_keeps_pivot_fixed() {
        for factor in [1.0_f32, 1.5, 2.0, 3.0] {
            let out = CONTRAST_PIVOT * factor + contrast_offset(factor);
            assert!((out - CONTRAST_PIVOT).abs() < 1e-4, "factor {factor}");
        }
    }

    #[test]
    fn preview_wide_landscape_scaled_to_bound() {
        assert_eq!(preview_dimensions((1200, 800), 300), (300, 200));
    }

    #[test]
    fn preview_portrait_scaled_by_width() {
        assert_eq!(preview_dimensions((600, 900), 300), (300, 450));
    }

    #[test]
    fn preview_rounds_height() {
        // 1000x333 → 300x99.9 → 300x100
        assert_eq!(preview_dimensions((1000, 333), 300), (300, 100));
    }

    #[test]
    fn preview_never_upscales() {
        assert_eq!(preview_dimensions((200, 150), 300), (200, 150));
        assert_eq!(preview_dimensions((300, 10), 300), (300, 10));
    }

    #[test]
    fn preview_extreme_panorama_keeps_one_row() {
        assert_eq!(preview_dimensions((10_000, 5), 300), (300, 1));
    }

    #[test]
    fn normalize_folds_negative_and_large_angles() {
        assert_eq!(normalize_degrees(-90.0), 270.0);
        assert_eq!(normalize_degrees(450.0), 90.0);
        assert_eq!(normalize_degrees(360.0), 0.0);
        assert_eq!(normalize_degrees(0.0), 0.0);
    }

    #[test]
    fn rotated_bounds_right_angles() {
        assert_eq!(rotated_bounds(100, 50, 90.0), (50, 100));
        assert_eq!(rotated_bounds(100, 50, 180.0), (100, 50));
        assert_eq!(rotated_bounds(100, 50, -90.0), (50, 100));
        assert_eq!(rotated_bounds(100, 50, 720.0), (100, 50));
    }

    #[test]
    fn rotated_bounds_45_degrees_square() {
        // 100 * sqrt(2) = 141.42 → 142
        assert_eq!(rotated_bounds(100, 100, 45.0), (142, 142));
    }

    #[test]
    fn rotated_bounds_grow_for_oblique_angles() {
        let (w, h) = rotated_bounds(200, 100, 30.0);
        assert!(w > 200);
        assert!(h > 100);
    }
}
