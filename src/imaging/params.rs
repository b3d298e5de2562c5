//! Parameter types for image operations.
//!
//! These structs describe *what* to do, not *how* to do it. They are the
//! interface between the [`operations`](super::operations) module (which
//! decides the order of steps) and the [`backend`](super::backend) (which does
//! the pixel work). Keeping them backend-free lets the ordering policy be
//! tested against a mock.
//!
//! ## Types
//!
//! - [`AdjustmentParameters`]: Caller-facing record; every field optional.
//! - [`PreviewConstraint`]: Maximum preview width (default 300).
//! - [`Modulation`]: Combined brightness/saturation factors.
//! - [`ContrastStretch`]: Normalized factor and offset for the linear stretch.

use super::calculations::{contrast_offset, effective_contrast_factor};
use serde::Deserialize;
use thiserror::Error;

/// Default maximum width for every stored preview.
pub const PREVIEW_MAX_WIDTH: u32 = 300;

/// A parameter value the engine cannot honour.
#[derive(Error, Debug, Clone, PartialEq)]
#[error("{name} = {value} {reason}")]
pub struct ParameterError {
    pub name: &'static str,
    pub value: f32,
    pub reason: &'static str,
}

/// Requested adjustments for an adjust-and-preview run.
///
/// Absent fields mean "leave unchanged", never zero. An empty record is legal
/// and produces a resize-only pass.
#[derive(Debug, Clone, Copy, Default, PartialEq, Deserialize)]
pub struct AdjustmentParameters {
    /// Multiplicative brightness factor (1 = unchanged).
    #[serde(default)]
    pub brightness: Option<f32>,
    /// Contrast factor (1 = unchanged). Values below 1 are shifted up by one.
    #[serde(default)]
    pub contrast: Option<f32>,
    /// Multiplicative saturation factor (1 = unchanged, 0 = grayscale).
    #[serde(default)]
    pub saturation: Option<f32>,
    /// Clockwise rotation in degrees.
    #[serde(default)]
    pub rotation: Option<f32>,
}

impl AdjustmentParameters {
    pub fn is_empty(&self) -> bool {
        self.brightness.is_none()
            && self.contrast.is_none()
            && self.saturation.is_none()
            && self.rotation.is_none()
    }

    /// Reject values outside the engine's numeric domain.
    ///
    /// Brightness and saturation must be finite and non-negative. Contrast
    /// and rotation only need to be finite.
    pub fn validate(&self) -> Result<(), ParameterError> {
        for (name, value) in [
            ("brightness", self.brightness),
            ("saturation", self.saturation),
        ] {
            if let Some(value) = value {
                check_scale_factor(name, value)?;
            }
        }
        if let Some(value) = self.contrast {
            check_finite("contrast", value, "must be a finite number")?;
        }
        if let Some(value) = self.rotation {
            check_finite("rotation", value, "must be a finite angle")?;
        }
        Ok(())
    }

    /// The modulation step, if brightness or saturation was requested.
    pub fn modulation(&self) -> Option<Modulation> {
        if self.brightness.is_none() && self.saturation.is_none() {
            return None;
        }
        Some(Modulation {
            brightness: self.brightness.unwrap_or(1.0),
            saturation: self.saturation.unwrap_or(1.0),
        })
    }

    /// The contrast step, if contrast was requested.
    pub fn contrast_stretch(&self) -> Option<ContrastStretch> {
        self.contrast.map(ContrastStretch::from_requested)
    }
}

fn check_finite(
    name: &'static str,
    value: f32,
    reason: &'static str,
) -> Result<(), ParameterError> {
    if value.is_finite() {
        Ok(())
    } else {
        Err(ParameterError {
            name,
            value,
            reason,
        })
    }
}

fn check_scale_factor(name: &'static str, value: f32) -> Result<(), ParameterError> {
    check_finite(name, value, "must be a finite number")?;
    if value < 0.0 {
        return Err(ParameterError {
            name,
            value,
            reason: "must not be negative",
        });
    }
    Ok(())
}

/// Width bound applied to every preview. Height follows the source aspect ratio.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PreviewConstraint {
    pub max_width: u32,
}

impl PreviewConstraint {
    pub fn new(max_width: u32) -> Self {
        Self {
            max_width: max_width.max(1),
        }
    }
}

impl Default for PreviewConstraint {
    fn default() -> Self {
        Self::new(PREVIEW_MAX_WIDTH)
    }
}

/// Brightness and saturation applied together in one pass.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Modulation {
    pub brightness: f32,
    pub saturation: f32,
}

/// Per-channel affine stretch `out = in * factor + offset`, pivoting on 128.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ContrastStretch {
    pub factor: f32,
    pub offset: f32,
}

impl ContrastStretch {
    /// Build the stretch from the caller's contrast value.
    pub fn from_requested(contrast: f32) -> Self {
        let factor = effective_contrast_factor(contrast);
        Self {
            factor,
            offset: contrast_offset(factor),
        }
    }
}
