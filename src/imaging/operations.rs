//! High-level image operations.
//!
//! These functions own the ordering policy. They turn caller parameters into
//! an ordered list of [`AdjustStep`]s and run them against a backend:
//!
//! ```text
//! modulate (brightness/saturation) → linear contrast → rotate → resize ≤ max width
//! ```
//!
//! The order is fixed. Resizing last keeps every adjustment working on the
//! full-resolution pixel population.

use super::backend::{BackendError, ImageBackend};
use super::calculations::preview_dimensions;
use super::params::{
    AdjustmentParameters, ContrastStretch, Modulation, ParameterError, PreviewConstraint,
};
use image::DynamicImage;
use std::path::Path;

/// Result type for image operations.
pub type Result<T> = std::result::Result<T, BackendError>;

/// One engine call in an adjustment plan.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum AdjustStep {
    Modulate(Modulation),
    Contrast(ContrastStretch),
    Rotate(f32),
    Resize(PreviewConstraint),
}

/// Plan an adjustment run without executing it.
///
/// Validates the parameters, then emits only the steps that were requested,
/// always ending with the preview resize.
pub fn plan_adjustments(
    params: &AdjustmentParameters,
    constraint: PreviewConstraint,
) -> std::result::Result<Vec<AdjustStep>, ParameterError> {
    params.validate()?;

    let mut steps = Vec::with_capacity(4);
    if let Some(modulation) = params.modulation() {
        steps.push(AdjustStep::Modulate(modulation));
    }
    if let Some(stretch) = params.contrast_stretch() {
        steps.push(AdjustStep::Contrast(stretch));
    }
    if let Some(degrees) = params.rotation {
        steps.push(AdjustStep::Rotate(degrees));
    }
    steps.push(AdjustStep::Resize(constraint));
    Ok(steps)
}

/// Run planned steps in order.
pub fn apply_steps(
    backend: &impl ImageBackend,
    image: DynamicImage,
    steps: &[AdjustStep],
) -> Result<DynamicImage> {
    steps.iter().try_fold(image, |image, step| match *step {
        AdjustStep::Modulate(modulation) => backend.modulate(image, modulation),
        AdjustStep::Contrast(stretch) => backend.linear(image, stretch),
        AdjustStep::Rotate(degrees) => backend.rotate(image, degrees),
        AdjustStep::Resize(constraint) => fit_to_width(backend, image, constraint),
    })
}

/// Resize so the width is at most `constraint.max_width`, aspect preserved.
pub fn fit_to_width(
    backend: &impl ImageBackend,
    image: DynamicImage,
    constraint: PreviewConstraint,
) -> Result<DynamicImage> {
    let (width, height) =
        preview_dimensions((image.width(), image.height()), constraint.max_width);
    backend.resize(image, width, height)
}

/// Decode uploaded bytes and produce an encoded preview.
pub fn create_preview(
    backend: &impl ImageBackend,
    bytes: &[u8],
    constraint: PreviewConstraint,
) -> Result<Vec<u8>> {
    let image = backend.decode(bytes)?;
    let preview = fit_to_width(backend, image, constraint)?;
    backend.encode(&preview)
}

/// Read a stored image, run an adjustment plan over it and encode the result.
pub fn create_adjusted_preview(
    backend: &impl ImageBackend,
    source: &Path,
    steps: &[AdjustStep],
) -> Result<Vec<u8>> {
    let image = backend.open(source)?;
    let adjusted = apply_steps(backend, image, steps)?;
    backend.encode(&adjusted)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::imaging::backend::tests::{MockBackend, RecordedOp};

    fn all_params() -> AdjustmentParameters {
        AdjustmentParameters {
            brightness: Some(1.2),
            contrast: Some(0.5),
            saturation: Some(0.8),
            rotation: Some(90.0),
        }
    }

    #[test]
    fn plan_empty_is_resize_only() {
        let steps =
            plan_adjustments(&AdjustmentParameters::default(), PreviewConstraint::default())
                .unwrap();
        assert_eq!(steps, vec![AdjustStep::Resize(PreviewConstraint::default())]);
    }

    #[test]
    fn plan_orders_modulate_contrast_rotate_resize() {
        let steps = plan_adjustments(&all_params(), PreviewConstraint::default()).unwrap();
        assert!(matches!(
            steps.as_slice(),
            [
                AdjustStep::Modulate(_),
                AdjustStep::Contrast(_),
                AdjustStep::Rotate(_),
                AdjustStep::Resize(_)
            ]
        ));
    }

    #[test]
    fn plan_brightness_only_still_modulates_with_identity_saturation() {
        let params = AdjustmentParameters {
            brightness: Some(0.5),
            ..Default::default()
        };
        let steps = plan_adjustments(&params, PreviewConstraint::default()).unwrap();
        assert_eq!(
            steps[0],
            AdjustStep::Modulate(Modulation {
                brightness: 0.5,
                saturation: 1.0
            })
        );
        assert_eq!(steps.len(), 2);
    }

    #[test]
    fn plan_normalizes_contrast() {
        let params = AdjustmentParameters {
            contrast: Some(0.5),
            ..Default::default()
        };
        let steps = plan_adjustments(&params, PreviewConstraint::default()).unwrap();
        assert_eq!(
            steps[0],
            AdjustStep::Contrast(ContrastStretch {
                factor: 1.5,
                offset: -64.0
            })
        );
    }

    #[test]
    fn plan_rejects_invalid_parameters() {
        let params = AdjustmentParameters {
            saturation: Some(-1.0),
            ..Default::default()
        };
        let err = plan_adjustments(&params, PreviewConstraint::default()).unwrap_err();
        assert_eq!(err.name, "saturation");
    }

    #[test]
    fn create_preview_decodes_resizes_encodes() {
        let backend = MockBackend::with_dimensions(1200, 800);

        create_preview(&backend, &[0u8; 16], PreviewConstraint::default()).unwrap();

        assert_eq!(
            backend.get_operations(),
            vec![
                RecordedOp::Decode(16),
                RecordedOp::Resize {
                    width: 300,
                    height: 200
                },
                RecordedOp::Encode {
                    width: 300,
                    height: 200
                },
            ]
        );
    }

    #[test]
    fn adjusted_preview_runs_engine_calls_in_policy_order() {
        let backend = MockBackend::with_dimensions(600, 300);
        let steps = plan_adjustments(&all_params(), PreviewConstraint::default()).unwrap();

        create_adjusted_preview(&backend, Path::new("/store/temp-1-abcdef01.png"), &steps)
            .unwrap();

        let ops = backend.get_operations();
        assert_eq!(ops[0], RecordedOp::Open("/store/temp-1-abcdef01.png".into()));
        assert!(matches!(ops[1], RecordedOp::Modulate { .. }));
        assert!(matches!(ops[2], RecordedOp::Linear { .. }));
        assert_eq!(ops[3], RecordedOp::Rotate(90.0));
        assert!(matches!(ops[4], RecordedOp::Resize { width: 300, .. }));
        assert!(matches!(ops[5], RecordedOp::Encode { .. }));
        assert_eq!(ops.len(), 6);
    }

    #[test]
    fn resize_is_always_last_even_without_adjustments() {
        let backend = MockBackend::with_dimensions(900, 600);
        let steps =
            plan_adjustments(&AdjustmentParameters::default(), PreviewConstraint::default())
                .unwrap();

        create_adjusted_preview(&backend, Path::new("/store/x.png"), &steps).unwrap();

        let ops = backend.get_operations();
        assert_eq!(ops.len(), 3);
        assert_eq!(
            ops[1],
            RecordedOp::Resize {
                width: 300,
                height: 200
            }
        );
    }

    #[test]
    fn engine_failure_stops_the_plan() {
        let backend = MockBackend::failing_on("linear");
        let steps = plan_adjustments(&all_params(), PreviewConstraint::default()).unwrap();

        let result = create_adjusted_preview(&backend, Path::new("/store/x.png"), &steps);
        assert!(result.is_err());

        // Nothing after the failing contrast step ran
        let ops = backend.get_operations();
        assert!(matches!(ops.last(), Some(RecordedOp::Linear { .. })));
        assert!(!ops.iter().any(|op| matches!(op, RecordedOp::Encode { .. })));
    }

    #[test]
    fn small_source_keeps_its_width() {
        let backend = MockBackend::with_dimensions(120, 90);
        create_preview(&backend, &[1], PreviewConstraint::default()).unwrap();
        assert!(backend.get_operations().contains(&RecordedOp::Resize {
            width: 120,
            height: 90
        }));
    }
}
