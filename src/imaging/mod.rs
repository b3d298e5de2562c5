//! Image processing in pure Rust, no system libraries.
//!
//! | Operation | Crate / function |
//! |---|---|
//! | **Decode** | `image::load_from_memory`, `ImageReader` |
//! | **Resize → preview** | Lanczos3, width bounded by [`PreviewConstraint`] |
//! | **Modulate / contrast** | per-pixel passes parallelised with `rayon` |
//! | **Rotate** | right-angle fast path, bilinear inverse mapping otherwise |
//! | **Encode** | PNG |
//!
//! The module is split into:
//! - **Calculations**: Pure functions for preview geometry and contrast math (unit testable)
//! - **Parameters**: Data structures describing requested adjustments
//! - **Backend**: [`ImageBackend`] trait + [`RustBackend`]
//! - **Operations**: Ordering policy combining parameters + backend

pub mod backend;
mod calculations;
pub mod operations;
mod params;
pub mod rust_backend;

pub use backend::{BackendError, ImageBackend};
pub use calculations::{contrast_offset, effective_contrast_factor, preview_dimensions};
pub use operations::{
    AdjustStep, apply_steps, create_adjusted_preview, create_preview, plan_adjustments,
};
pub use params::{
    AdjustmentParameters, ContrastStretch, Modulation, PREVIEW_MAX_WIDTH, ParameterError,
    PreviewConstraint,
};
pub use rust_backend::RustBackend;
