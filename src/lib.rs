//! # pixelmill
//!
//! An image preview service. Upload a raster image and get back a small PNG
//! preview; send adjustments (brightness, saturation, contrast, rotation)
//! for that preview and get back a second, adjusted preview.
//!
//! # Architecture: Two Operations Over One Engine
//!
//! ```text
//! Ingest   bytes             →  decode → resize ≤ 300 → PNG  →  uploads/temp-….png
//! Adjust   locator + params  →  modulate → contrast → rotate → resize → PNG  →  uploads/processed-….png
//! ```
//!
//! Both operations are stateless and share nothing but the preview
//! directory. Every run writes one new file under a fresh name and never
//! touches an existing one.
//!
//! # Module Map
//!
//! | Module | Role |
//! |--------|------|
//! | [`imaging`] | Engine trait, pure-Rust backend, parameter types and the fixed adjustment order |
//! | [`pipeline`] | Ingest-and-Preview and Adjust-and-Preview, with the four error kinds |
//! | [`storage`] | Preview directory: collision-free writes and locator resolution |
//! | [`naming`] | `<role>-<ms>-<token>.png` file name convention |
//! | [`server`] | axum routes: `/upload`, `/process`, static `/uploads`, `/health` |
//! | [`config`] | `config.toml` loading, validation and merging over stock defaults |
//! | [`output`] | CLI output formatting |
//!
//! # Design Decisions
//!
//! ## Fixed Adjustment Order
//!
//! Modulation always runs before contrast, contrast before rotation, and the
//! preview resize last. The order is part of the output contract: swapping
//! contrast and modulation changes pixels, and resizing earlier would make
//! adjustments work on an already-downsampled image.
//!
//! ## Locators Stay Inside the Store
//!
//! A locator is resolved by its last path component only, and that component
//! must be a name this service could have generated. Arbitrary filesystem
//! paths are never opened.
//!
//! ## Pure-Rust Imaging
//!
//! Decoding, resampling and encoding use the `image` crate; per-pixel passes
//! run on the `rayon` pool. The binary has no system library dependencies.

pub mod config;
pub mod imaging;
pub mod naming;
pub mod output;
pub mod pipeline;
pub mod server;
pub mod storage;

#[cfg(test)]
pub(crate) mod test_helpers;
