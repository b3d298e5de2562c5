//! Image codec/transform engine trait and shared types.
//!
//! The [`ImageBackend`] trait names the primitives the pipeline composes:
//! decode, open, resize, modulate, linear, rotate and encode. Each may fail.
//! The ordering of those primitives lives in
//! [`operations`](super::operations), never in a backend.
//!
//! The production implementation is
//! [`RustBackend`](super::rust_backend::RustBackend), built on the `image`
//! crate with `rayon` for the per-pixel passes.

use super::params::{ContrastStretch, Modulation};
use image::DynamicImage;
use std::path::Path;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum BackendError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Processing failed: {0}")]
    ProcessingFailed(String),
}

impl BackendError {
    /// True when the underlying cause is a missing file.
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::Io(e) if e.kind() == std::io::ErrorKind::NotFound)
    }
}

/// Trait for image codec/transform engines.
///
/// Transform methods take the image by value and return the result, so a
/// backend is free to work in place.
pub trait ImageBackend: Send + Sync {
    /// Decode an encoded image held in memory.
    fn decode(&self, bytes: &[u8]) -> Result<DynamicImage, BackendError>;

    /// Read and decode an image from disk.
    fn open(&self, path: &Path) -> Result<DynamicImage, BackendError>;

    /// Resample to exactly `width` x `height`.
    fn resize(
        &self,
        image: DynamicImage,
        width: u32,
        height: u32,
    ) -> Result<DynamicImage, BackendError>;

    /// Scale brightness and saturation together in a single pass.
    fn modulate(
        &self,
        image: DynamicImage,
        modulation: Modulation,
    ) -> Result<DynamicImage, BackendError>;

    /// Apply `out = in * factor + offset` to each color channel.
    fn linear(
        &self,
        image: DynamicImage,
        stretch: ContrastStretch,
    ) -> Result<DynamicImage, BackendError>;

    /// Rotate clockwise by `degrees`, expanding the canvas to fit.
    fn rotate(&self, image: DynamicImage, degrees: f32) -> Result<DynamicImage, BackendError>;

    /// Encode to the preview format (PNG).
    fn encode(&self, image: &DynamicImage) -> Result<Vec<u8>, BackendError>;
}

#[cfg(test)]
pub mod tests {
    use super::*;
    use std::sync::Mutex;

    /// Mock backend that records operations without doing pixel work.
    ///
    /// Decode/open hand back a blank image of the configured size; resize
    /// returns a blank image of the requested size so later steps see the
    /// right dimensions.
    pub struct MockBackend {
        pub source_dimensions: (u32, u32),
        pub fail_on: Option<&'static str>,
        pub operations: Mutex<Vec<RecordedOp>>,
    }

    #[derive(Debug, Clone, PartialEq)]
    pub enum RecordedOp {
        Decode(usize),
        Open(String),
        Resize { width: u32, height: u32 },
        Modulate { brightness: f32, saturation: f32 },
        Linear { factor: f32, offset: f32 },
        Rotate(f32),
        Encode { width: u32, height: u32 },
    }

    impl Default for MockBackend {
        fn default() -> Self {
            Self::with_dimensions(800, 600)
        }
    }

    impl MockBackend {
        pub fn new() -> Self {
            Self::default()
        }

        pub fn with_dimensions(width: u32, height: u32) -> Self {
            Self {
                source_dimensions: (width, height),
                fail_on: None,
                operations: Mutex::new(Vec::new()),
            }
        }

        /// A mock whose named operation (e.g. `"rotate"`) always fails.
        pub fn failing_on(op: &'static str) -> Self {
            Self {
                fail_on: Some(op),
                ..Self::default()
            }
        }

        pub fn get_operations(&self) -> Vec<RecordedOp> {
            self.operations.lock().unwrap().clone()
        }

        fn record(&self, name: &'static str, op: RecordedOp) -> Result<(), BackendError> {
            self.operations.lock().unwrap().push(op);
            if self.fail_on == Some(name) {
                return Err(BackendError::ProcessingFailed(format!("mock {name} failure")));
            }
            Ok(())
        }

        fn blank(&self) -> DynamicImage {
            let (w, h) = self.source_dimensions;
            DynamicImage::new_rgb8(w, h)
        }
    }

    impl ImageBackend for MockBackend {
        fn decode(&self, bytes: &[u8]) -> Result<DynamicImage, BackendError> {
            self.record("decode", RecordedOp::Decode(bytes.len()))?;
            Ok(self.blank())
        }

        fn open(&self, path: &Path) -> Result<DynamicImage, BackendError> {
            self.record("open", RecordedOp::Open(path.to_string_lossy().to_string()))?;
            Ok(self.blank())
        }

        fn resize(
            &self,
            _image: DynamicImage,
            width: u32,
            height: u32,
        ) -> Result<DynamicImage, BackendError> {
            self.record("resize", RecordedOp::Resize { width, height })?;
            Ok(DynamicImage::new_rgb8(width, height))
        }

        fn modulate(
            &self,
            image: DynamicImage,
            modulation: Modulation,
        ) -> Result<DynamicImage, BackendError> {
            self.record(
                "modulate",
                RecordedOp::Modulate {
                    brightness: modulation.brightness,
                    saturation: modulation.saturation,
                },
            )?;
            Ok(image)
        }

        fn linear(
            &self,
            image: DynamicImage,
            stretch: ContrastStretch,
        ) -> Result<DynamicImage, BackendError> {
            self.record(
                "linear",
                RecordedOp::Linear {
                    factor: stretch.factor,
                    offset: stretch.offset,
                },
            )?;
            Ok(image)
        }

        fn rotate(&self, image: DynamicImage, degrees: f32) -> Result<DynamicImage, BackendError> {
            self.record("rotate", RecordedOp::Rotate(degrees))?;
            Ok(image)
        }

        fn encode(&self, image: &DynamicImage) -> Result<Vec<u8>, BackendError> {
            self.record(
                "encode",
                RecordedOp::Encode {
                    width: image.width(),
                    height: image.height(),
                },
            )?;
            Ok(vec![0x89, b'P', b'N', b'G'])
        }
    }

    #[test]
    fn mock_records_decode() {
        let backend = MockBackend::with_dimensions(640, 480);

        let img = backend.decode(&[1, 2, 3]).unwrap();
        assert_eq!((img.width(), img.height()), (640, 480));

        let ops = backend.get_operations();
        assert_eq!(ops, vec![RecordedOp::Decode(3)]);
    }

    #[test]
    fn mock_resize_returns_requested_size() {
        let backend = MockBackend::new();

        let img = backend.resize(DynamicImage::new_rgb8(10, 10), 300, 225).unwrap();
        assert_eq!((img.width(), img.height()), (300, 225));
        assert!(matches!(
            &backend.get_operations()[0],
            RecordedOp::Resize {
                width: 300,
                height: 225
            }
        ));
    }

    #[test]
    fn mock_failure_is_still_recorded() {
        let backend = MockBackend::failing_on("rotate");

        let result = backend.rotate(DynamicImage::new_rgb8(4, 4), 90.0);
        assert!(result.is_err());
        assert_eq!(backend.get_operations(), vec![RecordedOp::Rotate(90.0)]);
    }

    #[test]
    fn not_found_detection() {
        let missing = BackendError::Io(std::io::Error::from(std::io::ErrorKind::NotFound));
        assert!(missing.is_not_found());
        assert!(!BackendError::ProcessingFailed("x".into()).is_not_found());
    }
}
