//! The two preview operations.
//!
//! [`Pipeline::ingest`] turns uploaded bytes into a stored `temp-` preview.
//! [`Pipeline::adjust`] re-reads a stored preview, runs the adjustment plan
//! from [`imaging::operations`](crate::imaging::operations), and stores the
//! result as a `processed-` preview.
//!
//! Both are stateless: a `Pipeline` can be shared across threads and called
//! concurrently. The only shared resource is the store directory, and every
//! write goes to a freshly generated name.
//!
//! ## Errors
//!
//! Every failure collapses into one of four [`PipelineError`] kinds and is
//! logged once here with its diagnostic. Nothing is retried and no fallback
//! preview is produced.

use crate::imaging::{
    AdjustStep, AdjustmentParameters, BackendError, ImageBackend, ParameterError, PreviewConstraint,
    RustBackend, create_adjusted_preview, create_preview, plan_adjustments,
};
use crate::naming::Role;
use crate::storage::{PreviewStore, StorageError, StoredPreview};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum PipelineError {
    #[error("No image supplied")]
    MissingInput,
    #[error("Source image not found: {0}")]
    SourceNotFound(String),
    #[error("Invalid parameter: {0}")]
    InvalidParameter(#[from] ParameterError),
    #[error("Image processing failed: {0}")]
    Processing(String),
}

impl PipelineError {
    /// HTTP status for this error kind. Caller mistakes are 400, engine and
    /// storage failures are 500.
    pub fn status_code(&self) -> u16 {
        match self {
            Self::MissingInput | Self::SourceNotFound(_) | Self::InvalidParameter(_) => 400,
            Self::Processing(_) => 500,
        }
    }
}

impl From<BackendError> for PipelineError {
    fn from(e: BackendError) -> Self {
        Self::Processing(e.to_string())
    }
}

impl From<StorageError> for PipelineError {
    fn from(e: StorageError) -> Self {
        match e {
            StorageError::Foreign(locator) | StorageError::NotFound(locator) => {
                Self::SourceNotFound(locator)
            }
            other => Self::Processing(other.to_string()),
        }
    }
}

pub struct Pipeline<B: ImageBackend = RustBackend> {
    backend: B,
    store: PreviewStore,
    constraint: PreviewConstraint,
}

impl<B: ImageBackend> Pipeline<B> {
    pub fn new(backend: B, store: PreviewStore, constraint: PreviewConstraint) -> Self {
        Self {
            backend,
            store,
            constraint,
        }
    }

    pub fn store(&self) -> &PreviewStore {
        &self.store
    }

    pub fn constraint(&self) -> PreviewConstraint {
        self.constraint
    }

    /// Ingest-and-Preview: decode, bound the width, encode, store as `temp-`.
    ///
    /// `None` or an empty buffer fails with [`PipelineError::MissingInput`]
    /// before the backend is touched.
    pub fn ingest(&self, upload: Option<&[u8]>) -> Result<StoredPreview, PipelineError> {
        let bytes = match upload {
            Some(bytes) if !bytes.is_empty() => bytes,
            _ => {
                tracing::warn!("ingest rejected: no image supplied");
                return Err(PipelineError::MissingInput);
            }
        };

        tracing::debug!(bytes = bytes.len(), "ingesting upload");
        let result = create_preview(&self.backend, bytes, self.constraint)
            .map_err(PipelineError::from)
            .and_then(|encoded| Ok(self.store.persist(Role::Temp, &encoded)?));
        log_outcome("ingest", result.as_ref());
        result
    }

    /// Adjust-and-Preview: modulate → contrast → rotate → resize, store as
    /// `processed-`. The source file is only read.
    pub fn adjust(
        &self,
        locator: &str,
        params: &AdjustmentParameters,
    ) -> Result<StoredPreview, PipelineError> {
        self.adjust_with_plan(locator, params).map(|(stored, _)| stored)
    }

    /// [`adjust`](Self::adjust), also returning the steps that were run.
    pub fn adjust_with_plan(
        &self,
        locator: &str,
        params: &AdjustmentParameters,
    ) -> Result<(StoredPreview, Vec<AdjustStep>), PipelineError> {
        let result = self.run_adjust(locator, params);
        log_outcome("adjust", result.as_ref().map(|(stored, _)| stored));
        result
    }

    fn run_adjust(
        &self,
        locator: &str,
        params: &AdjustmentParameters,
    ) -> Result<(StoredPreview, Vec<AdjustStep>), PipelineError> {
        let steps = plan_adjustments(params, self.constraint)?;
        let source = self.store.resolve(locator)?;
        tracing::debug!(source = %source.display(), ?steps, "adjusting preview");

        let encoded = create_adjusted_preview(&self.backend, &source, &steps).map_err(|e| {
            if e.is_not_found() {
                PipelineError::SourceNotFound(locator.to_string())
            } else {
                PipelineError::from(e)
            }
        })?;
        let stored = self.store.persist(Role::Processed, &encoded)?;
        Ok((stored, steps))
    }
}

fn log_outcome(operation: &str, result: Result<&StoredPreview, &PipelineError>) {
    match result {
        Ok(preview) => tracing::info!(operation, name = %preview.name, "preview stored"),
        Err(PipelineError::Processing(diagnostic)) => {
            tracing::error!(operation, %diagnostic, "preview failed")
        }
        Err(e) => tracing::warn!(operation, error = %e, "preview rejected"),
    }
}
