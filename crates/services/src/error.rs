//! Shared error types for the services crate.

use thiserror::Error;

use storage::repository::StorageError;

/// Errors emitted by `ProgressService`.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum ProgressServiceError {
    /// Rejected before any storage call was made.
    #[error("invalid argument: {0}")]
    InvalidArgument(#[from] progress_core::Error),
    #[error(transparent)]
    Storage(#[from] StorageError),
    #[error("export failed: {0}")]
    Export(#[from] csv::Error),
}

impl ProgressServiceError {
    pub(crate) fn invalid(e: impl Into<progress_core::Error>) -> Self {
        ProgressServiceError::InvalidArgument(e.into())
    }
}
