use thiserror::Error;

use crate::model::{DateRangeError, OwnerIdError, ProgressError};

/// Any validation failure raised by the domain model.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum Error {
    #[error(transparent)]
    OwnerId(#[from] OwnerIdError),
    #[error(transparent)]
    Progress(#[from] ProgressError),
    #[error(transparent)]
    DateRange(#[from] DateRangeError),
}
