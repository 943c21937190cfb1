use progress_core::model::LearningProgress;
use sqlx::Row;

use crate::repository::StorageError;

pub(crate) fn ser<E: core::fmt::Display>(e: E) -> StorageError {
    StorageError::Serialization(e.to_string())
}

pub(crate) fn conn(e: sqlx::Error) -> StorageError {
    StorageError::Connection(e.to_string())
}

/// Encodes a record as the JSON document stored alongside its projections.
pub(crate) fn to_document(record: &LearningProgress) -> Result<String, StorageError> {
    serde_json::to_string(record).map_err(ser)
}

/// Decodes a `learning_progress` row.
///
/// The document is authoritative; the projected `id` column must agree with it.
/// Payload checks run while decoding, so an invalid document is `Serialization`.
pub(crate) fn map_progress_row(
    row: &sqlx::sqlite::SqliteRow,
) -> Result<LearningProgress, StorageError> {
    let id: String = row.try_get("id").map_err(ser)?;
    let document: String = row.try_get("document").map_err(ser)?;
    let record: LearningProgress = serde_json::from_str(&document).map_err(ser)?;

    if record.id().as_str() != id {
        return Err(StorageError::Serialization(format!(
            "document id {} does not match row id {id}",
            record.id()
        )));
    }
    Ok(record)
}
