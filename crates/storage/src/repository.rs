use async_trait::async_trait;
use chrono::{DateTime, Utc};
use progress_core::model::{LearningProgress, NewProgress, OwnerId, ProgressId};
use std::sync::{Arc, Mutex};
use thiserror::Error;
use tracing::debug;

/// Errors surfaced by storage adapters.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum StorageError {
    #[error("not found")]
    NotFound,

    #[error("conflict")]
    Conflict,

    #[error("connection error: {0}")]
    Connection(String),

    #[error("serialization error: {0}")]
    Serialization(String),
}

/// Persistence boundary for learning-progress entries.
#[async_trait]
pub trait ProgressRepository: Send + Sync {
    /// Store a new entry; the store assigns its id.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the entry cannot be stored.
    async fn insert(&self, draft: NewProgress) -> Result<LearningProgress, StorageError>;

    /// Fetch an entry by id.
    ///
    /// # Errors
    ///
    /// Returns `StorageError::NotFound` if missing, or other storage errors.
    async fn get(&self, id: &ProgressId) -> Result<LearningProgress, StorageError>;

    /// Replace a stored entry as a whole.
    ///
    /// # Errors
    ///
    /// Returns `StorageError::NotFound` if no entry has the record's id.
    async fn replace(&self, record: &LearningProgress) -> Result<(), StorageError>;

    /// Every entry belonging to `owner`, in storage order.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the store cannot be read.
    async fn list_by_owner(&self, owner: &OwnerId) -> Result<Vec<LearningProgress>, StorageError>;

    /// Remove every entry belonging to `owner` and return how many were removed.
    ///
    /// Removing nothing is not an error.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the delete cannot be carried out.
    async fn delete_by_owner(&self, owner: &OwnerId) -> Result<u64, StorageError>;

    /// Entries of `owner` dated within `start..=end`.
    ///
    /// Both bounds are inclusive. An inverted range matches nothing.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the store cannot be read.
    async fn find_by_owner_and_date_range(
        &self,
        owner: &OwnerId,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> Result<Vec<LearningProgress>, StorageError>;
}

/// Simple in-memory repository implementation for testing and prototyping.
///
/// Entries are kept in insertion order, which is the order queries return.
#[derive(Clone, Default)]
pub struct InMemoryRepository {
    entries: Arc<Mutex<Vec<LearningProgress>>>,
}

impl InMemoryRepository {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> Result<std::sync::MutexGuard<'_, Vec<LearningProgress>>, StorageError> {
        self.entries
            .lock()
            .map_err(|e| StorageError::Connection(e.to_string()))
    }
}

#[async_trait]
impl ProgressRepository for InMemoryRepository {
    async fn insert(&self, draft: NewProgress) -> Result<LearningProgress, StorageError> {
        let record = draft.with_id(ProgressId::generate());
        let mut guard = self.lock()?;
        guard.push(record.clone());
        debug!(id = %record.id(), owner = %record.owner(), "inserted progress entry");
        Ok(record)
    }

    async fn get(&self, id: &ProgressId) -> Result<LearningProgress, StorageError> {
        let guard = self.lock()?;
        guard
            .iter()
            .find(|r| r.id() == id)
            .cloned()
            .ok_or(StorageError::NotFound)
    }

    async fn replace(&self, record: &LearningProgress) -> Result<(), StorageError> {
        let mut guard = self.lock()?;
        let slot = guard
            .iter_mut()
            .find(|r| r.id() == record.id())
            .ok_or(StorageError::NotFound)?;
        *slot = record.clone();
        Ok(())
    }

    async fn list_by_owner(&self, owner: &OwnerId) -> Result<Vec<LearningProgress>, StorageError> {
        let guard = self.lock()?;
        Ok(guard.iter().filter(|r| r.owner() == owner).cloned().collect())
    }

    async fn delete_by_owner(&self, owner: &OwnerId) -> Result<u64, StorageError> {
        let mut guard = self.lock()?;
        let before = guard.len();
        guard.retain(|r| r.owner() != owner);
        let removed = (before - guard.len()) as u64;
        debug!(%owner, removed, "deleted progress entries");
        Ok(removed)
    }

    async fn find_by_owner_and_date_range(
        &self,
        owner: &OwnerId,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> Result<Vec<LearningProgress>, StorageError> {
        let guard = self.lock()?;
        Ok(guard
            .iter()
            .filter(|r| r.owner() == owner && start <= r.date() && r.date() <= end)
            .cloned()
            .collect())
    }
}

/// Holds the progress repository behind a trait object for easy backend swapping.
#[derive(Clone)]
pub struct Storage {
    pub progress: Arc<dyn ProgressRepository>,
}

impl Storage {
    #[must_use]
    pub fn in_memory() -> Self {
        let progress: Arc<dyn ProgressRepository> = Arc::new(InMemoryRepository::new());
        Self { progress }
    }
}
