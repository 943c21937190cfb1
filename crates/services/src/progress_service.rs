use std::sync::Arc;

use chrono::{DateTime, Utc};
use tracing::{debug, info};

use progress_core::model::{
    DateRange, LearningProgress, NewProgress, OwnerId, ProgressId, RangePreset,
};
use progress_core::report::ProgressReport;
use storage::repository::ProgressRepository;

use crate::Clock;
use crate::error::ProgressServiceError;
use crate::export;

/// Unvalidated input for a new progress entry.
#[derive(Debug, Clone, Default)]
pub struct ProgressEntry {
    pub owner: String,
    pub title: String,
    pub description: String,
    pub category: String,
    /// Defaults to the service clock's "now".
    pub date: Option<DateTime<Utc>>,
}

/// Records, queries and summarises learning progress for post owners.
#[derive(Clone)]
pub struct ProgressService {
    clock: Clock,
    progress: Arc<dyn ProgressRepository>,
}

fn owner_id(raw: &str) -> Result<OwnerId, ProgressServiceError> {
    OwnerId::new(raw).map_err(ProgressServiceError::invalid)
}

impl ProgressService {
    #[must_use]
    pub fn new(clock: Clock, progress: Arc<dyn ProgressRepository>) -> Self {
        Self { clock, progress }
    }

    /// Validate and store a new entry.
    ///
    /// # Errors
    ///
    /// Returns `ProgressServiceError::InvalidArgument` for a blank owner,
    /// title or category.
    /// Returns `ProgressServiceError::Storage` if persistence fails.
    pub async fn record(
        &self,
        entry: ProgressEntry,
    ) -> Result<LearningProgress, ProgressServiceError> {
        let owner = owner_id(&entry.owner)?;
        let date = entry.date.unwrap_or_else(|| self.clock.now());
        let draft = NewProgress::new(
            owner,
            date,
            entry.title,
            entry.description,
            entry.category,
        )
        .map_err(ProgressServiceError::invalid)?;

        let stored = self.progress.insert(draft).await?;
        info!(id = %stored.id(), owner = %stored.owner(), "recorded learning progress");
        Ok(stored)
    }

    /// Fetch a single entry.
    ///
    /// # Errors
    ///
    /// Returns `ProgressServiceError::Storage` (`NotFound` when missing).
    pub async fn get(&self, id: &ProgressId) -> Result<LearningProgress, ProgressServiceError> {
        Ok(self.progress.get(id).await?)
    }

    /// Replace the payload of an existing entry, keeping its id and owner.
    ///
    /// # Errors
    ///
    /// Returns `ProgressServiceError::InvalidArgument` if the new payload is invalid.
    /// Returns `ProgressServiceError::Storage` if the entry is missing or persistence fails.
    pub async fn revise(
        &self,
        id: &ProgressId,
        title: String,
        description: String,
        category: String,
        date: DateTime<Utc>,
    ) -> Result<LearningProgress, ProgressServiceError> {
        let current = self.progress.get(id).await?;
        let revised = current
            .replaced_with(date, title, description, category)
            .map_err(ProgressServiceError::invalid)?;
        self.progress.replace(&revised).await?;
        info!(%id, "revised learning progress");
        Ok(revised)
    }

    /// Remove every entry of `owner`, returning how many were removed.
    ///
    /// # Errors
    ///
    /// Returns `ProgressServiceError::InvalidArgument` for a blank owner.
    /// Returns `ProgressServiceError::Storage` if the delete fails.
    pub async fn delete_owner_progress(&self, owner: &str) -> Result<u64, ProgressServiceError> {
        let owner = owner_id(owner)?;
        let removed = self.progress.delete_by_owner(&owner).await?;
        info!(%owner, removed, "deleted owner progress");
        Ok(removed)
    }

    /// Entries of `owner` dated within `start..=end`.
    ///
    /// # Errors
    ///
    /// Returns `ProgressServiceError::InvalidArgument` for a blank owner or
    /// when `start` is after `end`.
    /// Returns `ProgressServiceError::Storage` if the query fails.
    pub async fn progress_between(
        &self,
        owner: &str,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> Result<Vec<LearningProgress>, ProgressServiceError> {
        let owner = owner_id(owner)?;
        let range = DateRange::new(start, end).map_err(ProgressServiceError::invalid)?;
        self.in_range(&owner, range).await
    }

    /// Entries of `owner` inside a report window.
    ///
    /// # Errors
    ///
    /// Returns `ProgressServiceError::InvalidArgument` for a blank owner.
    /// Returns `ProgressServiceError::Storage` if the query fails.
    pub async fn progress_for(
        &self,
        owner: &str,
        preset: RangePreset,
    ) -> Result<Vec<LearningProgress>, ProgressServiceError> {
        let owner = owner_id(owner)?;
        match preset.resolve(&self.clock) {
            Some(range) => self.in_range(&owner, range).await,
            None => Ok(self.progress.list_by_owner(&owner).await?),
        }
    }

    /// Aggregate statistics over the entries [`ProgressService::progress_for`] returns.
    ///
    /// # Errors
    ///
    /// Same as [`ProgressService::progress_for`].
    pub async fn report(
        &self,
        owner: &str,
        preset: RangePreset,
    ) -> Result<ProgressReport, ProgressServiceError> {
        let entries = self.progress_for(owner, preset).await?;
        Ok(ProgressReport::from_records(&entries))
    }

    /// Write the entries [`ProgressService::progress_for`] returns as CSV
    /// (`Title,Description,Category,Date`), returning the number of rows.
    ///
    /// # Errors
    ///
    /// Same as [`ProgressService::progress_for`], plus
    /// `ProgressServiceError::Export` if writing fails.
    pub async fn export<W: std::io::Write>(
        &self,
        owner: &str,
        preset: RangePreset,
        writer: W,
    ) -> Result<usize, ProgressServiceError> {
        let entries = self.progress_for(owner, preset).await?;
        let rows = export::write_csv(&entries, writer)?;
        info!(owner, rows, "exported learning progress");
        Ok(rows)
    }

    async fn in_range(
        &self,
        owner: &OwnerId,
        range: DateRange,
    ) -> Result<Vec<LearningProgress>, ProgressServiceError> {
        let found = self
            .progress
            .find_by_owner_and_date_range(owner, range.start(), range.end())
            .await?;
        debug!(%owner, found = found.len(), "loaded progress window");
        Ok(found)
    }
}
