use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, TimeZone, Utc};
use progress_core::model::{LearningProgress, NewProgress, OwnerId, ProgressId, RangePreset};
use services::{Clock, ProgressEntry, ProgressService, ProgressServiceError};
use storage::repository::{ProgressRepository, Storage, StorageError};

fn jan(day: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 1, day, 8, 0, 0).unwrap()
}

fn entry(owner: &str, date: DateTime<Utc>, category: &str) -> ProgressEntry {
    ProgressEntry {
        owner: owner.to_owned(),
        title: format!("{category} session"),
        description: "notes".to_owned(),
        category: category.to_owned(),
        date: Some(date),
    }
}

#[tokio::test]
async fn owner_lifecycle_over_sqlite() {
    let storage = Storage::sqlite("sqlite:file:memdb_progress_flow?mode=memory&cache=shared")
        .await
        .expect("connect sqlite");
    let service = ProgressService::new(Clock::fixed(jan(31)), Arc::clone(&storage.progress));

    let first = service.record(entry("u1", jan(1), "Rust")).await.unwrap();
    let last = service.record(entry("u1", jan(5), "Go")).await.unwrap();
    let other = service.record(entry("u2", jan(3), "Rust")).await.unwrap();

    let window = service.progress_between("u1", jan(1), jan(5)).await.unwrap();
    assert_eq!(window, vec![first.clone(), last.clone()]);
    assert!(
        service
            .progress_between("u1", jan(2), jan(4))
            .await
            .unwrap()
            .is_empty()
    );

    let report = service.report("u1", RangePreset::All).await.unwrap();
    assert_eq!(report.total_entries(), 2);
    assert_eq!(report.by_month().len(), 1);
    assert!((report.average_per_month() - 2.0).abs() < f64::EPSILON);

    assert_eq!(service.delete_owner_progress("u1").await.unwrap(), 2);
    assert!(
        service
            .progress_for("u1", RangePreset::All)
            .await
            .unwrap()
            .is_empty()
    );
    assert_eq!(
        service.progress_for("u2", RangePreset::All).await.unwrap(),
        vec![other]
    );
}

/// Repository whose transport is always down.
struct Unreachable;

#[async_trait]
impl ProgressRepository for Unreachable {
    async fn insert(&self, _draft: NewProgress) -> Result<LearningProgress, StorageError> {
        Err(StorageError::Connection("connection refused".into()))
    }

    async fn get(&self, _id: &ProgressId) -> Result<LearningProgress, StorageError> {
        Err(StorageError::Connection("connection refused".into()))
    }

    async fn replace(&self, _record: &LearningProgress) -> Result<(), StorageError> {
        Err(StorageError::Connection("connection refused".into()))
    }

    async fn list_by_owner(&self, _owner: &OwnerId) -> Result<Vec<LearningProgress>, StorageError> {
        Err(StorageError::Connection("connection refused".into()))
    }

    async fn delete_by_owner(&self, _owner: &OwnerId) -> Result<u64, StorageError> {
        Err(StorageError::Connection("connection refused".into()))
    }

    async fn find_by_owner_and_date_range(
        &self,
        _owner: &OwnerId,
        _start: DateTime<Utc>,
        _end: DateTime<Utc>,
    ) -> Result<Vec<LearningProgress>, StorageError> {
        Err(StorageError::Connection("connection refused".into()))
    }
}

#[tokio::test]
async fn transport_failures_propagate_unchanged() {
    let service = ProgressService::new(Clock::fixed(jan(31)), Arc::new(Unreachable));

    let err = service.delete_owner_progress("u1").await.unwrap_err();
    assert!(matches!(
        err,
        ProgressServiceError::Storage(StorageError::Connection(ref msg)) if msg == "connection refused"
    ));

    let err = service
        .progress_between("u1", jan(1), jan(5))
        .await
        .unwrap_err();
    assert!(matches!(
        err,
        ProgressServiceError::Storage(StorageError::Connection(_))
    ));
}
