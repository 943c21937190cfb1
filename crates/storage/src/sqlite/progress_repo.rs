use chrono::{DateTime, Utc};
use progress_core::model::{LearningProgress, NewProgress, OwnerId, ProgressId};
use tracing::debug;

use super::{
    SqliteRepository,
    mapping::{conn, map_progress_row, to_document},
};
use crate::repository::{ProgressRepository, StorageError};

fn map_rows(rows: &[sqlx::sqlite::SqliteRow]) -> Result<Vec<LearningProgress>, StorageError> {
    let mut out = Vec::with_capacity(rows.len());
    for row in rows {
        out.push(map_progress_row(row)?);
    }
    Ok(out)
}

#[async_trait::async_trait]
impl ProgressRepository for SqliteRepository {
    async fn insert(&self, draft: NewProgress) -> Result<LearningProgress, StorageError> {
        let record = draft.with_id(ProgressId::generate());
        let document = to_document(&record)?;

        sqlx::query(
            r"
                INSERT INTO learning_progress (id, post_owner_id, date, document)
                VALUES (?1, ?2, ?3, ?4)
            ",
        )
        .bind(record.id().as_str())
        .bind(record.owner().as_str())
        .bind(record.date())
        .bind(document)
        .execute(&self.pool)
        .await
        .map_err(|e| match e {
            sqlx::Error::Database(db) if db.is_unique_violation() => StorageError::Conflict,
            other => conn(other),
        })?;

        debug!(id = %record.id(), owner = %record.owner(), "inserted progress entry");
        Ok(record)
    }

    async fn get(&self, id: &ProgressId) -> Result<LearningProgress, StorageError> {
        let row = sqlx::query(
            r"
                SELECT id, document
                FROM learning_progress
                WHERE id = ?1
            ",
        )
        .bind(id.as_str())
        .fetch_optional(&self.pool)
        .await
        .map_err(conn)?
        .ok_or(StorageError::NotFound)?;

        map_progress_row(&row)
    }

    async fn replace(&self, record: &LearningProgress) -> Result<(), StorageError> {
        let document = to_document(record)?;

        let res = sqlx::query(
            r"
                UPDATE learning_progress
                SET post_owner_id = ?2, date = ?3, document = ?4
                WHERE id = ?1
            ",
        )
        .bind(record.id().as_str())
        .bind(record.owner().as_str())
        .bind(record.date())
        .bind(document)
        .execute(&self.pool)
        .await
        .map_err(conn)?;

        if res.rows_affected() == 0 {
            return Err(StorageError::NotFound);
        }
        Ok(())
    }

    async fn list_by_owner(&self, owner: &OwnerId) -> Result<Vec<LearningProgress>, StorageError> {
        let rows = sqlx::query(
            r"
                SELECT id, document
                FROM learning_progress
                WHERE post_owner_id = ?1
                ORDER BY seq ASC
            ",
        )
        .bind(owner.as_str())
        .fetch_all(&self.pool)
        .await
        .map_err(conn)?;

        map_rows(&rows)
    }

    async fn delete_by_owner(&self, owner: &OwnerId) -> Result<u64, StorageError> {
        let res = sqlx::query("DELETE FROM learning_progress WHERE post_owner_id = ?1")
            .bind(owner.as_str())
            .execute(&self.pool)
            .await
            .map_err(conn)?;

        let removed = res.rows_affected();
        debug!(%owner, removed, "deleted progress entries");
        Ok(removed)
    }

    async fn find_by_owner_and_date_range(
        &self,
        owner: &OwnerId,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> Result<Vec<LearningProgress>, StorageError> {
        let rows = sqlx::query(
            r"
                SELECT id, document
                FROM learning_progress
                WHERE post_owner_id = ?1 AND date >= ?2 AND date <= ?3
                ORDER BY seq ASC
            ",
        )
        .bind(owner.as_str())
        .bind(start)
        .bind(end)
        .fetch_all(&self.pool)
        .await
        .map_err(conn)?;

        debug!(%owner, %start, %end, found = rows.len(), "queried progress by date range");
        map_rows(&rows)
    }
}
