//! MongoDB-backed progress repository.

use std::sync::Arc;

use bson::doc;
use chrono::{DateTime, Utc};
use futures_util::TryStreamExt;
use mongodb::{Client, Collection, IndexModel};
use progress_core::model::{LearningProgress, NewProgress, OwnerId, ProgressId};
use thiserror::Error;
use tracing::{debug, info};

use crate::repository::{ProgressRepository, Storage, StorageError};

mod schema;

pub use schema::{PROGRESS_COLLECTION, ProgressDoc, owner_date_range_filter, owner_filter};

#[derive(Debug, Error)]
#[non_exhaustive]
pub enum MongoInitError {
    #[error(transparent)]
    Driver(#[from] mongodb::error::Error),
}

fn conn(e: mongodb::error::Error) -> StorageError {
    StorageError::Connection(e.to_string())
}

#[derive(Clone)]
pub struct MongoRepository {
    collection: Collection<ProgressDoc>,
}

impl MongoRepository {
    /// Connect, verify the server answers, and ensure indexes exist.
    ///
    /// # Errors
    ///
    /// Returns `MongoInitError` if the server is unreachable or index
    /// creation fails.
    pub async fn connect(uri: &str, db_name: &str) -> Result<Self, MongoInitError> {
        // Fail fast instead of hanging on an unreachable server.
        let timeout_uri = if uri.contains('?') {
            format!("{uri}&serverSelectionTimeoutMS=3000&connectTimeoutMS=3000")
        } else {
            format!("{uri}?serverSelectionTimeoutMS=3000&connectTimeoutMS=3000")
        };

        let client = Client::with_uri_str(&timeout_uri).await?;
        client
            .database(db_name)
            .run_command(doc! { "ping": 1 })
            .await?;
        info!(db = db_name, "connected to mongodb");

        let collection = client
            .database(db_name)
            .collection::<ProgressDoc>(PROGRESS_COLLECTION);
        let repo = Self { collection };
        repo.apply_indexes().await?;
        Ok(repo)
    }

    async fn apply_indexes(&self) -> Result<(), MongoInitError> {
        let indices: Vec<IndexModel> = ProgressDoc::indices()
            .into_iter()
            .map(|(keys, opts)| IndexModel::builder().keys(keys).options(opts).build())
            .collect();
        self.collection.create_indexes(indices).await?;
        Ok(())
    }

    async fn find_many(
        &self,
        filter: bson::Document,
    ) -> Result<Vec<LearningProgress>, StorageError> {
        let docs: Vec<ProgressDoc> = self
            .collection
            .find(filter)
            .await
            .map_err(conn)?
            .try_collect()
            .await
            .map_err(conn)?;
        docs.into_iter().map(ProgressDoc::into_record).collect()
    }
}

#[async_trait::async_trait]
impl ProgressRepository for MongoRepository {
    async fn insert(&self, draft: NewProgress) -> Result<LearningProgress, StorageError> {
        let mut doc = ProgressDoc::from_draft(&draft);
        let res = self.collection.insert_one(&doc).await.map_err(conn)?;
        doc.id = Some(res.inserted_id.as_object_id().ok_or_else(|| {
            StorageError::Serialization("insert did not return an ObjectId".into())
        })?);

        // Echo what was stored, so later reads compare equal.
        let record = doc.into_record()?;
        debug!(id = %record.id(), owner = %record.owner(), "inserted progress entry");
        Ok(record)
    }

    async fn get(&self, id: &ProgressId) -> Result<LearningProgress, StorageError> {
        let oid = schema::object_id(id).ok_or(StorageError::NotFound)?;
        self.collection
            .find_one(doc! { "_id": oid })
            .await
            .map_err(conn)?
            .ok_or(StorageError::NotFound)?
            .into_record()
    }

    async fn replace(&self, record: &LearningProgress) -> Result<(), StorageError> {
        let oid = schema::object_id(record.id()).ok_or(StorageError::NotFound)?;
        let res = self
            .collection
            .replace_one(doc! { "_id": oid }, ProgressDoc::from_record(record, oid))
            .await
            .map_err(conn)?;

        if res.matched_count == 0 {
            return Err(StorageError::NotFound);
        }
        Ok(())
    }

    async fn list_by_owner(&self, owner: &OwnerId) -> Result<Vec<LearningProgress>, StorageError> {
        self.find_many(owner_filter(owner)).await
    }

    async fn delete_by_owner(&self, owner: &OwnerId) -> Result<u64, StorageError> {
        let res = self
            .collection
            .delete_many(owner_filter(owner))
            .await
            .map_err(conn)?;
        debug!(%owner, removed = res.deleted_count, "deleted progress entries");
        Ok(res.deleted_count)
    }

    async fn find_by_owner_and_date_range(
        &self,
        owner: &OwnerId,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> Result<Vec<LearningProgress>, StorageError> {
        self.find_many(owner_date_range_filter(owner, start, end))
            .await
    }
}

impl Storage {
    /// Build a `Storage` backed by MongoDB.
    ///
    /// # Errors
    ///
    /// Returns `MongoInitError` if the server cannot be reached.
    pub async fn mongo(uri: &str, db_name: &str) -> Result<Self, MongoInitError> {
        let repo = MongoRepository::connect(uri, db_name).await?;
        let progress: Arc<dyn ProgressRepository> = Arc::new(repo);
        Ok(Self { progress })
    }
}
