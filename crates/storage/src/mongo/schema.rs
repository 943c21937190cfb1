//! Document shape of a learning-progress entry in MongoDB.

use bson::{doc, oid::ObjectId, Document};
use chrono::{DateTime, Utc};
use mongodb::options::IndexOptions;
use progress_core::model::{LearningProgress, NewProgress, OwnerId, ProgressId};
use serde::{Deserialize, Serialize};

use crate::repository::StorageError;

/// Collection holding progress entries
pub const PROGRESS_COLLECTION: &str = "learningProgress";

/// Progress entry as stored in MongoDB
#[derive(Serialize, Deserialize, Clone, Debug)]
pub struct ProgressDoc {
    /// MongoDB document ID, assigned on insert
    #[serde(rename = "_id", skip_serializing_if = "Option::is_none")]
    pub id: Option<ObjectId>,

    #[serde(rename = "postOwnerID")]
    pub post_owner_id: String,

    /// Stored as a BSON date (millisecond precision)
    #[serde(with = "bson::serde_helpers::chrono_datetime_as_bson_datetime")]
    pub date: DateTime<Utc>,

    pub title: String,

    #[serde(default)]
    pub description: String,

    pub category: String,
}

/// Truncates to what a BSON date can hold.
fn bson_precision(at: DateTime<Utc>) -> DateTime<Utc> {
    bson::DateTime::from_chrono(at).to_chrono()
}

impl ProgressDoc {
    pub fn from_draft(draft: &NewProgress) -> Self {
        Self {
            id: None,
            post_owner_id: draft.owner().as_str().to_owned(),
            date: bson_precision(draft.date()),
            title: draft.title().to_owned(),
            description: draft.description().to_owned(),
            category: draft.category().to_owned(),
        }
    }

    pub fn from_record(record: &LearningProgress, id: ObjectId) -> Self {
        Self {
            id: Some(id),
            post_owner_id: record.owner().as_str().to_owned(),
            date: bson_precision(record.date()),
            title: record.title().to_owned(),
            description: record.description().to_owned(),
            category: record.category().to_owned(),
        }
    }

    pub fn into_record(self) -> Result<LearningProgress, StorageError> {
        let id = self
            .id
            .ok_or_else(|| StorageError::Serialization("document without _id".into()))?;
        let owner = OwnerId::new(self.post_owner_id)
            .map_err(|e| StorageError::Serialization(e.to_string()))?;
        LearningProgress::from_persisted(
            ProgressId::new(id.to_hex()),
            owner,
            self.date,
            self.title,
            self.description,
            self.category,
        )
        .map_err(|e| StorageError::Serialization(e.to_string()))
    }

    pub fn indices() -> Vec<(Document, Option<IndexOptions>)> {
        vec![(
            doc! { "postOwnerID": 1, "date": 1 },
            Some(
                IndexOptions::builder()
                    .name("owner_date_index".to_string())
                    .build(),
            ),
        )]
    }
}

/// `{ postOwnerID: owner }`
pub fn owner_filter(owner: &OwnerId) -> Document {
    doc! { "postOwnerID": owner.as_str() }
}

/// `{ postOwnerID: owner, date: { $gte: start, $lte: end } }`
pub fn owner_date_range_filter(
    owner: &OwnerId,
    start: DateTime<Utc>,
    end: DateTime<Utc>,
) -> Document {
    doc! {
        "postOwnerID": owner.as_str(),
        "date": {
            "$gte": bson::DateTime::from_chrono(start),
            "$lte": bson::DateTime::from_chrono(end),
        },
    }
}

/// Ids that are not ObjectIds cannot name a document in this collection.
pub fn object_id(id: &ProgressId) -> Option<ObjectId> {
    ObjectId::parse_str(id.as_str()).ok()
}
