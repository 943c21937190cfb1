use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::model::{OwnerId, ProgressId};

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum ProgressError {
    #[error("title must not be empty")]
    EmptyTitle,

    #[error("category must not be empty")]
    EmptyCategory,
}

/// Draft of a learning-progress entry that has not been stored yet.
///
/// The store assigns the id on insert and hands back a [`LearningProgress`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewProgress {
    owner: OwnerId,
    date: DateTime<Utc>,
    title: String,
    description: String,
    category: String,
}

impl NewProgress {
    /// Build a validated draft.
    ///
    /// # Errors
    ///
    /// Returns `ProgressError::EmptyTitle` or `ProgressError::EmptyCategory`
    /// when those fields are blank.
    pub fn new(
        owner: OwnerId,
        date: DateTime<Utc>,
        title: impl Into<String>,
        description: impl Into<String>,
        category: impl Into<String>,
    ) -> Result<Self, ProgressError> {
        let title = title.into();
        if title.trim().is_empty() {
            return Err(ProgressError::EmptyTitle);
        }
        let category = category.into();
        if category.trim().is_empty() {
            return Err(ProgressError::EmptyCategory);
        }
        Ok(Self {
            owner,
            date,
            title,
            description: description.into(),
            category,
        })
    }

    /// Attach a store-assigned id, producing the persisted record.
    #[must_use]
    pub fn with_id(self, id: ProgressId) -> LearningProgress {
        LearningProgress {
            id,
            owner: self.owner,
            date: self.date,
            title: self.title,
            description: self.description,
            category: self.category,
        }
    }

    #[must_use]
    pub fn owner(&self) -> &OwnerId {
        &self.owner
    }

    #[must_use]
    pub fn date(&self) -> DateTime<Utc> {
        self.date
    }

    #[must_use]
    pub fn title(&self) -> &str {
        &self.title
    }

    #[must_use]
    pub fn description(&self) -> &str {
        &self.description
    }

    #[must_use]
    pub fn category(&self) -> &str {
        &self.category
    }
}

/// A stored learning-progress entry.
///
/// Entries are never edited field by field; a change is a whole-record
/// replacement keyed by `id`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "PersistedProgress")]
pub struct LearningProgress {
    id: ProgressId,
    #[serde(rename = "postOwnerID")]
    owner: OwnerId,
    date: DateTime<Utc>,
    title: String,
    #[serde(default)]
    description: String,
    category: String,
}

/// Wire shape of [`LearningProgress`]; decoding goes through `from_persisted`.
#[derive(Deserialize)]
struct PersistedProgress {
    id: ProgressId,
    #[serde(rename = "postOwnerID")]
    owner: OwnerId,
    date: DateTime<Utc>,
    title: String,
    #[serde(default)]
    description: String,
    category: String,
}

impl TryFrom<PersistedProgress> for LearningProgress {
    type Error = ProgressError;

    fn try_from(p: PersistedProgress) -> Result<Self, Self::Error> {
        LearningProgress::from_persisted(p.id, p.owner, p.date, p.title, p.description, p.category)
    }
}

impl LearningProgress {
    /// Rehydrate a record from persisted storage.
    ///
    /// # Errors
    ///
    /// Returns `ProgressError` if the persisted payload is invalid.
    pub fn from_persisted(
        id: ProgressId,
        owner: OwnerId,
        date: DateTime<Utc>,
        title: String,
        description: String,
        category: String,
    ) -> Result<Self, ProgressError> {
        Ok(NewProgress::new(owner, date, title, description, category)?.with_id(id))
    }

    /// Build the replacement for this record with a new payload.
    ///
    /// Owner and id are kept; date and payload come from the arguments.
    ///
    /// # Errors
    ///
    /// Returns `ProgressError` if the new payload is invalid.
    pub fn replaced_with(
        &self,
        date: DateTime<Utc>,
        title: impl Into<String>,
        description: impl Into<String>,
        category: impl Into<String>,
    ) -> Result<Self, ProgressError> {
        Ok(NewProgress::new(self.owner.clone(), date, title, description, category)?
            .with_id(self.id.clone()))
    }

    #[must_use]
    pub fn id(&self) -> &ProgressId {
        &self.id
    }

    #[must_use]
    pub fn owner(&self) -> &OwnerId {
        &self.owner
    }

    #[must_use]
    pub fn date(&self) -> DateTime<Utc> {
        self.date
    }

    #[must_use]
    pub fn title(&self) -> &str {
        &self.title
    }

    #[must_use]
    pub fn description(&self) -> &str {
        &self.description
    }

    #[must_use]
    pub fn category(&self) -> &str {
        &self.category
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::time::fixed_now;

    fn owner() -> OwnerId {
        OwnerId::new("u1").unwrap()
    }

    #[test]
    fn rejects_blank_title() {
        let err = NewProgress::new(owner(), fixed_now(), " ", "", "Rust").unwrap_err();
        assert_eq!(err, ProgressError::EmptyTitle);
    }

    #[test]
    fn rejects_blank_category() {
        let err = NewProgress::new(owner(), fixed_now(), "Traits", "", "").unwrap_err();
        assert_eq!(err, ProgressError::EmptyCategory);
    }

    #[test]
    fn replacement_keeps_id_and_owner() {
        let record = NewProgress::new(owner(), fixed_now(), "Traits", "", "Rust")
            .unwrap()
            .with_id(ProgressId::new("p1"));
        let later = fixed_now() + chrono::Duration::days(1);
        let replaced = record
            .replaced_with(later, "Generics", "bounds", "Rust")
            .unwrap();

        assert_eq!(replaced.id(), record.id());
        assert_eq!(replaced.owner(), record.owner());
        assert_eq!(replaced.title(), "Generics");
        assert_eq!(replaced.date(), later);
    }

    #[test]
    fn serializes_owner_as_post_owner_id() {
        let record = NewProgress::new(owner(), fixed_now(), "Traits", "", "Rust")
            .unwrap()
            .with_id(ProgressId::new("p1"));
        let json = serde_json::to_value(&record).unwrap();
        assert_eq!(json["postOwnerID"], "u1");
        assert_eq!(json["id"], "p1");
    }

    #[test]
    fn deserialize_applies_payload_checks() {
        let blank_title = r#"{"id":"p1","postOwnerID":"u1","date":"2024-01-01T00:00:00Z","title":" ","category":"Rust"}"#;
        assert!(serde_json::from_str::<LearningProgress>(blank_title).is_err());

        let blank_category = r#"{"id":"p1","postOwnerID":"u1","date":"2024-01-01T00:00:00Z","title":"Traits","category":""}"#;
        assert!(serde_json::from_str::<LearningProgress>(blank_category).is_err());

        let valid = r#"{"id":"p1","postOwnerID":"u1","date":"2024-01-01T00:00:00Z","title":"Traits","category":"Rust"}"#;
        let record = serde_json::from_str::<LearningProgress>(valid).unwrap();
        assert_eq!(record.title(), "Traits");
        assert_eq!(record.description(), "");
    }
}
