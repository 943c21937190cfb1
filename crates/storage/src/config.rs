//! Backend selection from environment variables.

use thiserror::Error;

use crate::repository::Storage;
use crate::sqlite::SqliteInitError;

pub const DEFAULT_SQLITE_URL: &str = "sqlite:progress.sqlite3?mode=rwc";
pub const DEFAULT_MONGO_URI: &str = "mongodb://localhost:27017";
pub const DEFAULT_MONGO_DB: &str = "share_and_learn";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StorageConfig {
    Memory,
    Sqlite { url: String },
    Mongo { uri: String, db: String },
}

#[derive(Debug, Error)]
#[non_exhaustive]
pub enum ConfigError {
    #[error("unknown storage backend {0:?} (expected memory, sqlite or mongo)")]
    UnknownBackend(String),
    #[error("{var} must not be empty")]
    Empty { var: &'static str },
}

#[derive(Debug, Error)]
#[non_exhaustive]
pub enum StorageInitError {
    #[error(transparent)]
    Sqlite(#[from] SqliteInitError),
    #[cfg(feature = "mongo")]
    #[error(transparent)]
    Mongo(#[from] crate::mongo::MongoInitError),
    #[error("mongo backend requested but the `mongo` feature is disabled")]
    MongoDisabled,
}

impl Default for StorageConfig {
    fn default() -> Self {
        StorageConfig::Sqlite {
            url: DEFAULT_SQLITE_URL.to_owned(),
        }
    }
}

impl StorageConfig {
    /// Reads `PROGRESS_STORAGE`, `PROGRESS_DB_URL`, `PROGRESS_MONGO_URI` and
    /// `PROGRESS_MONGO_DB`.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` for an unknown backend name or a blank value.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Same as [`StorageConfig::from_env`] with an injectable variable source.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` for an unknown backend name or a blank value.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let var = |key: &'static str, default: &str| -> Result<String, ConfigError> {
            let value = lookup(key).unwrap_or_else(|| default.to_owned());
            if value.trim().is_empty() {
                return Err(ConfigError::Empty { var: key });
            }
            Ok(value)
        };

        let backend = lookup("PROGRESS_STORAGE").unwrap_or_else(|| "sqlite".to_owned());
        match backend.trim().to_ascii_lowercase().as_str() {
            "memory" => Ok(StorageConfig::Memory),
            "sqlite" => Ok(StorageConfig::Sqlite {
                url: var("PROGRESS_DB_URL", DEFAULT_SQLITE_URL)?,
            }),
            "mongo" | "mongodb" => Ok(StorageConfig::Mongo {
                uri: var("PROGRESS_MONGO_URI", DEFAULT_MONGO_URI)?,
                db: var("PROGRESS_MONGO_DB", DEFAULT_MONGO_DB)?,
            }),
            _ => Err(ConfigError::UnknownBackend(backend)),
        }
    }
}

impl Storage {
    /// Build the backend described by `config`.
    ///
    /// # Errors
    ///
    /// Returns `StorageInitError` if the backend cannot be initialised.
    pub async fn from_config(config: &StorageConfig) -> Result<Self, StorageInitError> {
        match config {
            StorageConfig::Memory => Ok(Storage::in_memory()),
            StorageConfig::Sqlite { url } => Ok(Storage::sqlite(url).await?),
            #[cfg(feature = "mongo")]
            StorageConfig::Mongo { uri, db } => Ok(Storage::mongo(uri, db).await?),
            #[cfg(not(feature = "mongo"))]
            StorageConfig::Mongo { .. } => Err(StorageInitError::MongoDisabled),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| ((*k).to_owned(), (*v).to_owned()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn defaults_to_sqlite() {
        let config = StorageConfig::from_lookup(lookup(&[])).unwrap();
        assert_eq!(config, StorageConfig::default());
    }

    #[test]
    fn reads_mongo_settings() {
        let config = StorageConfig::from_lookup(lookup(&[
            ("PROGRESS_STORAGE", "Mongo"),
            ("PROGRESS_MONGO_URI", "mongodb://db:27017"),
        ]))
        .unwrap();
        assert_eq!(
            config,
            StorageConfig::Mongo {
                uri: "mongodb://db:27017".into(),
                db: DEFAULT_MONGO_DB.into(),
            }
        );
    }

    #[test]
    fn rejects_unknown_backend_and_blank_values() {
        let err = StorageConfig::from_lookup(lookup(&[("PROGRESS_STORAGE", "redis")])).unwrap_err();
        assert!(matches!(err, ConfigError::UnknownBackend(_)));

        let err = StorageConfig::from_lookup(lookup(&[("PROGRESS_DB_URL", " ")])).unwrap_err();
        assert!(matches!(err, ConfigError::Empty { var: "PROGRESS_DB_URL" }));
    }

    #[tokio::test]
    async fn memory_config_builds_storage() {
        let storage = Storage::from_config(&StorageConfig::Memory).await.unwrap();
        let owner = progress_core::model::OwnerId::new("u1").unwrap();
        assert!(storage.progress.list_by_owner(&owner).await.unwrap().is_empty());
    }
}
