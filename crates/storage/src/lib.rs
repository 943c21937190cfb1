#![forbid(unsafe_code)]

pub mod config;
#[cfg(feature = "mongo")]
pub mod mongo;
pub mod repository;
pub mod sqlite;

pub use config::{ConfigError, StorageConfig, StorageInitError};
pub use repository::{InMemoryRepository, ProgressRepository, Storage, StorageError};
