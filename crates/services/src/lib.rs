#![forbid(unsafe_code)]

pub mod error;
pub mod export;
pub mod progress_service;

pub use progress_core::Clock;

pub use error::ProgressServiceError;
pub use progress_service::{ProgressEntry, ProgressService};
