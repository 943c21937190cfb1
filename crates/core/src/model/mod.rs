mod ids;
mod progress;
mod range;

pub use ids::{OwnerId, OwnerIdError, ProgressId};
pub use progress::{LearningProgress, NewProgress, ProgressError};
pub use range::{DateRange, DateRangeError, RangePreset};
