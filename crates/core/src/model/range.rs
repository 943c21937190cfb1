use chrono::{DateTime, Duration, Months, Utc};
use thiserror::Error;

use crate::time::Clock;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum DateRangeError {
    #[error("range start {start} is after range end {end}")]
    Inverted {
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    },
}

/// Inclusive `[start, end]` window over entry dates.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DateRange {
    start: DateTime<Utc>,
    end: DateTime<Utc>,
}

impl DateRange {
    /// Creates a range covering `start..=end`.
    ///
    /// # Errors
    ///
    /// Returns `DateRangeError::Inverted` if `start` is after `end`.
    pub fn new(start: DateTime<Utc>, end: DateTime<Utc>) -> Result<Self, DateRangeError> {
        if start > end {
            return Err(DateRangeError::Inverted { start, end });
        }
        Ok(Self { start, end })
    }

    #[must_use]
    pub fn start(&self) -> DateTime<Utc> {
        self.start
    }

    #[must_use]
    pub fn end(&self) -> DateTime<Utc> {
        self.end
    }

    /// Both bounds are included.
    #[must_use]
    pub fn contains(&self, at: DateTime<Utc>) -> bool {
        self.start <= at && at <= self.end
    }
}

/// Report windows offered to a user.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RangePreset {
    /// Every entry, no date filter.
    #[default]
    All,
    /// The last seven days up to now.
    Week,
    /// The last calendar month up to now.
    Month,
    Custom(DateRange),
}

impl RangePreset {
    /// Resolve the preset to a concrete window relative to `clock`.
    ///
    /// Returns `None` for [`RangePreset::All`].
    #[must_use]
    pub fn resolve(&self, clock: &Clock) -> Option<DateRange> {
        let now = clock.now();
        match self {
            RangePreset::All => None,
            RangePreset::Week => Some(DateRange {
                start: now
                    .checked_sub_signed(Duration::days(7))
                    .unwrap_or(DateTime::<Utc>::MIN_UTC),
                end: now,
            }),
            RangePreset::Month => {
                // Windows clamp to the earliest representable instant.
                let start = now
                    .checked_sub_months(Months::new(1))
                    .or_else(|| now.checked_sub_signed(Duration::days(31)))
                    .unwrap_or(DateTime::<Utc>::MIN_UTC);
                Some(DateRange { start, end: now })
            }
            RangePreset::Custom(range) => Some(*range),
        }
    }
}
