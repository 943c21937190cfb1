//! Aggregate statistics over a set of learning-progress entries.

use std::collections::BTreeMap;

use chrono::Datelike;

use crate::model::LearningProgress;

/// Calendar month bucket used by the timeline (`YYYY-MM`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct YearMonth {
    pub year: i32,
    pub month: u32,
}

impl std::fmt::Display for YearMonth {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:04}-{:02}", self.year, self.month)
    }
}

/// Summary of an owner's progress entries.
#[derive(Debug, Clone, PartialEq)]
pub struct ProgressReport {
    total_entries: usize,
    by_category: BTreeMap<String, usize>,
    by_month: BTreeMap<YearMonth, usize>,
}

impl ProgressReport {
    #[must_use]
    pub fn from_records(records: &[LearningProgress]) -> Self {
        let mut by_category: BTreeMap<String, usize> = BTreeMap::new();
        let mut by_month: BTreeMap<YearMonth, usize> = BTreeMap::new();

        for record in records {
            *by_category.entry(record.category().to_owned()).or_default() += 1;
            let date = record.date();
            let bucket = YearMonth {
                year: date.year(),
                month: date.month(),
            };
            *by_month.entry(bucket).or_default() += 1;
        }

        Self {
            total_entries: records.len(),
            by_category,
            by_month,
        }
    }

    #[must_use]
    pub fn total_entries(&self) -> usize {
        self.total_entries
    }

    /// Entry count per category, ordered by category name.
    #[must_use]
    pub fn by_category(&self) -> &BTreeMap<String, usize> {
        &self.by_category
    }

    /// Entry count per calendar month, oldest first.
    #[must_use]
    pub fn by_month(&self) -> &BTreeMap<YearMonth, usize> {
        &self.by_month
    }

    /// Category with the most entries.
    ///
    /// Ties go to the category that sorts first. `None` when there are no entries.
    #[must_use]
    pub fn most_common_category(&self) -> Option<&str> {
        let mut best: Option<(&str, usize)> = None;
        for (category, &count) in &self.by_category {
            if best.is_none_or(|(_, top)| count > top) {
                best = Some((category.as_str(), count));
            }
        }
        best.map(|(category, _)| category)
    }

    /// Mean number of entries per month that has at least one entry.
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn average_per_month(&self) -> f64 {
        if self.by_month.is_empty() {
            return 0.0;
        }
        self.total_entries as f64 / self.by_month.len() as f64
    }
}
