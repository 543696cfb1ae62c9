use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Highest rating a goal or a progress record can carry.
pub const MAX_RATING: u8 = 10;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Entry {
    pub name: String,
    pub goal: String,
    pub details: String,
    pub base_rating: u8,
    /// `None` means the goal has no deadline.
    #[serde(default)]
    pub target_date: Option<NaiveDate>,
    #[serde(default)]
    pub progress_records: Vec<ProgressRecord>,
}

impl Entry {
    pub fn new(
        name: impl Into<String>,
        goal: impl Into<String>,
        details: impl Into<String>,
        base_rating: u8,
        target_date: Option<NaiveDate>,
    ) -> Self {
        Entry {
            name: name.into(),
            goal: goal.into(),
            details: details.into(),
            base_rating: base_rating.min(MAX_RATING),
            target_date,
            progress_records: Vec::new(),
        }
    }

    /// Highest rating among the progress records, 0 when there are none.
    pub fn best_progress(&self) -> u8 {
        self.progress_records
            .iter()
            .map(|r| r.rating)
            .max()
            .unwrap_or(0)
    }

    /// Clamp ratings read from disk into `0..=MAX_RATING`. Returns whether
    /// anything had to be changed.
    pub fn clamp_ratings(&mut self) -> bool {
        let mut changed = false;
        if self.base_rating > MAX_RATING {
            self.base_rating = MAX_RATING;
            changed = true;
        }
        for record in &mut self.progress_records {
            if record.rating > MAX_RATING {
                record.rating = MAX_RATING;
                changed = true;
            }
        }
        changed
    }
}

/// A dated rating update. Appended to an entry and never changed afterwards.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProgressRecord {
    pub date: NaiveDate,
    pub rating: u8,
    #[serde(default)]
    pub label: String,
}

impl ProgressRecord {
    pub fn new(date: NaiveDate, rating: u8, label: impl Into<String>) -> Self {
        ProgressRecord {
            date,
            rating: rating.min(MAX_RATING),
            label: label.into(),
        }
    }
}
