use chrono::NaiveDate;

use crate::error::ValidationFailure;
use crate::models::{Entry, ProgressRecord};

/// Text fields of the add/edit goal form. The rating comes from the goal
/// rating selector at save time.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EntryDraft {
    pub name: String,
    pub goal: String,
    pub details: String,
    pub target_date: Option<NaiveDate>,
}

impl EntryDraft {
    pub fn from_entry(entry: &Entry) -> Self {
        EntryDraft {
            name: entry.name.clone(),
            goal: entry.goal.clone(),
            details: entry.details.clone(),
            target_date: entry.target_date,
        }
    }

    /// Rules for a new goal: all text fields and a rating.
    pub fn validate(&self, rating: u8) -> Result<(), ValidationFailure> {
        self.validate_text()?;
        if rating == 0 {
            return Err(ValidationFailure::MissingRating);
        }
        Ok(())
    }

    /// Rules for an edit. Only the text fields are checked, so a goal saved
    /// with no rating can still have its text changed.
    pub fn validate_text(&self) -> Result<(), ValidationFailure> {
        require("name", &self.name)?;
        require("goal", &self.goal)?;
        require("details", &self.details)
    }

    pub fn into_entry(self, rating: u8) -> Entry {
        Entry::new(
            self.name.trim(),
            self.goal.trim(),
            self.details.trim(),
            rating,
            self.target_date,
        )
    }

    /// Overwrite the editable fields of `entry`, keeping its progress records.
    pub fn apply_to(self, entry: &mut Entry, rating: u8) {
        let edited = self.into_entry(rating);
        entry.name = edited.name;
        entry.goal = edited.goal;
        entry.details = edited.details;
        entry.base_rating = edited.base_rating;
        entry.target_date = edited.target_date;
    }
}

/// Fields of the add-progress form. The date may be left unset; the record
/// then takes the current date.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProgressDraft {
    pub label: String,
    pub date: Option<NaiveDate>,
}

impl ProgressDraft {
    pub fn validate(&self, rating: u8) -> Result<(), ValidationFailure> {
        require("label", &self.label)?;
        if rating == 0 {
            return Err(ValidationFailure::MissingRating);
        }
        Ok(())
    }

    pub fn into_record(self, rating: u8, today: NaiveDate) -> ProgressRecord {
        ProgressRecord::new(self.date.unwrap_or(today), rating, self.label.trim())
    }
}

fn require(field: &'static str, value: &str) -> Result<(), ValidationFailure> {
    if value.trim().is_empty() {
        Err(ValidationFailure::MissingField(field))
    } else {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn draft() -> EntryDraft {
        EntryDraft {
            name: "Run".into(),
            goal: "Run 5k".into(),
            details: "training plan".into(),
            target_date: None,
        }
    }

    #[test]
    fn complete_entry_draft_passes() {
        assert_eq!(draft().validate(6), Ok(()));
    }

    #[test]
    fn entry_draft_reports_first_missing_field() {
        let mut d = draft();
        d.goal = "   ".into();
        d.details.clear();
        assert_eq!(d.validate(6), Err(ValidationFailure::MissingField("goal")));
    }

    #[test]
    fn entry_draft_needs_a_rating() {
        assert_eq!(draft().validate(0), Err(ValidationFailure::MissingRating));
    }

    #[test]
    fn edit_rules_ignore_the_rating() {
        assert_eq!(draft().validate_text(), Ok(()));
        let mut d = draft();
        d.name = " ".into();
        assert_eq!(d.validate_text(), Err(ValidationFailure::MissingField("name")));
    }

    #[test]
    fn into_entry_trims_text() {
        let mut d = draft();
        d.name = "  Run  ".into();
        let entry = d.into_entry(4);
        assert_eq!(entry.name, "Run");
        assert_eq!(entry.base_rating, 4);
    }

    #[test]
    fn apply_to_keeps_progress_records() {
        let day = NaiveDate::from_ymd_opt(2024, 3, 1).unwrap();
        let mut entry = draft().into_entry(3);
        entry
            .progress_records
            .push(ProgressRecord::new(day, 7, "tempo"));

        let mut edit = EntryDraft::from_entry(&entry);
        edit.goal = "Run 10k".into();
        edit.target_date = Some(day);
        edit.apply_to(&mut entry, 5);

        assert_eq!(entry.goal, "Run 10k");
        assert_eq!(entry.base_rating, 5);
        assert_eq!(entry.target_date, Some(day));
        assert_eq!(entry.progress_records.len(), 1);
    }

    #[test]
    fn progress_draft_rules() {
        let blank = ProgressDraft::default();
        assert_eq!(blank.validate(3), Err(ValidationFailure::MissingField("label")));

        let labelled = ProgressDraft {
            label: "long run".into(),
            date: None,
        };
        assert_eq!(labelled.validate(0), Err(ValidationFailure::MissingRating));
        assert_eq!(labelled.validate(3), Ok(()));
    }

    #[test]
    fn unset_progress_date_falls_back_to_today() {
        let today = NaiveDate::from_ymd_opt(2024, 6, 9).unwrap();
        let picked = NaiveDate::from_ymd_opt(2024, 6, 1).unwrap();

        let record = ProgressDraft {
            label: "x".into(),
            date: None,
        }
        .into_record(4, today);
        assert_eq!(record.date, today);

        let record = ProgressDraft {
            label: "x".into(),
            date: Some(picked),
        }
        .into_record(4, today);
        assert_eq!(record.date, picked);
    }
}
