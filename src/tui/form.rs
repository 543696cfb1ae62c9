use anyhow::Result;

use crate::models::Entry;
use crate::screens::{EntryDraft, ProgressDraft};
use crate::utils::format::parse_date;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Field {
    Name,
    Goal,
    Details,
    TargetDate,
    Label,
    Date,
    Rating,
}

impl Field {
    pub fn label(self) -> &'static str {
        match self {
            Field::Name => "Name",
            Field::Goal => "Achievement goal",
            Field::Details => "Details",
            Field::TargetDate => "Target date",
            Field::Label => "What did you do",
            Field::Date => "Date",
            Field::Rating => "Rating",
        }
    }

    pub fn hint(self) -> &'static str {
        match self {
            Field::TargetDate => "YYYY-MM-DD, blank for none",
            Field::Date => "YYYY-MM-DD, blank for today",
            Field::Rating => "← → pick · Enter set · 1-9, 0 = 10",
            _ => "",
        }
    }
}

/// Text typed into an add/edit or progress form. The rating row lives in
/// the orchestrator; this only tracks which field has focus.
#[derive(Debug, Clone)]
pub struct FormState {
    fields: Vec<(Field, String)>,
    focus: usize,
    pub error: Option<String>,
}

impl FormState {
    pub fn entry() -> Self {
        Self::with_fields(&[
            Field::Name,
            Field::Goal,
            Field::Details,
            Field::TargetDate,
            Field::Rating,
        ])
    }

    /// Entry form prefilled from a saved goal.
    pub fn entry_from(entry: &Entry) -> Self {
        let mut form = Self::entry();
        form.set(Field::Name, &entry.name);
        form.set(Field::Goal, &entry.goal);
        form.set(Field::Details, &entry.details);
        if let Some(date) = entry.target_date {
            form.set(Field::TargetDate, &date.format("%Y-%m-%d").to_string());
        }
        form
    }

    pub fn progress() -> Self {
        Self::with_fields(&[Field::Label, Field::Date, Field::Rating])
    }

    fn with_fields(fields: &[Field]) -> Self {
        FormState {
            fields: fields.iter().map(|f| (*f, String::new())).collect(),
            focus: 0,
            error: None,
        }
    }

    fn set(&mut self, field: Field, value: &str) {
        if let Some((_, v)) = self.fields.iter_mut().find(|(f, _)| *f == field) {
            *v = value.to_string();
        }
    }

    pub fn value(&self, field: Field) -> &str {
        self.fields
            .iter()
            .find(|(f, _)| *f == field)
            .map(|(_, v)| v.as_str())
            .unwrap_or("")
    }

    pub fn fields(&self) -> impl Iterator<Item = (Field, &str)> {
        self.fields.iter().map(|(f, v)| (*f, v.as_str()))
    }

    pub fn focused(&self) -> Field {
        self.fields[self.focus].0
    }

    pub fn next_field(&mut self) {
        self.focus = (self.focus + 1) % self.fields.len();
    }

    pub fn prev_field(&mut self) {
        self.focus = (self.focus + self.fields.len() - 1) % self.fields.len();
    }

    pub fn push_char(&mut self, c: char) {
        if self.focused() == Field::Rating {
            return;
        }
        self.fields[self.focus].1.push(c);
        self.error = None;
    }

    pub fn pop_char(&mut self) {
        if self.focused() == Field::Rating {
            return;
        }
        self.fields[self.focus].1.pop();
        self.error = None;
    }

    pub fn entry_draft(&self) -> Result<EntryDraft> {
        Ok(EntryDraft {
            name: self.value(Field::Name).to_string(),
            goal: self.value(Field::Goal).to_string(),
            details: self.value(Field::Details).to_string(),
            target_date: parse_date(self.value(Field::TargetDate))?,
        })
    }

    pub fn progress_draft(&self) -> Result<ProgressDraft> {
        Ok(ProgressDraft {
            label: self.value(Field::Label).to_string(),
            date: parse_date(self.value(Field::Date))?,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    #[test]
    fn focus_wraps_both_ways() {
        let mut form = FormState::progress();
        assert_eq!(form.focused(), Field::Label);
        form.prev_field();
        assert_eq!(form.focused(), Field::Rating);
        form.next_field();
        form.next_field();
        assert_eq!(form.focused(), Field::Date);
    }

    #[test]
    fn typing_goes_to_the_focused_field_only() {
        let mut form = FormState::entry();
        for c in "Run".chars() {
            form.push_char(c);
        }
        form.next_field();
        form.push_char('x');
        form.pop_char();
        assert_eq!(form.value(Field::Name), "Run");
        assert_eq!(form.value(Field::Goal), "");

        while form.focused() != Field::Rating {
            form.next_field();
        }
        form.push_char('7');
        assert!(form.fields().all(|(_, v)| !v.contains('7')));
    }

    #[test]
    fn prefilled_form_round_trips_to_a_draft() {
        let date = NaiveDate::from_ymd_opt(2024, 3, 1).unwrap();
        let entry = Entry::new("Run", "Run 5k", "plan", 6, Some(date));
        let draft = FormState::entry_from(&entry).entry_draft().unwrap();
        assert_eq!(draft, EntryDraft::from_entry(&entry));
    }

    #[test]
    fn bad_dates_surface_as_errors() {
        let mut form = FormState::progress();
        form.next_field();
        for c in "someday".chars() {
            form.push_char(c);
        }
        assert!(form.progress_draft().is_err());

        let blank = FormState::progress().progress_draft().unwrap();
        assert_eq!(blank.date, None);
    }
}
