use anyhow::{anyhow, Result};
use chrono::{Datelike, Duration, NaiveDate};
use unicode_width::{UnicodeWidthChar, UnicodeWidthStr};

/// Accepted input spellings for dates, ISO first.
const DATE_INPUTS: [&str; 3] = ["%Y-%m-%d", "%d/%m/%Y", "%d.%m.%Y"];

/// Parse a user-typed date. Blank input means "no date".
pub fn parse_date(input: &str) -> Result<Option<NaiveDate>> {
    let trimmed = input.trim();
    if trimmed.is_empty() {
        return Ok(None);
    }
    DATE_INPUTS
        .iter()
        .find_map(|fmt| NaiveDate::parse_from_str(trimmed, fmt).ok())
        .map(Some)
        .ok_or_else(|| anyhow!("'{}' is not a date (use YYYY-MM-DD or DD/MM/YYYY)", trimmed))
}

/// Format an optional date, "no date" when unset.
pub fn format_date(date: Option<NaiveDate>, fmt: &str) -> String {
    date.map(|d| d.format(fmt).to_string())
        .unwrap_or_else(|| "no date".to_string())
}

/// "in 3 days", "today", "2 days ago"
pub fn relative_days(target: NaiveDate, today: NaiveDate) -> String {
    match (target - today).num_days() {
        0 => "today".to_string(),
        1 => "tomorrow".to_string(),
        -1 => "yesterday".to_string(),
        n if n > 0 => format!("in {} days", n),
        n => format!("{} days ago", -n),
    }
}

/// Monday to Sunday of the week containing `today`.
pub fn week_of(today: NaiveDate) -> [NaiveDate; 7] {
    let monday = today - Duration::days(today.weekday().num_days_from_monday() as i64);
    std::array::from_fn(|i| monday + Duration::days(i as i64))
}

/// Create a simple ASCII progress bar
pub fn progress_bar(filled: u32, total: u32, width: usize) -> String {
    if total == 0 {
        return "░".repeat(width);
    }
    let ratio = (filled as f64 / total as f64).min(1.0);
    let filled_count = (ratio * width as f64).round() as usize;
    let empty_count = width.saturating_sub(filled_count);
    format!("{}{}", "█".repeat(filled_count), "░".repeat(empty_count))
}

/// Cut `text` to at most `width` terminal columns, marking the cut with `…`.
pub fn truncate_to_width(text: &str, width: usize) -> String {
    if text.width() <= width {
        return text.to_string();
    }
    if width == 0 {
        return String::new();
    }
    let mut out = String::new();
    let mut used = 0;
    for c in text.chars() {
        let w = c.width().unwrap_or(0);
        if used + w > width - 1 {
            break;
        }
        out.push(c);
        used += w;
    }
    out.push('…');
    out
}
