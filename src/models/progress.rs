use crate::models::entry::{Entry, MAX_RATING};

/// Completion percentage shown for an entry: ten times the larger of the
/// base rating and the best progress rating. The latest record does not win,
/// the best one does.
pub fn display_percentage(entry: &Entry) -> u8 {
    10 * entry.base_rating.max(entry.best_progress()).min(MAX_RATING)
}

/// Same value as a 0.0..=1.0 ratio for gauges.
pub fn fill_ratio(entry: &Entry) -> f64 {
    display_percentage(entry) as f64 / 100.0
}
