pub mod entry;
pub mod progress;
pub mod rating;

pub use entry::{Entry, ProgressRecord, MAX_RATING};
pub use progress::{display_percentage, fill_ratio};
pub use rating::{RatingChanged, RatingSelector};
