use std::io;

use thiserror::Error;

use crate::store::SlotIndex;

pub type CoreResult<T> = std::result::Result<T, CoreError>;

/// Failures raised by the tracker core. Application edges wrap these in
/// `anyhow` with context.
#[derive(Debug, Error)]
pub enum CoreError {
    #[error("cannot add more entries: all {capacity} slots are in use")]
    NoCapacity { capacity: usize },

    #[error("storage failure at {location}: {source}")]
    Io {
        location: String,
        #[source]
        source: io::Error,
    },

    #[error("could not encode entries: {0}")]
    Encode(#[source] serde_json::Error),

    #[error("stored entries at {location} are unreadable: {source}")]
    Corrupt {
        location: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("not overwriting {location}: it could not be read and no copy of it could be kept")]
    Unreadable { location: String },

    #[error("another save or load is still running")]
    Busy,

    #[error(transparent)]
    Validation(#[from] ValidationFailure),

    #[error("'{action}' is not available on the {screen} screen")]
    InvalidTransition {
        screen: &'static str,
        action: &'static str,
    },

    #[error("slot {0} holds no entry")]
    EmptySlot(SlotIndex),
}

/// A form gating rule that was not satisfied. Blocks the save transition.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationFailure {
    #[error("{0} must not be empty")]
    MissingField(&'static str),

    #[error("pick a rating first")]
    MissingRating,
}
