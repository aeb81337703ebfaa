//! Error types shared by the calculator harness.

use chrono::NaiveDate;
use thiserror::Error;

/// A problem found by [`crate::calculator::validate_inputs`].
///
/// None of these stop a report from being computed; they flag values that
/// will produce implausible numbers.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum InputIssue {
    #[error("physical progress {value}% is outside 0-100")]
    ProgressOutOfRange { value: f64 },

    #[error("total budget is negative: {value}")]
    NegativeBudget { value: f64 },

    #[error("amount spent is negative: {value}")]
    NegativeSpend { value: f64 },

    #[error("planned duration must be positive, got {months} months")]
    NonPositiveDuration { months: i32 },

    #[error("start date {start} is after evaluation date {as_of}")]
    StartInFuture { start: NaiveDate, as_of: NaiveDate },
}

#[derive(Error, Debug)]
pub enum SnapshotError {
    #[error("snapshot file I/O failed: {0}")]
    Io(#[from] std::io::Error),

    #[error("snapshot file is not valid JSON: {0}")]
    Json(#[from] serde_json::Error),
}
