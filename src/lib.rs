//! Performance metrics for construction projects: how physical progress
//! compares with money spent and time elapsed, with status bands and
//! cost/schedule projections.

pub mod calculator;
pub mod config;
pub mod error;
pub mod ledger;
pub mod loader;
pub mod output;
pub mod reports;
pub mod snapshot;
pub mod types;
pub mod util;

pub use calculator::{
    classify_status, compute_performance_report, describe_financial_performance,
    describe_schedule_performance, validate_inputs,
};
pub use error::{InputIssue, SnapshotError};
pub use snapshot::{SnapshotStore, StoredReport};
pub use types::{PerformanceReport, ProgressSnapshot, Status};
