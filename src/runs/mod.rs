//! The test-run registry: every known run, the active filters, the selection and batch re-runs
mod batch;
mod error;
mod filter;
mod record;
mod registry;
mod source;

pub use batch::execute_batch;
pub use error::{MergeError, RunError, RunSourceError};
pub use filter::{apply_filters, sort_runs, FilterDimension, FilterSet};
pub use record::{Recency, RunStatus, TestRun, JUST_UPDATED};
pub use registry::{BatchOutcome, RunRegistry, RunStats, Selected};
pub use source::{FileRunSource, HttpRunSource, RunSource, UnconfiguredRunSource};

/// Timeframes the dashboard offers, the first one is loaded on start
pub const TIMEFRAMES: [&str; 4] = ["today", "week", "month", "all"];
