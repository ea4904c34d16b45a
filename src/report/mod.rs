//! Result aggregation and failure evidence.
//!
//! Verdicts from the validator are folded into pass/fail counters, and a
//! bounded number of failing frames are deep-copied for later diagnosis.

mod aggregator;
mod snapshot;

pub use aggregator::{Report, ResultAggregator, DEFAULT_SNAPSHOT_CAP};
pub use snapshot::FailureSnapshot;
