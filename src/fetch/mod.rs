//! Concurrent fetch pipeline.
//!
//! - [`retry`] wraps one upstream call with rate-limit backoff
//! - [`aggregate`] fans out one retrying task per (kind, country) and collects
//!   the results, bounded by an overall deadline

pub mod aggregate;
pub mod retry;

pub use aggregate::{AggregatedResult, CountryItems, FanOutAggregator};
pub use retry::{Backoff, BackoffPolicy, MIN_DELAY, TaskOutcome, TaskReport, run_with_backoff};
