//! Exponential backoff for rate-limited fetches.
//!
//! [`run_with_backoff`] drives a single fetch through
//! `Pending → {Success | Backoff → Pending | Failed}`. Only HTTP 429 is retried,
//! without an attempt limit; the caller bounds the total time with a deadline.
//! Every other failure short-circuits to an empty result.

use std::{future::Future, time::Duration};

use tokio::time::sleep;

use crate::{
    spotify::{FetchFailure, FetchOutcome},
    types::{FetchTask, ResultItem},
};

/// Shortest delay a policy accepts. A zero delay would never grow and turn a
/// rate-limited task into a busy loop against the upstream.
pub const MIN_DELAY: Duration = Duration::from_millis(100);

/// Delay schedule shared by all tasks of an aggregation. Each task gets its own
/// [`Backoff`] state from it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BackoffPolicy {
    initial: Duration,
    max: Duration,
}

impl BackoffPolicy {
    /// Both delays are raised to at least [`MIN_DELAY`]; `initial` never
    /// exceeds `max`.
    pub fn new(initial: Duration, max: Duration) -> Self {
        let max = max.max(MIN_DELAY);
        Self {
            initial: initial.max(MIN_DELAY).min(max),
            max,
        }
    }

    pub fn initial(&self) -> Duration {
        self.initial
    }

    pub fn max(&self) -> Duration {
        self.max
    }

    pub fn start(&self) -> Backoff {
        Backoff {
            delay: self.initial,
            max: self.max,
        }
    }
}

impl Default for BackoffPolicy {
    fn default() -> Self {
        Self::new(Duration::from_secs(1), Duration::from_secs(60))
    }
}

/// Per-task backoff state.
#[derive(Debug, Clone)]
pub struct Backoff {
    delay: Duration,
    max: Duration,
}

impl Backoff {
    pub fn current(&self) -> Duration {
        self.delay
    }

    /// Doubles the delay, saturating at the policy maximum.
    pub fn advance(&mut self) {
        self.delay = self.delay.saturating_mul(2).min(self.max);
    }

    /// Returns the delay to sleep now and advances the schedule.
    ///
    /// A server `Retry-After` hint can stretch the delay, never past the maximum.
    pub fn next_delay(&mut self, hint: Option<Duration>) -> Duration {
        let base = self.delay;
        self.advance();
        hint.map_or(base, |h| h.max(base)).min(self.max)
    }
}

/// Terminal state of one task. Rate limiting is never terminal.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TaskOutcome {
    Success,
    Failed(FetchFailure),
    TimedOut,
}

#[derive(Debug, Clone, PartialEq)]
pub struct TaskReport {
    pub items: Vec<ResultItem>,
    pub outcome: TaskOutcome,
    /// Number of upstream calls made, including the final one.
    pub attempts: u32,
}

impl TaskReport {
    pub fn timed_out() -> Self {
        Self {
            items: Vec::new(),
            outcome: TaskOutcome::TimedOut,
            attempts: 0,
        }
    }

    pub fn into_items(self) -> Vec<ResultItem> {
        self.items
    }
}

/// Runs `fetch` until it yields items or a non-retryable failure.
///
/// On [`FetchOutcome::RateLimited`] the task sleeps for the current backoff
/// delay (1, 2, 4, ... capped at `policy.max`) and calls `fetch` again. Failures
/// produce an empty item list immediately, with no sleep.
pub async fn run_with_backoff<F, Fut>(
    policy: BackoffPolicy,
    task: &FetchTask,
    mut fetch: F,
) -> TaskReport
where
    F: FnMut() -> Fut,
    Fut: Future<Output = FetchOutcome>,
{
    let mut backoff = policy.start();
    let mut attempts = 0u32;

    loop {
        attempts += 1;
        match fetch().await {
            FetchOutcome::Items(items) => {
                tracing::debug!(%task, attempts, count = items.len(), "fetch succeeded");
                return TaskReport {
                    items,
                    outcome: TaskOutcome::Success,
                    attempts,
                };
            }
            FetchOutcome::RateLimited { retry_after } => {
                let delay = backoff.next_delay(retry_after);
                tracing::warn!(
                    %task,
                    attempt = attempts,
                    delay_secs = delay.as_secs_f64(),
                    "rate limit exceeded, retrying after backoff"
                );
                sleep(delay).await;
            }
            FetchOutcome::Failed(failure) => {
                tracing::error!(%task, attempts, error = %failure, "failed to fetch data");
                return TaskReport {
                    items: Vec::new(),
                    outcome: TaskOutcome::Failed(failure),
                    attempts,
                };
            }
        }
    }
}
