use std::time::Duration;
use tracing::{debug, warn};

use crate::config::timing;

/// Configuration for retry behavior of a copy attempt
#[derive(Debug, Clone)]
pub struct RetryPolicy {
    /// Maximum number of retries after the first attempt
    pub max_retries: u32,
    /// Fixed delay before each retry
    pub delay: Duration,
}

/// What to do after a copy attempt failed with both strategies.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RetryDecision {
    /// Schedule retry number `retry` after `delay`.
    RetryAfter { retry: u32, delay: Duration },
    /// The retry budget is exhausted; settle as failed.
    GiveUp,
}

impl RetryPolicy {
    /// Create a new retry policy with a fixed back-off
    pub fn new(max_retries: u32, delay: Duration) -> Self {
        Self { max_retries, delay }
    }

    /// Preset: clipboard copy retries (3 retries, fixed 800ms back-off)
    pub fn clipboard() -> Self {
        Self::new(timing::MAX_RETRIES, timing::DEFAULT_RETRY_DELAY)
    }

    /// Calculate the delay before a given retry (1-indexed; 0 means the first attempt)
    pub fn delay_for_retry(&self, retry: u32) -> Duration {
        if retry == 0 {
            Duration::ZERO
        } else {
            self.delay
        }
    }

    /// Decide whether a failed attempt that already used `retries_used`
    /// retries may be retried again.
    pub fn decide(&self, retries_used: u32) -> RetryDecision {
        if retries_used < self.max_retries {
            let retry = retries_used + 1;
            let delay = self.delay_for_retry(retry);
            debug!(
                "Copy retry {}/{} scheduled after {:?}",
                retry, self.max_retries, delay
            );
            RetryDecision::RetryAfter { retry, delay }
        } else {
            warn!(
                "All {} copy attempts failed, giving up",
                self.max_retries + 1
            );
            RetryDecision::GiveUp
        }
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::clipboard()
    }
}
