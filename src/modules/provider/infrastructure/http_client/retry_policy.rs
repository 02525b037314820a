//! Retry policy for provider JSON requests
//!
//! Delays grow linearly per retry rather than exponentially: provider APIs
//! recover quickly or not at all within a single resolution.

use std::time::Duration;

/// Configuration for HTTP retry behavior
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Additional attempts after the first one
    pub max_retries: u32,
    /// Wait before the first retry
    pub base_delay: Duration,
    /// Added to the wait for every further retry
    pub delay_step: Duration,
    /// Maximum delay to wait (prevents excessive waits)
    pub max_delay: Duration,
}

impl RetryPolicy {
    /// 1000ms, 1500ms, 2000ms, ... with two retries
    pub fn standard() -> Self {
        Self {
            max_retries: 2,
            base_delay: Duration::from_millis(1000),
            delay_step: Duration::from_millis(500),
            max_delay: Duration::from_secs(10),
        }
    }

    /// Delay before retry number `retry` (1-based).
    pub fn calculate_delay(&self, retry: u32) -> Duration {
        let steps = retry.saturating_sub(1);
        let delay = self.base_delay + self.delay_step.saturating_mul(steps);
        delay.min(self.max_delay)
    }

    /// Total attempts for a given retry budget
    pub fn total_attempts(max_retries: u32) -> u32 {
        max_retries.saturating_add(1)
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::standard()
    }
}

/// 4xx and 5xx answers never count as usable, whatever the body says.
pub fn is_error_status(status: u16) -> bool {
    (400..600).contains(&status)
}
