//! Retry policy with exponential backoff.
//!
//! Attempts are 1-based: the first execution is attempt 1, and a retry is
//! allowed while `attempt < max_attempts`. The delay before attempt N+1 is
//! `base_delay * 2^(N-1)`, capped at `max_delay`; a vendor-supplied
//! rate-limit hint overrides the computed delay (still capped).

use std::time::Duration;

/// Bounded-retry configuration for the dispatcher.
#[derive(Debug, Clone)]
pub struct RetryPolicy {
    /// Total send attempts, including the first (not just retries).
    pub max_attempts: u32,
    /// Delay before the first retry.
    pub base_delay: Duration,
    /// Upper bound on any single backoff delay.
    pub max_delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            base_delay: Duration::from_millis(500),
            max_delay: Duration::from_secs(8),
        }
    }
}

impl RetryPolicy {
    /// Whether another attempt may follow the given (1-based) failed attempt.
    pub fn should_retry(&self, attempt: u32) -> bool {
        attempt < self.max_attempts
    }

    /// Backoff delay to sleep after the given (1-based) failed attempt.
    ///
    /// `retry_after_ms` is the vendor's rate-limit hint; when present it
    /// replaces the exponential delay, capped at `max_delay`.
    pub fn delay_for(&self, attempt: u32, retry_after_ms: Option<u64>) -> Duration {
        if let Some(hint_ms) = retry_after_ms {
            return Duration::from_millis(hint_ms).min(self.max_delay);
        }

        let exponent = attempt.saturating_sub(1).min(16);
        let delay = self.base_delay.saturating_mul(1 << exponent);
        delay.min(self.max_delay)
    }
}
