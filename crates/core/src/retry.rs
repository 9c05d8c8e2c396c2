//! Submission retry and pacing policy.
//!
//! Rate-limited submissions are retried with a linearly growing wait
//! (`retry_wait_base * attempt`); any other failure abandons the row. A
//! fixed pacing delay separates consecutive rows regardless of outcome.

use std::time::Duration;

/// Default number of attempts per row.
pub const DEFAULT_MAX_ATTEMPTS: u32 = 3;

/// Default base wait after a rate-limited attempt.
pub const DEFAULT_RETRY_WAIT_BASE: Duration = Duration::from_secs(10);

/// Default delay between consecutive rows.
pub const DEFAULT_REQUEST_INTERVAL: Duration = Duration::from_secs(20);

/// Tunable parameters for the submission loop.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Attempts per row, including the first.
    pub max_attempts: u32,
    /// Wait after rate-limited attempt `n` is `retry_wait_base * n`.
    pub retry_wait_base: Duration,
    /// Delay inserted between rows (never after the last one).
    pub request_interval: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: DEFAULT_MAX_ATTEMPTS,
            retry_wait_base: DEFAULT_RETRY_WAIT_BASE,
            request_interval: DEFAULT_REQUEST_INTERVAL,
        }
    }
}

impl RetryPolicy {
    /// Wait before retrying after rate-limited attempt `attempt` (1-based),
    /// or `None` when that attempt was the last one allowed.
    pub fn rate_limit_wait(&self, attempt: u32) -> Option<Duration> {
        if attempt >= self.max_attempts {
            return None;
        }
        Some(self.retry_wait_base * attempt)
    }

    /// Pacing delay after row `index` (0-based) of `total` rows.
    pub fn pacing_after(&self, index: usize, total: usize) -> Option<Duration> {
        (index + 1 < total).then_some(self.request_interval)
    }
}

/// Whether an error message looks like a rate-limit rejection.
pub fn is_rate_limit_message(message: &str) -> bool {
    message.contains("429") || message.to_lowercase().contains("rate limit")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn waits_grow_linearly() {
        let policy = RetryPolicy::default();
        assert_eq!(policy.rate_limit_wait(1), Some(Duration::from_secs(10)));
        assert_eq!(policy.rate_limit_wait(2), Some(Duration::from_secs(20)));
    }

    #[test]
    fn no_wait_after_final_attempt() {
        let policy = RetryPolicy::default();
        assert_eq!(policy.rate_limit_wait(3), None);
        assert_eq!(policy.rate_limit_wait(4), None);
    }

    #[test]
    fn single_attempt_never_waits() {
        let policy = RetryPolicy {
            max_attempts: 1,
            ..Default::default()
        };
        assert_eq!(policy.rate_limit_wait(1), None);
    }

    #[test]
    fn pacing_skips_last_row() {
        let policy = RetryPolicy::default();
        assert_eq!(policy.pacing_after(0, 3), Some(Duration::from_secs(20)));
        assert_eq!(policy.pacing_after(1, 3), Some(Duration::from_secs(20)));
        assert_eq!(policy.pacing_after(2, 3), None);
        assert_eq!(policy.pacing_after(0, 1), None);
    }

    #[test]
    fn rate_limit_messages() {
        assert!(is_rate_limit_message("API returned HTTP 429"));
        assert!(is_rate_limit_message("Rate limit exceeded"));
        assert!(is_rate_limit_message("rate limit"));
        assert!(!is_rate_limit_message("model not loaded"));
    }
}
