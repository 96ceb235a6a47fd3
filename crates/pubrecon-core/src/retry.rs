//! Retry with exponential backoff for literature-source queries

use std::time::Duration;

use crate::source::SourceError;

/// Bounded retry schedule.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Total attempts including the first one
    pub max_attempts: u32,
    /// Delay before the second attempt; doubles for each further attempt
    pub base_delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            base_delay: Duration::from_secs(5),
        }
    }
}

impl RetryPolicy {
    /// Delay after failed attempt number `attempt` (1-based): base * 2^(attempt-1)
    pub fn delay_after(&self, attempt: u32) -> Duration {
        self.base_delay * 2u32.saturating_pow(attempt.saturating_sub(1))
    }
}

/// Retry a fallible query with exponential backoff.
///
/// Non-retryable errors are returned immediately. Returns the last error
/// once `max_attempts` is exhausted.
pub fn retry_with_backoff<T>(
    label: &str,
    policy: &RetryPolicy,
    mut attempt_fn: impl FnMut() -> Result<T, SourceError>,
) -> Result<T, SourceError> {
    let max_attempts = policy.max_attempts.max(1);
    let mut attempt = 1u32;
    loop {
        match attempt_fn() {
            Ok(v) => {
                if attempt > 1 {
                    log::info!("{label}: succeeded on attempt {attempt}/{max_attempts}");
                }
                return Ok(v);
            }
            Err(e) if attempt < max_attempts && e.is_retryable() => {
                let delay = policy.delay_after(attempt);
                log::warn!(
                    "{label}: attempt {attempt}/{max_attempts} failed: {e}, retrying in {delay:?}"
                );
                std::thread::sleep(delay);
                attempt += 1;
            }
            Err(e) => {
                log::error!("{label}: giving up after attempt {attempt}/{max_attempts}: {e}");
                return Err(e);
            }
        }
    }
}
