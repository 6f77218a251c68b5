//! Retry policy for peer connection attempts

use std::time::Duration;

/// Bounded retry with linear backoff
///
/// The initial attempt runs immediately; retry `n` (1-based) waits
/// `backoff_step * n` before building a fresh peer connection.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    pub max_retries: u32,
    pub backoff_step: Duration,
}

impl RetryPolicy {
    /// Backoff before the given retry attempt (1-based)
    pub fn delay_for(&self, attempt: u32) -> Duration {
        self.backoff_step * attempt
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_retries: 3,
            backoff_step: Duration::from_secs(2),
        }
    }
}
