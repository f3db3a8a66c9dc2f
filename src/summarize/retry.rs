//! Retry timing for rate-limited providers.

use crate::config::RetrySettings;
use std::time::Duration;

/// How many times to try and how long to wait in between.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Total attempts including the first.
    pub max_attempts: u32,
    /// Multiplied by the 1-based attempt number after a 429 without `Retry-After`.
    pub base_delay: Duration,
    /// Fixed wait after a transport error.
    pub error_delay: Duration,
}

impl RetryPolicy {
    /// Wait after a 429 on the zero-based `attempt`.
    ///
    /// The server's `Retry-After` wins, otherwise 5 s, 10 s, 15 s with the defaults.
    pub fn rate_limit_delay(&self, attempt: u32, retry_after: Option<Duration>) -> Duration {
        retry_after.unwrap_or_else(|| self.base_delay * (attempt + 1))
    }

    /// Whether another attempt follows the zero-based `attempt`.
    pub fn has_next(&self, attempt: u32) -> bool {
        attempt + 1 < self.max_attempts
    }
}

impl From<&RetrySettings> for RetryPolicy {
    fn from(settings: &RetrySettings) -> Self {
        Self {
            max_attempts: settings.max_attempts.max(1),
            base_delay: Duration::from_millis(settings.base_delay_ms),
            error_delay: Duration::from_millis(settings.error_delay_ms),
        }
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::from(&RetrySettings::default())
    }
}
