//! Dispatch server configuration.
//!
//! ```rust
//! use std::time::Duration;
//! use rcommon::RetryPolicy;
//! use rdispatch::DispatchConfig;
//!
//! let config = DispatchConfig::default()
//!     .with_call_timeout(Duration::from_secs(5))
//!     .with_retry(RetryPolicy::new(3));
//! assert_eq!(config.call_timeout, Duration::from_secs(5));
//! assert_eq!(config.retry.max_attempts, 3);
//! ```

use std::time::Duration;

use rcommon::RetryPolicy;

#[derive(Debug, Clone, PartialEq)]
pub struct DispatchConfig {
    /// Deadline for one adapter execution attempt.
    pub call_timeout: Duration,
    /// Applied to failures the adapter marks retryable. Defaults to a single attempt.
    pub retry: RetryPolicy,
}

impl Default for DispatchConfig {
    fn default() -> Self {
        Self {
            call_timeout: Duration::from_secs(30),
            retry: RetryPolicy::no_retry(),
        }
    }
}

impl DispatchConfig {
    pub fn with_call_timeout(mut self, call_timeout: Duration) -> Self {
        self.call_timeout = call_timeout;
        self
    }

    pub fn with_retry(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }
}
