//! Errors raised while talking to a model backend.
//!
//! Every failure carries a `retryable` flag that the resilience layer and the
//! orchestrator consult before trying again. Failures that came back from the
//! backend over HTTP also keep the status code they were classified from.
//!
//! ```rust
//! use rprovider::{ProviderError, ProviderErrorKind};
//!
//! let throttled = ProviderError::from_status(429, "slow down");
//! assert_eq!(throttled.kind, ProviderErrorKind::RateLimited);
//! assert_eq!(throttled.status, Some(429));
//! assert!(throttled.retryable);
//!
//! let revoked = ProviderError::authentication("api key revoked");
//! assert!(!revoked.retryable);
//! assert_eq!(revoked.to_string(), "authentication: api key revoked");
//! ```

use std::error::Error;
use std::fmt::{Display, Formatter};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProviderErrorKind {
    Authentication,
    RateLimited,
    InvalidRequest,
    Timeout,
    Transport,
    Unavailable,
    Other,
}

impl ProviderErrorKind {
    /// Stable snake_case label used in logs and metric labels.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Authentication => "authentication",
            Self::RateLimited => "rate_limited",
            Self::InvalidRequest => "invalid_request",
            Self::Timeout => "timeout",
            Self::Transport => "transport",
            Self::Unavailable => "unavailable",
            Self::Other => "other",
        }
    }

    /// Whether a failure of this kind is worth another attempt by default.
    pub fn default_retryable(self) -> bool {
        matches!(
            self,
            Self::RateLimited | Self::Timeout | Self::Transport | Self::Unavailable
        )
    }
}

impl Display for ProviderErrorKind {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProviderError {
    pub kind: ProviderErrorKind,
    pub message: String,
    pub retryable: bool,
    /// HTTP status the error was classified from, when the backend answered.
    pub status: Option<u16>,
}

impl ProviderError {
    pub fn new(kind: ProviderErrorKind, message: impl Into<String>, retryable: bool) -> Self {
        Self {
            kind,
            message: message.into(),
            retryable,
            status: None,
        }
    }

    fn of_kind(kind: ProviderErrorKind, message: impl Into<String>) -> Self {
        Self::new(kind, message, kind.default_retryable())
    }

    pub fn authentication(message: impl Into<String>) -> Self {
        Self::of_kind(ProviderErrorKind::Authentication, message)
    }

    pub fn rate_limited(message: impl Into<String>) -> Self {
        Self::of_kind(ProviderErrorKind::RateLimited, message)
    }

    pub fn invalid_request(message: impl Into<String>) -> Self {
        Self::of_kind(ProviderErrorKind::InvalidRequest, message)
    }

    pub fn timeout(message: impl Into<String>) -> Self {
        Self::of_kind(ProviderErrorKind::Timeout, message)
    }

    pub fn transport(message: impl Into<String>) -> Self {
        Self::of_kind(ProviderErrorKind::Transport, message)
    }

    pub fn unavailable(message: impl Into<String>) -> Self {
        Self::of_kind(ProviderErrorKind::Unavailable, message)
    }

    pub fn other(message: impl Into<String>) -> Self {
        Self::of_kind(ProviderErrorKind::Other, message)
    }

    /// Classifies a non-success HTTP answer from a chat-completions backend.
    ///
    /// Gateways in front of the backend tend to answer 502/503/504 while the
    /// model is warming up, so those map to retryable kinds. Any other 5xx is
    /// treated as an unavailable backend; unrecognised 4xx as a bad request.
    pub fn from_status(status: u16, message: impl Into<String>) -> Self {
        let kind = match status {
            401 | 403 => ProviderErrorKind::Authentication,
            429 => ProviderErrorKind::RateLimited,
            408 | 504 => ProviderErrorKind::Timeout,
            502 | 503 => ProviderErrorKind::Unavailable,
            500..=599 => ProviderErrorKind::Unavailable,
            400..=499 => ProviderErrorKind::InvalidRequest,
            _ => ProviderErrorKind::Transport,
        };

        Self::of_kind(kind, message).with_status(status)
    }

    pub fn with_status(mut self, status: u16) -> Self {
        self.status = Some(status);
        self
    }

    pub fn with_retryable(mut self, retryable: bool) -> Self {
        self.retryable = retryable;
        self
    }

    /// True when the backend rejected the configured credentials.
    pub fn is_credential_failure(&self) -> bool {
        self.kind == ProviderErrorKind::Authentication
    }
}

impl Display for ProviderError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self.status {
            Some(status) => write!(f, "{} (HTTP {status}): {}", self.kind, self.message),
            None => write!(f, "{}: {}", self.kind, self.message),
        }
    }
}

impl Error for ProviderError {}
