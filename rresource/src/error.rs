//! Resource-level error kinds.
//!
//! ```rust
//! use rresource::{ResourceError, ResourceErrorKind};
//!
//! let error = ResourceError::rate_limited("quota exceeded");
//! assert_eq!(error.kind, ResourceErrorKind::RateLimited);
//! assert!(error.retryable);
//! ```

use std::error::Error;
use std::fmt::{Display, Formatter};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResourceErrorKind {
    NotFound,
    Unauthorized,
    RateLimited,
    Unavailable,
    Timeout,
    Malformed,
    Other,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResourceError {
    pub kind: ResourceErrorKind,
    pub message: String,
    pub retryable: bool,
}

impl ResourceError {
    pub fn new(kind: ResourceErrorKind, message: impl Into<String>, retryable: bool) -> Self {
        Self {
            kind,
            message: message.into(),
            retryable,
        }
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        Self::new(ResourceErrorKind::NotFound, message, false)
    }

    pub fn unauthorized(message: impl Into<String>) -> Self {
        Self::new(ResourceErrorKind::Unauthorized, message, false)
    }

    pub fn rate_limited(message: impl Into<String>) -> Self {
        Self::new(ResourceErrorKind::RateLimited, message, true)
    }

    pub fn unavailable(message: impl Into<String>) -> Self {
        Self::new(ResourceErrorKind::Unavailable, message, true)
    }

    pub fn timeout(message: impl Into<String>) -> Self {
        Self::new(ResourceErrorKind::Timeout, message, true)
    }

    pub fn malformed(message: impl Into<String>) -> Self {
        Self::new(ResourceErrorKind::Malformed, message, false)
    }

    pub fn other(message: impl Into<String>) -> Self {
        Self::new(ResourceErrorKind::Other, message, false)
    }
}

impl Display for ResourceError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:?}: {}", self.kind, self.message)
    }
}

impl Error for ResourceError {}
