//! Uniform response envelope returned for every tool call.
//!
//! ```rust
//! use rtooling::{Envelope, ToolError};
//! use serde_json::json;
//!
//! let ok = Envelope::success(json!({"count": 120}));
//! assert_eq!(
//!     serde_json::to_value(&ok).expect("serialize"),
//!     json!({"status": "ok", "data": {"count": 120}})
//! );
//!
//! let error = Envelope::from(ToolError::not_found("message 'x' not found"));
//! assert_eq!(
//!     serde_json::to_value(&error).expect("serialize")["error"]["kind"],
//!     json!("NotFound")
//! );
//! ```

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::{ToolError, ToolErrorKind, ToolResult};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ErrorDetail {
    pub kind: ToolErrorKind,
    pub message: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub violations: Vec<String>,
    #[serde(default)]
    pub retryable: bool,
}

impl From<&ToolError> for ErrorDetail {
    fn from(error: &ToolError) -> Self {
        Self {
            kind: error.kind,
            message: error.message.clone(),
            violations: error.violations.clone(),
            retryable: error.retryable,
        }
    }
}

impl From<ErrorDetail> for ToolError {
    fn from(detail: ErrorDetail) -> Self {
        ToolError::new(detail.kind, detail.message, detail.retryable)
            .with_violations(detail.violations)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "status")]
pub enum Envelope {
    #[serde(rename = "ok")]
    Success { data: Value },
    #[serde(rename = "error")]
    Failure { error: ErrorDetail },
}

impl Envelope {
    pub fn success(data: Value) -> Self {
        Self::Success { data }
    }

    pub fn failure(error: ErrorDetail) -> Self {
        Self::Failure { error }
    }

    pub fn is_ok(&self) -> bool {
        matches!(self, Self::Success { .. })
    }

    pub fn data(&self) -> Option<&Value> {
        match self {
            Self::Success { data } => Some(data),
            Self::Failure { .. } => None,
        }
    }

    pub fn error(&self) -> Option<&ErrorDetail> {
        match self {
            Self::Success { .. } => None,
            Self::Failure { error } => Some(error),
        }
    }

    pub fn error_kind(&self) -> Option<ToolErrorKind> {
        self.error().map(|detail| detail.kind)
    }

    pub fn to_json(&self) -> Value {
        serde_json::to_value(self).unwrap_or(Value::Null)
    }

    pub fn to_pretty_json(&self) -> String {
        serde_json::to_string_pretty(self).unwrap_or_else(|_| self.to_json().to_string())
    }
}

impl From<ToolResult> for Envelope {
    fn from(result: ToolResult) -> Self {
        match result {
            ToolResult::Success(data) => Self::success(data),
            ToolResult::Failure(error) => Self::from(error),
        }
    }
}

impl From<ToolError> for Envelope {
    fn from(error: ToolError) -> Self {
        Self::failure(ErrorDetail::from(&error))
    }
}
