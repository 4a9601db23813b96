//! Tool failure taxonomy and registry errors.

use std::error::Error;
use std::fmt::{Display, Formatter};

use serde::{Deserialize, Serialize};

/// Failure kinds a tool call can end in. Serialized names are the wire codes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ToolErrorKind {
    UnknownTool,
    InvalidParameters,
    NotFound,
    Unauthorized,
    Timeout,
    #[serde(rename = "InternalError")]
    Internal,
}

impl ToolErrorKind {
    pub fn code(&self) -> &'static str {
        match self {
            Self::UnknownTool => "UnknownTool",
            Self::InvalidParameters => "InvalidParameters",
            Self::NotFound => "NotFound",
            Self::Unauthorized => "Unauthorized",
            Self::Timeout => "Timeout",
            Self::Internal => "InternalError",
        }
    }
}

impl Display for ToolErrorKind {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.code())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ToolError {
    pub kind: ToolErrorKind,
    pub message: String,
    pub retryable: bool,
    pub violations: Vec<String>,
    pub tool_name: Option<String>,
    pub tool_call_id: Option<String>,
}

impl ToolError {
    pub fn new(kind: ToolErrorKind, message: impl Into<String>, retryable: bool) -> Self {
        Self {
            kind,
            message: message.into(),
            retryable,
            violations: Vec::new(),
            tool_name: None,
            tool_call_id: None,
        }
    }

    pub fn unknown_tool(name: &str) -> Self {
        Self::new(
            ToolErrorKind::UnknownTool,
            format!("tool '{name}' is not registered"),
            false,
        )
        .with_tool_name(name)
    }

    pub fn invalid_parameters(message: impl Into<String>) -> Self {
        Self::new(ToolErrorKind::InvalidParameters, message, false)
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        Self::new(ToolErrorKind::NotFound, message, false)
    }

    pub fn unauthorized(message: impl Into<String>) -> Self {
        Self::new(ToolErrorKind::Unauthorized, message, false)
    }

    pub fn timeout(message: impl Into<String>) -> Self {
        Self::new(ToolErrorKind::Timeout, message, true)
    }

    pub fn internal(message: impl Into<String>) -> Self {
        Self::new(ToolErrorKind::Internal, message, false)
    }

    pub fn with_tool_name(mut self, tool_name: impl Into<String>) -> Self {
        self.tool_name = Some(tool_name.into());
        self
    }

    pub fn with_tool_call_id(mut self, tool_call_id: impl Into<String>) -> Self {
        self.tool_call_id = Some(tool_call_id.into());
        self
    }

    pub fn with_violations(mut self, violations: Vec<String>) -> Self {
        self.violations = violations;
        self
    }

    pub fn with_retryable(mut self, retryable: bool) -> Self {
        self.retryable = retryable;
        self
    }

    pub fn is_retryable(&self) -> bool {
        self.retryable
    }

    pub fn is_user_error(&self) -> bool {
        matches!(
            self.kind,
            ToolErrorKind::UnknownTool
                | ToolErrorKind::InvalidParameters
                | ToolErrorKind::NotFound
                | ToolErrorKind::Unauthorized
        )
    }
}

impl Display for ToolError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match (&self.tool_name, &self.tool_call_id) {
            (Some(tool_name), Some(tool_call_id)) => write!(
                f,
                "{} [tool={}, call_id={}]: {}",
                self.kind, tool_name, tool_call_id, self.message
            ),
            (Some(tool_name), None) => {
                write!(f, "{} [tool={}]: {}", self.kind, tool_name, self.message)
            }
            _ => write!(f, "{}: {}", self.kind, self.message),
        }
    }
}

impl Error for ToolError {}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RegistryErrorKind {
    DuplicateTool,
    UnknownTool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RegistryError {
    pub kind: RegistryErrorKind,
    pub name: String,
}

impl RegistryError {
    pub fn duplicate(name: impl Into<String>) -> Self {
        Self {
            kind: RegistryErrorKind::DuplicateTool,
            name: name.into(),
        }
    }

    pub fn unknown(name: impl Into<String>) -> Self {
        Self {
            kind: RegistryErrorKind::UnknownTool,
            name: name.into(),
        }
    }
}

impl Display for RegistryError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self.kind {
            RegistryErrorKind::DuplicateTool => {
                write!(f, "tool '{}' is already registered", self.name)
            }
            RegistryErrorKind::UnknownTool => write!(f, "tool '{}' is not registered", self.name),
        }
    }
}

impl Error for RegistryError {}

impl From<RegistryError> for ToolError {
    fn from(error: RegistryError) -> Self {
        match error.kind {
            RegistryErrorKind::UnknownTool => ToolError::unknown_tool(&error.name),
            RegistryErrorKind::DuplicateTool => {
                ToolError::internal(error.to_string()).with_tool_name(error.name)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn helper_methods_report_retryable_and_user_error() {
        let timeout = ToolError::timeout("slow");
        assert!(timeout.is_retryable());
        assert!(!timeout.is_user_error());

        let invalid = ToolError::invalid_parameters("bad args");
        assert!(!invalid.is_retryable());
        assert!(invalid.is_user_error());
    }

    #[test]
    fn context_fields_are_included_in_display() {
        let error = ToolError::not_found("missing")
            .with_tool_name("get_email_full")
            .with_tool_call_id("call_1");

        let rendered = error.to_string();
        assert!(rendered.starts_with("NotFound"));
        assert!(rendered.contains("get_email_full"));
        assert!(rendered.contains("call_1"));
    }

    #[test]
    fn internal_kind_uses_internal_error_wire_code() {
        assert_eq!(ToolErrorKind::Internal.code(), "InternalError");
        assert_eq!(
            serde_json::to_value(ToolErrorKind::Internal).expect("serialize"),
            serde_json::json!("InternalError")
        );
    }

    #[test]
    fn unknown_registry_error_converts_to_unknown_tool() {
        let error: ToolError = RegistryError::unknown("nope").into();
        assert_eq!(error.kind, ToolErrorKind::UnknownTool);
        assert_eq!(error.tool_name.as_deref(), Some("nope"));
    }
}
