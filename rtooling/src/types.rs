//! Tool call requests, execution context and results.

use rcommon::{SessionId, TraceId};
use serde_json::Value;

use crate::{Parameters, ToolError};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ToolExecutionContext {
    pub session_id: SessionId,
    pub trace_id: Option<TraceId>,
}

impl ToolExecutionContext {
    pub fn new(session_id: impl Into<SessionId>) -> Self {
        Self {
            session_id: session_id.into(),
            trace_id: None,
        }
    }

    pub fn with_trace_id(mut self, trace_id: impl Into<TraceId>) -> Self {
        self.trace_id = Some(trace_id.into());
        self
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ToolCallRequest {
    pub tool_name: String,
    pub parameters: Parameters,
    pub call_id: Option<String>,
}

impl ToolCallRequest {
    pub fn new(tool_name: impl Into<String>, parameters: Parameters) -> Self {
        Self {
            tool_name: tool_name.into(),
            parameters,
            call_id: None,
        }
    }

    pub fn with_call_id(mut self, call_id: impl Into<String>) -> Self {
        self.call_id = Some(call_id.into());
        self
    }
}

/// Outcome of a single adapter execution. Failures are values, never panics.
#[derive(Debug, Clone, PartialEq)]
pub enum ToolResult {
    Success(Value),
    Failure(ToolError),
}

impl ToolResult {
    pub fn is_success(&self) -> bool {
        matches!(self, Self::Success(_))
    }

    pub fn is_retryable_failure(&self) -> bool {
        matches!(self, Self::Failure(error) if error.retryable)
    }

    pub fn into_result(self) -> Result<Value, ToolError> {
        match self {
            Self::Success(payload) => Ok(payload),
            Self::Failure(error) => Err(error),
        }
    }
}

impl From<Result<Value, ToolError>> for ToolResult {
    fn from(result: Result<Value, ToolError>) -> Self {
        match result {
            Ok(payload) => Self::Success(payload),
            Err(error) => Self::Failure(error),
        }
    }
}
