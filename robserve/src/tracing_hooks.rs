//! Tracing-based hooks for provider, tool dispatch and session events.
//!
//! ```rust
//! use rchat::OrchestrationHooks;
//! use robserve::TracingObservabilityHooks;
//!
//! fn accepts_session_hooks(_hooks: &dyn OrchestrationHooks) {}
//!
//! let hooks = TracingObservabilityHooks;
//! accepts_session_hooks(&hooks);
//! ```

use std::time::Duration;

use rchat::{Decision, OrchestrationError, OrchestrationHooks, SessionState};
use rcommon::SessionId;
use rprovider::{ProviderError, ProviderId, ProviderOperationHooks};
use rtooling::{ToolCallRequest, ToolError, ToolExecutionContext, ToolRuntimeHooks};
use serde_json::Value;

#[derive(Debug, Clone, Copy, Default)]
pub struct TracingObservabilityHooks;

impl ProviderOperationHooks for TracingObservabilityHooks {
    fn on_attempt_start(&self, provider: ProviderId, operation: &str, attempt: u32) {
        tracing::info!(
            phase = "provider",
            event = "attempt_start",
            provider = %provider,
            operation,
            attempt
        );
    }

    fn on_retry_scheduled(
        &self,
        provider: ProviderId,
        operation: &str,
        attempt: u32,
        delay: Duration,
        error: &ProviderError,
    ) {
        tracing::warn!(
            phase = "provider",
            event = "retry_scheduled",
            provider = %provider,
            operation,
            attempt,
            delay_ms = delay.as_millis() as u64,
            error_kind = %error.kind,
            retryable = error.retryable,
            error = %error
        );
    }

    fn on_success(&self, provider: ProviderId, operation: &str, attempts: u32) {
        tracing::info!(
            phase = "provider",
            event = "success",
            provider = %provider,
            operation,
            attempts
        );
    }

    fn on_failure(
        &self,
        provider: ProviderId,
        operation: &str,
        attempts: u32,
        error: &ProviderError,
    ) {
        tracing::error!(
            phase = "provider",
            event = "failure",
            provider = %provider,
            operation,
            attempts,
            error_kind = %error.kind,
            retryable = error.retryable,
            error = %error
        );
    }
}

impl ToolRuntimeHooks for TracingObservabilityHooks {
    fn on_call_rejected(
        &self,
        request: &ToolCallRequest,
        context: &ToolExecutionContext,
        error: &ToolError,
    ) {
        tracing::warn!(
            phase = "tool",
            event = "call_rejected",
            tool_name = request.tool_name,
            tool_call_id = request.call_id.as_deref(),
            session_id = %context.session_id,
            error_kind = %error.kind,
            violations = error.violations.len(),
            error = %error
        );
    }

    fn on_execution_start(&self, request: &ToolCallRequest, context: &ToolExecutionContext) {
        tracing::info!(
            phase = "tool",
            event = "execution_start",
            tool_name = request.tool_name,
            tool_call_id = request.call_id.as_deref(),
            session_id = %context.session_id,
            trace_id = context.trace_id.as_ref().map(|id| id.as_str())
        );
    }

    fn on_execution_success(
        &self,
        request: &ToolCallRequest,
        context: &ToolExecutionContext,
        _payload: &Value,
        elapsed: Duration,
    ) {
        tracing::info!(
            phase = "tool",
            event = "execution_success",
            tool_name = request.tool_name,
            tool_call_id = request.call_id.as_deref(),
            session_id = %context.session_id,
            trace_id = context.trace_id.as_ref().map(|id| id.as_str()),
            elapsed_ms = elapsed.as_millis() as u64
        );
    }

    fn on_execution_failure(
        &self,
        request: &ToolCallRequest,
        context: &ToolExecutionContext,
        error: &ToolError,
        elapsed: Duration,
    ) {
        // Caller mistakes are routine; only resource and runtime faults are errors.
        if error.is_user_error() {
            tracing::warn!(
                phase = "tool",
                event = "execution_rejected",
                tool_name = request.tool_name,
                tool_call_id = request.call_id.as_deref(),
                session_id = %context.session_id,
                error_kind = %error.kind,
                error = %error
            );
            return;
        }

        tracing::error!(
            phase = "tool",
            event = "execution_failure",
            tool_name = request.tool_name,
            tool_call_id = request.call_id.as_deref(),
            session_id = %context.session_id,
            trace_id = context.trace_id.as_ref().map(|id| id.as_str()),
            elapsed_ms = elapsed.as_millis() as u64,
            error_kind = %error.kind,
            retryable = error.retryable,
            error = %error
        );
    }
}

impl OrchestrationHooks for TracingObservabilityHooks {
    fn on_session_start(&self, session_id: &SessionId, query: &str) {
        tracing::info!(
            phase = "session",
            event = "start",
            session_id = %session_id,
            query_chars = query.chars().count()
        );
    }

    fn on_state_change(&self, session_id: &SessionId, from: SessionState, to: SessionState) {
        tracing::debug!(
            phase = "session",
            event = "state_change",
            session_id = %session_id,
            from = %from,
            to = %to
        );
    }

    fn on_decision(&self, session_id: &SessionId, decision: &Decision) {
        tracing::info!(
            phase = "session",
            event = "decision",
            session_id = %session_id,
            tool_name = decision.tool_name(),
            direct_answer = decision.tool_name().is_none()
        );
    }

    fn on_protocol_retry(&self, session_id: &SessionId, attempt: u32, error: &OrchestrationError) {
        tracing::warn!(
            phase = "session",
            event = "protocol_retry",
            session_id = %session_id,
            attempt,
            error = %error
        );
    }

    fn on_session_complete(&self, session_id: &SessionId, tool_calls: u32, elapsed: Duration) {
        tracing::info!(
            phase = "session",
            event = "complete",
            session_id = %session_id,
            tool_calls,
            elapsed_ms = elapsed.as_millis() as u64
        );
    }

    fn on_session_failure(
        &self,
        session_id: &SessionId,
        error: &OrchestrationError,
        elapsed: Duration,
    ) {
        tracing::error!(
            phase = "session",
            event = "failure",
            session_id = %session_id,
            error_kind = ?error.kind,
            state = %error.state,
            elapsed_ms = elapsed.as_millis() as u64,
            error = %error
        );
    }
}
