//! Metrics-based hooks. Every series is prefixed `toolrelay_`.
//!
//! ```rust
//! use robserve::MetricsObservabilityHooks;
//! use rtooling::ToolRuntimeHooks;
//!
//! fn accepts_tool_hooks(_hooks: &dyn ToolRuntimeHooks) {}
//!
//! let hooks = MetricsObservabilityHooks;
//! accepts_tool_hooks(&hooks);
//! ```

use std::time::Duration;

use rchat::{Decision, OrchestrationError, OrchestrationHooks, SessionState};
use rcommon::SessionId;
use rprovider::{ProviderError, ProviderId, ProviderOperationHooks};
use rtooling::{ToolCallRequest, ToolError, ToolExecutionContext, ToolRuntimeHooks};
use serde_json::Value;

#[derive(Debug, Clone, Copy, Default)]
pub struct MetricsObservabilityHooks;

impl ProviderOperationHooks for MetricsObservabilityHooks {
    fn on_attempt_start(&self, provider: ProviderId, operation: &str, _attempt: u32) {
        metrics::counter!(
            "toolrelay_provider_attempt_start_total",
            "provider" => provider.to_string(),
            "operation" => operation.to_string()
        )
        .increment(1);
    }

    fn on_retry_scheduled(
        &self,
        provider: ProviderId,
        operation: &str,
        _attempt: u32,
        delay: Duration,
        error: &ProviderError,
    ) {
        metrics::counter!(
            "toolrelay_provider_retry_scheduled_total",
            "provider" => provider.to_string(),
            "operation" => operation.to_string(),
            "error_kind" => error.kind.as_str()
        )
        .increment(1);
        metrics::histogram!(
            "toolrelay_provider_retry_delay_seconds",
            "provider" => provider.to_string(),
            "operation" => operation.to_string()
        )
        .record(delay.as_secs_f64());
    }

    fn on_success(&self, provider: ProviderId, operation: &str, attempts: u32) {
        metrics::counter!(
            "toolrelay_provider_success_total",
            "provider" => provider.to_string(),
            "operation" => operation.to_string()
        )
        .increment(1);
        metrics::histogram!(
            "toolrelay_provider_attempts_per_success",
            "provider" => provider.to_string(),
            "operation" => operation.to_string()
        )
        .record(attempts as f64);
    }

    fn on_failure(
        &self,
        provider: ProviderId,
        operation: &str,
        attempts: u32,
        error: &ProviderError,
    ) {
        metrics::counter!(
            "toolrelay_provider_failure_total",
            "provider" => provider.to_string(),
            "operation" => operation.to_string(),
            "error_kind" => error.kind.as_str()
        )
        .increment(1);
        metrics::histogram!(
            "toolrelay_provider_attempts_per_failure",
            "provider" => provider.to_string(),
            "operation" => operation.to_string()
        )
        .record(attempts as f64);
    }
}

impl ToolRuntimeHooks for MetricsObservabilityHooks {
    fn on_call_rejected(
        &self,
        request: &ToolCallRequest,
        _context: &ToolExecutionContext,
        error: &ToolError,
    ) {
        metrics::counter!(
            "toolrelay_tool_call_rejected_total",
            "tool_name" => request.tool_name.clone(),
            "error_kind" => error.kind.code()
        )
        .increment(1);
    }

    fn on_execution_start(&self, request: &ToolCallRequest, _context: &ToolExecutionContext) {
        metrics::counter!(
            "toolrelay_tool_execution_start_total",
            "tool_name" => request.tool_name.clone()
        )
        .increment(1);
    }

    fn on_execution_success(
        &self,
        request: &ToolCallRequest,
        _context: &ToolExecutionContext,
        _payload: &Value,
        elapsed: Duration,
    ) {
        metrics::counter!(
            "toolrelay_tool_execution_success_total",
            "tool_name" => request.tool_name.clone()
        )
        .increment(1);
        metrics::histogram!(
            "toolrelay_tool_execution_duration_seconds",
            "tool_name" => request.tool_name.clone(),
            "status" => "success"
        )
        .record(elapsed.as_secs_f64());
    }

    fn on_execution_failure(
        &self,
        request: &ToolCallRequest,
        _context: &ToolExecutionContext,
        error: &ToolError,
        elapsed: Duration,
    ) {
        metrics::counter!(
            "toolrelay_tool_execution_failure_total",
            "tool_name" => request.tool_name.clone(),
            "error_kind" => error.kind.code()
        )
        .increment(1);
        metrics::histogram!(
            "toolrelay_tool_execution_duration_seconds",
            "tool_name" => request.tool_name.clone(),
            "status" => "failure"
        )
        .record(elapsed.as_secs_f64());
    }
}

impl OrchestrationHooks for MetricsObservabilityHooks {
    fn on_session_start(&self, _session_id: &SessionId, _query: &str) {
        metrics::counter!("toolrelay_session_start_total").increment(1);
    }

    fn on_state_change(&self, _session_id: &SessionId, _from: SessionState, to: SessionState) {
        metrics::counter!("toolrelay_session_state_total", "state" => to.as_str()).increment(1);
    }

    fn on_decision(&self, _session_id: &SessionId, decision: &Decision) {
        let kind = match decision {
            Decision::DirectAnswer(_) => "direct_answer",
            Decision::ToolCallIntent { .. } => "tool_call",
        };
        metrics::counter!("toolrelay_decision_total", "decision" => kind).increment(1);
    }

    fn on_protocol_retry(
        &self,
        _session_id: &SessionId,
        _attempt: u32,
        _error: &OrchestrationError,
    ) {
        metrics::counter!("toolrelay_protocol_retry_total").increment(1);
    }

    fn on_session_complete(&self, _session_id: &SessionId, tool_calls: u32, elapsed: Duration) {
        metrics::counter!("toolrelay_session_complete_total").increment(1);
        metrics::histogram!("toolrelay_session_tool_calls").record(tool_calls as f64);
        metrics::histogram!(
            "toolrelay_session_duration_seconds",
            "status" => "success"
        )
        .record(elapsed.as_secs_f64());
    }

    fn on_session_failure(
        &self,
        _session_id: &SessionId,
        error: &OrchestrationError,
        elapsed: Duration,
    ) {
        metrics::counter!(
            "toolrelay_session_failure_total",
            "error_kind" => format!("{:?}", error.kind),
            "state" => error.state.as_str()
        )
        .increment(1);
        metrics::histogram!(
            "toolrelay_session_duration_seconds",
            "status" => "failure"
        )
        .record(elapsed.as_secs_f64());
    }
}
