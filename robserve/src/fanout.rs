use std::time::Duration;

use rchat::{Decision, OrchestrationError, OrchestrationHooks, SessionState};
use rcommon::SessionId;
use rprovider::{ProviderError, ProviderId, ProviderOperationHooks};
use rtooling::{ToolCallRequest, ToolError, ToolExecutionContext, ToolRuntimeHooks};
use serde_json::Value;

use crate::{MetricsObservabilityHooks, TracingObservabilityHooks};

/// Forwards every event to `first`, then to `second`.
#[derive(Debug, Default, Clone, Copy)]
pub struct Fanout<A, B> {
    pub first: A,
    pub second: B,
}

impl<A, B> Fanout<A, B> {
    pub fn new(first: A, second: B) -> Self {
        Self { first, second }
    }
}

/// Structured logs plus `toolrelay_*` metrics.
pub type StandardHooks = Fanout<TracingObservabilityHooks, MetricsObservabilityHooks>;

pub fn standard_hooks() -> StandardHooks {
    Fanout::new(TracingObservabilityHooks, MetricsObservabilityHooks)
}

impl<A, B> ProviderOperationHooks for Fanout<A, B>
where
    A: ProviderOperationHooks,
    B: ProviderOperationHooks,
{
    fn on_attempt_start(&self, provider: ProviderId, operation: &str, attempt: u32) {
        self.first.on_attempt_start(provider, operation, attempt);
        self.second.on_attempt_start(provider, operation, attempt);
    }

    fn on_retry_scheduled(
        &self,
        provider: ProviderId,
        operation: &str,
        attempt: u32,
        delay: Duration,
        error: &ProviderError,
    ) {
        self.first
            .on_retry_scheduled(provider, operation, attempt, delay, error);
        self.second
            .on_retry_scheduled(provider, operation, attempt, delay, error);
    }

    fn on_success(&self, provider: ProviderId, operation: &str, attempts: u32) {
        self.first.on_success(provider, operation, attempts);
        self.second.on_success(provider, operation, attempts);
    }

    fn on_failure(
        &self,
        provider: ProviderId,
        operation: &str,
        attempts: u32,
        error: &ProviderError,
    ) {
        self.first.on_failure(provider, operation, attempts, error);
        self.second.on_failure(provider, operation, attempts, error);
    }
}

impl<A, B> ToolRuntimeHooks for Fanout<A, B>
where
    A: ToolRuntimeHooks,
    B: ToolRuntimeHooks,
{
    fn on_call_rejected(
        &self,
        request: &ToolCallRequest,
        context: &ToolExecutionContext,
        error: &ToolError,
    ) {
        self.first.on_call_rejected(request, context, error);
        self.second.on_call_rejected(request, context, error);
    }

    fn on_execution_start(&self, request: &ToolCallRequest, context: &ToolExecutionContext) {
        self.first.on_execution_start(request, context);
        self.second.on_execution_start(request, context);
    }

    fn on_execution_success(
        &self,
        request: &ToolCallRequest,
        context: &ToolExecutionContext,
        payload: &Value,
        elapsed: Duration,
    ) {
        self.first
            .on_execution_success(request, context, payload, elapsed);
        self.second
            .on_execution_success(request, context, payload, elapsed);
    }

    fn on_execution_failure(
        &self,
        request: &ToolCallRequest,
        context: &ToolExecutionContext,
        error: &ToolError,
        elapsed: Duration,
    ) {
        self.first
            .on_execution_failure(request, context, error, elapsed);
        self.second
            .on_execution_failure(request, context, error, elapsed);
    }
}

impl<A, B> OrchestrationHooks for Fanout<A, B>
where
    A: OrchestrationHooks,
    B: OrchestrationHooks,
{
    fn on_session_start(&self, session_id: &SessionId, query: &str) {
        self.first.on_session_start(session_id, query);
        self.second.on_session_start(session_id, query);
    }

    fn on_state_change(&self, session_id: &SessionId, from: SessionState, to: SessionState) {
        self.first.on_state_change(session_id, from, to);
        self.second.on_state_change(session_id, from, to);
    }

    fn on_decision(&self, session_id: &SessionId, decision: &Decision) {
        self.first.on_decision(session_id, decision);
        self.second.on_decision(session_id, decision);
    }

    fn on_protocol_retry(&self, session_id: &SessionId, attempt: u32, error: &OrchestrationError) {
        self.first.on_protocol_retry(session_id, attempt, error);
        self.second.on_protocol_retry(session_id, attempt, error);
    }

    fn on_session_complete(&self, session_id: &SessionId, tool_calls: u32, elapsed: Duration) {
        self.first
            .on_session_complete(session_id, tool_calls, elapsed);
        self.second
            .on_session_complete(session_id, tool_calls, elapsed);
    }

    fn on_session_failure(
        &self,
        session_id: &SessionId,
        error: &OrchestrationError,
        elapsed: Duration,
    ) {
        self.first.on_session_failure(session_id, error, elapsed);
        self.second.on_session_failure(session_id, error, elapsed);
    }
}
