use std::panic::{AssertUnwindSafe, catch_unwind};
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use rchat::{Decision, OrchestrationError, OrchestrationHooks, SessionState};
use rcommon::SessionId;
use rprovider::{ProviderError, ProviderId, ProviderOperationHooks};
use rtooling::{ToolCallRequest, ToolError, ToolExecutionContext, ToolRuntimeHooks};
use serde_json::Value;

/// Contains panics raised by the wrapped hooks.
///
/// One wrapper serves all three hook surfaces. A panicking callback is logged
/// at `warn` with the callback name and counted; the caller never sees it.
#[derive(Debug, Default)]
pub struct Guarded<H> {
    inner: H,
    contained: AtomicU64,
}

impl<H> Guarded<H> {
    pub fn new(inner: H) -> Self {
        Self {
            inner,
            contained: AtomicU64::new(0),
        }
    }

    pub fn inner(&self) -> &H {
        &self.inner
    }

    /// Panics contained so far.
    pub fn contained_panics(&self) -> u64 {
        self.contained.load(Ordering::Relaxed)
    }

    fn run(&self, callback: &'static str, hook: impl FnOnce(&H)) {
        if let Err(payload) = catch_unwind(AssertUnwindSafe(|| hook(&self.inner))) {
            self.contained.fetch_add(1, Ordering::Relaxed);
            let reason = payload
                .downcast_ref::<&str>()
                .map(|text| text.to_string())
                .or_else(|| payload.downcast_ref::<String>().cloned())
                .unwrap_or_else(|| "non-string panic payload".to_string());
            tracing::warn!(callback, reason = %reason, "observability hook panicked");
        }
    }
}

impl<H: ProviderOperationHooks> ProviderOperationHooks for Guarded<H> {
    fn on_attempt_start(&self, provider: ProviderId, operation: &str, attempt: u32) {
        self.run("on_attempt_start", |hooks| {
            hooks.on_attempt_start(provider, operation, attempt)
        });
    }

    fn on_retry_scheduled(
        &self,
        provider: ProviderId,
        operation: &str,
        attempt: u32,
        delay: Duration,
        error: &ProviderError,
    ) {
        self.run("on_retry_scheduled", |hooks| {
            hooks.on_retry_scheduled(provider, operation, attempt, delay, error)
        });
    }

    fn on_success(&self, provider: ProviderId, operation: &str, attempts: u32) {
        self.run("on_success", |hooks| {
            hooks.on_success(provider, operation, attempts)
        });
    }

    fn on_failure(
        &self,
        provider: ProviderId,
        operation: &str,
        attempts: u32,
        error: &ProviderError,
    ) {
        self.run("on_failure", |hooks| {
            hooks.on_failure(provider, operation, attempts, error)
        });
    }
}

impl<H: ToolRuntimeHooks> ToolRuntimeHooks for Guarded<H> {
    fn on_call_rejected(
        &self,
        request: &ToolCallRequest,
        context: &ToolExecutionContext,
        error: &ToolError,
    ) {
        self.run("on_call_rejected", |hooks| {
            hooks.on_call_rejected(request, context, error)
        });
    }

    fn on_execution_start(&self, request: &ToolCallRequest, context: &ToolExecutionContext) {
        self.run("on_execution_start", |hooks| {
            hooks.on_execution_start(request, context)
        });
    }

    fn on_execution_success(
        &self,
        request: &ToolCallRequest,
        context: &ToolExecutionContext,
        payload: &Value,
        elapsed: Duration,
    ) {
        self.run("on_execution_success", |hooks| {
            hooks.on_execution_success(request, context, payload, elapsed)
        });
    }

    fn on_execution_failure(
        &self,
        request: &ToolCallRequest,
        context: &ToolExecutionContext,
        error: &ToolError,
        elapsed: Duration,
    ) {
        self.run("on_execution_failure", |hooks| {
            hooks.on_execution_failure(request, context, error, elapsed)
        });
    }
}

impl<H: OrchestrationHooks> OrchestrationHooks for Guarded<H> {
    fn on_session_start(&self, session_id: &SessionId, query: &str) {
        self.run("on_session_start", |hooks| {
            hooks.on_session_start(session_id, query)
        });
    }

    fn on_state_change(&self, session_id: &SessionId, from: SessionState, to: SessionState) {
        self.run("on_state_change", |hooks| {
            hooks.on_state_change(session_id, from, to)
        });
    }

    fn on_decision(&self, session_id: &SessionId, decision: &Decision) {
        self.run("on_decision", |hooks| hooks.on_decision(session_id, decision));
    }

    fn on_protocol_retry(&self, session_id: &SessionId, attempt: u32, error: &OrchestrationError) {
        self.run("on_protocol_retry", |hooks| {
            hooks.on_protocol_retry(session_id, attempt, error)
        });
    }

    fn on_session_complete(&self, session_id: &SessionId, tool_calls: u32, elapsed: Duration) {
        self.run("on_session_complete", |hooks| {
            hooks.on_session_complete(session_id, tool_calls, elapsed)
        });
    }

    fn on_session_failure(
        &self,
        session_id: &SessionId,
        error: &OrchestrationError,
        elapsed: Duration,
    ) {
        self.run("on_session_failure", |hooks| {
            hooks.on_session_failure(session_id, error, elapsed)
        });
    }
}
