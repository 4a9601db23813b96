use std::time::Duration;

use rcommon::SessionId;

use crate::{Decision, OrchestrationError, SessionState};

/// Observation points for an orchestration session. All methods default to
/// no-ops.
pub trait OrchestrationHooks: Send + Sync {
    fn on_session_start(&self, _session_id: &SessionId, _query: &str) {}

    fn on_state_change(&self, _session_id: &SessionId, _from: SessionState, _to: SessionState) {}

    fn on_decision(&self, _session_id: &SessionId, _decision: &Decision) {}

    fn on_protocol_retry(
        &self,
        _session_id: &SessionId,
        _attempt: u32,
        _error: &OrchestrationError,
    ) {
    }

    fn on_session_complete(&self, _session_id: &SessionId, _tool_calls: u32, _elapsed: Duration) {}

    fn on_session_failure(
        &self,
        _session_id: &SessionId,
        _error: &OrchestrationError,
        _elapsed: Duration,
    ) {
    }
}

#[derive(Debug, Default, Clone, Copy)]
pub struct NoopOrchestrationHooks;

impl OrchestrationHooks for NoopOrchestrationHooks {}
