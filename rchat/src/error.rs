//! Orchestration-layer errors and classification.

use std::error::Error;
use std::fmt::{Display, Formatter};

use rprovider::ProviderError;
use rtooling::Envelope;

use crate::SessionState;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OrchestrationErrorKind {
    InvalidRequest,
    /// The model's reply fit neither a direct answer nor a single tool call.
    ModelProtocol,
    Provider,
}

#[derive(Debug, Clone, PartialEq)]
pub struct OrchestrationError {
    pub kind: OrchestrationErrorKind,
    pub message: String,
    pub state: SessionState,
    pub retryable: bool,
    /// Last dispatch outcome when the failure happened after a tool ran.
    pub envelope: Option<Envelope>,
}

impl OrchestrationError {
    pub fn new(
        kind: OrchestrationErrorKind,
        message: impl Into<String>,
        state: SessionState,
    ) -> Self {
        Self {
            kind,
            message: message.into(),
            state,
            retryable: false,
            envelope: None,
        }
    }

    pub fn invalid_request(message: impl Into<String>) -> Self {
        Self::new(
            OrchestrationErrorKind::InvalidRequest,
            message,
            SessionState::AwaitingDecision,
        )
    }

    pub fn model_protocol(message: impl Into<String>, state: SessionState) -> Self {
        Self::new(OrchestrationErrorKind::ModelProtocol, message, state)
    }

    pub fn provider(error: ProviderError, state: SessionState) -> Self {
        Self {
            retryable: error.retryable,
            ..Self::new(OrchestrationErrorKind::Provider, error.to_string(), state)
        }
    }

    pub fn in_state(mut self, state: SessionState) -> Self {
        self.state = state;
        self
    }

    pub fn with_envelope(mut self, envelope: Option<Envelope>) -> Self {
        self.envelope = envelope;
        self
    }
}

impl Display for OrchestrationError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:?} during {:?}: {}", self.kind, self.state, self.message)
    }
}

impl Error for OrchestrationError {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn provider_errors_keep_retryable_flag_and_state() {
        let error = OrchestrationError::provider(
            ProviderError::rate_limited("slow down"),
            SessionState::Summarizing,
        );

        assert_eq!(error.kind, OrchestrationErrorKind::Provider);
        assert_eq!(error.state, SessionState::Summarizing);
        assert!(error.retryable);
        assert!(error.to_string().contains("Summarizing"));
    }
}
