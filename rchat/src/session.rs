//! Per-query session state.

use std::fmt::{Display, Formatter};
use std::sync::Arc;

use rcommon::SessionId;
use rtooling::ToolRegistry;

use crate::{ConversationTurn, OrchestrationError, Transcript, TurnRole};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SessionState {
    AwaitingDecision,
    Dispatching,
    Summarizing,
    Done,
}

impl SessionState {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::AwaitingDecision => "awaiting_decision",
            Self::Dispatching => "dispatching",
            Self::Summarizing => "summarizing",
            Self::Done => "done",
        }
    }

    /// Legal successor states. `Summarizing -> AwaitingDecision` only occurs
    /// when more than one tool hop is allowed.
    pub fn can_advance_to(self, next: SessionState) -> bool {
        matches!(
            (self, next),
            (Self::AwaitingDecision, Self::Dispatching)
                | (Self::AwaitingDecision, Self::Done)
                | (Self::Dispatching, Self::Summarizing)
                | (Self::Summarizing, Self::Done)
                | (Self::Summarizing, Self::AwaitingDecision)
        )
    }
}

impl Display for SessionState {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One user query in flight. Owns its transcript and only reads the
/// shared catalog.
#[derive(Debug, Clone)]
pub struct OrchestrationSession {
    id: SessionId,
    catalog: Arc<ToolRegistry>,
    state: SessionState,
    transcript: Transcript,
    tool_hops: u32,
}

impl OrchestrationSession {
    pub fn start(
        id: impl Into<SessionId>,
        catalog: Arc<ToolRegistry>,
        query: &str,
    ) -> Result<Self, OrchestrationError> {
        let query = query.trim();
        if query.is_empty() {
            return Err(OrchestrationError::invalid_request(
                "query must not be empty",
            ));
        }

        let mut transcript = Transcript::new();
        transcript.push(ConversationTurn::user(query));

        Ok(Self {
            id: id.into(),
            catalog,
            state: SessionState::AwaitingDecision,
            transcript,
            tool_hops: 0,
        })
    }

    pub fn id(&self) -> &SessionId {
        &self.id
    }

    pub fn catalog(&self) -> &ToolRegistry {
        &self.catalog
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    pub fn transcript(&self) -> &Transcript {
        &self.transcript
    }

    pub fn tool_hops(&self) -> u32 {
        self.tool_hops
    }

    pub fn record(&mut self, turn: ConversationTurn) {
        if turn.role == TurnRole::Tool {
            self.tool_hops += 1;
        }
        self.transcript.push(turn);
    }

    /// Moves to `next`, returning the state left behind.
    pub fn advance(&mut self, next: SessionState) -> Result<SessionState, OrchestrationError> {
        if !self.state.can_advance_to(next) {
            return Err(OrchestrationError::invalid_request(format!(
                "illegal session transition {} -> {}",
                self.state, next
            ))
            .in_state(self.state));
        }

        let previous = self.state;
        self.state = next;
        Ok(previous)
    }

    pub fn into_transcript(self) -> Transcript {
        self.transcript
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::OrchestrationErrorKind;

    fn catalog() -> Arc<ToolRegistry> {
        Arc::new(ToolRegistry::new())
    }

    #[test]
    fn blank_query_is_rejected_before_any_state() {
        let error =
            OrchestrationSession::start("s-1", catalog(), "   ").expect_err("blank query");
        assert_eq!(error.kind, OrchestrationErrorKind::InvalidRequest);
    }

    #[test]
    fn done_is_terminal() {
        let mut session =
            OrchestrationSession::start("s-1", catalog(), "hello").expect("session");
        session.advance(SessionState::Done).expect("direct answer");

        assert!(session.advance(SessionState::AwaitingDecision).is_err());
        assert!(session.advance(SessionState::Dispatching).is_err());
        assert_eq!(session.state(), SessionState::Done);
    }

    #[test]
    fn dispatching_must_pass_through_summarizing() {
        let mut session =
            OrchestrationSession::start("s-1", catalog(), "hello").expect("session");
        session.advance(SessionState::Dispatching).expect("tool intent");

        assert!(session.advance(SessionState::Done).is_err());
        assert_eq!(
            session.advance(SessionState::Summarizing).expect("summarize"),
            SessionState::Dispatching
        );
    }
}
