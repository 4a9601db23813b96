//! Orchestration client: drives one user query through the
//! decide, dispatch and summarize loop.

mod decision;
mod error;
mod hooks;
mod orchestrator;
mod policy;
mod render;
mod session;
mod transcript;

pub mod prelude {
    pub use crate::{
        ConversationTurn, Decision, OrchestrationError, OrchestrationErrorKind,
        OrchestrationHooks, OrchestrationOutcome, OrchestrationPolicy, Orchestrator,
        OrchestratorBuilder, SessionState, Transcript, TurnContent, TurnRole,
    };
    pub use rcommon::SessionId;
}

pub use decision::{Decision, parse_decision};
pub use error::{OrchestrationError, OrchestrationErrorKind};
pub use hooks::{NoopOrchestrationHooks, OrchestrationHooks};
pub use orchestrator::{OrchestrationOutcome, Orchestrator, OrchestratorBuilder};
pub use policy::OrchestrationPolicy;
pub use render::render_messages;
pub use session::{OrchestrationSession, SessionState};
pub use transcript::{ConversationTurn, Transcript, TurnContent, TurnRole};
