//! Unified facade over the toolrelay workspace crates.
//!
//! Re-exports the tool catalog, dispatch, provider and orchestration crates
//! and wires them together from a [`RelayConfig`].

mod macros;

pub mod config;
pub mod prelude;
pub mod providers;
pub mod runtime;

pub use rchat;
pub use rcommon;
pub use rdispatch;
pub use robserve;
pub use rprovider;
pub use rresource;
pub use rtooling;
pub use serde_json;

pub use config::{RelayConfig, RelayError, RelayErrorKind};
pub use providers::build_provider;
pub use runtime::{
    DispatchBinding, build_dispatch_server, build_dispatcher, build_mailbox, build_orchestrator,
    build_orchestrator_with, build_registry, build_tool_set,
};

pub use rchat::{
    ConversationTurn, Decision, OrchestrationError, OrchestrationErrorKind, OrchestrationHooks,
    OrchestrationOutcome, OrchestrationPolicy, Orchestrator, OrchestratorBuilder, SessionState,
    Transcript, TurnContent, TurnRole,
};
pub use rcommon::{BoxFuture, MetadataMap, RetryPolicy, SessionId, TraceId};
pub use rdispatch::{DispatchConfig, DispatchServer, HttpDispatchClient, RunningServer};
pub use rprovider::{
    Message, ModelProvider, ModelRequest, ModelResponse, ProviderError, ProviderErrorKind,
    ProviderId, Role, ToolCall, ToolDefinition,
};
pub use rresource::{HeadcountSource, InMemoryMailbox, Mailbox, StaticHeadcount};
pub use rtooling::{
    Envelope, ErrorDetail, ParameterSpec, ParameterType, Parameters, ToolAdapter,
    ToolCallRequest, ToolDescriptor, ToolDispatcher, ToolError, ToolErrorKind,
    ToolExecutionContext, ToolRegistry, ToolResult, ToolSet,
};
