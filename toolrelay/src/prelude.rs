//! Common imports for most toolrelay applications.

pub use crate::{
    DispatchBinding, RelayConfig, RelayError, RelayErrorKind, build_dispatch_server,
    build_dispatcher, build_mailbox, build_orchestrator, build_orchestrator_with, build_provider,
    build_registry, build_tool_set,
};
pub use crate::{tr_call, tr_params};
pub use crate::{
    DispatchConfig, DispatchServer, Envelope, HttpDispatchClient, Message, ModelProvider,
    OrchestrationError, OrchestrationOutcome, OrchestrationPolicy, Orchestrator, Parameters,
    ProviderError, Role, SessionId, ToolAdapter, ToolCallRequest, ToolDescriptor, ToolDispatcher,
    ToolError, ToolErrorKind, ToolExecutionContext, ToolRegistry, ToolSet,
};
