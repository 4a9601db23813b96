//! Provider-agnostic model inference capability.
//!
//! The orchestration layer treats a model as an opaque remote call: it sends a
//! transcript plus the available tool catalog and receives either text or tool
//! call intents back.

mod credentials;
mod error;
mod model;
mod provider;
mod resilience;

pub mod adapters;
pub mod prelude;

pub use credentials::{SecretString, SecureCredentialManager};
pub use error::{ProviderError, ProviderErrorKind};
pub use model::{
    MAX_TOOL_NAME_LEN, Message, ModelRequest, ModelRequestBuilder, ModelResponse, OutputItem,
    ProviderId, Role, StopReason, TokenUsage, ToolCall, ToolDefinition,
};
pub use provider::{ModelProvider, ProviderFuture};
pub use rcommon::RetryPolicy;
pub use resilience::{NoopOperationHooks, ProviderOperationHooks, execute_with_retry};
