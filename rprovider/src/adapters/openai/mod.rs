//! Adapter for OpenAI-compatible chat-completions backends.
//!
//! Requests are lowered straight into the chat-completions wire shape and
//! replies are lifted back into [`crate::ModelResponse`]. The HTTP hop sits
//! behind [`OpenAiTransport`] so tests can script backend replies.

mod auth;
mod provider;
mod tests;
mod transport;
mod wire;

pub use auth::OpenAiAuth;
pub use provider::OpenAiProvider;
pub use transport::{DEFAULT_OPENAI_BASE_URL, OpenAiHttpTransport, OpenAiTransport};
pub use wire::{
    ChatCompletionReply, ChatCompletionRequest, WireChoice, WireFunction, WireFunctionCall,
    WireMessage, WireReplyMessage, WireTool, WireToolCall, WireUsage,
};
