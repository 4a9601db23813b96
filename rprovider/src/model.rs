//! What goes to a model and what comes back.
//!
//! A [`ModelRequest`] carries the rendered transcript plus the tool catalog
//! the model may choose from; a [`ModelResponse`] carries assistant text,
//! tool call intents, or both.
//!
//! ```rust
//! use rprovider::{Message, ModelRequest, ProviderErrorKind, ToolDefinition};
//!
//! let catalog = vec![ToolDefinition::new(
//!     "get_employee_count",
//!     "Returns the number of employees.",
//!     r#"{"type":"object","properties":{}}"#,
//! )];
//!
//! let request = ModelRequest::builder("gpt-4o-mini")
//!     .message(Message::user("How many people work here?"))
//!     .tools(catalog)
//!     .build()
//!     .expect("valid request");
//! assert!(request.offers_tools());
//!
//! let err = ModelRequest::builder("gpt-4o-mini")
//!     .message(Message::user("hi"))
//!     .tools(vec![ToolDefinition::new("get employee count", "spaces", "{}")])
//!     .build()
//!     .expect_err("tool names are identifiers");
//! assert_eq!(err.kind, ProviderErrorKind::InvalidRequest);
//! ```

use std::collections::HashSet;
use std::fmt::{Display, Formatter};

use rcommon::{GenerationOptions, MetadataMap};

use crate::ProviderError;

/// Longest function name chat-completions backends accept.
pub const MAX_TOOL_NAME_LEN: usize = 64;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ProviderId {
    OpenAi,
}

impl Display for ProviderId {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::OpenAi => f.write_str("openai"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Role {
    System,
    User,
    Assistant,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Message {
    pub role: Role,
    pub content: String,
}

impl Message {
    pub fn new(role: Role, content: impl Into<String>) -> Self {
        Self {
            role,
            content: content.into(),
        }
    }

    pub fn system(content: impl Into<String>) -> Self {
        Self::new(Role::System, content)
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self::new(Role::User, content)
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self::new(Role::Assistant, content)
    }
}

/// Tool catalog entry as presented to a model.
///
/// `input_schema` holds a JSON Schema document describing the arguments object.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ToolDefinition {
    pub name: String,
    pub description: String,
    pub input_schema: String,
}

impl ToolDefinition {
    pub fn new(
        name: impl Into<String>,
        description: impl Into<String>,
        input_schema: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            description: description.into(),
            input_schema: input_schema.into(),
        }
    }

    /// Backends only accept `[A-Za-z0-9_-]{1,64}` as function names.
    pub fn has_valid_name(&self) -> bool {
        !self.name.is_empty()
            && self.name.len() <= MAX_TOOL_NAME_LEN
            && self
                .name
                .bytes()
                .all(|byte| byte.is_ascii_alphanumeric() || byte == b'_' || byte == b'-')
    }
}

/// A tool invocation requested by the model. `arguments` is the raw JSON text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ToolCall {
    pub id: String,
    pub name: String,
    pub arguments: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OutputItem {
    Message(Message),
    ToolCall(ToolCall),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StopReason {
    EndTurn,
    MaxTokens,
    ToolUse,
    Cancelled,
    Other,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct TokenUsage {
    pub input_tokens: u32,
    pub output_tokens: u32,
    pub total_tokens: u32,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModelResponse {
    pub provider: ProviderId,
    pub model: String,
    pub output: Vec<OutputItem>,
    pub stop_reason: StopReason,
    pub usage: TokenUsage,
}

impl ModelResponse {
    /// Concatenated assistant text across all message items.
    pub fn text(&self) -> String {
        self.output
            .iter()
            .filter_map(|item| match item {
                OutputItem::Message(message) if message.role == Role::Assistant => {
                    Some(message.content.as_str())
                }
                _ => None,
            })
            .collect()
    }

    pub fn tool_calls(&self) -> Vec<&ToolCall> {
        self.output
            .iter()
            .filter_map(|item| match item {
                OutputItem::ToolCall(call) => Some(call),
                OutputItem::Message(_) => None,
            })
            .collect()
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ModelRequest {
    pub model: String,
    pub messages: Vec<Message>,
    pub options: GenerationOptions,
    pub tools: Vec<ToolDefinition>,
    pub metadata: MetadataMap,
}

impl ModelRequest {
    pub fn builder(model: impl Into<String>) -> ModelRequestBuilder {
        ModelRequestBuilder::new(model)
    }

    /// Unvalidated request; providers validate before sending.
    pub fn new(model: impl Into<String>, messages: Vec<Message>) -> Self {
        Self {
            model: model.into(),
            messages,
            options: GenerationOptions::default(),
            tools: Vec::new(),
            metadata: MetadataMap::new(),
        }
    }

    pub fn with_tools(mut self, tools: Vec<ToolDefinition>) -> Self {
        self.tools = tools;
        self
    }

    /// Summarization turns go out with an empty catalog.
    pub fn offers_tools(&self) -> bool {
        !self.tools.is_empty()
    }

    pub fn validate(&self) -> Result<(), ProviderError> {
        if self.model.trim().is_empty() {
            return Err(ProviderError::invalid_request("model must not be empty"));
        }

        if self.messages.is_empty() {
            return Err(ProviderError::invalid_request(
                "at least one message is required",
            ));
        }

        if self.options.max_tokens == Some(0) {
            return Err(ProviderError::invalid_request(
                "max_tokens must be greater than zero",
            ));
        }

        if let Some(temperature) = self.options.temperature
            && !(0.0..=2.0).contains(&temperature)
        {
            return Err(ProviderError::invalid_request(
                "temperature must be in the inclusive range 0.0..=2.0",
            ));
        }

        let mut seen = HashSet::new();
        for tool in &self.tools {
            if !tool.has_valid_name() {
                return Err(ProviderError::invalid_request(format!(
                    "tool name '{}' must match [A-Za-z0-9_-]{{1,{MAX_TOOL_NAME_LEN}}}",
                    tool.name
                )));
            }
            if !seen.insert(tool.name.as_str()) {
                return Err(ProviderError::invalid_request(format!(
                    "duplicate tool definition '{}'",
                    tool.name
                )));
            }
        }

        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ModelRequestBuilder {
    request: ModelRequest,
}

impl ModelRequestBuilder {
    pub fn new(model: impl Into<String>) -> Self {
        Self {
            request: ModelRequest::new(model, Vec::new()),
        }
    }

    pub fn message(mut self, message: Message) -> Self {
        self.request.messages.push(message);
        self
    }

    pub fn messages(mut self, messages: Vec<Message>) -> Self {
        self.request.messages.extend(messages);
        self
    }

    pub fn options(mut self, options: GenerationOptions) -> Self {
        self.request.options = options;
        self
    }

    pub fn tools(mut self, tools: Vec<ToolDefinition>) -> Self {
        self.request.tools = tools;
        self
    }

    pub fn metadata(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.request.metadata.insert(key.into(), value.into());
        self
    }

    pub fn build(self) -> Result<ModelRequest, ProviderError> {
        self.request.validate()?;
        Ok(self.request)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ProviderErrorKind;

    fn tool(name: &str) -> ToolDefinition {
        ToolDefinition::new(name, "test tool", r#"{"type":"object"}"#)
    }

    fn rejection(builder: ModelRequestBuilder) -> ProviderError {
        builder.build().expect_err("request should be rejected")
    }

    #[test]
    fn catalog_names_must_be_unique_identifiers() {
        let duplicate = rejection(
            ModelRequest::builder("gpt-4o-mini")
                .message(Message::user("hi"))
                .tools(vec![tool("search_emails"), tool("search_emails")]),
        );
        assert_eq!(duplicate.kind, ProviderErrorKind::InvalidRequest);
        assert!(duplicate.message.contains("duplicate"));

        let dotted = rejection(
            ModelRequest::builder("gpt-4o-mini")
                .message(Message::user("hi"))
                .tools(vec![tool("mail.search")]),
        );
        assert!(dotted.message.contains("mail.search"));

        assert!(tool("get-email_full2").has_valid_name());
        assert!(!tool(&"x".repeat(MAX_TOOL_NAME_LEN + 1)).has_valid_name());
    }

    #[test]
    fn generation_bounds_are_checked() {
        let hot = rejection(
            ModelRequest::builder("gpt-4o-mini")
                .message(Message::user("hi"))
                .options(GenerationOptions::default().with_temperature(3.5)),
        );
        assert!(hot.message.contains("temperature"));

        let empty = rejection(
            ModelRequest::builder("gpt-4o-mini")
                .message(Message::user("hi"))
                .options(GenerationOptions::default().with_max_tokens(0)),
        );
        assert!(empty.message.contains("max_tokens"));

        let silent = rejection(ModelRequest::builder("gpt-4o-mini"));
        assert!(silent.message.contains("at least one message"));
    }

    #[test]
    fn builder_keeps_metadata_and_catalog() {
        let request = ModelRequest::builder("gpt-4o-mini")
            .messages(vec![Message::system("pick a tool"), Message::user("unread?")])
            .tools(vec![tool("get_unread_emails")])
            .metadata("session_id", "session-3")
            .build()
            .expect("valid");

        assert!(request.offers_tools());
        assert_eq!(request.messages[0].role, Role::System);
        assert_eq!(
            request.metadata.get("session_id").map(String::as_str),
            Some("session-3")
        );
        assert!(!ModelRequest::new("gpt-4o-mini", vec![Message::user("hi")]).offers_tools());
    }

    #[test]
    fn response_helpers_split_text_and_tool_calls() {
        let response = ModelResponse {
            provider: ProviderId::OpenAi,
            model: "gpt-4o-mini".to_string(),
            output: vec![
                OutputItem::Message(Message::assistant("checking ")),
                OutputItem::ToolCall(ToolCall {
                    id: "call_1".to_string(),
                    name: "get_unread_emails".to_string(),
                    arguments: "{}".to_string(),
                }),
                OutputItem::Message(Message::assistant("now")),
            ],
            stop_reason: StopReason::ToolUse,
            usage: TokenUsage::default(),
        };

        assert_eq!(response.text(), "checking now");
        assert_eq!(response.tool_calls().len(), 1);
        assert_eq!(response.tool_calls()[0].name, "get_unread_emails");
    }
}
