//! Chat-completions payloads and their mapping onto the shared model types.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::{
    Message, ModelRequest, ModelResponse, OutputItem, ProviderError, ProviderId, Role,
    StopReason, TokenUsage, ToolCall, ToolDefinition,
};

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChatCompletionRequest {
    pub model: String,
    pub messages: Vec<WireMessage>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub tools: Vec<WireTool>,
    /// Decisions carry at most one tool call, so parallel calls are switched
    /// off whenever tools are offered.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub parallel_tool_calls: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub temperature: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_tokens: Option<u32>,
}

impl ChatCompletionRequest {
    pub fn from_model_request(request: ModelRequest) -> Result<Self, ProviderError> {
        if request.messages.is_empty() {
            return Err(ProviderError::invalid_request(
                "chat completion requires at least one message",
            ));
        }

        let messages = request
            .messages
            .into_iter()
            .enumerate()
            .map(|(index, message)| WireMessage::lower(index, message))
            .collect::<Result<Vec<_>, _>>()?;

        let tools = request
            .tools
            .into_iter()
            .map(WireTool::lower)
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Self {
            model: request.model,
            messages,
            parallel_tool_calls: (!tools.is_empty()).then_some(false),
            tools,
            temperature: request.options.temperature,
            max_tokens: request.options.max_tokens,
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct WireMessage {
    pub role: &'static str,
    pub content: String,
}

impl WireMessage {
    fn lower(index: usize, message: Message) -> Result<Self, ProviderError> {
        if message.content.trim().is_empty() {
            return Err(ProviderError::invalid_request(format!(
                "message {index} has empty content"
            )));
        }

        let role = match message.role {
            Role::System => "system",
            Role::User => "user",
            Role::Assistant => "assistant",
        };

        Ok(Self {
            role,
            content: message.content,
        })
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct WireTool {
    pub r#type: &'static str,
    pub function: WireFunction,
}

impl WireTool {
    fn lower(tool: ToolDefinition) -> Result<Self, ProviderError> {
        let parameters = serde_json::from_str::<Value>(&tool.input_schema)
            .ok()
            .filter(Value::is_object)
            .ok_or_else(|| {
                ProviderError::invalid_request(format!(
                    "input schema of tool '{}' is not a JSON object",
                    tool.name
                ))
            })?;

        Ok(Self {
            r#type: "function",
            function: WireFunction {
                name: tool.name,
                description: tool.description,
                parameters,
            },
        })
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct WireFunction {
    pub name: String,
    pub description: String,
    pub parameters: Value,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ChatCompletionReply {
    pub model: String,
    #[serde(default)]
    pub choices: Vec<WireChoice>,
    #[serde(default)]
    pub usage: Option<WireUsage>,
}

impl ChatCompletionReply {
    /// Lifts the first choice into a [`ModelResponse`].
    pub fn into_model_response(self) -> Result<ModelResponse, ProviderError> {
        let Some(choice) = self.choices.into_iter().next() else {
            return Err(ProviderError::transport(
                "chat completion reply carried no choices",
            ));
        };

        let mut output = Vec::new();
        if let Some(content) = choice.message.content.filter(|text| !text.is_empty()) {
            output.push(OutputItem::Message(Message::new(Role::Assistant, content)));
        }
        output.extend(
            choice
                .message
                .tool_calls
                .unwrap_or_default()
                .into_iter()
                .map(|call| {
                    OutputItem::ToolCall(ToolCall {
                        id: call.id,
                        name: call.function.name,
                        arguments: call.function.arguments,
                    })
                }),
        );

        Ok(ModelResponse {
            provider: ProviderId::OpenAi,
            model: self.model,
            output,
            stop_reason: stop_reason(choice.finish_reason.as_deref()),
            usage: self.usage.map(TokenUsage::from).unwrap_or_default(),
        })
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct WireChoice {
    pub message: WireReplyMessage,
    #[serde(default)]
    pub finish_reason: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct WireReplyMessage {
    #[serde(default)]
    pub content: Option<String>,
    #[serde(default)]
    pub tool_calls: Option<Vec<WireToolCall>>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct WireToolCall {
    pub id: String,
    pub function: WireFunctionCall,
}

#[derive(Debug, Clone, Deserialize)]
pub struct WireFunctionCall {
    pub name: String,
    #[serde(default)]
    pub arguments: String,
}

#[derive(Debug, Clone, Copy, Deserialize)]
pub struct WireUsage {
    #[serde(default)]
    pub prompt_tokens: u32,
    #[serde(default)]
    pub completion_tokens: u32,
    #[serde(default)]
    pub total_tokens: u32,
}

impl From<WireUsage> for TokenUsage {
    fn from(value: WireUsage) -> Self {
        Self {
            input_tokens: value.prompt_tokens,
            output_tokens: value.completion_tokens,
            total_tokens: value.total_tokens,
        }
    }
}

pub(crate) fn stop_reason(finish_reason: Option<&str>) -> StopReason {
    match finish_reason {
        Some("stop") => StopReason::EndTurn,
        Some("length") => StopReason::MaxTokens,
        Some("tool_calls" | "function_call") => StopReason::ToolUse,
        Some("content_filter" | "cancelled") => StopReason::Cancelled,
        _ => StopReason::Other,
    }
}

/// Pulls a human-readable message out of an error body.
///
/// Accepts both `{"error":{"message":…}}` and the bare `{"error":"…"}` some
/// gateways send.
pub(crate) fn error_message(body: &str) -> Option<String> {
    let parsed = serde_json::from_str::<Value>(body).ok()?;
    match parsed.get("error")? {
        Value::String(message) => Some(message.clone()),
        error => error
            .get("message")
            .and_then(Value::as_str)
            .map(str::to_string),
    }
}
