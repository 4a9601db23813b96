//! Strict parsing of a model reply into exactly one next step.

use rprovider::ModelResponse;
use rtooling::{Parameters, parse_json_object};

use crate::{OrchestrationError, SessionState};

#[derive(Debug, Clone, PartialEq)]
pub enum Decision {
    DirectAnswer(String),
    ToolCallIntent {
        name: String,
        parameters: Parameters,
        call_id: Option<String>,
    },
}

impl Decision {
    pub fn tool_name(&self) -> Option<&str> {
        match self {
            Self::DirectAnswer(_) => None,
            Self::ToolCallIntent { name, .. } => Some(name),
        }
    }
}

/// A reply with more than one tool call, malformed arguments, or neither
/// text nor a call is a protocol error. Text alongside a single call is
/// ignored in favor of the call.
pub fn parse_decision(response: &ModelResponse) -> Result<Decision, OrchestrationError> {
    let calls = response.tool_calls();

    match calls.as_slice() {
        [] => {
            let text = response.text();
            let text = text.trim();
            if text.is_empty() {
                return Err(protocol("model reply contained neither text nor a tool call"));
            }
            Ok(Decision::DirectAnswer(text.to_string()))
        }
        [call] => {
            let name = call.name.trim();
            if name.is_empty() {
                return Err(protocol("model requested a tool call without a name"));
            }

            let parameters = parse_json_object(&call.arguments).map_err(|error| {
                protocol(format!(
                    "arguments for tool '{name}' are not a JSON object: {}",
                    error.message
                ))
            })?;

            Ok(Decision::ToolCallIntent {
                name: name.to_string(),
                parameters,
                call_id: (!call.id.is_empty()).then(|| call.id.clone()),
            })
        }
        many => Err(protocol(format!(
            "model requested {} tool calls; exactly one is allowed per decision",
            many.len()
        ))),
    }
}

fn protocol(message: impl Into<String>) -> OrchestrationError {
    OrchestrationError::model_protocol(message, SessionState::AwaitingDecision)
}
