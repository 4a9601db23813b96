//! Transcript to provider message rendering.

use rprovider::{Message, Role};
use serde_json::Value;

use crate::{ConversationTurn, Transcript, TurnContent, TurnRole};

const TRUNCATION_MARKER: &str = "... [truncated]";

/// Renders every turn in order. Tool results are presented as user
/// messages because the decision protocol carries no tool-result role.
pub fn render_messages(transcript: &Transcript, max_body_chars: usize) -> Vec<Message> {
    transcript
        .turns()
        .iter()
        .map(|turn| render_turn(turn, max_body_chars))
        .collect()
}

fn render_turn(turn: &ConversationTurn, max_body_chars: usize) -> Message {
    match (turn.role, &turn.content) {
        (TurnRole::User, content) => Message::new(Role::User, content_text(content)),
        (TurnRole::Model, TurnContent::Structured(intent)) => {
            let name = turn.tool_name.as_deref().unwrap_or("unknown");
            let parameters = intent
                .get("parameters")
                .map(Value::to_string)
                .unwrap_or_else(|| "{}".to_string());
            Message::new(
                Role::Assistant,
                format!("Calling tool {name} with parameters {parameters}"),
            )
        }
        (TurnRole::Model, TurnContent::Text(text)) => Message::new(Role::Assistant, text.clone()),
        (TurnRole::Tool, content) => {
            let name = turn.tool_name.as_deref().unwrap_or("unknown");
            let output = match content {
                TurnContent::Structured(value) => {
                    let mut value = value.clone();
                    clip_bodies(&mut value, max_body_chars);
                    serde_json::to_string_pretty(&value).unwrap_or_else(|_| value.to_string())
                }
                TurnContent::Text(text) => text.clone(),
            };
            Message::new(Role::User, format!("Tool ({name}) output:\n{output}"))
        }
    }
}

fn content_text(content: &TurnContent) -> String {
    match content {
        TurnContent::Text(text) => text.clone(),
        TurnContent::Structured(value) => value.to_string(),
    }
}

fn clip_bodies(value: &mut Value, limit: usize) {
    match value {
        Value::Object(map) => {
            for (key, entry) in map.iter_mut() {
                if key == "body"
                    && let Value::String(body) = entry
                    && body.chars().count() > limit
                {
                    let mut clipped: String = body.chars().take(limit).collect();
                    clipped.push_str(TRUNCATION_MARKER);
                    *body = clipped;
                } else {
                    clip_bodies(entry, limit);
                }
            }
        }
        Value::Array(items) => items.iter_mut().for_each(|item| clip_bodies(item, limit)),
        _ => {}
    }
}
