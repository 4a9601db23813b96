//! Append-only record of one orchestration session.
//!
//! ```rust
//! use rchat::{ConversationTurn, Transcript, TurnRole};
//!
//! let mut transcript = Transcript::new();
//! transcript.push(ConversationTurn::user("How many unread emails do I have?"));
//! transcript.push(ConversationTurn::model_text("You have 2 unread emails."));
//!
//! assert_eq!(transcript.len(), 2);
//! assert_eq!(transcript.turns()[0].role, TurnRole::User);
//! ```

use serde_json::{Map, Value, json};

use rtooling::{Envelope, Parameters};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TurnRole {
    User,
    Model,
    Tool,
}

#[derive(Debug, Clone, PartialEq)]
pub enum TurnContent {
    Text(String),
    Structured(Value),
}

impl TurnContent {
    pub fn as_text(&self) -> Option<&str> {
        match self {
            Self::Text(text) => Some(text),
            Self::Structured(_) => None,
        }
    }

    pub fn as_structured(&self) -> Option<&Value> {
        match self {
            Self::Text(_) => None,
            Self::Structured(value) => Some(value),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ConversationTurn {
    pub role: TurnRole,
    pub content: TurnContent,
    /// Set on tool-intent and tool-result turns.
    pub tool_name: Option<String>,
}

impl ConversationTurn {
    pub fn user(text: impl Into<String>) -> Self {
        Self {
            role: TurnRole::User,
            content: TurnContent::Text(text.into()),
            tool_name: None,
        }
    }

    pub fn model_text(text: impl Into<String>) -> Self {
        Self {
            role: TurnRole::Model,
            content: TurnContent::Text(text.into()),
            tool_name: None,
        }
    }

    pub fn tool_intent(name: impl Into<String>, parameters: &Parameters) -> Self {
        let name = name.into();
        Self {
            role: TurnRole::Model,
            content: TurnContent::Structured(json!({
                "tool": name,
                "parameters": Value::Object(parameters.clone()),
            })),
            tool_name: Some(name),
        }
    }

    pub fn tool_result(name: impl Into<String>, envelope: &Envelope) -> Self {
        Self {
            role: TurnRole::Tool,
            content: TurnContent::Structured(envelope.to_json()),
            tool_name: Some(name.into()),
        }
    }

    pub fn is_tool_intent(&self) -> bool {
        self.role == TurnRole::Model && self.tool_name.is_some()
    }

    /// Parameters recorded on a tool-intent turn.
    pub fn intent_parameters(&self) -> Option<&Map<String, Value>> {
        if !self.is_tool_intent() {
            return None;
        }

        self.content
            .as_structured()
            .and_then(|value| value.get("parameters"))
            .and_then(Value::as_object)
    }
}

/// Turns are only ever appended; there is no way to edit or remove one.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Transcript {
    turns: Vec<ConversationTurn>,
}

impl Transcript {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, turn: ConversationTurn) {
        self.turns.push(turn);
    }

    pub fn turns(&self) -> &[ConversationTurn] {
        &self.turns
    }

    pub fn last(&self) -> Option<&ConversationTurn> {
        self.turns.last()
    }

    pub fn len(&self) -> usize {
        self.turns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.turns.is_empty()
    }

    pub fn tool_calls(&self) -> usize {
        self.turns
            .iter()
            .filter(|turn| turn.role == TurnRole::Tool)
            .count()
    }
}
