//! UI-agnostic conversation state types
//!
//! This module contains data structures that are shared between the conversation
//! client and whatever front end renders it, and don't depend on any UI framework.

use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

/// A chat message shown in the conversation log
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: ChatRole,
    pub content: String,
}

/// The role of a chat message sender
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChatRole {
    User,
    Bot,
}

/// Server-owned conversation state.
///
/// The backend decides what lives in here. The client only echoes back the most
/// recent value it received, so the inner JSON is never inspected or rebuilt,
/// with the single exception of [`ConversationState::bootstrap`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ConversationState(Value);

impl ConversationState {
    /// The state used before any server contact succeeds.
    pub fn bootstrap() -> Self {
        Self(json!({
            "turn_count": 0,
            "scores": {
                "anxiety": 0,
                "depression": 0,
                "stress": 0,
            }
        }))
    }

    pub fn from_value(value: Value) -> Self {
        Self(value)
    }

    pub fn as_value(&self) -> &Value {
        &self.0
    }

    pub fn into_value(self) -> Value {
        self.0
    }

    /// Peek at the turn counter for display. Returns `None` when the server
    /// uses a shape without one.
    pub fn turn_count(&self) -> Option<i64> {
        self.0.get("turn_count").and_then(Value::as_i64)
    }
}

impl Default for ConversationState {
    fn default() -> Self {
        Self::bootstrap()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bootstrap_shape() {
        let state = ConversationState::bootstrap();
        assert_eq!(state.turn_count(), Some(0));
        assert_eq!(state.as_value()["scores"]["anxiety"], 0);
        assert_eq!(state.as_value()["scores"]["depression"], 0);
        assert_eq!(state.as_value()["scores"]["stress"], 0);
    }

    #[test]
    fn test_unknown_shape_is_kept_verbatim() {
        let raw = json!({"session": "abc", "extra": [1, 2, 3]});
        let state = ConversationState::from_value(raw.clone());
        assert_eq!(state.turn_count(), None);
        assert_eq!(serde_json::to_value(&state).unwrap(), raw);
    }

    #[test]
    fn test_role_serializes_lowercase() {
        assert_eq!(serde_json::to_string(&ChatRole::Bot).unwrap(), "\"bot\"");
        assert_eq!(serde_json::to_string(&ChatRole::User).unwrap(), "\"user\"");
    }
}
