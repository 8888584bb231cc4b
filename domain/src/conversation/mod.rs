//! Conversation history
//!
//! An ordered, append-only sequence of [`ConversationTurn`]s supplied by
//! the caller. Pipeline stages only ever read a bounded trailing window.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Speaker of a conversation turn
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Assistant,
}

impl Role {
    pub fn as_str(&self) -> &str {
        match self {
            Role::User => "user",
            Role::Assistant => "assistant",
        }
    }
}

/// A single message in the conversation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConversationTurn {
    pub role: Role,
    pub content: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timestamp: Option<DateTime<Utc>>,
}

impl ConversationTurn {
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: Role::User,
            content: content.into(),
            timestamp: None,
        }
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self {
            role: Role::Assistant,
            content: content.into(),
            timestamp: None,
        }
    }

    pub fn at(mut self, timestamp: DateTime<Utc>) -> Self {
        self.timestamp = Some(timestamp);
        self
    }
}

/// The last `size` turns, preserving insertion order.
pub fn history_window(history: &[ConversationTurn], size: usize) -> &[ConversationTurn] {
    let start = history.len().saturating_sub(size);
    &history[start..]
}

/// Render turns as `role: content` lines (for prompts and logs).
pub fn render_history(history: &[ConversationTurn]) -> String {
    history
        .iter()
        .map(|t| format!("{}: {}", t.role.as_str(), t.content))
        .collect::<Vec<_>>()
        .join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Vec<ConversationTurn> {
        vec![
            ConversationTurn::user("one"),
            ConversationTurn::assistant("two"),
            ConversationTurn::user("three"),
        ]
    }

    #[test]
    fn test_history_window_keeps_tail_in_order() {
        let history = sample();
        let window = history_window(&history, 2);
        assert_eq!(window.len(), 2);
        assert_eq!(window[0].content, "two");
        assert_eq!(window[1].content, "three");
    }

    #[test]
    fn test_history_window_larger_than_history() {
        let history = sample();
        assert_eq!(history_window(&history, 10).len(), 3);
        assert!(history_window(&[], 5).is_empty());
    }

    #[test]
    fn test_render_history() {
        let history = sample();
        assert_eq!(render_history(&history[..2]), "user: one\nassistant: two");
    }

    #[test]
    fn test_turn_serde_roundtrip_without_timestamp() {
        let json = r#"{"role": "assistant", "content": "hi"}"#;
        let turn: ConversationTurn = serde_json::from_str(json).unwrap();
        assert_eq!(turn.role, Role::Assistant);
        assert!(turn.timestamp.is_none());
    }
}
