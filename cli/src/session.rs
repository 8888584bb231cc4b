//! Conversation saved between CLI invocations
//!
//! `--save-state` writes the workflow snapshot together with the
//! conversation so far, so the next `--state` run can classify a bare
//! reply against the turns that led to it.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;
use tutor_domain::{ConversationTurn, WorkflowSnapshot, WorkflowState};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Session {
    pub state: WorkflowSnapshot,
    #[serde(default)]
    pub history: Vec<ConversationTurn>,
}

impl Session {
    /// Snapshot the finished turn and append it to `history`.
    pub fn after_turn(
        state: &WorkflowState,
        mut history: Vec<ConversationTurn>,
        message: &str,
        reply: &str,
    ) -> Self {
        let now = chrono::Utc::now();
        history.push(ConversationTurn::user(message).at(now));
        if !reply.trim().is_empty() {
            history.push(ConversationTurn::assistant(reply).at(now));
        }
        Self {
            state: state.snapshot(),
            history,
        }
    }

    /// Read a saved session, or a bare snapshot as printed by `--output json`.
    pub fn load(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read {}", path.display()))?;
        Self::from_json(&text).with_context(|| format!("Failed to parse {}", path.display()))
    }

    pub fn from_json(json: &str) -> Result<Self> {
        let raw: serde_json::Value = serde_json::from_str(json)?;
        match raw.get("state") {
            Some(state) => {
                let state = WorkflowSnapshot::from_json(&state.to_string())?;
                let history = match raw.get("history") {
                    Some(history) => serde_json::from_value(history.clone())?,
                    None => Vec::new(),
                };
                Ok(Self { state, history })
            }
            None => Ok(Self {
                state: WorkflowSnapshot::from_json(json)?,
                history: Vec::new(),
            }),
        }
    }

    pub fn save(&self, path: &Path) -> Result<()> {
        let json = serde_json::to_string_pretty(self)?;
        std::fs::write(path, json).with_context(|| format!("Failed to write {}", path.display()))
    }

    pub fn restore(self) -> Result<(WorkflowState, Vec<ConversationTurn>)> {
        Ok((WorkflowState::restore(self.state)?, self.history))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;
    use tutor_domain::{Role, WorkflowEvent, WorkflowPolicy};

    fn started() -> WorkflowState {
        WorkflowState::new("conv-9")
            .apply(
                WorkflowEvent::TurnStarted {
                    message: "notes please".to_string(),
                },
                Duration::from_millis(1),
                &WorkflowPolicy::default(),
            )
            .unwrap()
    }

    #[test]
    fn test_after_turn_appends_both_sides() {
        let earlier = vec![ConversationTurn::user("hi")];
        let session = Session::after_turn(&started(), earlier, "notes please", "Which topic?");

        assert_eq!(session.history.len(), 3);
        assert_eq!(session.history[1].role, Role::User);
        assert_eq!(session.history[1].content, "notes please");
        assert_eq!(session.history[2].role, Role::Assistant);
        assert_eq!(session.history[2].content, "Which topic?");
        assert!(session.history[2].timestamp.is_some());
    }

    #[test]
    fn test_save_and_load_keeps_history() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("session.json");
        let state = started();
        Session::after_turn(&state, Vec::new(), "notes please", "Which topic?")
            .save(&path)
            .unwrap();

        let (restored, history) = Session::load(&path).unwrap().restore().unwrap();
        assert_eq!(restored, state);
        assert_eq!(history.len(), 2);
        assert_eq!(history[0].content, "notes please");
    }

    #[test]
    fn test_bare_snapshot_loads_without_history() {
        let state = started();
        let json = state.snapshot().to_json().unwrap();

        let session = Session::from_json(&json).unwrap();
        assert!(session.history.is_empty());
        assert_eq!(session.state.conversation_id, "conv-9");
    }

    #[test]
    fn test_unknown_snapshot_version_rejected() {
        let json = r#"{"state": {"version": 99, "conversation_id": "c", "stage": "start", "turn": 0, "clarification_attempts": 0}}"#;
        assert!(Session::from_json(json).is_err());
    }
}
