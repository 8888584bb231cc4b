//! Tool execution value objects
//!
//! The outcome of calling a downstream tool. A [`ToolResponse`] is produced
//! for every execution, successful or not, and always records the wall-clock
//! duration and the number of attempts spent.
//!
//! [`FailureKind`] drives the retry strategy:
//!
//! | Kind | Retried? | Examples |
//! |------|----------|----------|
//! | `Transient` | Yes, bounded | network error, 5xx, timeout |
//! | `Permanent` | No | 4xx, malformed response |

use super::entities::ToolType;
use serde::{Deserialize, Serialize};

/// Retry classification of a failed call
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FailureKind {
    Transient,
    Permanent,
}

impl FailureKind {
    pub fn is_retryable(&self) -> bool {
        matches!(self, FailureKind::Transient)
    }
}

impl std::fmt::Display for FailureKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            FailureKind::Transient => write!(f, "transient"),
            FailureKind::Permanent => write!(f, "permanent"),
        }
    }
}

/// Last classified error of a failed execution
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToolError {
    pub kind: FailureKind,
    pub message: String,
    /// HTTP-style status code, when the service answered at all
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<u16>,
}

impl ToolError {
    pub fn transient(message: impl Into<String>) -> Self {
        Self {
            kind: FailureKind::Transient,
            message: message.into(),
            status: None,
        }
    }

    pub fn permanent(message: impl Into<String>) -> Self {
        Self {
            kind: FailureKind::Permanent,
            message: message.into(),
            status: None,
        }
    }

    pub fn with_status(mut self, status: u16) -> Self {
        self.status = Some(status);
        self
    }
}

impl std::fmt::Display for ToolError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self.status {
            Some(status) => write!(f, "[{} {}] {}", self.kind, status, self.message),
            None => write!(f, "[{}] {}", self.kind, self.message),
        }
    }
}

/// Result of one tool execution (all attempts included)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToolResponse {
    pub tool_type: ToolType,
    pub success: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub payload: Option<serde_json::Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<ToolError>,
    /// Wall-clock time across all attempts and backoff sleeps
    pub duration_ms: u64,
    pub attempts: u32,
}

impl ToolResponse {
    pub fn success(tool_type: ToolType, payload: serde_json::Value) -> Self {
        Self {
            tool_type,
            success: true,
            payload: Some(payload),
            error: None,
            duration_ms: 0,
            attempts: 1,
        }
    }

    pub fn failure(tool_type: ToolType, error: ToolError) -> Self {
        Self {
            tool_type,
            success: false,
            payload: None,
            error: Some(error),
            duration_ms: 0,
            attempts: 1,
        }
    }

    pub fn with_duration_ms(mut self, duration_ms: u64) -> Self {
        self.duration_ms = duration_ms;
        self
    }

    pub fn with_attempts(mut self, attempts: u32) -> Self {
        self.attempts = attempts;
        self
    }

    pub fn failure_kind(&self) -> Option<FailureKind> {
        self.error.as_ref().map(|e| e.kind)
    }
}

/// Deterministic identifier of one outbound attempt.
///
/// Same conversation, turn, tool and attempt number always yield the same
/// id, so a downstream deduplicator can recognise a replayed call.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct AttemptId(String);

impl AttemptId {
    pub fn new(conversation_id: &str, turn: u32, tool_type: ToolType, attempt: u32) -> Self {
        Self(format!("{}:{}:{}:{}", conversation_id, turn, tool_type, attempt))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for AttemptId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_attempt_id_is_deterministic() {
        let a = AttemptId::new("conv-1", 2, ToolType::FlashcardGenerator, 1);
        let b = AttemptId::new("conv-1", 2, ToolType::FlashcardGenerator, 1);
        let c = AttemptId::new("conv-1", 2, ToolType::FlashcardGenerator, 2);
        assert_eq!(a, b);
        assert_ne!(a, c);
        assert_eq!(a.as_str(), "conv-1:2:flashcard_generator:1");
    }

    #[test]
    fn test_response_builders() {
        let ok = ToolResponse::success(ToolType::NoteMaker, json!({"notes": []}))
            .with_duration_ms(42)
            .with_attempts(2);
        assert!(ok.success);
        assert_eq!(ok.failure_kind(), None);
        assert_eq!(ok.attempts, 2);

        let failed = ToolResponse::failure(
            ToolType::NoteMaker,
            ToolError::permanent("bad request").with_status(400),
        );
        assert!(!failed.success);
        assert_eq!(failed.failure_kind(), Some(FailureKind::Permanent));
        assert_eq!(failed.error.unwrap().to_string(), "[permanent 400] bad request");
    }

    #[test]
    fn test_only_transient_is_retryable() {
        assert!(FailureKind::Transient.is_retryable());
        assert!(!FailureKind::Permanent.is_retryable());
    }
}
