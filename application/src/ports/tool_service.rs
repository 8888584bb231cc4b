//! Tool service port
//!
//! One outbound call to a downstream content tool. Retry, timeout and
//! backoff live in the
//! [`ToolExecutionClient`](crate::use_cases::execute_tool::ToolExecutionClient);
//! an adapter performs exactly one attempt per call.

use async_trait::async_trait;
use thiserror::Error;
use tutor_domain::{AttemptId, FailureKind, ToolError, ToolType};

#[derive(Error, Debug, Clone, PartialEq)]
pub enum ToolInvocationError {
    #[error("Network error: {0}")]
    Network(String),

    #[error("Tool service returned {code}: {body}")]
    Status { code: u16, body: String },

    #[error("Tool call timed out")]
    Timeout,

    #[error("Malformed tool response: {0}")]
    MalformedResponse(String),
}

impl ToolInvocationError {
    /// Transient: network, timeout, 5xx, 408 and 429. Everything else is permanent.
    pub fn classify(&self) -> FailureKind {
        match self {
            ToolInvocationError::Network(_) | ToolInvocationError::Timeout => FailureKind::Transient,
            ToolInvocationError::Status { code, .. } if *code >= 500 || *code == 408 || *code == 429 => {
                FailureKind::Transient
            }
            ToolInvocationError::Status { .. } | ToolInvocationError::MalformedResponse(_) => {
                FailureKind::Permanent
            }
        }
    }

    pub fn to_tool_error(&self) -> ToolError {
        let error = ToolError {
            kind: self.classify(),
            message: self.to_string(),
            status: None,
        };
        match self {
            ToolInvocationError::Status { code, .. } => error.with_status(*code),
            _ => error,
        }
    }
}

#[async_trait]
pub trait ToolServicePort: Send + Sync {
    /// Issue a single call; `attempt_id` lets the service deduplicate replays.
    async fn invoke(
        &self,
        tool_type: ToolType,
        body: &serde_json::Value,
        attempt_id: &AttemptId,
    ) -> Result<serde_json::Value, ToolInvocationError>;
}
