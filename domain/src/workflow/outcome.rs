//! Terminal outcomes of a turn

use crate::tool::{FailureKind, ToolResponse};
use serde::{Deserialize, Serialize};

/// Machine-readable reason of a failed turn
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FailureReason {
    /// Clarification ceiling reached
    NeedsHumanReview,
    Cancelled,
    ToolPermanentFailure,
    ToolRetriesExhausted,
    /// The NLU capability stayed unreachable through its retry budget
    CapabilityUnavailable,
}

impl FailureReason {
    pub fn as_str(&self) -> &'static str {
        match self {
            FailureReason::NeedsHumanReview => "needs_human_review",
            FailureReason::Cancelled => "cancelled",
            FailureReason::ToolPermanentFailure => "tool_permanent_failure",
            FailureReason::ToolRetriesExhausted => "tool_retries_exhausted",
            FailureReason::CapabilityUnavailable => "capability_unavailable",
        }
    }

    /// Learner-facing message for this reason
    pub fn default_message(&self) -> &'static str {
        match self {
            FailureReason::NeedsHumanReview => {
                "I still don't have enough detail to help with this. A tutor will follow up with you."
            }
            FailureReason::Cancelled => "This request was cancelled.",
            FailureReason::ToolPermanentFailure => {
                "Sorry, I couldn't create that for you. The request was rejected."
            }
            FailureReason::ToolRetriesExhausted => {
                "Sorry, the service is having trouble right now. Please try again in a moment."
            }
            FailureReason::CapabilityUnavailable => {
                "Sorry, I can't understand requests right now. Please try again in a moment."
            }
        }
    }

    /// Reason for a failed tool response
    pub fn for_tool_failure(response: &ToolResponse) -> Self {
        match response.failure_kind() {
            Some(FailureKind::Transient) => FailureReason::ToolRetriesExhausted,
            _ => FailureReason::ToolPermanentFailure,
        }
    }
}

impl std::fmt::Display for FailureReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WorkflowFailure {
    pub reason: FailureReason,
    pub message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tool_response: Option<ToolResponse>,
}

impl WorkflowFailure {
    pub fn new(reason: FailureReason) -> Self {
        Self {
            reason,
            message: reason.default_message().to_string(),
            tool_response: None,
        }
    }

    pub fn with_message(mut self, message: impl Into<String>) -> Self {
        self.message = message.into();
        self
    }

    pub fn with_tool_response(mut self, response: ToolResponse) -> Self {
        self.tool_response = Some(response);
        self
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "status", content = "detail", rename_all = "snake_case")]
pub enum TerminalOutcome {
    Completed(ToolResponse),
    Failed(WorkflowFailure),
}
