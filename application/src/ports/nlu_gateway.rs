//! NLU gateway port
//!
//! Defines the interface to the natural-language-understanding capability:
//! intent classification, literal parameter extraction and clarification
//! phrasing.

use async_trait::async_trait;
use thiserror::Error;
use tutor_domain::{
    ClarificationRequest, ConversationTurn, ExplicitField, IntentClassification, ToolType,
    UserProfile,
};

/// Errors that can occur during NLU gateway operations
#[derive(Error, Debug, Clone, PartialEq)]
pub enum GatewayError {
    #[error("Connection error: {0}")]
    ConnectionError(String),

    #[error("Timeout")]
    Timeout,

    #[error("Request failed: {0}")]
    RequestFailed(String),

    #[error("Malformed response: {0}")]
    MalformedResponse(String),

    #[error("Operation not supported: {0}")]
    Unsupported(String),
}

impl GatewayError {
    /// Unreachable or overloaded capability; worth retrying.
    pub fn is_transient(&self) -> bool {
        matches!(
            self,
            GatewayError::ConnectionError(_) | GatewayError::Timeout | GatewayError::RequestFailed(_)
        )
    }
}

/// Gateway to the NLU capability
///
/// Implementations must be safe to call concurrently for different
/// conversations.
#[async_trait]
pub trait NluGateway: Send + Sync {
    /// Pick a tool type (or unclear) for the message
    async fn classify_intent(
        &self,
        message: &str,
        profile: &UserProfile,
        history: &[ConversationTurn],
    ) -> Result<IntentClassification, GatewayError>;

    /// Fields literally stated in the message, for the given tool
    ///
    /// `pending` is the question the message replies to, when the previous
    /// turn asked the learner for parameters of this tool.
    async fn extract_explicit(
        &self,
        message: &str,
        tool_type: ToolType,
        profile: &UserProfile,
        history: &[ConversationTurn],
        pending: Option<&ClarificationRequest>,
    ) -> Result<Vec<ExplicitField>, GatewayError>;

    /// Natural phrasing of a clarification question
    async fn generate_clarification_text(
        &self,
        request: &ClarificationRequest,
        history: &[ConversationTurn],
    ) -> Result<String, GatewayError>;
}
