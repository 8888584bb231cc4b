//! Tool execution client.
//!
//! Invokes the tool service for a validated [`ToolRequest`] with per-attempt
//! timeout, Transient/Permanent classification and bounded exponential
//! backoff. Every attempt carries a deterministic [`AttemptId`].

use crate::config::RetryPolicy;
use crate::ports::tool_service::{ToolInvocationError, ToolServicePort};
use crate::use_cases::shared::{RetryOutcome, call_with_retry};
use std::sync::Arc;
use std::time::Instant;
use tokio_util::sync::CancellationToken;
use tracing::info;
use tutor_domain::{AttemptId, ConversationTurn, ToolRequest, ToolResponse, UserProfile};

/// Tool execution was cancelled; no response was produced
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ExecutionCancelled;

/// Who is asking, for request bodies and attempt ids
#[derive(Debug, Clone, Copy)]
pub struct ExecutionContext<'a> {
    pub conversation_id: &'a str,
    pub turn: u32,
    pub profile: &'a UserProfile,
    pub history: &'a [ConversationTurn],
}

pub struct ToolExecutionClient {
    service: Arc<dyn ToolServicePort>,
    policy: RetryPolicy,
}

impl ToolExecutionClient {
    pub fn new(service: Arc<dyn ToolServicePort>, policy: RetryPolicy) -> Self {
        Self { service, policy }
    }

    pub fn policy(&self) -> &RetryPolicy {
        &self.policy
    }

    /// Execute `request`; failures come back as an unsuccessful [`ToolResponse`].
    pub async fn execute(
        &self,
        request: &ToolRequest,
        context: ExecutionContext<'_>,
        cancellation_token: &Option<CancellationToken>,
    ) -> Result<ToolResponse, ExecutionCancelled> {
        let tool_type = request.tool_type();
        let body = request.to_body(context.profile, context.history);
        let started = Instant::now();

        let outcome = call_with_retry(
            tool_type.as_str(),
            &self.policy,
            cancellation_token,
            |e: &ToolInvocationError| e.classify().is_retryable(),
            || ToolInvocationError::Timeout,
            |attempt| {
                let attempt_id = AttemptId::new(context.conversation_id, context.turn, tool_type, attempt);
                let service = Arc::clone(&self.service);
                let body = &body;
                async move { service.invoke(tool_type, body, &attempt_id).await }
            },
        )
        .await;

        let duration_ms = u64::try_from(started.elapsed().as_millis()).unwrap_or(u64::MAX);
        let response = match outcome {
            RetryOutcome::Succeeded { value, attempts } => {
                ToolResponse::success(tool_type, value).with_attempts(attempts)
            }
            RetryOutcome::Failed { error, attempts } => {
                ToolResponse::failure(tool_type, error.to_tool_error()).with_attempts(attempts)
            }
            RetryOutcome::Cancelled => return Err(ExecutionCancelled),
        }
        .with_duration_ms(duration_ms);

        info!(
            "{} finished: success={} attempts={} duration={}ms",
            tool_type, response.success, response.attempts, duration_ms
        );
        Ok(response)
    }
}
