//! Generate Clarification use case.
//!
//! Produces the question for a failed validation. NLU phrasing is tried
//! once within a time budget; anything unusable falls back to the
//! deterministic template, so a question is always produced.

use crate::ports::nlu_gateway::NluGateway;
use std::sync::Arc;
use std::time::Duration;
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};
use tutor_domain::{ClarificationRequest, ClarificationTemplate, ConversationTurn, ToolSchema};

/// Clarification generation was cancelled
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ClarificationCancelled;

pub struct GenerateClarificationUseCase {
    nlu: Arc<dyn NluGateway>,
    timeout: Duration,
}

impl GenerateClarificationUseCase {
    pub fn new(nlu: Arc<dyn NluGateway>, timeout: Duration) -> Self {
        Self { nlu, timeout }
    }

    /// Question naming every field of `request`.
    pub async fn execute(
        &self,
        request: &ClarificationRequest,
        schema: &ToolSchema,
        history: &[ConversationTurn],
        cancellation_token: &Option<CancellationToken>,
    ) -> Result<String, ClarificationCancelled> {
        let phrasing = tokio::time::timeout(
            self.timeout,
            self.nlu.generate_clarification_text(request, history),
        );
        let result = match cancellation_token {
            Some(token) => tokio::select! {
                biased;
                _ = token.cancelled() => return Err(ClarificationCancelled),
                result = phrasing => result,
            },
            None => phrasing.await,
        };

        match result {
            Ok(Ok(text)) if ClarificationTemplate::satisfies_contract(&text, request, schema) => {
                debug!("Using NLU phrasing for clarification of {}", ClarificationTemplate::summary(request));
                Ok(text)
            }
            Ok(Ok(_)) => {
                warn!("NLU clarification did not name exactly the requested fields; using template");
                Ok(ClarificationTemplate::render(request))
            }
            Ok(Err(e)) => {
                debug!("NLU clarification unavailable ({}); using template", e);
                Ok(ClarificationTemplate::render(request))
            }
            Err(_elapsed) => {
                warn!("NLU clarification timed out after {:?}; using template", self.timeout);
                Ok(ClarificationTemplate::render(request))
            }
        }
    }

    /// Question asked when the tool is uncertain.
    pub fn disambiguation(&self) -> String {
        ClarificationTemplate::disambiguation()
    }
}
