//! Classify Intent use case.
//!
//! Wraps the NLU capability's intent classification with a bounded history
//! window and the capability retry policy.

use crate::config::RetryPolicy;
use crate::ports::nlu_gateway::{GatewayError, NluGateway};
use crate::use_cases::shared::{RetryOutcome, call_with_retry};
use std::sync::Arc;
use thiserror::Error;
use tokio_util::sync::CancellationToken;
use tracing::info;
use tutor_domain::core::string::truncate;
use tutor_domain::{ConversationTurn, IntentClassification, UserProfile, history_window};

/// Failure of an NLU capability call after the retry budget
#[derive(Error, Debug, Clone, PartialEq)]
pub enum CapabilityError {
    #[error("Cancelled")]
    Cancelled,

    #[error("NLU capability unavailable after {attempts} attempt(s): {last_error}")]
    Unavailable {
        attempts: u32,
        last_error: GatewayError,
    },
}

pub struct ClassifyIntentUseCase {
    nlu: Arc<dyn NluGateway>,
    retry: RetryPolicy,
    history_window: usize,
}

impl ClassifyIntentUseCase {
    pub fn new(nlu: Arc<dyn NluGateway>, retry: RetryPolicy, history_window: usize) -> Self {
        Self {
            nlu,
            retry,
            history_window,
        }
    }

    pub async fn execute(
        &self,
        message: &str,
        profile: &UserProfile,
        history: &[ConversationTurn],
        cancellation_token: &Option<CancellationToken>,
    ) -> Result<IntentClassification, CapabilityError> {
        let window = history_window(history, self.history_window);
        let outcome = call_with_retry(
            "classify_intent",
            &self.retry,
            cancellation_token,
            GatewayError::is_transient,
            || GatewayError::Timeout,
            |_| self.nlu.classify_intent(message, profile, window),
        )
        .await;

        match outcome {
            RetryOutcome::Succeeded { value, .. } => {
                info!(
                    "Classified '{}' as {} ({:.2})",
                    truncate(message, 60),
                    value.intent,
                    value.confidence
                );
                Ok(value)
            }
            RetryOutcome::Failed { error, attempts } => Err(CapabilityError::Unavailable {
                attempts,
                last_error: error,
            }),
            RetryOutcome::Cancelled => Err(CapabilityError::Cancelled),
        }
    }
}
