//! Extract Parameters use case.
//!
//! Asks the NLU capability for literal fields, then runs the four-layer
//! [`InferenceEngine`] against the tool's schema.

use crate::config::RetryPolicy;
use crate::ports::nlu_gateway::{GatewayError, NluGateway};
use crate::use_cases::classify_intent::CapabilityError;
use crate::use_cases::shared::{RetryOutcome, call_with_retry};
use std::sync::Arc;
use thiserror::Error;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};
use tutor_domain::{
    ClarificationRequest, ConversationTurn, DomainError, ExplicitField, ExtractionResult, InferenceEngine,
    InferenceInput, Provenance, SchemaRegistry, ToolType, UserProfile, history_window,
};

#[derive(Error, Debug, Clone, PartialEq)]
pub enum ExtractParametersError {
    #[error(transparent)]
    Capability(#[from] CapabilityError),

    #[error(transparent)]
    Domain(#[from] DomainError),
}

/// Input for one extraction
#[derive(Debug, Clone, Copy)]
pub struct ExtractParametersInput<'a> {
    pub message: &'a str,
    pub tool_type: ToolType,
    pub profile: &'a UserProfile,
    pub history: &'a [ConversationTurn],
    /// Previous turn's extraction, used as the History layer
    pub prior: Option<&'a ExtractionResult>,
    /// Parameter question this message answers, if one is outstanding
    pub pending: Option<&'a ClarificationRequest>,
    pub turn: u32,
}

pub struct ExtractParametersUseCase {
    nlu: Arc<dyn NluGateway>,
    engine: InferenceEngine,
    registry: Arc<SchemaRegistry>,
    retry: RetryPolicy,
    history_window: usize,
}

impl ExtractParametersUseCase {
    pub fn new(
        nlu: Arc<dyn NluGateway>,
        engine: InferenceEngine,
        registry: Arc<SchemaRegistry>,
        retry: RetryPolicy,
        history_window: usize,
    ) -> Self {
        Self {
            nlu,
            engine,
            registry,
            retry,
            history_window,
        }
    }

    pub async fn execute(
        &self,
        input: ExtractParametersInput<'_>,
        cancellation_token: &Option<CancellationToken>,
    ) -> Result<ExtractionResult, ExtractParametersError> {
        let schema = self.registry.schema(input.tool_type)?;
        let explicit = self.explicit_fields(&input, cancellation_token).await?;

        // Fields outside the schema are dropped by the engine's schema walk.
        for field in explicit.iter().filter(|f| !schema.has_field(&f.field)) {
            debug!("Ignoring explicit field '{}' not in {} schema", field.field, input.tool_type);
        }

        let extraction = self.engine.infer(
            schema,
            InferenceInput {
                message: input.message,
                profile: input.profile,
                explicit: &explicit,
                prior: input.prior,
                turn: input.turn,
            },
        );

        info!(
            "Extracted {} fields for {} (explicit {}, inferred {}, history {}, default {}; aggregate {:.2})",
            extraction.len(),
            input.tool_type,
            extraction.count_by(Provenance::Explicit),
            extraction.count_by(Provenance::Inferred),
            extraction.count_by(Provenance::History),
            extraction.count_by(Provenance::Default),
            extraction.aggregate_confidence()
        );
        Ok(extraction)
    }

    /// Literal fields from the NLU capability.
    ///
    /// A permanent capability error degrades to "nothing stated"; the
    /// remaining layers and clarification still apply.
    async fn explicit_fields(
        &self,
        input: &ExtractParametersInput<'_>,
        cancellation_token: &Option<CancellationToken>,
    ) -> Result<Vec<ExplicitField>, CapabilityError> {
        let window = history_window(input.history, self.history_window);
        let pending = input.pending.filter(|p| p.tool_type == input.tool_type);
        let outcome = call_with_retry(
            "extract_explicit",
            &self.retry,
            cancellation_token,
            GatewayError::is_transient,
            || GatewayError::Timeout,
            |_| {
                self.nlu
                    .extract_explicit(input.message, input.tool_type, input.profile, window, pending)
            },
        )
        .await;

        match outcome {
            RetryOutcome::Succeeded { value, .. } => Ok(value),
            RetryOutcome::Failed { error, .. } if !error.is_transient() => {
                warn!("Explicit extraction unavailable ({}); continuing without it", error);
                Ok(Vec::new())
            }
            RetryOutcome::Failed { error, attempts } => Err(CapabilityError::Unavailable {
                attempts,
                last_error: error,
            }),
            RetryOutcome::Cancelled => Err(CapabilityError::Cancelled),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicU32, Ordering};
    use std::time::Duration;
    use tutor_domain::{IntentClassification, ParameterValue};

    struct FixedNlu {
        explicit: Result<Vec<ExplicitField>, GatewayError>,
        calls: AtomicU32,
    }

    impl FixedNlu {
        fn new(explicit: Result<Vec<ExplicitField>, GatewayError>) -> Self {
            Self {
                explicit,
                calls: AtomicU32::new(0),
            }
        }
    }

    #[async_trait]
    impl NluGateway for FixedNlu {
        async fn classify_intent(
            &self,
            _message: &str,
            _profile: &UserProfile,
            _history: &[ConversationTurn],
        ) -> Result<IntentClassification, GatewayError> {
            Ok(IntentClassification::unclear(0.0))
        }

        async fn extract_explicit(
            &self,
            _message: &str,
            _tool_type: ToolType,
            _profile: &UserProfile,
            _history: &[ConversationTurn],
            _pending: Option<&ClarificationRequest>,
        ) -> Result<Vec<ExplicitField>, GatewayError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            self.explicit.clone()
        }

        async fn generate_clarification_text(
            &self,
            _request: &ClarificationRequest,
            _history: &[ConversationTurn],
        ) -> Result<String, GatewayError> {
            Err(GatewayError::Unsupported("phrasing".into()))
        }
    }

    fn use_case(nlu: Arc<FixedNlu>) -> ExtractParametersUseCase {
        ExtractParametersUseCase::new(
            nlu,
            InferenceEngine::default(),
            Arc::new(SchemaRegistry::builtin()),
            RetryPolicy::default().with_backoff(Duration::from_millis(1), Duration::from_millis(2)),
            10,
        )
    }

    fn input<'a>(message: &'a str, profile: &'a UserProfile) -> ExtractParametersInput<'a> {
        ExtractParametersInput {
            message,
            tool_type: ToolType::FlashcardGenerator,
            profile,
            history: &[],
            prior: None,
            pending: None,
            turn: 1,
        }
    }

    #[tokio::test]
    async fn test_explicit_fields_flow_into_extraction() {
        let nlu = Arc::new(FixedNlu::new(Ok(vec![
            ExplicitField::new("topic", "photosynthesis"),
            ExplicitField::new("count", 5i64),
            ExplicitField::new("difficulty", "medium"),
            ExplicitField::new("colour", "blue"),
        ])));
        let profile = UserProfile::new("s1", "10");

        let extraction = use_case(nlu)
            .execute(input("Create 5 flashcards on photosynthesis", &profile), &None)
            .await
            .unwrap();

        assert_eq!(extraction.value("topic"), Some(&ParameterValue::from("photosynthesis")));
        assert_eq!(extraction.count_by(Provenance::Explicit), 3);
        assert!(extraction.get("colour").is_none());
        assert_eq!(extraction.value("subject"), Some(&ParameterValue::from("General")));
    }

    #[tokio::test]
    async fn test_permanent_error_degrades_to_other_layers() {
        let nlu = Arc::new(FixedNlu::new(Err(GatewayError::MalformedResponse("{".into()))));
        let profile = UserProfile::new("s1", "10");

        let extraction = use_case(nlu.clone())
            .execute(input("I'm struggling, need practice", &profile), &None)
            .await
            .unwrap();

        assert_eq!(nlu.calls.load(Ordering::SeqCst), 1);
        assert_eq!(extraction.count_by(Provenance::Explicit), 0);
        assert_eq!(extraction.value("difficulty"), Some(&ParameterValue::from("easy")));
        assert!(extraction.get("topic").is_none());
    }

    #[tokio::test]
    async fn test_exhausted_transient_errors_are_unavailable() {
        let nlu = Arc::new(FixedNlu::new(Err(GatewayError::Timeout)));
        let profile = UserProfile::new("s1", "10");

        let err = use_case(nlu.clone())
            .execute(input("flashcards", &profile), &None)
            .await
            .unwrap_err();

        assert!(matches!(
            err,
            ExtractParametersError::Capability(CapabilityError::Unavailable { attempts: 3, .. })
        ));
        assert_eq!(nlu.calls.load(Ordering::SeqCst), 3);
    }
}
