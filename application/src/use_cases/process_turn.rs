//! Process Turn use case: the workflow controller.
//!
//! Drives one conversation turn through the [`WorkflowState`] machine:
//!
//! ```text
//! TurnStarted → classify → extract → validate → execute        → Completed | Failed
//!                   │                    └──── clarify         → Clarifying
//!                   └── (uncertain) ──────── disambiguate      → Clarifying
//!                                          (ceiling) escalate  → Failed
//! ```
//!
//! Stages run strictly in sequence. The only awaits are the NLU and
//! tool-service calls, both of which honour the cancellation token.
//! Each applied transition is reported to the injected
//! [`WorkflowObserver`].

use crate::config::OrchestratorConfig;
use crate::ports::nlu_gateway::NluGateway;
use crate::ports::tool_service::ToolServicePort;
use crate::ports::workflow_observer::{NoObserver, StageObservation, WorkflowObserver};
use crate::use_cases::classify_intent::{CapabilityError, ClassifyIntentUseCase};
use crate::use_cases::execute_tool::{ExecutionContext, ToolExecutionClient};
use crate::use_cases::extract_parameters::{
    ExtractParametersError, ExtractParametersInput, ExtractParametersUseCase,
};
use crate::use_cases::generate_clarification::GenerateClarificationUseCase;
use crate::use_cases::shared::is_cancelled;
use std::sync::Arc;
use std::time::Instant;
use thiserror::Error;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};
use tutor_domain::{
    ClarificationKind, ClarificationRequest, ConversationTurn, DomainError, FailureReason,
    NextStep, SchemaRegistry, SchemaValidator, ToolRequest, TransitionError, UserProfile,
    WorkflowEvent, WorkflowFailure, WorkflowPolicy, WorkflowStage, WorkflowState,
    history_window,
};

/// Errors that indicate a controller bug or unusable input.
///
/// Learner-facing failures are never errors; they end the turn in
/// [`WorkflowStage::Failed`] with a [`FailureReason`].
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ProcessTurnError {
    #[error("Invalid workflow transition: {0}")]
    Transition(#[from] TransitionError),

    #[error("Domain error: {0}")]
    Domain(#[from] DomainError),

    #[error("Prior state belongs to conversation '{found}', not '{expected}'")]
    ConversationMismatch { expected: String, found: String },

    #[error("Workflow stalled in stage {0}")]
    Stalled(WorkflowStage),
}

/// Input for the [`ProcessTurnUseCase`].
#[derive(Debug, Clone)]
pub struct ProcessTurnInput {
    pub conversation_id: String,
    pub message: String,
    pub profile: UserProfile,
    /// Prior turns, oldest first
    pub history: Vec<ConversationTurn>,
    /// State restored from the previous turn, if any
    pub prior_state: Option<WorkflowState>,
    pub cancellation_token: Option<CancellationToken>,
}

impl ProcessTurnInput {
    pub fn new(
        conversation_id: impl Into<String>,
        message: impl Into<String>,
        profile: UserProfile,
    ) -> Self {
        Self {
            conversation_id: conversation_id.into(),
            message: message.into(),
            profile,
            history: Vec::new(),
            prior_state: None,
            cancellation_token: None,
        }
    }

    pub fn with_history(mut self, history: Vec<ConversationTurn>) -> Self {
        self.history = history;
        self
    }

    pub fn with_prior_state(mut self, state: Option<WorkflowState>) -> Self {
        self.prior_state = state;
        self
    }

    pub fn with_cancellation(mut self, token: CancellationToken) -> Self {
        self.cancellation_token = Some(token);
        self
    }
}

/// Use case for processing one conversation turn.
///
/// Holds no per-conversation state; one instance can serve any number of
/// concurrent conversations.
pub struct ProcessTurnUseCase {
    classifier: ClassifyIntentUseCase,
    extractor: ExtractParametersUseCase,
    clarifier: GenerateClarificationUseCase,
    executor: ToolExecutionClient,
    registry: Arc<SchemaRegistry>,
    validator: SchemaValidator,
    policy: WorkflowPolicy,
    extraction_history_window: usize,
    observer: Arc<dyn WorkflowObserver>,
}

impl ProcessTurnUseCase {
    pub fn new(
        nlu: Arc<dyn NluGateway>,
        tools: Arc<dyn ToolServicePort>,
        config: &OrchestratorConfig,
    ) -> Self {
        let registry = Arc::new(SchemaRegistry::builtin());
        Self {
            classifier: ClassifyIntentUseCase::new(
                nlu.clone(),
                config.capability_retry,
                config.classification_history_window,
            ),
            extractor: ExtractParametersUseCase::new(
                nlu.clone(),
                config.inference_engine(),
                registry.clone(),
                config.capability_retry,
                config.extraction_history_window,
            ),
            clarifier: GenerateClarificationUseCase::new(nlu, config.clarification_timeout),
            executor: ToolExecutionClient::new(tools, config.execution),
            registry,
            validator: SchemaValidator::new(config.max_violations),
            policy: config.workflow_policy(),
            extraction_history_window: config.extraction_history_window,
            observer: Arc::new(NoObserver),
        }
    }

    /// Create with a workflow observer.
    pub fn with_observer(mut self, observer: Arc<dyn WorkflowObserver>) -> Self {
        self.observer = observer;
        self
    }

    pub fn policy(&self) -> &WorkflowPolicy {
        &self.policy
    }

    pub async fn execute(&self, input: ProcessTurnInput) -> Result<WorkflowState, ProcessTurnError> {
        let ProcessTurnInput {
            conversation_id,
            message,
            profile,
            history,
            prior_state,
            cancellation_token: token,
        } = input;

        let state = match prior_state {
            Some(state) if state.conversation_id() != conversation_id => {
                return Err(ProcessTurnError::ConversationMismatch {
                    expected: conversation_id,
                    found: state.conversation_id().to_string(),
                });
            }
            Some(state) => state,
            None => WorkflowState::new(&conversation_id),
        };

        let window = history_window(&history, self.extraction_history_window);
        // Cleared by TurnStarted; the reply is read against it.
        let pending = state.pending_clarification().cloned();
        let mut state = self.advance(
            state,
            WorkflowEvent::TurnStarted {
                message: message.clone(),
            },
            Instant::now(),
        )?;
        info!(
            "Processing turn {} of conversation {}",
            state.turn(),
            state.conversation_id()
        );

        loop {
            let step = state.next_step(&self.policy);
            if matches!(step, NextStep::AwaitUser | NextStep::Done) {
                break;
            }
            if is_cancelled(&token) {
                state = self.abort(state, FailureReason::Cancelled)?;
                continue;
            }
            debug!("Stage {} → {:?}", state.stage(), step);
            let started = Instant::now();

            state = match step {
                NextStep::ClassifyIntent => {
                    match self
                        .classifier
                        .execute(&message, &profile, &history, &token)
                        .await
                    {
                        Ok(classification) => {
                            let classification = match &pending {
                                Some(request) => request.continue_intent(
                                    classification,
                                    self.policy.intent_confidence_threshold,
                                ),
                                None => classification,
                            };
                            self.advance(
                                state,
                                WorkflowEvent::IntentClassified(classification),
                                started,
                            )?
                        }
                        Err(error) => self.capability_failure(state, error)?,
                    }
                }

                NextStep::ExtractParameters(tool_type) => {
                    let prior = state.extraction().cloned();
                    let input = ExtractParametersInput {
                        message: &message,
                        tool_type,
                        profile: &profile,
                        history: &history,
                        prior: prior.as_ref(),
                        pending: pending.as_ref(),
                        turn: state.turn(),
                    };
                    match self.extractor.execute(input, &token).await {
                        Ok(extraction) => self.advance(
                            state,
                            WorkflowEvent::ParametersExtracted(extraction),
                            started,
                        )?,
                        Err(ExtractParametersError::Capability(error)) => {
                            self.capability_failure(state, error)?
                        }
                        Err(ExtractParametersError::Domain(error)) => return Err(error.into()),
                    }
                }

                NextStep::Validate(tool_type) => {
                    let schema = self.registry.schema(tool_type)?;
                    let extraction = state
                        .extraction()
                        .ok_or(ProcessTurnError::Stalled(state.stage()))?;
                    let validation = self.validator.validate(extraction, schema)?;
                    if !validation.ok {
                        info!(
                            "Validation found {} violation(s): {}",
                            validation.total_violations,
                            validation.fields().collect::<Vec<_>>().join(", ")
                        );
                    }
                    self.advance(state, WorkflowEvent::Validated(validation), started)?
                }

                NextStep::Execute(_) => {
                    let extraction = state
                        .extraction()
                        .ok_or(ProcessTurnError::Stalled(state.stage()))?;
                    let request = ToolRequest::from_extraction(extraction)?;
                    let state = self.advance(state, WorkflowEvent::ExecutionStarted, started)?;

                    let started = Instant::now();
                    let context = ExecutionContext {
                        conversation_id: &conversation_id,
                        turn: state.turn(),
                        profile: &profile,
                        history: window,
                    };
                    match self.executor.execute(&request, context, &token).await {
                        Ok(response) => {
                            self.advance(state, WorkflowEvent::ToolFinished(response), started)?
                        }
                        Err(_) => self.abort(state, FailureReason::Cancelled)?,
                    }
                }

                NextStep::Clarify(ClarificationKind::Disambiguation) => {
                    let text = self.clarifier.disambiguation();
                    self.advance(
                        state,
                        WorkflowEvent::ClarificationIssued {
                            kind: ClarificationKind::Disambiguation,
                            text,
                            request: None,
                        },
                        started,
                    )?
                }

                NextStep::Clarify(ClarificationKind::MissingParameters) => {
                    let (validation, tool_type) = match (state.validation(), state.extraction()) {
                        (Some(v), Some(e)) => (v, e.tool_type()),
                        _ => return Err(ProcessTurnError::Stalled(state.stage())),
                    };
                    let schema = self.registry.schema(tool_type)?;
                    let request = ClarificationRequest::from_validation(validation, schema, &message);
                    match self
                        .clarifier
                        .execute(&request, schema, window, &token)
                        .await
                    {
                        Ok(text) => self.advance(
                            state,
                            WorkflowEvent::ClarificationIssued {
                                kind: ClarificationKind::MissingParameters,
                                text,
                                request: Some(request),
                            },
                            started,
                        )?,
                        Err(_) => self.abort(state, FailureReason::Cancelled)?,
                    }
                }

                NextStep::Escalate => {
                    warn!(
                        "Clarification ceiling of {} reached; escalating for human review",
                        self.policy.max_clarification_attempts
                    );
                    self.advance(state, WorkflowEvent::Escalated, started)?
                }

                NextStep::AwaitTool | NextStep::AwaitUser | NextStep::Done => {
                    return Err(ProcessTurnError::Stalled(state.stage()));
                }
            };
        }

        info!(
            "Turn {} ended in stage {}",
            state.turn(),
            state.stage()
        );
        Ok(state)
    }

    /// Apply `event` and report the transition.
    fn advance(
        &self,
        state: WorkflowState,
        event: WorkflowEvent,
        started: Instant,
    ) -> Result<WorkflowState, TransitionError> {
        let state = state.apply(event, started.elapsed(), &self.policy)?;
        if let Some(entry) = state.last_entry() {
            debug!("[{}] {} → {}", entry.event, entry.stage, entry.outcome);
            self.observer
                .observe(&StageObservation::from_entry(state.conversation_id(), entry));
        }
        Ok(state)
    }

    fn abort(
        &self,
        state: WorkflowState,
        reason: FailureReason,
    ) -> Result<WorkflowState, TransitionError> {
        warn!("Aborting turn {}: {}", state.turn(), reason);
        let failure = WorkflowFailure::new(reason);
        self.advance(state, WorkflowEvent::Aborted(failure), Instant::now())
    }

    fn capability_failure(
        &self,
        state: WorkflowState,
        error: CapabilityError,
    ) -> Result<WorkflowState, TransitionError> {
        match error {
            CapabilityError::Cancelled => self.abort(state, FailureReason::Cancelled),
            CapabilityError::Unavailable { .. } => {
                warn!("{}", error);
                self.abort(state, FailureReason::CapabilityUnavailable)
            }
        }
    }
}
