//! Workflow state and the pure transition function

use super::event::{ClarificationKind, NextStep, WorkflowEvent};
use super::outcome::{FailureReason, TerminalOutcome, WorkflowFailure};
use super::stage::WorkflowStage;
use crate::clarification::ClarificationRequest;
use crate::core::error::TransitionError;
use crate::parameter::ExtractionResult;
use crate::tool::{IntentClassification, ToolResponse, ToolType};
use crate::validation::ValidationResult;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Routing and ceiling parameters of the state machine
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct WorkflowPolicy {
    pub intent_confidence_threshold: f64,
    pub max_clarification_attempts: u32,
}

impl Default for WorkflowPolicy {
    fn default() -> Self {
        Self {
            intent_confidence_threshold: 0.5,
            max_clarification_attempts: 3,
        }
    }
}

/// One applied transition
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProcessingLogEntry {
    pub turn: u32,
    pub event: String,
    /// Stage entered by the transition
    pub stage: WorkflowStage,
    pub outcome: String,
    pub duration_ms: u64,
}

/// Per-conversation workflow state.
///
/// Owned by exactly one turn at a time. Fields are private; the only way to
/// change them is [`WorkflowState::apply`].
#[derive(Debug, Clone, PartialEq)]
pub struct WorkflowState {
    pub(super) conversation_id: String,
    pub(super) stage: WorkflowStage,
    pub(super) turn: u32,
    pub(super) clarification_attempts: u32,
    pub(super) message: String,
    pub(super) intent: Option<IntentClassification>,
    pub(super) extraction: Option<ExtractionResult>,
    pub(super) validation: Option<ValidationResult>,
    pub(super) clarification: Option<String>,
    pub(super) pending_clarification: Option<ClarificationRequest>,
    pub(super) log: Vec<ProcessingLogEntry>,
    pub(super) outcome: Option<TerminalOutcome>,
}

impl WorkflowState {
    pub fn new(conversation_id: impl Into<String>) -> Self {
        Self {
            conversation_id: conversation_id.into(),
            stage: WorkflowStage::Start,
            turn: 0,
            clarification_attempts: 0,
            message: String::new(),
            intent: None,
            extraction: None,
            validation: None,
            clarification: None,
            pending_clarification: None,
            log: Vec::new(),
            outcome: None,
        }
    }

    pub fn conversation_id(&self) -> &str {
        &self.conversation_id
    }

    pub fn stage(&self) -> WorkflowStage {
        self.stage
    }

    /// Number of turns started in this conversation
    pub fn turn(&self) -> u32 {
        self.turn
    }

    pub fn clarification_attempts(&self) -> u32 {
        self.clarification_attempts
    }

    /// The learner message of the current turn
    pub fn message(&self) -> &str {
        &self.message
    }

    pub fn intent(&self) -> Option<&IntentClassification> {
        self.intent.as_ref()
    }

    /// Latest extraction; survives turn boundaries as the History input.
    pub fn extraction(&self) -> Option<&ExtractionResult> {
        self.extraction.as_ref()
    }

    pub fn validation(&self) -> Option<&ValidationResult> {
        self.validation.as_ref()
    }

    /// Clarification question raised in the current turn
    pub fn clarification(&self) -> Option<&str> {
        self.clarification.as_deref()
    }

    /// Fields the current clarification asks about
    pub fn pending_clarification(&self) -> Option<&ClarificationRequest> {
        self.pending_clarification.as_ref()
    }

    pub fn log(&self) -> &[ProcessingLogEntry] {
        &self.log
    }

    pub fn last_entry(&self) -> Option<&ProcessingLogEntry> {
        self.log.last()
    }

    pub fn outcome(&self) -> Option<&TerminalOutcome> {
        self.outcome.as_ref()
    }

    pub fn needs_clarification(&self) -> bool {
        self.stage == WorkflowStage::Clarifying
    }

    pub fn tool_response(&self) -> Option<&ToolResponse> {
        match &self.outcome {
            Some(TerminalOutcome::Completed(response)) => Some(response),
            Some(TerminalOutcome::Failed(failure)) => failure.tool_response.as_ref(),
            None => None,
        }
    }

    pub fn failure(&self) -> Option<&WorkflowFailure> {
        match &self.outcome {
            Some(TerminalOutcome::Failed(failure)) => Some(failure),
            _ => None,
        }
    }

    /// Tool chosen by the classifier, if it cleared `threshold`
    pub fn resolved_tool(&self, threshold: f64) -> Option<ToolType> {
        self.intent.as_ref().and_then(|i| i.resolved_tool(threshold))
    }

    /// What the controller must do next.
    pub fn next_step(&self, policy: &WorkflowPolicy) -> NextStep {
        let ceiling_reached = self.clarification_attempts >= policy.max_clarification_attempts;
        match self.stage {
            WorkflowStage::Start => NextStep::ClassifyIntent,
            WorkflowStage::IntentClassified => {
                match self.resolved_tool(policy.intent_confidence_threshold) {
                    Some(tool) => NextStep::ExtractParameters(tool),
                    None if ceiling_reached => NextStep::Escalate,
                    None => NextStep::Clarify(ClarificationKind::Disambiguation),
                }
            }
            WorkflowStage::ParametersExtracted => match &self.extraction {
                Some(extraction) => NextStep::Validate(extraction.tool_type()),
                None => NextStep::Escalate,
            },
            WorkflowStage::Validated => {
                let ok = self.validation.as_ref().is_some_and(|v| v.ok);
                match (&self.extraction, ok) {
                    (Some(extraction), true) => NextStep::Execute(extraction.tool_type()),
                    _ if ceiling_reached => NextStep::Escalate,
                    _ => NextStep::Clarify(ClarificationKind::MissingParameters),
                }
            }
            WorkflowStage::Executing => NextStep::AwaitTool,
            WorkflowStage::Clarifying => NextStep::AwaitUser,
            WorkflowStage::Completed | WorkflowStage::Failed => NextStep::Done,
        }
    }

    /// Apply one event, producing the next state.
    ///
    /// `elapsed` is the time spent producing the event and is recorded in
    /// the processing log.
    pub fn apply(
        mut self,
        event: WorkflowEvent,
        elapsed: Duration,
        policy: &WorkflowPolicy,
    ) -> Result<Self, TransitionError> {
        let name = event.name();
        let invalid = |stage| TransitionError::InvalidTransition { stage, event: name };

        let outcome = match (self.stage, event) {
            (stage, WorkflowEvent::TurnStarted { message }) => {
                let fresh = stage == WorkflowStage::Start && self.turn == 0;
                if !fresh && !stage.accepts_new_turn() {
                    return Err(TransitionError::TurnInProgress(stage));
                }
                if stage.is_terminal() {
                    self.clarification_attempts = 0;
                    self.outcome = None;
                }
                self.turn += 1;
                self.message = message;
                self.intent = None;
                self.validation = None;
                self.clarification = None;
                self.pending_clarification = None;
                self.stage = WorkflowStage::Start;
                format!("turn {} started", self.turn)
            }

            (WorkflowStage::Start, WorkflowEvent::IntentClassified(classification)) => {
                let outcome = format!(
                    "{} ({:.2})",
                    classification.intent, classification.confidence
                );
                self.intent = Some(classification);
                self.stage = WorkflowStage::IntentClassified;
                outcome
            }

            (WorkflowStage::IntentClassified, WorkflowEvent::ParametersExtracted(extraction)) => {
                let expected = self
                    .resolved_tool(policy.intent_confidence_threshold)
                    .ok_or(TransitionError::IntentNotResolved)?;
                if extraction.tool_type() != expected {
                    return Err(TransitionError::ToolMismatch {
                        expected,
                        found: extraction.tool_type(),
                    });
                }
                let outcome = format!(
                    "{} fields, aggregate confidence {:.2}",
                    extraction.len(),
                    extraction.aggregate_confidence()
                );
                self.extraction = Some(extraction);
                self.stage = WorkflowStage::ParametersExtracted;
                outcome
            }

            (WorkflowStage::ParametersExtracted, WorkflowEvent::Validated(validation)) => {
                let outcome = if validation.ok {
                    "ok".to_string()
                } else {
                    format!("{} violation(s)", validation.total_violations)
                };
                self.validation = Some(validation);
                self.stage = WorkflowStage::Validated;
                outcome
            }

            (WorkflowStage::Validated, WorkflowEvent::ExecutionStarted) => {
                if !self.validation.as_ref().is_some_and(|v| v.ok) {
                    return Err(TransitionError::ValidationFailed);
                }
                self.stage = WorkflowStage::Executing;
                match &self.extraction {
                    Some(e) => format!("executing {}", e.tool_type()),
                    None => return Err(invalid(WorkflowStage::Validated)),
                }
            }

            (
                stage @ (WorkflowStage::IntentClassified | WorkflowStage::Validated),
                WorkflowEvent::ClarificationIssued { kind, text, request },
            ) => {
                let expected = match stage {
                    WorkflowStage::IntentClassified => ClarificationKind::Disambiguation,
                    _ => ClarificationKind::MissingParameters,
                };
                let needed = match stage {
                    WorkflowStage::IntentClassified => self
                        .resolved_tool(policy.intent_confidence_threshold)
                        .is_none(),
                    _ => !self.validation.as_ref().is_some_and(|v| v.ok),
                };
                if kind != expected || !needed {
                    return Err(TransitionError::NothingToClarify);
                }
                if self.clarification_attempts >= policy.max_clarification_attempts {
                    return Err(TransitionError::CeilingReached(self.clarification_attempts));
                }
                self.clarification_attempts += 1;
                self.clarification = Some(text);
                self.pending_clarification = request;
                self.stage = WorkflowStage::Clarifying;
                format!(
                    "clarification {}/{}",
                    self.clarification_attempts, policy.max_clarification_attempts
                )
            }

            (
                WorkflowStage::IntentClassified | WorkflowStage::Validated,
                WorkflowEvent::Escalated,
            ) => {
                if self.clarification_attempts < policy.max_clarification_attempts {
                    return Err(TransitionError::CeilingNotReached {
                        attempts: self.clarification_attempts,
                        max: policy.max_clarification_attempts,
                    });
                }
                let failure = WorkflowFailure::new(FailureReason::NeedsHumanReview);
                self.fail(failure)
            }

            (WorkflowStage::Executing, WorkflowEvent::ToolFinished(response)) => {
                if response.success {
                    let outcome = format!("success after {} attempt(s)", response.attempts);
                    self.outcome = Some(TerminalOutcome::Completed(response));
                    self.stage = WorkflowStage::Completed;
                    outcome
                } else {
                    let failure = WorkflowFailure::new(FailureReason::for_tool_failure(&response))
                        .with_tool_response(response);
                    self.fail(failure)
                }
            }

            (stage, WorkflowEvent::Aborted(failure)) if !stage.accepts_new_turn() => {
                self.fail(failure)
            }

            (stage, _) => return Err(invalid(stage)),
        };

        self.log.push(ProcessingLogEntry {
            turn: self.turn,
            event: name.to_string(),
            stage: self.stage,
            outcome,
            duration_ms: u64::try_from(elapsed.as_millis()).unwrap_or(u64::MAX),
        });
        Ok(self)
    }

    fn fail(&mut self, failure: WorkflowFailure) -> String {
        let outcome = failure.reason.as_str().to_string();
        self.outcome = Some(TerminalOutcome::Failed(failure));
        self.stage = WorkflowStage::Failed;
        outcome
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parameter::{ParameterField, Provenance};
    use crate::tool::ToolError;
    use crate::validation::{Violation, ViolationKind};
    use serde_json::json;

    fn policy() -> WorkflowPolicy {
        WorkflowPolicy::default()
    }

    fn step(state: WorkflowState, event: WorkflowEvent) -> WorkflowState {
        state.apply(event, Duration::from_millis(1), &policy()).unwrap()
    }

    fn started(message: &str) -> WorkflowEvent {
        WorkflowEvent::TurnStarted {
            message: message.to_string(),
        }
    }

    fn extraction() -> ExtractionResult {
        ExtractionResult::new(
            ToolType::NoteMaker,
            1,
            vec![ParameterField::new("subject", "History", Provenance::Explicit, 1.0)],
            1.0,
        )
    }

    fn failed_validation() -> ValidationResult {
        ValidationResult {
            ok: false,
            violations: vec![Violation {
                field: "topic".to_string(),
                kind: ViolationKind::MissingRequiredField,
                detail: "'topic' is required".to_string(),
                expected: "string".to_string(),
            }],
            total_violations: 1,
        }
    }

    fn clarify(text: &str) -> WorkflowEvent {
        WorkflowEvent::ClarificationIssued {
            kind: ClarificationKind::MissingParameters,
            text: text.to_string(),
            request: None,
        }
    }

    /// Runs one failing turn and returns the state at Validated.
    fn to_failed_validation(state: WorkflowState) -> WorkflowState {
        let state = step(state, started("notes please"));
        let state = step(
            state,
            WorkflowEvent::IntentClassified(IntentClassification::tool(ToolType::NoteMaker, 0.9)),
        );
        let state = step(state, WorkflowEvent::ParametersExtracted(extraction()));
        step(state, WorkflowEvent::Validated(failed_validation()))
    }

    #[test]
    fn test_happy_path() {
        let state = WorkflowState::new("c1");
        assert_eq!(state.next_step(&policy()), NextStep::ClassifyIntent);
        let state = step(state, started("notes"));
        let state = step(
            state,
            WorkflowEvent::IntentClassified(IntentClassification::tool(ToolType::NoteMaker, 0.9)),
        );
        assert_eq!(state.next_step(&policy()), NextStep::ExtractParameters(ToolType::NoteMaker));
        let state = step(state, WorkflowEvent::ParametersExtracted(extraction()));
        assert_eq!(state.next_step(&policy()), NextStep::Validate(ToolType::NoteMaker));
        let state = step(state, WorkflowEvent::Validated(ValidationResult::valid()));
        assert_eq!(state.next_step(&policy()), NextStep::Execute(ToolType::NoteMaker));
        let state = step(state, WorkflowEvent::ExecutionStarted);
        let state = step(
            state,
            WorkflowEvent::ToolFinished(ToolResponse::success(ToolType::NoteMaker, json!({}))),
        );
        assert_eq!(state.stage(), WorkflowStage::Completed);
        assert_eq!(state.next_step(&policy()), NextStep::Done);
        assert!(state.tool_response().unwrap().success);
        assert_eq!(state.log().len(), 6);
        assert!(state.log().iter().all(|e| e.duration_ms == 1 && e.turn == 1));
    }

    #[test]
    fn test_uncertain_intent_routes_to_disambiguation() {
        let state = step(WorkflowState::new("c1"), started("hmm"));
        let state = step(
            state,
            WorkflowEvent::IntentClassified(IntentClassification::tool(ToolType::NoteMaker, 0.2)),
        );
        assert_eq!(
            state.next_step(&policy()),
            NextStep::Clarify(ClarificationKind::Disambiguation)
        );
        // Extraction against an unresolved tool is refused.
        let err = state
            .clone()
            .apply(WorkflowEvent::ParametersExtracted(extraction()), Duration::ZERO, &policy())
            .unwrap_err();
        assert_eq!(err, TransitionError::IntentNotResolved);

        let state = step(
            state,
            WorkflowEvent::ClarificationIssued {
                kind: ClarificationKind::Disambiguation,
                text: "Which tool?".to_string(),
                request: None,
            },
        );
        assert!(state.needs_clarification());
        assert_eq!(state.clarification_attempts(), 1);
    }

    #[test]
    fn test_ceiling_escalates_on_fourth_failure() {
        let mut state = WorkflowState::new("c1");
        for attempt in 1..=3 {
            state = to_failed_validation(state);
            assert_eq!(
                state.next_step(&policy()),
                NextStep::Clarify(ClarificationKind::MissingParameters)
            );
            state = step(state, clarify("Which topic?"));
            assert_eq!(state.clarification_attempts(), attempt);
        }

        state = to_failed_validation(state);
        assert_eq!(state.next_step(&policy()), NextStep::Escalate);
        let err = state
            .clone()
            .apply(clarify("Which topic?"), Duration::ZERO, &policy())
            .unwrap_err();
        assert_eq!(err, TransitionError::CeilingReached(3));

        let state = step(state, WorkflowEvent::Escalated);
        assert_eq!(state.stage(), WorkflowStage::Failed);
        assert_eq!(state.failure().unwrap().reason, FailureReason::NeedsHumanReview);
        assert_eq!(state.clarification(), None);
    }

    #[test]
    fn test_extraction_survives_turn_boundary() {
        let state = to_failed_validation(WorkflowState::new("c1"));
        let state = step(state, clarify("Which topic?"));
        let state = step(state, started("photosynthesis"));
        assert_eq!(state.turn(), 2);
        assert_eq!(state.stage(), WorkflowStage::Start);
        assert!(state.extraction().is_some());
        assert!(state.validation().is_none());
        assert!(state.clarification().is_none());
        assert_eq!(state.clarification_attempts(), 1);
    }

    #[test]
    fn test_new_turn_after_completion_resets_attempts() {
        let state = to_failed_validation(WorkflowState::new("c1"));
        let state = step(state, clarify("Which topic?"));
        let state = step(state, started("cells"));
        let state = step(
            state,
            WorkflowEvent::IntentClassified(IntentClassification::tool(ToolType::NoteMaker, 0.9)),
        );
        let state = step(state, WorkflowEvent::ParametersExtracted(extraction()));
        let state = step(state, WorkflowEvent::Validated(ValidationResult::valid()));
        let state = step(state, WorkflowEvent::ExecutionStarted);
        let state = step(
            state,
            WorkflowEvent::ToolFinished(ToolResponse::success(ToolType::NoteMaker, json!({}))),
        );
        let state = step(state, started("now flashcards"));
        assert_eq!(state.clarification_attempts(), 0);
        assert!(state.outcome().is_none());
    }

    #[test]
    fn test_mid_turn_restart_is_rejected() {
        let state = step(WorkflowState::new("c1"), started("notes"));
        let err = state.apply(started("again"), Duration::ZERO, &policy()).unwrap_err();
        assert_eq!(err, TransitionError::TurnInProgress(WorkflowStage::Start));
    }

    #[test]
    fn test_execution_requires_ok_validation() {
        let state = to_failed_validation(WorkflowState::new("c1"));
        let err = state
            .apply(WorkflowEvent::ExecutionStarted, Duration::ZERO, &policy())
            .unwrap_err();
        assert_eq!(err, TransitionError::ValidationFailed);
    }

    #[test]
    fn test_tool_failure_kinds() {
        let run = |response: ToolResponse| {
            let state = step(WorkflowState::new("c1"), started("notes"));
            let state = step(
                state,
                WorkflowEvent::IntentClassified(IntentClassification::tool(ToolType::NoteMaker, 0.9)),
            );
            let state = step(state, WorkflowEvent::ParametersExtracted(extraction()));
            let state = step(state, WorkflowEvent::Validated(ValidationResult::valid()));
            let state = step(state, WorkflowEvent::ExecutionStarted);
            step(state, WorkflowEvent::ToolFinished(response))
        };

        let state = run(ToolResponse::failure(ToolType::NoteMaker, ToolError::permanent("bad")));
        assert_eq!(state.failure().unwrap().reason, FailureReason::ToolPermanentFailure);
        assert!(state.tool_response().is_some());

        let state = run(ToolResponse::failure(ToolType::NoteMaker, ToolError::transient("503")));
        assert_eq!(state.failure().unwrap().reason, FailureReason::ToolRetriesExhausted);
    }

    #[test]
    fn test_abort_from_any_active_stage() {
        let state = step(WorkflowState::new("c1"), started("notes"));
        let state = step(
            state,
            WorkflowEvent::Aborted(WorkflowFailure::new(FailureReason::Cancelled)),
        );
        assert_eq!(state.stage(), WorkflowStage::Failed);
        assert_eq!(state.last_entry().unwrap().outcome, "cancelled");

        let err = state
            .apply(
                WorkflowEvent::Aborted(WorkflowFailure::new(FailureReason::Cancelled)),
                Duration::ZERO,
                &policy(),
            )
            .unwrap_err();
        assert!(matches!(err, TransitionError::InvalidTransition { .. }));
    }
}
