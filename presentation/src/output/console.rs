//! Console output formatter for processed turns

use crate::output::formatter::OutputFormatter;
use colored::Colorize;
use tutor_domain::{Provenance, TerminalOutcome, WorkflowState};

/// Formats a [`WorkflowState`] for console display
pub struct ConsoleFormatter;

impl ConsoleFormatter {
    /// Format every stage of the turn
    pub fn format(state: &WorkflowState) -> String {
        let mut output = String::new();

        output.push_str(&Self::header("Tutor Orchestrator"));
        output.push('\n');

        output.push_str(&format!(
            "{} {}  {} {}  {} {}\n",
            "Conversation:".cyan().bold(),
            state.conversation_id(),
            "Turn:".cyan().bold(),
            state.turn(),
            "Stage:".cyan().bold(),
            state.stage().as_str()
        ));
        if !state.message().is_empty() {
            output.push_str(&format!("{} {}\n", "Message:".cyan().bold(), state.message()));
        }

        if let Some(intent) = state.intent() {
            output.push_str(&Self::section_header("Intent"));
            output.push_str(&format!(
                "  {} (confidence {:.2})\n",
                intent.intent.to_string().yellow().bold(),
                intent.confidence
            ));
            if let Some(reasoning) = &intent.reasoning {
                output.push_str(&format!("  {}\n", reasoning.dimmed()));
            }
        }

        if let Some(extraction) = state.extraction() {
            output.push_str(&Self::section_header(&format!(
                "Parameters: {} (aggregate {:.2})",
                extraction.tool_type(),
                extraction.aggregate_confidence()
            )));
            for field in extraction.fields() {
                let tag = format!("[{} {:.2}]", field.provenance.as_str(), field.confidence);
                let tag = match field.provenance {
                    Provenance::Explicit => tag.green(),
                    Provenance::Inferred => tag.yellow(),
                    Provenance::History => tag.blue(),
                    Provenance::Default => tag.dimmed(),
                };
                output.push_str(&format!("  {} = {} {}\n", field.name.bold(), field.value, tag));
                if let Some(reasoning) = &field.reasoning {
                    output.push_str(&format!("      {}\n", reasoning.dimmed()));
                }
            }
        }

        if let Some(validation) = state.validation() {
            output.push_str(&Self::section_header("Validation"));
            if validation.ok {
                output.push_str(&format!("  {}\n", "ok".green().bold()));
            } else {
                for violation in &validation.violations {
                    output.push_str(&format!(
                        "  {} {}: {} (expected {})\n",
                        "x".red().bold(),
                        violation.field.bold(),
                        violation.detail,
                        violation.expected
                    ));
                }
                if validation.is_truncated() {
                    output.push_str(&format!(
                        "  {}\n",
                        format!(
                            "... {} more not shown",
                            validation.total_violations - validation.violations.len()
                        )
                        .dimmed()
                    ));
                }
            }
        }

        if let Some(text) = state.clarification() {
            output.push_str(&Self::section_header(&format!(
                "Clarification (attempt {})",
                state.clarification_attempts()
            )));
            output.push_str(&format!("{}\n", Self::indent(text, "  ").yellow()));
        }

        match state.outcome() {
            Some(TerminalOutcome::Completed(response)) => {
                output.push_str(&Self::section_header("Result"));
                output.push_str(&format!(
                    "  {} {} in {} ms ({} attempt(s))\n",
                    "Completed".green().bold(),
                    response.tool_type,
                    response.duration_ms,
                    response.attempts
                ));
                if let Some(payload) = &response.payload {
                    output.push_str(&Self::indent(&Self::pretty(payload), "  "));
                    output.push('\n');
                }
            }
            Some(TerminalOutcome::Failed(failure)) => {
                output.push_str(&Self::section_header("Result"));
                output.push_str(&format!(
                    "  {} {}\n  {}\n",
                    "Failed:".red().bold(),
                    failure.reason.as_str(),
                    failure.message
                ));
                if let Some(error) = failure.tool_response.as_ref().and_then(|r| r.error.as_ref())
                {
                    output.push_str(&format!("  {}\n", error.to_string().dimmed()));
                }
            }
            None => {}
        }

        if !state.log().is_empty() {
            output.push_str(&Self::section_header("Processing Log"));
            for entry in state.log() {
                output.push_str(&format!(
                    "  {:>2} {:<22} -> {:<12} {:>5} ms  {}\n",
                    entry.turn,
                    entry.event,
                    entry.stage.as_str(),
                    entry.duration_ms,
                    entry.outcome.dimmed()
                ));
            }
        }

        output.push_str(&Self::footer());

        output
    }

    /// Format as JSON
    pub fn format_json(state: &WorkflowState) -> String {
        state
            .snapshot()
            .to_json()
            .unwrap_or_else(|_| "{}".to_string())
    }

    /// Only the learner-facing reply (concise output)
    pub fn format_reply(state: &WorkflowState) -> String {
        if let Some(text) = state.clarification() {
            return text.to_string();
        }
        match state.outcome() {
            Some(TerminalOutcome::Completed(response)) => response
                .payload
                .as_ref()
                .map(Self::pretty)
                .unwrap_or_default(),
            Some(TerminalOutcome::Failed(failure)) => failure.message.clone(),
            None => format!("(turn stopped at {})", state.stage().as_str()),
        }
    }

    fn pretty(value: &serde_json::Value) -> String {
        serde_json::to_string_pretty(value).unwrap_or_else(|_| value.to_string())
    }

    fn header(title: &str) -> String {
        let line = "=".repeat(60);
        format!("{}\n{:^60}\n{}", line.cyan(), title.bold(), line.cyan())
    }

    fn section_header(title: &str) -> String {
        format!("\n{}\n{}\n", title.cyan().bold(), "-".repeat(40))
    }

    fn footer() -> String {
        format!("\n{}\n", "=".repeat(60).cyan())
    }

    /// Indent a multi-line string
    pub fn indent(text: &str, prefix: &str) -> String {
        text.lines()
            .map(|line| format!("{}{}", prefix, line))
            .collect::<Vec<_>>()
            .join("\n")
    }
}

impl OutputFormatter for ConsoleFormatter {
    fn format(&self, state: &WorkflowState) -> String {
        Self::format(state)
    }

    fn format_json(&self, state: &WorkflowState) -> String {
        Self::format_json(state)
    }

    fn format_reply(&self, state: &WorkflowState) -> String {
        Self::format_reply(state)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;
    use tutor_domain::{
        ClarificationKind, ExtractionResult, IntentClassification, ParameterField, ToolResponse,
        ToolType, ValidationResult, Violation, ViolationKind, WorkflowEvent, WorkflowPolicy,
        WorkflowSnapshot,
    };

    fn step(state: WorkflowState, event: WorkflowEvent) -> WorkflowState {
        state
            .apply(event, Duration::from_millis(3), &WorkflowPolicy::default())
            .unwrap()
    }

    fn classified(message: &str) -> WorkflowState {
        let state = step(
            WorkflowState::new("conv-7"),
            WorkflowEvent::TurnStarted {
                message: message.to_string(),
            },
        );
        step(
            state,
            WorkflowEvent::IntentClassified(IntentClassification::tool(
                ToolType::FlashcardGenerator,
                0.9,
            )),
        )
    }

    fn extracted(message: &str) -> WorkflowState {
        let extraction = ExtractionResult::new(
            ToolType::FlashcardGenerator,
            1,
            vec![
                ParameterField::new("topic", "photosynthesis", Provenance::Explicit, 1.0),
                ParameterField::new("count", 5i64, Provenance::Default, 0.3)
                    .with_reasoning("default card count"),
            ],
            1.0,
        );
        step(classified(message), WorkflowEvent::ParametersExtracted(extraction))
    }

    fn completed() -> WorkflowState {
        let state = step(
            extracted("5 flashcards on photosynthesis"),
            WorkflowEvent::Validated(ValidationResult::valid()),
        );
        let state = step(state, WorkflowEvent::ExecutionStarted);
        let response = ToolResponse::success(
            ToolType::FlashcardGenerator,
            serde_json::json!({"flashcards": [{"question": "What is chlorophyll?"}]}),
        )
        .with_attempts(1);
        step(state, WorkflowEvent::ToolFinished(response))
    }

    fn clarifying() -> WorkflowState {
        let validation = ValidationResult {
            ok: false,
            violations: vec![Violation {
                field: "difficulty".to_string(),
                kind: ViolationKind::MissingRequiredField,
                detail: "'difficulty' is required".to_string(),
                expected: "string, one of easy, medium, hard".to_string(),
            }],
            total_violations: 1,
        };
        let state = step(extracted("flashcards please"), WorkflowEvent::Validated(validation));
        step(
            state,
            WorkflowEvent::ClarificationIssued {
                kind: ClarificationKind::MissingParameters,
                text: "Which difficulty would you like?".to_string(),
                request: None,
            },
        )
    }

    #[test]
    fn test_full_output_covers_each_stage() {
        colored::control::set_override(false);
        let output = ConsoleFormatter::format(&completed());

        assert!(output.contains("Conversation: conv-7"));
        assert!(output.contains("flashcard_generator (confidence 0.90)"));
        assert!(output.contains("topic = photosynthesis [explicit 1.00]"));
        assert!(output.contains("count = 5 [default 0.30]"));
        assert!(output.contains("default card count"));
        assert!(output.contains("Completed flashcard_generator"));
        assert!(output.contains("What is chlorophyll?"));
        assert!(output.contains("tool_finished"));
    }

    #[test]
    fn test_full_output_shows_violations_and_question() {
        colored::control::set_override(false);
        let output = ConsoleFormatter::format(&clarifying());

        assert!(output.contains("x difficulty: 'difficulty' is required"));
        assert!(output.contains("Clarification (attempt 1)"));
        assert!(output.contains("Which difficulty would you like?"));
        assert!(!output.contains("\nResult\n"));
    }

    #[test]
    fn test_reply_is_clarification_or_payload() {
        assert_eq!(
            ConsoleFormatter::format_reply(&clarifying()),
            "Which difficulty would you like?"
        );
        assert!(ConsoleFormatter::format_reply(&completed()).contains("chlorophyll"));
    }

    #[test]
    fn test_json_output_is_a_restorable_snapshot() {
        let state = clarifying();
        let json = ConsoleFormatter::format_json(&state);
        let snapshot = WorkflowSnapshot::from_json(&json).unwrap();
        let restored = WorkflowState::restore(snapshot).unwrap();
        assert_eq!(restored, state);
    }
}
