//! Output formatter trait

use tutor_domain::WorkflowState;

/// Trait for formatting the state left behind by a turn
pub trait OutputFormatter {
    /// Every stage: intent, parameters, validation, outcome and log
    fn format(&self, state: &WorkflowState) -> String;

    /// Versioned snapshot as JSON
    fn format_json(&self, state: &WorkflowState) -> String;

    /// Only what the learner should see next
    fn format_reply(&self, state: &WorkflowState) -> String;
}
