use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WorkflowStage {
    Start,
    IntentClassified,
    ParametersExtracted,
    Validated,
    Executing,
    Clarifying,
    Completed,
    Failed,
}

impl WorkflowStage {
    pub fn as_str(&self) -> &'static str {
        match self {
            WorkflowStage::Start => "start",
            WorkflowStage::IntentClassified => "intent_classified",
            WorkflowStage::ParametersExtracted => "parameters_extracted",
            WorkflowStage::Validated => "validated",
            WorkflowStage::Executing => "executing",
            WorkflowStage::Clarifying => "clarifying",
            WorkflowStage::Completed => "completed",
            WorkflowStage::Failed => "failed",
        }
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, WorkflowStage::Completed | WorkflowStage::Failed)
    }

    /// Stages in which a turn has ended and the next one may begin.
    pub fn accepts_new_turn(&self) -> bool {
        matches!(
            self,
            WorkflowStage::Clarifying | WorkflowStage::Completed | WorkflowStage::Failed
        )
    }
}

impl std::fmt::Display for WorkflowStage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
