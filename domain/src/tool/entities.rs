//! Tool domain entities

use crate::core::error::DomainError;
use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// The closed set of downstream content-generation tools
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ToolType {
    /// Structured study notes
    NoteMaker,
    /// Q&A flashcards for practice
    FlashcardGenerator,
    /// Explanations with examples
    ConceptExplainer,
}

impl ToolType {
    pub const ALL: [ToolType; 3] = [
        ToolType::NoteMaker,
        ToolType::FlashcardGenerator,
        ToolType::ConceptExplainer,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            ToolType::NoteMaker => "note_maker",
            ToolType::FlashcardGenerator => "flashcard_generator",
            ToolType::ConceptExplainer => "concept_explainer",
        }
    }

    pub fn display_name(&self) -> &'static str {
        match self {
            ToolType::NoteMaker => "Note Maker",
            ToolType::FlashcardGenerator => "Flashcard Generator",
            ToolType::ConceptExplainer => "Concept Explainer",
        }
    }

    /// What the tool produces, phrased for the learner
    pub fn offering(&self) -> &'static str {
        match self {
            ToolType::NoteMaker => "study notes",
            ToolType::FlashcardGenerator => "practice flashcards",
            ToolType::ConceptExplainer => "an explanation of a concept",
        }
    }

    /// Path of the tool's endpoint on the tool service
    pub fn endpoint_path(&self) -> &'static str {
        match self {
            ToolType::NoteMaker => "/api/note-maker",
            ToolType::FlashcardGenerator => "/api/flashcard-generator",
            ToolType::ConceptExplainer => "/api/concept-explainer",
        }
    }
}

impl std::fmt::Display for ToolType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for ToolType {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.trim().to_lowercase().replace(['-', ' '], "_");
        ToolType::ALL
            .into_iter()
            .find(|t| t.as_str() == normalized)
            .ok_or_else(|| DomainError::UnknownToolType(s.to_string()))
    }
}

/// Intent picked by the classifier: a tool, or "unclear"
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Intent {
    Tool(ToolType),
    Unclear,
}

impl Intent {
    pub fn tool(&self) -> Option<ToolType> {
        match self {
            Intent::Tool(t) => Some(*t),
            Intent::Unclear => None,
        }
    }
}

impl std::fmt::Display for Intent {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Intent::Tool(t) => write!(f, "{}", t),
            Intent::Unclear => write!(f, "unclear"),
        }
    }
}

/// Output of intent classification
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IntentClassification {
    pub intent: Intent,
    /// Confidence in [0, 1]
    pub confidence: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reasoning: Option<String>,
}

impl IntentClassification {
    /// Create a classification; confidence is clamped into [0, 1].
    pub fn new(intent: Intent, confidence: f64) -> Self {
        Self {
            intent,
            confidence: clamp_unit(confidence),
            reasoning: None,
        }
    }

    pub fn tool(tool: ToolType, confidence: f64) -> Self {
        Self::new(Intent::Tool(tool), confidence)
    }

    pub fn unclear(confidence: f64) -> Self {
        Self::new(Intent::Unclear, confidence)
    }

    pub fn with_reasoning(mut self, reasoning: impl Into<String>) -> Self {
        self.reasoning = Some(reasoning.into());
        self
    }

    /// The tool to route to, if the classification clears `threshold`.
    pub fn resolved_tool(&self, threshold: f64) -> Option<ToolType> {
        if self.confidence >= threshold {
            self.intent.tool()
        } else {
            None
        }
    }
}

pub(crate) fn clamp_unit(value: f64) -> f64 {
    if value.is_nan() { 0.0 } else { value.clamp(0.0, 1.0) }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tool_type_from_str() {
        assert_eq!("note_maker".parse::<ToolType>().unwrap(), ToolType::NoteMaker);
        assert_eq!(
            "Flashcard-Generator".parse::<ToolType>().unwrap(),
            ToolType::FlashcardGenerator
        );
        assert_eq!(
            " concept explainer ".parse::<ToolType>().unwrap(),
            ToolType::ConceptExplainer
        );
        assert!(matches!(
            "quiz".parse::<ToolType>(),
            Err(DomainError::UnknownToolType(_))
        ));
    }

    #[test]
    fn test_tool_type_serde_snake_case() {
        let json = serde_json::to_string(&ToolType::FlashcardGenerator).unwrap();
        assert_eq!(json, "\"flashcard_generator\"");
    }

    #[test]
    fn test_resolved_tool_respects_threshold() {
        let c = IntentClassification::tool(ToolType::NoteMaker, 0.8);
        assert_eq!(c.resolved_tool(0.5), Some(ToolType::NoteMaker));
        assert_eq!(c.resolved_tool(0.9), None);
        assert_eq!(IntentClassification::unclear(1.0).resolved_tool(0.1), None);
    }

    #[test]
    fn test_confidence_clamped() {
        assert_eq!(IntentClassification::unclear(1.7).confidence, 1.0);
        assert_eq!(IntentClassification::unclear(-0.2).confidence, 0.0);
        assert_eq!(IntentClassification::unclear(f64::NAN).confidence, 0.0);
    }
}
