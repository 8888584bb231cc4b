//! Typed tool requests
//!
//! A validated [`ExtractionResult`] is converted into a strongly typed
//! per-tool record before it crosses the tool-service boundary. Conversion
//! re-checks every field and fails with [`DomainError::InvalidRequestField`]
//! instead of panicking, so a caller that skipped validation still gets an
//! error rather than a malformed call.

use super::entities::ToolType;
use crate::conversation::ConversationTurn;
use crate::core::error::DomainError;
use crate::parameter::{ExtractionResult, ParameterValue};
use crate::profile::UserProfile;
use serde::{Deserialize, Serialize};
use std::str::FromStr;

macro_rules! closed_set {
    ($(#[$meta:meta])* $name:ident { $($variant:ident => $text:literal),+ $(,)? }) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        #[serde(rename_all = "snake_case")]
        pub enum $name {
            $($variant),+
        }

        impl $name {
            pub const ALL: &'static [$name] = &[$($name::$variant),+];

            pub fn as_str(&self) -> &'static str {
                match self {
                    $($name::$variant => $text),+
                }
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                write!(f, "{}", self.as_str())
            }
        }

        impl FromStr for $name {
            type Err = String;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                let normalized = s.trim().to_lowercase().replace(['-', ' '], "_");
                $name::ALL
                    .iter()
                    .copied()
                    .find(|v| v.as_str() == normalized)
                    .ok_or_else(|| format!("'{}' is not a valid {}", s, stringify!($name)))
            }
        }
    };
}

closed_set!(
    /// Note layout
    NoteTakingStyle {
        Outline => "outline",
        BulletPoints => "bullet_points",
        Narrative => "narrative",
        Structured => "structured",
    }
);

closed_set!(
    /// Flashcard difficulty, easiest first
    Difficulty {
        Easy => "easy",
        Medium => "medium",
        Hard => "hard",
    }
);

closed_set!(
    /// Explanation depth, shallowest first
    Depth {
        Basic => "basic",
        Intermediate => "intermediate",
        Advanced => "advanced",
        Comprehensive => "comprehensive",
    }
);

impl Difficulty {
    pub fn easier(self) -> Self {
        match self {
            Difficulty::Hard => Difficulty::Medium,
            _ => Difficulty::Easy,
        }
    }
}

impl Depth {
    pub fn shallower(self) -> Self {
        match self {
            Depth::Comprehensive => Depth::Advanced,
            Depth::Advanced => Depth::Intermediate,
            _ => Depth::Basic,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NoteMakerRequest {
    pub topic: String,
    pub subject: String,
    pub note_taking_style: NoteTakingStyle,
    pub include_examples: bool,
    pub include_analogies: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FlashcardRequest {
    pub topic: String,
    pub count: u32,
    pub difficulty: Difficulty,
    pub subject: String,
    pub include_examples: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConceptExplainerRequest {
    pub concept_to_explain: String,
    pub current_topic: String,
    pub desired_depth: Depth,
}

/// Parameters of one tool call
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "tool_type", rename_all = "snake_case")]
pub enum ToolRequest {
    NoteMaker(NoteMakerRequest),
    FlashcardGenerator(FlashcardRequest),
    ConceptExplainer(ConceptExplainerRequest),
}

impl ToolRequest {
    pub fn tool_type(&self) -> ToolType {
        match self {
            ToolRequest::NoteMaker(_) => ToolType::NoteMaker,
            ToolRequest::FlashcardGenerator(_) => ToolType::FlashcardGenerator,
            ToolRequest::ConceptExplainer(_) => ToolType::ConceptExplainer,
        }
    }

    /// Build the typed record from a merged extraction.
    pub fn from_extraction(extraction: &ExtractionResult) -> Result<Self, DomainError> {
        let fields = Fields {
            tool: extraction.tool_type(),
            extraction,
        };
        let request = match fields.tool {
            ToolType::NoteMaker => ToolRequest::NoteMaker(NoteMakerRequest {
                topic: fields.text("topic")?,
                subject: fields.text("subject")?,
                note_taking_style: fields.choice("note_taking_style")?,
                include_examples: fields.flag("include_examples")?,
                include_analogies: fields.flag("include_analogies")?,
            }),
            ToolType::FlashcardGenerator => {
                let count = fields.integer("count")?;
                let count = u32::try_from(count)
                    .ok()
                    .filter(|c| (1..=20).contains(c))
                    .ok_or_else(|| fields.invalid("count", format!("{} is outside 1..=20", count)))?;
                ToolRequest::FlashcardGenerator(FlashcardRequest {
                    topic: fields.text("topic")?,
                    count,
                    difficulty: fields.choice("difficulty")?,
                    subject: fields.text("subject")?,
                    include_examples: fields.flag("include_examples")?,
                })
            }
            ToolType::ConceptExplainer => ToolRequest::ConceptExplainer(ConceptExplainerRequest {
                concept_to_explain: fields.text("concept_to_explain")?,
                current_topic: fields.text("current_topic")?,
                desired_depth: fields.choice("desired_depth")?,
            }),
        };
        Ok(request)
    }

    /// JSON body for the tool service: parameters, profile and (where the
    /// tool uses it) the chat history.
    pub fn to_body(&self, profile: &UserProfile, history: &[ConversationTurn]) -> serde_json::Value {
        let mut body = match self {
            ToolRequest::NoteMaker(r) => serde_json::to_value(r),
            ToolRequest::FlashcardGenerator(r) => serde_json::to_value(r),
            ToolRequest::ConceptExplainer(r) => serde_json::to_value(r),
        }
        .unwrap_or_else(|_| serde_json::json!({}));

        if let Some(obj) = body.as_object_mut() {
            obj.insert(
                "user_info".to_string(),
                serde_json::to_value(profile).unwrap_or(serde_json::Value::Null),
            );
            if self.tool_type() != ToolType::FlashcardGenerator {
                obj.insert(
                    "chat_history".to_string(),
                    serde_json::to_value(history).unwrap_or_else(|_| serde_json::json!([])),
                );
            }
        }
        body
    }
}

struct Fields<'a> {
    tool: ToolType,
    extraction: &'a ExtractionResult,
}

impl Fields<'_> {
    fn invalid(&self, field: &str, detail: impl Into<String>) -> DomainError {
        DomainError::InvalidRequestField {
            tool: self.tool,
            field: field.to_string(),
            detail: detail.into(),
        }
    }

    fn value(&self, field: &str) -> Option<&ParameterValue> {
        self.extraction.value(field)
    }

    fn text(&self, field: &str) -> Result<String, DomainError> {
        match self.value(field) {
            Some(ParameterValue::Text(s)) if !s.trim().is_empty() => Ok(s.trim().to_string()),
            Some(ParameterValue::Text(_)) | None => Err(self.invalid(field, "missing")),
            Some(other) => Err(self.invalid(field, format!("expected string, got {}", other.type_name()))),
        }
    }

    fn integer(&self, field: &str) -> Result<i64, DomainError> {
        match self.value(field) {
            Some(ParameterValue::Integer(i)) => Ok(*i),
            None => Err(self.invalid(field, "missing")),
            Some(other) => Err(self.invalid(field, format!("expected integer, got {}", other.type_name()))),
        }
    }

    /// Optional flags default to `false` when absent.
    fn flag(&self, field: &str) -> Result<bool, DomainError> {
        match self.value(field) {
            Some(ParameterValue::Boolean(b)) => Ok(*b),
            None => Ok(false),
            Some(other) => Err(self.invalid(field, format!("expected boolean, got {}", other.type_name()))),
        }
    }

    fn choice<T: FromStr<Err = String>>(&self, field: &str) -> Result<T, DomainError> {
        let text = self.text(field)?;
        text.parse::<T>().map_err(|e| self.invalid(field, e))
    }
}
