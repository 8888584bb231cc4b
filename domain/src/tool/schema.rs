//! Tool schema registry
//!
//! Static per-tool field contracts. The registry is built once and is
//! read-only afterwards; every lookup hands out shared references.

use super::entities::ToolType;
use crate::core::error::DomainError;
use crate::parameter::ParameterValue;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Declared type of a schema field
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FieldType {
    String,
    Integer,
    Boolean,
}

impl FieldType {
    pub fn as_str(&self) -> &'static str {
        match self {
            FieldType::String => "string",
            FieldType::Integer => "integer",
            FieldType::Boolean => "boolean",
        }
    }

    pub fn matches(&self, value: &ParameterValue) -> bool {
        matches!(
            (self, value),
            (FieldType::String, ParameterValue::Text(_))
                | (FieldType::Integer, ParameterValue::Integer(_))
                | (FieldType::Boolean, ParameterValue::Boolean(_))
        )
    }

    /// Lossless coercion of a literal into this type.
    ///
    /// Numeric text becomes an integer, `"true"`/`"false"` become booleans,
    /// integers render as text for string fields. Anything else is returned
    /// unchanged so the validator can report the mismatch.
    pub fn coerce(&self, value: ParameterValue) -> ParameterValue {
        match (self, value) {
            (FieldType::Integer, ParameterValue::Text(s)) => match s.trim().parse::<i64>() {
                Ok(i) => ParameterValue::Integer(i),
                Err(_) => ParameterValue::Text(s),
            },
            (FieldType::Boolean, ParameterValue::Text(s)) => {
                match s.trim().to_lowercase().as_str() {
                    "true" | "yes" => ParameterValue::Boolean(true),
                    "false" | "no" => ParameterValue::Boolean(false),
                    _ => ParameterValue::Text(s),
                }
            }
            (FieldType::String, ParameterValue::Integer(i)) => ParameterValue::Text(i.to_string()),
            (_, other) => other,
        }
    }
}

impl std::fmt::Display for FieldType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Value constraint beyond the base type
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Constraint {
    /// Inclusive integer range
    Range { min: i64, max: i64 },
    /// Closed enumeration of allowed text values
    OneOf { values: Vec<String> },
}

impl Constraint {
    pub fn one_of(values: &[&str]) -> Self {
        Constraint::OneOf {
            values: values.iter().map(|v| v.to_string()).collect(),
        }
    }

    /// `true` when the value satisfies the constraint.
    ///
    /// Values of the wrong shape pass; type checking is the validator's job.
    pub fn check(&self, value: &ParameterValue) -> bool {
        match (self, value) {
            (Constraint::Range { min, max }, ParameterValue::Integer(i)) => (*min..=*max).contains(i),
            (Constraint::OneOf { values }, ParameterValue::Text(s)) => {
                let s = s.trim();
                values.iter().any(|v| v.eq_ignore_ascii_case(s))
            }
            _ => true,
        }
    }

    pub fn describe(&self) -> String {
        match self {
            Constraint::Range { min, max } => format!("between {} and {}", min, max),
            Constraint::OneOf { values } => format!("one of: {}", values.join(", ")),
        }
    }
}

/// A single field contract
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FieldDescriptor {
    pub name: String,
    pub field_type: FieldType,
    pub required: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub constraint: Option<Constraint>,
    /// Short human description used in clarification questions
    pub description: String,
}

impl FieldDescriptor {
    pub fn required(name: &str, field_type: FieldType, description: &str) -> Self {
        Self {
            name: name.to_string(),
            field_type,
            required: true,
            constraint: None,
            description: description.to_string(),
        }
    }

    pub fn optional(name: &str, field_type: FieldType, description: &str) -> Self {
        Self {
            required: false,
            ..Self::required(name, field_type, description)
        }
    }

    pub fn with_constraint(mut self, constraint: Constraint) -> Self {
        self.constraint = Some(constraint);
        self
    }

    /// e.g. `integer, between 1 and 20` or `string, one of: easy, medium, hard`
    pub fn describe_requirement(&self) -> String {
        match &self.constraint {
            Some(c) => format!("{}, {}", self.field_type, c.describe()),
            None => self.field_type.to_string(),
        }
    }
}

/// Ordered field contract for one tool type
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToolSchema {
    pub tool_type: ToolType,
    pub fields: Vec<FieldDescriptor>,
}

impl ToolSchema {
    pub fn new(tool_type: ToolType, fields: Vec<FieldDescriptor>) -> Self {
        Self { tool_type, fields }
    }

    pub fn field(&self, name: &str) -> Option<&FieldDescriptor> {
        self.fields.iter().find(|f| f.name == name)
    }

    pub fn has_field(&self, name: &str) -> bool {
        self.field(name).is_some()
    }

    pub fn required_fields(&self) -> impl Iterator<Item = &FieldDescriptor> {
        self.fields.iter().filter(|f| f.required)
    }

    pub fn field_names(&self) -> impl Iterator<Item = &str> {
        self.fields.iter().map(|f| f.name.as_str())
    }
}

/// Read-only lookup of schemas by tool type
#[derive(Debug, Clone)]
pub struct SchemaRegistry {
    schemas: HashMap<ToolType, ToolSchema>,
}

impl SchemaRegistry {
    pub fn new(schemas: impl IntoIterator<Item = ToolSchema>) -> Self {
        Self {
            schemas: schemas.into_iter().map(|s| (s.tool_type, s)).collect(),
        }
    }

    /// Registry with the contracts of the three built-in tools
    pub fn builtin() -> Self {
        use FieldType::*;

        let note_maker = ToolSchema::new(
            ToolType::NoteMaker,
            vec![
                FieldDescriptor::required("topic", String, "the topic the notes should cover"),
                FieldDescriptor::required("subject", String, "the subject area"),
                FieldDescriptor::required("note_taking_style", String, "how the notes are laid out")
                    .with_constraint(Constraint::one_of(&[
                        "outline",
                        "bullet_points",
                        "narrative",
                        "structured",
                    ])),
                FieldDescriptor::optional("include_examples", Boolean, "whether to add worked examples"),
                FieldDescriptor::optional("include_analogies", Boolean, "whether to add analogies"),
            ],
        );

        let flashcards = ToolSchema::new(
            ToolType::FlashcardGenerator,
            vec![
                FieldDescriptor::required("topic", String, "the topic to practice"),
                FieldDescriptor::required("count", Integer, "how many flashcards to make")
                    .with_constraint(Constraint::Range { min: 1, max: 20 }),
                FieldDescriptor::required("difficulty", String, "how hard the cards should be")
                    .with_constraint(Constraint::one_of(&["easy", "medium", "hard"])),
                FieldDescriptor::required("subject", String, "the subject area"),
                FieldDescriptor::optional("include_examples", Boolean, "whether to add examples"),
            ],
        );

        let explainer = ToolSchema::new(
            ToolType::ConceptExplainer,
            vec![
                FieldDescriptor::required("concept_to_explain", String, "the concept you want explained"),
                FieldDescriptor::required("current_topic", String, "the topic you are studying"),
                FieldDescriptor::required("desired_depth", String, "how deep the explanation should go")
                    .with_constraint(Constraint::one_of(&[
                        "basic",
                        "intermediate",
                        "advanced",
                        "comprehensive",
                    ])),
            ],
        );

        Self::new([note_maker, flashcards, explainer])
    }

    pub fn get(&self, tool_type: ToolType) -> Option<&ToolSchema> {
        self.schemas.get(&tool_type)
    }

    pub fn schema(&self, tool_type: ToolType) -> Result<&ToolSchema, DomainError> {
        self.get(tool_type)
            .ok_or(DomainError::SchemaNotFound(tool_type))
    }
}

impl Default for SchemaRegistry {
    fn default() -> Self {
        Self::builtin()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builtin_covers_every_tool() {
        let registry = SchemaRegistry::builtin();
        for tool in ToolType::ALL {
            let schema = registry.schema(tool).unwrap();
            assert_eq!(schema.tool_type, tool);
            assert!(schema.required_fields().count() >= 3);
        }
    }

    #[test]
    fn test_flashcard_field_order() {
        let registry = SchemaRegistry::builtin();
        let schema = registry.schema(ToolType::FlashcardGenerator).unwrap();
        let names: Vec<&str> = schema.field_names().collect();
        assert_eq!(
            names,
            vec!["topic", "count", "difficulty", "subject", "include_examples"]
        );
    }

    #[test]
    fn test_empty_registry_reports_missing_schema() {
        let registry = SchemaRegistry::new(Vec::new());
        assert_eq!(
            registry.schema(ToolType::NoteMaker),
            Err(DomainError::SchemaNotFound(ToolType::NoteMaker))
        );
    }

    #[test]
    fn test_coerce() {
        assert_eq!(FieldType::Integer.coerce("12".into()), ParameterValue::Integer(12));
        assert_eq!(FieldType::Integer.coerce("a dozen".into()), ParameterValue::Text("a dozen".into()));
        assert_eq!(FieldType::Boolean.coerce("True".into()), ParameterValue::Boolean(true));
        assert_eq!(FieldType::String.coerce(ParameterValue::Integer(7)), ParameterValue::Text("7".into()));
        assert_eq!(FieldType::String.coerce(ParameterValue::Boolean(true)), ParameterValue::Boolean(true));
    }

    #[test]
    fn test_constraints() {
        let range = Constraint::Range { min: 1, max: 20 };
        assert!(range.check(&ParameterValue::Integer(20)));
        assert!(!range.check(&ParameterValue::Integer(0)));
        assert!(!range.check(&ParameterValue::Integer(21)));

        let levels = Constraint::one_of(&["easy", "medium", "hard"]);
        assert!(levels.check(&"Medium".into()));
        assert!(!levels.check(&"extreme".into()));
        assert_eq!(levels.describe(), "one of: easy, medium, hard");
    }

    #[test]
    fn test_describe_requirement() {
        let registry = SchemaRegistry::builtin();
        let schema = registry.schema(ToolType::FlashcardGenerator).unwrap();
        assert_eq!(
            schema.field("count").unwrap().describe_requirement(),
            "integer, between 1 and 20"
        );
        assert_eq!(schema.field("topic").unwrap().describe_requirement(), "string");
    }
}
