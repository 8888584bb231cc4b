use crate::core::error::DomainError;
use crate::parameter::ExtractionResult;
use crate::tool::{FieldDescriptor, ToolSchema};
use serde::{Deserialize, Serialize};

/// Default cap on reported violations
pub const DEFAULT_MAX_VIOLATIONS: usize = 5;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ViolationKind {
    MissingRequiredField,
    TypeMismatch,
    RangeViolation,
}

impl ViolationKind {
    pub fn as_str(&self) -> &str {
        match self {
            ViolationKind::MissingRequiredField => "missing_required_field",
            ViolationKind::TypeMismatch => "type_mismatch",
            ViolationKind::RangeViolation => "range_violation",
        }
    }
}

impl std::fmt::Display for ViolationKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Violation {
    pub field: String,
    pub kind: ViolationKind,
    pub detail: String,
    /// Requirement of the field, e.g. `integer, between 1 and 20`
    pub expected: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ValidationResult {
    pub ok: bool,
    /// Reported violations, in schema order, at most the configured cap
    pub violations: Vec<Violation>,
    /// Violations found, including those dropped by the cap
    pub total_violations: usize,
}

impl ValidationResult {
    pub fn valid() -> Self {
        Self {
            ok: true,
            violations: Vec::new(),
            total_violations: 0,
        }
    }

    pub fn is_truncated(&self) -> bool {
        self.total_violations > self.violations.len()
    }

    pub fn fields(&self) -> impl Iterator<Item = &str> {
        self.violations.iter().map(|v| v.field.as_str())
    }
}

#[derive(Debug, Clone, Copy)]
pub struct SchemaValidator {
    max_violations: usize,
}

impl Default for SchemaValidator {
    fn default() -> Self {
        Self::new(DEFAULT_MAX_VIOLATIONS)
    }
}

impl SchemaValidator {
    pub fn new(max_violations: usize) -> Self {
        Self { max_violations }
    }

    pub fn max_violations(&self) -> usize {
        self.max_violations
    }

    /// Validate `extraction` against `schema`.
    ///
    /// Fails only when the extraction was produced for another tool.
    pub fn validate(
        &self,
        extraction: &ExtractionResult,
        schema: &ToolSchema,
    ) -> Result<ValidationResult, DomainError> {
        if extraction.tool_type() != schema.tool_type {
            return Err(DomainError::SchemaMismatch {
                extraction: extraction.tool_type(),
                schema: schema.tool_type,
            });
        }

        let found: Vec<Violation> = schema
            .fields
            .iter()
            .filter_map(|descriptor| check_field(descriptor, extraction))
            .collect();

        let total_violations = found.len();
        let violations = found.into_iter().take(self.max_violations).collect();
        Ok(ValidationResult {
            ok: total_violations == 0,
            violations,
            total_violations,
        })
    }
}

/// At most one violation per field: missing, then type, then constraint.
fn check_field(descriptor: &FieldDescriptor, extraction: &ExtractionResult) -> Option<Violation> {
    let violation = |kind, detail: String| Violation {
        field: descriptor.name.clone(),
        kind,
        detail,
        expected: descriptor.describe_requirement(),
    };

    let value = match extraction.value(&descriptor.name) {
        Some(v) if !v.is_blank() => v,
        _ if descriptor.required => {
            return Some(violation(
                ViolationKind::MissingRequiredField,
                format!("'{}' is required", descriptor.name),
            ));
        }
        _ => return None,
    };

    if !descriptor.field_type.matches(value) {
        return Some(violation(
            ViolationKind::TypeMismatch,
            format!(
                "expected {}, got {} '{}'",
                descriptor.field_type,
                value.type_name(),
                value
            ),
        ));
    }

    match &descriptor.constraint {
        Some(constraint) if !constraint.check(value) => Some(violation(
            ViolationKind::RangeViolation,
            format!("'{}' is not {}", value, constraint.describe()),
        )),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parameter::{ParameterField, ParameterValue, Provenance};
    use crate::tool::{SchemaRegistry, ToolType};

    fn extraction(tool: ToolType, fields: Vec<(&str, ParameterValue)>) -> ExtractionResult {
        ExtractionResult::new(
            tool,
            1,
            fields
                .into_iter()
                .map(|(n, v)| ParameterField::new(n, v, Provenance::Explicit, 1.0)),
            1.0,
        )
    }

    fn schema(tool: ToolType) -> ToolSchema {
        SchemaRegistry::builtin().schema(tool).unwrap().clone()
    }

    #[test]
    fn test_complete_extraction_is_ok() {
        let e = extraction(
            ToolType::FlashcardGenerator,
            vec![
                ("topic", "photosynthesis".into()),
                ("count", 5i64.into()),
                ("difficulty", "medium".into()),
                ("subject", "Biology".into()),
            ],
        );
        let result = SchemaValidator::default()
            .validate(&e, &schema(ToolType::FlashcardGenerator))
            .unwrap();
        assert!(result.ok);
        assert!(result.violations.is_empty());
    }

    #[test]
    fn test_missing_topic_for_note_maker() {
        let e = extraction(
            ToolType::NoteMaker,
            vec![("subject", "History".into()), ("note_taking_style", "outline".into())],
        );
        let result = SchemaValidator::default()
            .validate(&e, &schema(ToolType::NoteMaker))
            .unwrap();
        assert!(!result.ok);
        assert_eq!(result.violations.len(), 1);
        assert_eq!(result.violations[0].field, "topic");
        assert_eq!(result.violations[0].kind, ViolationKind::MissingRequiredField);
    }

    #[test]
    fn test_missing_fields_reported_in_schema_order() {
        let e = extraction(ToolType::FlashcardGenerator, vec![("difficulty", "easy".into())]);
        let result = SchemaValidator::default()
            .validate(&e, &schema(ToolType::FlashcardGenerator))
            .unwrap();
        let fields: Vec<&str> = result.fields().collect();
        assert_eq!(fields, vec!["topic", "count", "subject"]);
    }

    #[test]
    fn test_does_not_short_circuit() {
        let e = extraction(
            ToolType::FlashcardGenerator,
            vec![
                ("count", "twelve".into()),
                ("difficulty", "extreme".into()),
                ("subject", "Biology".into()),
                ("include_examples", 3i64.into()),
            ],
        );
        let result = SchemaValidator::default()
            .validate(&e, &schema(ToolType::FlashcardGenerator))
            .unwrap();
        let kinds: Vec<(&str, ViolationKind)> = result
            .violations
            .iter()
            .map(|v| (v.field.as_str(), v.kind))
            .collect();
        assert_eq!(
            kinds,
            vec![
                ("topic", ViolationKind::MissingRequiredField),
                ("count", ViolationKind::TypeMismatch),
                ("difficulty", ViolationKind::RangeViolation),
                ("include_examples", ViolationKind::TypeMismatch),
            ]
        );
    }

    #[test]
    fn test_range_violation() {
        let e = extraction(
            ToolType::FlashcardGenerator,
            vec![
                ("topic", "cells".into()),
                ("count", 25i64.into()),
                ("difficulty", "easy".into()),
                ("subject", "Biology".into()),
            ],
        );
        let result = SchemaValidator::default()
            .validate(&e, &schema(ToolType::FlashcardGenerator))
            .unwrap();
        assert_eq!(result.violations[0].kind, ViolationKind::RangeViolation);
        assert_eq!(result.violations[0].expected, "integer, between 1 and 20");
    }

    #[test]
    fn test_cap_does_not_change_ok() {
        let e = extraction(ToolType::FlashcardGenerator, vec![]);
        let result = SchemaValidator::new(2)
            .validate(&e, &schema(ToolType::FlashcardGenerator))
            .unwrap();
        assert!(!result.ok);
        assert_eq!(result.violations.len(), 2);
        assert_eq!(result.total_violations, 4);
        assert!(result.is_truncated());
    }

    #[test]
    fn test_schema_mismatch() {
        let e = extraction(ToolType::NoteMaker, vec![]);
        let err = SchemaValidator::default()
            .validate(&e, &schema(ToolType::ConceptExplainer))
            .unwrap_err();
        assert!(matches!(err, DomainError::SchemaMismatch { .. }));
    }
}
