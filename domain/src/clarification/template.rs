use crate::core::string::{mentions_identifier, truncate};
use crate::parameter::{ExplicitField, ParameterValue};
use crate::tool::{Constraint, IntentClassification, ToolSchema, ToolType};
use crate::validation::{ValidationResult, ViolationKind};
use serde::{Deserialize, Serialize};

/// Longest bare reply read as a field value
const MAX_ANSWER_CHARS: usize = 80;

/// One field the learner is asked about
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClarificationField {
    pub name: String,
    pub kind: ViolationKind,
    /// Requirement, e.g. `string, one of: easy, medium, hard`
    pub expected: String,
    pub description: String,
    pub detail: String,
}

/// Input to clarification phrasing
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClarificationRequest {
    pub tool_type: ToolType,
    pub fields: Vec<ClarificationField>,
    /// The learner's latest message
    pub context: String,
}

impl ClarificationRequest {
    /// Build from the reported (capped) violations only.
    pub fn from_validation(
        validation: &ValidationResult,
        schema: &ToolSchema,
        context: impl Into<String>,
    ) -> Self {
        let fields = validation
            .violations
            .iter()
            .map(|v| ClarificationField {
                name: v.field.clone(),
                kind: v.kind,
                expected: v.expected.clone(),
                description: schema
                    .field(&v.field)
                    .map(|f| f.description.clone())
                    .unwrap_or_default(),
                detail: v.detail.clone(),
            })
            .collect();
        Self {
            tool_type: schema.tool_type,
            fields,
            context: context.into(),
        }
    }

    pub fn field_names(&self) -> impl Iterator<Item = &str> {
        self.fields.iter().map(|f| f.name.as_str())
    }

    /// The only field asked about, when the question named exactly one.
    pub fn single_field(&self) -> Option<&ClarificationField> {
        match self.fields.as_slice() {
            [field] => Some(field),
            _ => None,
        }
    }

    /// Keep routing to the tool being asked about when `classified` does
    /// not name a tool above `threshold` on its own.
    pub fn continue_intent(
        &self,
        classified: IntentClassification,
        threshold: f64,
    ) -> IntentClassification {
        if classified.resolved_tool(threshold).is_some() {
            return classified;
        }
        IntentClassification::tool(self.tool_type, threshold.max(classified.confidence))
            .with_reasoning(format!(
                "reply to the pending question about {}",
                self.field_names().collect::<Vec<_>>().join(", ")
            ))
    }

    /// Read a bare reply as the value of the single field asked about.
    ///
    /// `None` when several fields were asked for, or when the reply does not
    /// fit the field's type and constraint.
    pub fn answer_from_reply(&self, reply: &str, schema: &ToolSchema) -> Option<ExplicitField> {
        if schema.tool_type != self.tool_type {
            return None;
        }
        let asked = self.single_field()?;
        let descriptor = schema.field(&asked.name)?;

        let text = reply.trim().trim_end_matches(['.', '!', '?']).trim();
        if text.is_empty() || text.chars().count() > MAX_ANSWER_CHARS {
            return None;
        }
        let text = match descriptor.constraint {
            Some(Constraint::OneOf { .. }) => text.to_lowercase().replace(['-', ' '], "_"),
            _ => text.to_string(),
        };
        let value = descriptor.field_type.coerce(ParameterValue::Text(text));
        let fits = descriptor.field_type.matches(&value)
            && descriptor.constraint.as_ref().is_none_or(|c| c.check(&value));

        fits.then(|| {
            ExplicitField::new(asked.name.as_str(), value)
                .with_reasoning(format!("reply to the question about {}", asked.name))
        })
    }
}

/// Deterministic question templates
pub struct ClarificationTemplate;

impl ClarificationTemplate {
    /// Lists every field with its requirement verbatim.
    pub fn render(request: &ClarificationRequest) -> String {
        let mut text = format!(
            "To prepare {} I need a little more information:",
            request.tool_type.offering()
        );
        for field in &request.fields {
            let line = match field.kind {
                ViolationKind::MissingRequiredField => {
                    format!("\n- {} ({}): {}", field.name, field.expected, field.description)
                }
                ViolationKind::TypeMismatch | ViolationKind::RangeViolation => format!(
                    "\n- {} ({}): {}; {}",
                    field.name, field.expected, field.description, field.detail
                ),
            };
            text.push_str(&line);
        }
        text
    }

    /// Question asked when the tool could not be determined.
    pub fn disambiguation() -> String {
        let options: Vec<String> = ToolType::ALL
            .iter()
            .map(|t| format!("{} ({})", t.offering(), t.as_str()))
            .collect();
        format!(
            "I'm not sure which kind of help you need. I can help with {}. Which would you like?",
            options.join(", or ")
        )
    }

    /// Whether externally phrased `text` is usable for `request`.
    ///
    /// It must mention every requested field and no other field of `schema`.
    pub fn satisfies_contract(text: &str, request: &ClarificationRequest, schema: &ToolSchema) -> bool {
        if text.trim().is_empty() {
            return false;
        }
        let all_named = request.field_names().all(|name| mentions_identifier(text, name));
        let none_fabricated = schema
            .field_names()
            .filter(|name| !request.field_names().any(|r| r == *name))
            .all(|name| !mentions_identifier(text, name));
        all_named && none_fabricated
    }

    /// Short form for logs.
    pub fn summary(request: &ClarificationRequest) -> String {
        truncate(&request.field_names().collect::<Vec<_>>().join(", "), 80)
    }
}
