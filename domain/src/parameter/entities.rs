//! Parameter entities

use super::value_objects::{ParameterValue, Provenance};
use crate::tool::entities::{ToolType, clamp_unit};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// A populated parameter with provenance and confidence
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ParameterField {
    pub name: String,
    pub value: ParameterValue,
    pub provenance: Provenance,
    /// Confidence in [0, 1]
    pub confidence: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reasoning: Option<String>,
    /// Turn in which the value was first established
    pub established_turn: u32,
}

impl ParameterField {
    /// Create a field; confidence is clamped into [0, 1].
    pub fn new(
        name: impl Into<String>,
        value: impl Into<ParameterValue>,
        provenance: Provenance,
        confidence: f64,
    ) -> Self {
        Self {
            name: name.into(),
            value: value.into(),
            provenance,
            confidence: clamp_unit(confidence),
            reasoning: None,
            established_turn: 0,
        }
    }

    pub fn with_reasoning(mut self, reasoning: impl Into<String>) -> Self {
        self.reasoning = Some(reasoning.into());
        self
    }

    pub fn with_reasoning_opt(mut self, reasoning: Option<String>) -> Self {
        self.reasoning = reasoning;
        self
    }

    pub fn established_in(mut self, turn: u32) -> Self {
        self.established_turn = turn;
        self
    }
}

/// Merged parameter set for one turn, keyed by field name.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExtractionResult {
    tool_type: ToolType,
    turn: u32,
    fields: BTreeMap<String, ParameterField>,
    aggregate_confidence: f64,
}

impl ExtractionResult {
    pub fn new(
        tool_type: ToolType,
        turn: u32,
        fields: impl IntoIterator<Item = ParameterField>,
        aggregate_confidence: f64,
    ) -> Self {
        Self {
            tool_type,
            turn,
            fields: fields.into_iter().map(|f| (f.name.clone(), f)).collect(),
            aggregate_confidence: clamp_unit(aggregate_confidence),
        }
    }

    pub fn tool_type(&self) -> ToolType {
        self.tool_type
    }

    /// Turn that produced this result
    pub fn turn(&self) -> u32 {
        self.turn
    }

    pub fn aggregate_confidence(&self) -> f64 {
        self.aggregate_confidence
    }

    pub fn get(&self, name: &str) -> Option<&ParameterField> {
        self.fields.get(name)
    }

    pub fn value(&self, name: &str) -> Option<&ParameterValue> {
        self.fields.get(name).map(|f| &f.value)
    }

    pub fn fields(&self) -> impl Iterator<Item = &ParameterField> {
        self.fields.values()
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    pub fn with_provenance(&self, provenance: Provenance) -> impl Iterator<Item = &ParameterField> {
        self.fields.values().filter(move |f| f.provenance == provenance)
    }

    pub fn count_by(&self, provenance: Provenance) -> usize {
        self.with_provenance(provenance).count()
    }

    /// Field name → JSON value map (for logging and analytics payloads).
    pub fn values_json(&self) -> serde_json::Value {
        serde_json::Value::Object(
            self.fields
                .iter()
                .map(|(k, f)| (k.clone(), f.value.to_json()))
                .collect(),
        )
    }
}
