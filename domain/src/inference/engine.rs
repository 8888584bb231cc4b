//! Four-layer inference engine

use super::config::InferenceWeights;
use super::defaults::DefaultPolicy;
use super::rules::RuleTable;
use crate::core::string::tokenize;
use crate::parameter::{
    ExplicitField, ExtractionResult, ParameterField, ParameterValue, Provenance,
};
use crate::profile::UserProfile;
use crate::tool::{Constraint, FieldDescriptor, ToolSchema};

/// Everything the engine reads for one turn
#[derive(Debug, Clone, Copy)]
pub struct InferenceInput<'a> {
    pub message: &'a str,
    pub profile: &'a UserProfile,
    /// Literal values from the NLU capability
    pub explicit: &'a [ExplicitField],
    /// The previous turn's extraction, if any
    pub prior: Option<&'a ExtractionResult>,
    /// Current turn number (1-based)
    pub turn: u32,
}

#[derive(Debug, Clone, Default)]
pub struct InferenceEngine {
    rules: RuleTable,
    defaults: DefaultPolicy,
    weights: InferenceWeights,
}

impl InferenceEngine {
    pub fn new(rules: RuleTable, defaults: DefaultPolicy, weights: InferenceWeights) -> Self {
        Self {
            rules,
            defaults,
            weights,
        }
    }

    pub fn weights(&self) -> &InferenceWeights {
        &self.weights
    }

    /// Merge all layers into one result for `schema`.
    pub fn infer(&self, schema: &ToolSchema, input: InferenceInput<'_>) -> ExtractionResult {
        let tokens = tokenize(input.message);
        let fields: Vec<ParameterField> = schema
            .fields
            .iter()
            .filter_map(|descriptor| {
                self.explicit_layer(descriptor, input.explicit, input.turn)
                    .or_else(|| self.inferred_layer(descriptor, &tokens, input.turn))
                    .or_else(|| self.history_layer(schema, descriptor, input.prior, input.turn))
                    .or_else(|| self.default_layer(schema, descriptor, input.profile, input.turn))
            })
            .collect();

        let aggregate = fields
            .iter()
            .filter(|f| f.provenance.counts_toward_aggregate())
            .map(|f| f.confidence)
            .reduce(f64::min)
            .unwrap_or(self.weights.aggregate_floor);

        ExtractionResult::new(schema.tool_type, input.turn, fields, aggregate)
    }

    fn explicit_layer(
        &self,
        descriptor: &FieldDescriptor,
        explicit: &[ExplicitField],
        turn: u32,
    ) -> Option<ParameterField> {
        let found = explicit
            .iter()
            .find(|e| e.field == descriptor.name && !e.value.is_blank())?;
        let value = normalize(descriptor, found.value.clone());
        Some(
            ParameterField::new(&descriptor.name, value, Provenance::Explicit, 1.0)
                .with_reasoning(
                    found
                        .reasoning
                        .clone()
                        .unwrap_or_else(|| "stated in the message".to_string()),
                )
                .established_in(turn),
        )
    }

    fn inferred_layer(
        &self,
        descriptor: &FieldDescriptor,
        tokens: &[String],
        turn: u32,
    ) -> Option<ParameterField> {
        let matched = self.rules.first_match(&descriptor.name, tokens)?;
        let confidence = self.weights.inferred_weight * matched.rule.certainty;
        Some(
            ParameterField::new(
                &descriptor.name,
                matched.rule.value.clone(),
                Provenance::Inferred,
                confidence,
            )
            .with_reasoning(matched.reasoning())
            .established_in(turn),
        )
    }

    fn history_layer(
        &self,
        schema: &ToolSchema,
        descriptor: &FieldDescriptor,
        prior: Option<&ExtractionResult>,
        turn: u32,
    ) -> Option<ParameterField> {
        // Only a prior request for the same tool carries fields.
        let prior = prior.filter(|p| p.tool_type() == schema.tool_type)?;
        let field = prior
            .get(&descriptor.name)
            .filter(|f| f.provenance.is_carryable())?;

        let elapsed = turn.saturating_sub(prior.turn()).max(1);
        let decayed = field.confidence * self.weights.history_decay.powi(elapsed as i32);
        // The floor never lifts a field above what it had when carried in.
        let confidence = decayed.max(self.weights.history_floor.min(field.confidence));

        Some(
            ParameterField::new(
                &descriptor.name,
                field.value.clone(),
                Provenance::History,
                confidence,
            )
            .with_reasoning(format!("carried forward from turn {}", field.established_turn))
            .established_in(field.established_turn),
        )
    }

    fn default_layer(
        &self,
        schema: &ToolSchema,
        descriptor: &FieldDescriptor,
        profile: &UserProfile,
        turn: u32,
    ) -> Option<ParameterField> {
        let (value, reasoning) = self
            .defaults
            .value_for(schema.tool_type, &descriptor.name, profile)?;
        Some(
            ParameterField::new(
                &descriptor.name,
                value,
                Provenance::Default,
                self.weights.default_confidence,
            )
            .with_reasoning(reasoning)
            .established_in(turn),
        )
    }
}

/// Coerce a literal to the declared type; enumeration text is folded to
/// its canonical `snake_case` spelling ("Bullet Points" → "bullet_points").
fn normalize(descriptor: &FieldDescriptor, value: ParameterValue) -> ParameterValue {
    let value = descriptor.field_type.coerce(value);
    match (&descriptor.constraint, value) {
        (Some(Constraint::OneOf { .. }), ParameterValue::Text(s)) => ParameterValue::Text(
            s.trim().to_lowercase().replace(['-', ' '], "_"),
        ),
        (_, ParameterValue::Text(s)) => ParameterValue::Text(s.trim().to_string()),
        (_, other) => other,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tool::{SchemaRegistry, ToolType};

    fn engine() -> InferenceEngine {
        InferenceEngine::default()
    }

    fn flashcard_schema() -> ToolSchema {
        SchemaRegistry::builtin()
            .schema(ToolType::FlashcardGenerator)
            .unwrap()
            .clone()
    }

    fn input<'a>(
        message: &'a str,
        profile: &'a UserProfile,
        explicit: &'a [ExplicitField],
        prior: Option<&'a ExtractionResult>,
        turn: u32,
    ) -> InferenceInput<'a> {
        InferenceInput {
            message,
            profile,
            explicit,
            prior,
            turn,
        }
    }

    #[test]
    fn test_explicit_fields_have_full_confidence_and_no_inference() {
        let profile = UserProfile::new("s1", "9");
        let explicit = vec![
            ExplicitField::new("topic", "photosynthesis"),
            ExplicitField::new("count", "5"),
            ExplicitField::new("difficulty", "Medium"),
        ];
        let message = "Create 5 flashcards on photosynthesis at medium difficulty";
        let result = engine().infer(&flashcard_schema(), input(message, &profile, &explicit, None, 1));

        assert_eq!(result.count_by(Provenance::Explicit), 3);
        assert_eq!(result.count_by(Provenance::Inferred), 0);
        assert_eq!(result.value("count"), Some(&ParameterValue::Integer(5)));
        assert_eq!(result.value("difficulty"), Some(&ParameterValue::from("medium")));
        assert_eq!(result.get("subject").unwrap().provenance, Provenance::Default);
        assert_eq!(result.aggregate_confidence(), 1.0);
    }

    #[test]
    fn test_distress_inference_with_default_count() {
        let profile = UserProfile::new("s1", "11");
        let explicit = vec![ExplicitField::new("topic", "derivatives")];
        let message = "I'm struggling with derivatives, need practice";
        let result = engine().infer(&flashcard_schema(), input(message, &profile, &explicit, None, 1));

        let difficulty = result.get("difficulty").unwrap();
        assert_eq!(difficulty.provenance, Provenance::Inferred);
        assert_eq!(difficulty.value, ParameterValue::from("easy"));
        assert!(difficulty.reasoning.as_deref().unwrap().contains("struggling"));
        assert!((difficulty.confidence - 0.63).abs() < 1e-9);

        let count = result.get("count").unwrap();
        assert_eq!(count.provenance, Provenance::Default);
        assert_eq!(count.value, ParameterValue::Integer(5));

        assert!((result.aggregate_confidence() - 0.63).abs() < 1e-9);
    }

    #[test]
    fn test_explicit_beats_every_other_layer() {
        let profile = UserProfile::new("s1", "12").with_mastery("Level 10");
        let prior = ExtractionResult::new(
            ToolType::FlashcardGenerator,
            1,
            vec![ParameterField::new("difficulty", "medium", Provenance::Explicit, 1.0).established_in(1)],
            1.0,
        );
        // Inferred says easy, history says medium, default says hard.
        let explicit = vec![ExplicitField::new("difficulty", "hard")];
        let result = engine().infer(
            &flashcard_schema(),
            input("I'm so confused", &profile, &explicit, Some(&prior), 2),
        );
        let field = result.get("difficulty").unwrap();
        assert_eq!(field.provenance, Provenance::Explicit);
        assert_eq!(field.value, ParameterValue::from("hard"));
    }

    #[test]
    fn test_history_carry_forward_decays_with_floor() {
        let profile = UserProfile::new("s1", "9");
        let prior = ExtractionResult::new(
            ToolType::FlashcardGenerator,
            1,
            vec![
                ParameterField::new("topic", "mitosis", Provenance::Explicit, 1.0).established_in(1),
                ParameterField::new("difficulty", "easy", Provenance::Inferred, 0.42).established_in(1),
                ParameterField::new("count", 5i64, Provenance::Default, 0.3).established_in(1),
            ],
            0.42,
        );
        let result = engine().infer(&flashcard_schema(), input("next one", &profile, &[], Some(&prior), 2));

        let topic = result.get("topic").unwrap();
        assert_eq!(topic.provenance, Provenance::History);
        assert!((topic.confidence - 0.9).abs() < 1e-9);
        assert_eq!(topic.established_turn, 1);
        assert_eq!(topic.reasoning.as_deref(), Some("carried forward from turn 1"));

        // 0.42 * 0.9 = 0.378, floored at 0.4
        let difficulty = result.get("difficulty").unwrap();
        assert!((difficulty.confidence - 0.4).abs() < 1e-9);

        // defaults are recomputed, not carried
        assert_eq!(result.get("count").unwrap().provenance, Provenance::Default);
        assert_eq!(result.get("count").unwrap().established_turn, 2);
    }

    #[test]
    fn test_history_ignores_fields_outside_schema() {
        let profile = UserProfile::new("s1", "9");
        let prior = ExtractionResult::new(
            ToolType::ConceptExplainer,
            1,
            vec![ParameterField::new("concept_to_explain", "derivative", Provenance::Explicit, 1.0)],
            1.0,
        );
        let result = engine().infer(&flashcard_schema(), input("", &profile, &[], Some(&prior), 2));
        assert!(result.get("concept_to_explain").is_none());
        assert!(result.get("topic").is_none());
    }

    #[test]
    fn test_history_not_carried_across_tools() {
        let profile = UserProfile::new("s1", "9");
        let prior = ExtractionResult::new(
            ToolType::NoteMaker,
            1,
            vec![
                ParameterField::new("topic", "French Revolution", Provenance::Explicit, 1.0)
                    .established_in(1),
                ParameterField::new("subject", "History", Provenance::Explicit, 1.0)
                    .established_in(1),
            ],
            1.0,
        );
        let result = engine().infer(
            &flashcard_schema(),
            input("now quiz me", &profile, &[], Some(&prior), 2),
        );

        assert!(result.get("topic").is_none());
        assert_eq!(result.count_by(Provenance::History), 0);
        // subject falls back to the profile default instead
        assert_eq!(result.get("subject").unwrap().provenance, Provenance::Default);
    }

    #[test]
    fn test_aggregate_floor_when_only_defaults() {
        let profile = UserProfile::new("s1", "9");
        let result = engine().infer(&flashcard_schema(), input("hello", &profile, &[], None, 1));
        assert_eq!(result.count_by(Provenance::Explicit), 0);
        assert_eq!(result.aggregate_confidence(), 0.3);
    }

    #[test]
    fn test_aggregate_never_exceeds_min_contributing_field() {
        let profile = UserProfile::new("s1", "9");
        let explicit = vec![ExplicitField::new("topic", "cells")];
        let result = engine().infer(
            &flashcard_schema(),
            input("a quick set, I'm ready", &profile, &explicit, None, 1),
        );
        let min = result
            .fields()
            .filter(|f| f.provenance != Provenance::Default)
            .map(|f| f.confidence)
            .fold(1.0, f64::min);
        assert!(result.aggregate_confidence() <= min);
    }

    #[test]
    fn test_blank_explicit_value_is_ignored() {
        let profile = UserProfile::new("s1", "9");
        let explicit = vec![ExplicitField::new("topic", "  ")];
        let result = engine().infer(&flashcard_schema(), input("", &profile, &explicit, None, 1));
        assert!(result.get("topic").is_none());
    }
}
