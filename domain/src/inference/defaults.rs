//! Profile-derived default policy

use crate::parameter::ParameterValue;
use crate::profile::{MasteryBand, TeachingStyle, UserProfile};
use crate::tool::{Depth, Difficulty, NoteTakingStyle, ToolType};
use serde::{Deserialize, Serialize};

/// Deterministic defaults computed from the learner profile
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DefaultPolicy {
    pub subject: String,
    pub flashcard_count: i64,
    pub include_examples: bool,
}

impl Default for DefaultPolicy {
    fn default() -> Self {
        Self {
            subject: "General".to_string(),
            flashcard_count: 5,
            include_examples: true,
        }
    }
}

impl DefaultPolicy {
    /// Default value for `field` of `tool`, with a reasoning string.
    ///
    /// `None` means the field has no default and must come from a higher layer.
    pub fn value_for(
        &self,
        tool: ToolType,
        field: &str,
        profile: &UserProfile,
    ) -> Option<(ParameterValue, String)> {
        let band = profile.mastery_band();
        let strained = profile.is_strained();
        let strain_note = if strained { ", eased for emotional state" } else { "" };

        match (tool, field) {
            (ToolType::FlashcardGenerator, "difficulty") => {
                let mut difficulty = difficulty_for(band);
                if strained {
                    difficulty = difficulty.easier();
                }
                Some((
                    difficulty.as_str().into(),
                    format!("default for {} mastery{}", band, strain_note),
                ))
            }
            (ToolType::FlashcardGenerator, "count") => Some((
                self.flashcard_count.into(),
                "default flashcard count".to_string(),
            )),
            (ToolType::ConceptExplainer, "desired_depth") => {
                let mut depth = depth_for(band);
                if strained {
                    depth = depth.shallower();
                }
                Some((
                    depth.as_str().into(),
                    format!("default for {} mastery{}", band, strain_note),
                ))
            }
            (ToolType::NoteMaker, "note_taking_style") => {
                let style = if strained {
                    NoteTakingStyle::BulletPoints
                } else {
                    style_for(profile.teaching_style)
                };
                Some((
                    style.as_str().into(),
                    format!("default for {} teaching style{}", profile.teaching_style, strain_note),
                ))
            }
            (ToolType::NoteMaker, "include_analogies") => Some((
                profile.prefers_visual().into(),
                "default from learning style".to_string(),
            )),
            (ToolType::NoteMaker | ToolType::FlashcardGenerator, "subject") => {
                Some((self.subject.clone().into(), "default subject".to_string()))
            }
            (ToolType::NoteMaker | ToolType::FlashcardGenerator, "include_examples") => Some((
                self.include_examples.into(),
                "default example policy".to_string(),
            )),
            _ => None,
        }
    }
}

fn difficulty_for(band: MasteryBand) -> Difficulty {
    match band {
        MasteryBand::Foundational => Difficulty::Easy,
        MasteryBand::Developing | MasteryBand::Proficient => Difficulty::Medium,
        MasteryBand::Advanced => Difficulty::Hard,
    }
}

fn depth_for(band: MasteryBand) -> Depth {
    match band {
        MasteryBand::Foundational => Depth::Basic,
        MasteryBand::Developing => Depth::Intermediate,
        MasteryBand::Proficient => Depth::Advanced,
        MasteryBand::Advanced => Depth::Comprehensive,
    }
}

fn style_for(style: TeachingStyle) -> NoteTakingStyle {
    match style {
        TeachingStyle::Direct => NoteTakingStyle::BulletPoints,
        TeachingStyle::Socratic => NoteTakingStyle::Outline,
        TeachingStyle::Visual => NoteTakingStyle::Structured,
        TeachingStyle::FlippedClassroom => NoteTakingStyle::Narrative,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn value(policy: &DefaultPolicy, tool: ToolType, field: &str, profile: &UserProfile) -> ParameterValue {
        policy.value_for(tool, field, profile).unwrap().0
    }

    #[test]
    fn test_difficulty_by_band_and_strain() {
        let policy = DefaultPolicy::default();
        let advanced = UserProfile::new("s1", "12").with_mastery("Level 10");
        assert_eq!(value(&policy, ToolType::FlashcardGenerator, "difficulty", &advanced), "hard".into());

        let anxious = advanced.clone().with_emotional_state("Anxious before exams");
        assert_eq!(value(&policy, ToolType::FlashcardGenerator, "difficulty", &anxious), "medium".into());
    }

    #[test]
    fn test_depth_by_band() {
        let policy = DefaultPolicy::default();
        let profile = UserProfile::new("s1", "Grade 4");
        assert_eq!(value(&policy, ToolType::ConceptExplainer, "desired_depth", &profile), "basic".into());
        let profile = UserProfile::new("s1", "Grade 10").with_emotional_state("tired");
        assert_eq!(
            value(&policy, ToolType::ConceptExplainer, "desired_depth", &profile),
            "intermediate".into()
        );
    }

    #[test]
    fn test_note_style_by_teaching_style() {
        let policy = DefaultPolicy::default();
        let profile = UserProfile::new("s1", "8").with_teaching_style(TeachingStyle::Socratic);
        assert_eq!(value(&policy, ToolType::NoteMaker, "note_taking_style", &profile), "outline".into());
        let strained = profile.with_emotional_state("confused and tired");
        assert_eq!(
            value(&policy, ToolType::NoteMaker, "note_taking_style", &strained),
            "bullet_points".into()
        );
    }

    #[test]
    fn test_no_default_for_topics() {
        let policy = DefaultPolicy::default();
        let profile = UserProfile::new("s1", "8");
        assert!(policy.value_for(ToolType::NoteMaker, "topic", &profile).is_none());
        assert!(policy.value_for(ToolType::ConceptExplainer, "concept_to_explain", &profile).is_none());
        assert!(policy.value_for(ToolType::ConceptExplainer, "subject", &profile).is_none());
    }
}
