//! Profile entities

use serde::{Deserialize, Serialize};

/// Preferred teaching style of the learner
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TeachingStyle {
    #[default]
    Direct,
    Socratic,
    Visual,
    FlippedClassroom,
}

impl TeachingStyle {
    pub fn as_str(&self) -> &str {
        match self {
            TeachingStyle::Direct => "direct",
            TeachingStyle::Socratic => "socratic",
            TeachingStyle::Visual => "visual",
            TeachingStyle::FlippedClassroom => "flipped_classroom",
        }
    }
}

impl std::fmt::Display for TeachingStyle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Coarse mastery classification derived from profile summaries
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MasteryBand {
    /// Levels 1-3
    Foundational,
    /// Levels 4-6
    Developing,
    /// Levels 7-9
    Proficient,
    /// Level 10
    Advanced,
}

impl MasteryBand {
    pub fn as_str(&self) -> &str {
        match self {
            MasteryBand::Foundational => "foundational",
            MasteryBand::Developing => "developing",
            MasteryBand::Proficient => "proficient",
            MasteryBand::Advanced => "advanced",
        }
    }

    fn from_level(level: u32) -> Self {
        match level {
            0..=3 => MasteryBand::Foundational,
            4..=6 => MasteryBand::Developing,
            7..=9 => MasteryBand::Proficient,
            _ => MasteryBand::Advanced,
        }
    }

    fn from_grade(grade: u32) -> Self {
        match grade {
            0..=5 => MasteryBand::Foundational,
            6..=8 => MasteryBand::Developing,
            9..=12 => MasteryBand::Proficient,
            _ => MasteryBand::Advanced,
        }
    }
}

impl std::fmt::Display for MasteryBand {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Emotional-state keywords that mark a learner as strained.
const STRAIN_KEYWORDS: &[&str] = &["anxious", "confused", "tired", "stressed", "overwhelmed"];

/// Learning-style keywords that favor analogies and structured layouts.
const VISUAL_KEYWORDS: &[&str] = &["visual", "imagery", "diagram", "pictures"];

/// Student profile (identity plus summarized attributes).
///
/// Field names match the payload the downstream tool services expect.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserProfile {
    pub user_id: String,
    #[serde(default)]
    pub name: String,
    pub grade_level: String,
    #[serde(default)]
    pub learning_style_summary: String,
    #[serde(default)]
    pub emotional_state_summary: String,
    #[serde(default)]
    pub mastery_level_summary: String,
    #[serde(default)]
    pub teaching_style: TeachingStyle,
}

impl UserProfile {
    pub fn new(user_id: impl Into<String>, grade_level: impl Into<String>) -> Self {
        Self {
            user_id: user_id.into(),
            name: String::new(),
            grade_level: grade_level.into(),
            learning_style_summary: String::new(),
            emotional_state_summary: String::new(),
            mastery_level_summary: String::new(),
            teaching_style: TeachingStyle::default(),
        }
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    pub fn with_learning_style(mut self, summary: impl Into<String>) -> Self {
        self.learning_style_summary = summary.into();
        self
    }

    pub fn with_emotional_state(mut self, summary: impl Into<String>) -> Self {
        self.emotional_state_summary = summary.into();
        self
    }

    pub fn with_mastery(mut self, summary: impl Into<String>) -> Self {
        self.mastery_level_summary = summary.into();
        self
    }

    pub fn with_teaching_style(mut self, style: TeachingStyle) -> Self {
        self.teaching_style = style;
        self
    }

    /// Mastery band: the mastery summary's level wins, then the grade level.
    pub fn mastery_band(&self) -> MasteryBand {
        if let Some(level) = first_integer(&self.mastery_level_summary).filter(|l| (1..=10).contains(l))
        {
            return MasteryBand::from_level(level);
        }
        first_integer(&self.grade_level)
            .map(MasteryBand::from_grade)
            .unwrap_or(MasteryBand::Developing)
    }

    /// Whether the emotional-state summary signals strain (anxious, confused, ...).
    pub fn is_strained(&self) -> bool {
        let summary = self.emotional_state_summary.to_lowercase();
        STRAIN_KEYWORDS.iter().any(|k| summary.contains(k))
    }

    /// Whether the learning-style summary favors visual material.
    pub fn prefers_visual(&self) -> bool {
        let summary = self.learning_style_summary.to_lowercase();
        self.teaching_style == TeachingStyle::Visual
            || VISUAL_KEYWORDS.iter().any(|k| summary.contains(k))
    }
}

fn first_integer(text: &str) -> Option<u32> {
    let digits: String = text
        .chars()
        .skip_while(|c| !c.is_ascii_digit())
        .take_while(|c| c.is_ascii_digit())
        .collect();
    digits.parse().ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mastery_band_from_mastery_summary() {
        let profile = UserProfile::new("s1", "10").with_mastery("Level 2: needs fundamentals");
        assert_eq!(profile.mastery_band(), MasteryBand::Foundational);

        let profile = UserProfile::new("s1", "10").with_mastery("Level 10 - mastery achieved");
        assert_eq!(profile.mastery_band(), MasteryBand::Advanced);
    }

    #[test]
    fn test_mastery_band_falls_back_to_grade() {
        let profile = UserProfile::new("s1", "Grade 7").with_mastery("still building");
        assert_eq!(profile.mastery_band(), MasteryBand::Developing);

        let profile = UserProfile::new("s1", "11th grade");
        assert_eq!(profile.mastery_band(), MasteryBand::Proficient);
    }

    #[test]
    fn test_mastery_band_out_of_range_level_uses_grade() {
        let profile = UserProfile::new("s1", "3").with_mastery("scored 85 on the last test");
        assert_eq!(profile.mastery_band(), MasteryBand::Foundational);
    }

    #[test]
    fn test_mastery_band_default() {
        let profile = UserProfile::new("s1", "college");
        assert_eq!(profile.mastery_band(), MasteryBand::Developing);
    }

    #[test]
    fn test_strain_and_visual_signals() {
        let profile = UserProfile::new("s1", "9")
            .with_emotional_state("Anxious about the upcoming exam")
            .with_learning_style("Learns best with diagrams and visual imagery");
        assert!(profile.is_strained());
        assert!(profile.prefers_visual());

        let calm = UserProfile::new("s2", "9").with_emotional_state("Focused and motivated");
        assert!(!calm.is_strained());
        assert!(!calm.prefers_visual());
    }

    #[test]
    fn test_deserialize_profile_defaults() {
        let json = r#"{"user_id": "u1", "grade_level": "8"}"#;
        let profile: UserProfile = serde_json::from_str(json).unwrap();
        assert_eq!(profile.teaching_style, TeachingStyle::Direct);
        assert!(profile.name.is_empty());

        let json = r#"{"user_id": "u1", "grade_level": "8", "teaching_style": "flipped_classroom"}"#;
        let profile: UserProfile = serde_json::from_str(json).unwrap();
        assert_eq!(profile.teaching_style, TeachingStyle::FlippedClassroom);
    }
}
