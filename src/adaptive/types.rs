//! Learning profile, activity log, recommendations, and learning paths.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Per-subject proficiency tier. Moves one step at a time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Level {
    Beginner,
    Intermediate,
    Advanced,
}

impl Level {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Beginner => "beginner",
            Self::Intermediate => "intermediate",
            Self::Advanced => "advanced",
        }
    }

    /// One tier up, saturating at `Advanced`.
    pub fn promoted(self) -> Self {
        match self {
            Self::Beginner => Self::Intermediate,
            Self::Intermediate | Self::Advanced => Self::Advanced,
        }
    }

    /// One tier down, saturating at `Beginner`.
    pub fn demoted(self) -> Self {
        match self {
            Self::Advanced => Self::Intermediate,
            Self::Intermediate | Self::Beginner => Self::Beginner,
        }
    }
}

impl std::fmt::Display for Level {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Difficulty {
    Easy,
    Medium,
    Hard,
}

impl Difficulty {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Easy => "easy",
            Self::Medium => "medium",
            Self::Hard => "hard",
        }
    }
}

impl std::fmt::Display for Difficulty {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for Difficulty {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "easy" => Ok(Self::Easy),
            "medium" => Ok(Self::Medium),
            "hard" => Ok(Self::Hard),
            _ => Err(format!("unknown difficulty: {s}")),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LearningStyle {
    Visual,
    Auditory,
    Kinesthetic,
    Reading,
}

impl LearningStyle {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Visual => "visual",
            Self::Auditory => "auditory",
            Self::Kinesthetic => "kinesthetic",
            Self::Reading => "reading",
        }
    }
}

impl std::str::FromStr for LearningStyle {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "visual" => Ok(Self::Visual),
            "auditory" => Ok(Self::Auditory),
            "kinesthetic" => Ok(Self::Kinesthetic),
            "reading" => Ok(Self::Reading),
            _ => Err(format!("unknown learning style: {s}")),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Pace {
    Slow,
    Medium,
    Fast,
}

impl Pace {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Slow => "slow",
            Self::Medium => "medium",
            Self::Fast => "fast",
        }
    }
}

impl std::str::FromStr for Pace {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "slow" => Ok(Self::Slow),
            "medium" => Ok(Self::Medium),
            "fast" => Ok(Self::Fast),
            _ => Err(format!("unknown pace: {s}")),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct AdaptiveSettings {
    pub difficulty_adjustment: bool,
    pub content_recommendations: bool,
    pub pace_adjustment: bool,
}

impl Default for AdaptiveSettings {
    fn default() -> Self {
        Self {
            difficulty_adjustment: true,
            content_recommendations: true,
            pace_adjustment: true,
        }
    }
}

/// One scored learning activity (quiz, practice set, ...).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LearningActivity {
    pub id: String,
    pub topic: String,
    pub subject: String,
    /// 0–100.
    pub score: f64,
    /// Minutes.
    pub time_spent: u32,
    pub difficulty: Difficulty,
    pub timestamp: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct LearningProfile {
    pub user_id: String,
    pub learning_style: LearningStyle,
    pub preferred_pace: Pace,
    pub strengths: Vec<String>,
    pub weaknesses: Vec<String>,
    pub interests: Vec<String>,
    pub current_level: BTreeMap<String, Level>,
    pub learning_history: Vec<LearningActivity>,
    pub adaptive_settings: AdaptiveSettings,
}

impl Default for LearningProfile {
    fn default() -> Self {
        Self {
            user_id: "local-user".into(),
            learning_style: LearningStyle::Visual,
            preferred_pace: Pace::Medium,
            strengths: Vec::new(),
            weaknesses: Vec::new(),
            interests: Vec::new(),
            current_level: BTreeMap::new(),
            learning_history: Vec::new(),
            adaptive_settings: AdaptiveSettings::default(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RecommendationKind {
    Practice,
    Path,
    Challenge,
    Review,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Priority {
    High,
    Medium,
    Low,
}

/// Regenerated on every call; ids are not stable across calls.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LearningRecommendation {
    pub id: String,
    #[serde(rename = "type")]
    pub kind: RecommendationKind,
    pub title: String,
    pub description: String,
    pub priority: Priority,
    /// 0–100.
    pub confidence: u8,
    pub reason: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub path_id: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LearningPath {
    pub id: String,
    pub title: String,
    pub description: String,
    pub subject: String,
    pub difficulty: Difficulty,
    pub topics: Vec<String>,
    pub estimated_hours: u32,
    /// Percent complete, 0–100.
    #[serde(default)]
    pub progress: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LearningAnalytics {
    /// Minutes.
    pub total_time_spent: u64,
    pub average_score: f64,
    pub completed_paths: usize,
    pub current_streak: u32,
    pub favorite_subjects: Vec<String>,
    /// Score points per hour of activity; 0 when no time is recorded.
    pub learning_velocity: f64,
    pub total_activities: usize,
}
