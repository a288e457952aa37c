//! Documents owned by the progress engine.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

/// One bounded interval of study. At most one session is open at a time
/// (stored under `gabu-current-session`); closed sessions are kept
/// most-recent-first under `gabu-study-sessions`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StudySession {
    pub id: String,
    pub start_time: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub end_time: Option<DateTime<Utc>>,
    #[serde(default)]
    pub topics: Vec<String>,
    #[serde(default)]
    pub questions_asked: u32,
    #[serde(default)]
    pub bookmarks_created: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub quiz_score: Option<f64>,
    /// Minutes, filled in when the session closes.
    #[serde(default)]
    pub total_time: i64,
}

/// Running totals across all sessions.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct LearningProgress {
    /// Minutes.
    pub total_study_time: i64,
    pub sessions_today: u32,
    pub current_streak: u32,
    pub longest_streak: u32,
    pub topics_studied: Vec<String>,
    pub bookmarks_count: u32,
    /// Last instant the streak was credited.
    pub last_study_date: Option<DateTime<Utc>>,
    /// Minutes per week.
    pub weekly_goal: u32,
    /// Minutes studied in the current week.
    pub weekly_progress: u32,
    /// Last time any session closed; drives the `sessions_today` reset.
    pub last_session_at: Option<DateTime<Utc>>,
    /// Monday of the week `weekly_progress` belongs to.
    pub week_start: Option<NaiveDate>,
}

impl Default for LearningProgress {
    fn default() -> Self {
        Self {
            total_study_time: 0,
            sessions_today: 0,
            current_streak: 0,
            longest_streak: 0,
            topics_studied: Vec::new(),
            bookmarks_count: 0,
            last_study_date: None,
            weekly_goal: 300,
            weekly_progress: 0,
            last_session_at: None,
            week_start: None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BookmarkType {
    Explanation,
    Quiz,
    Illustration,
}

impl BookmarkType {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Explanation => "explanation",
            Self::Quiz => "quiz",
            Self::Illustration => "illustration",
        }
    }
}

impl std::fmt::Display for BookmarkType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for BookmarkType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "explanation" => Ok(Self::Explanation),
            "quiz" => Ok(Self::Quiz),
            "illustration" => Ok(Self::Illustration),
            _ => Err(format!("unknown bookmark type: {s}")),
        }
    }
}

/// A saved chat message or diagram. Never edited in place.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Bookmark {
    pub id: String,
    pub title: String,
    pub content: String,
    pub topic: String,
    pub timestamp: DateTime<Utc>,
    #[serde(rename = "type")]
    pub kind: BookmarkType,
    #[serde(default)]
    pub tags: Vec<String>,
}

impl Bookmark {
    /// Case-insensitive substring match on title, content, topic, or any tag.
    /// `needle` must already be lowercase.
    pub(crate) fn matches(&self, needle: &str) -> bool {
        self.title.to_lowercase().contains(needle)
            || self.content.to_lowercase().contains(needle)
            || self.topic.to_lowercase().contains(needle)
            || self.tags.iter().any(|t| t.to_lowercase().contains(needle))
    }
}

/// Fields the caller supplies when saving a bookmark.
#[derive(Debug, Clone)]
pub struct NewBookmark {
    pub title: String,
    pub content: String,
    pub topic: String,
    pub kind: BookmarkType,
    pub tags: Vec<String>,
}
