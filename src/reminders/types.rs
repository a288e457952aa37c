//! Reminder and goal documents.

use chrono::{DateTime, NaiveTime, Utc};
use serde::{Deserialize, Serialize};

/// A recurring study reminder. `time` is local wall-clock `HH:MM`; `days`
/// are weekdays with Sunday = 0.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StudyReminder {
    pub id: String,
    pub title: String,
    #[serde(default)]
    pub message: String,
    pub time: String,
    pub days: Vec<u8>,
    #[serde(default = "default_true")]
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
}

/// A recurring study goal: `target_minutes` of study on each listed day.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StudyGoal {
    pub id: String,
    pub title: String,
    #[serde(default)]
    pub description: String,
    pub target_minutes: u32,
    pub time: String,
    pub days: Vec<u8>,
    #[serde(default = "default_true")]
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
}

fn default_true() -> bool {
    true
}

/// Caller-supplied fields for a new reminder.
#[derive(Debug, Clone)]
pub struct NewReminder {
    pub title: String,
    pub message: String,
    pub time: String,
    pub days: Vec<u8>,
}

#[derive(Debug, Clone)]
pub struct NewGoal {
    pub title: String,
    pub description: String,
    pub target_minutes: u32,
    pub time: String,
    pub days: Vec<u8>,
}

/// Parse `HH:MM` (24-hour).
pub fn parse_time_of_day(time: &str) -> Option<NaiveTime> {
    NaiveTime::parse_from_str(time.trim(), "%H:%M").ok()
}

/// Validate `time` and `days`, returning normalized (sorted, deduplicated) days.
pub fn validate_schedule(time: &str, days: &[u8]) -> anyhow::Result<Vec<u8>> {
    anyhow::ensure!(
        parse_time_of_day(time).is_some(),
        "invalid time {time:?}, expected HH:MM"
    );
    anyhow::ensure!(!days.is_empty(), "at least one weekday is required");
    if let Some(bad) = days.iter().find(|d| **d > 6) {
        anyhow::bail!("invalid weekday {bad}, expected 0 (Sunday) to 6 (Saturday)");
    }
    let mut days = days.to_vec();
    days.sort_unstable();
    days.dedup();
    Ok(days)
}
