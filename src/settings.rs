//! User settings and the recent-topics list.

use anyhow::Result;
use serde::{Deserialize, Serialize};

use crate::store::{keys, Store};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct UserSettings {
    pub name: String,
    pub grade_level: String,
    pub language: String,
    pub voice_enabled: bool,
    pub notifications_enabled: bool,
}

impl Default for UserSettings {
    fn default() -> Self {
        Self {
            name: String::new(),
            grade_level: "middle school".into(),
            language: "English".into(),
            voice_enabled: false,
            notifications_enabled: true,
        }
    }
}

pub struct SettingsService {
    store: Store,
    recent_cap: usize,
    label_chars: usize,
}

impl SettingsService {
    pub fn new(store: Store, recent_cap: usize, label_chars: usize) -> Self {
        Self {
            store,
            recent_cap,
            label_chars,
        }
    }

    pub fn get_settings(&self) -> Result<UserSettings> {
        self.store.get_or_default(keys::SETTINGS)
    }

    pub fn save_settings(&self, settings: &UserSettings) -> Result<()> {
        self.store.set(keys::SETTINGS, settings)
    }

    /// Most recent first.
    pub fn recent_topics(&self) -> Result<Vec<String>> {
        self.store.get_or_default(keys::RECENT_TOPICS)
    }

    /// Derive a label from `text` and put it at the front of the recent list,
    /// removing any exact duplicate and trimming to the cap. Returns the label,
    /// or `None` when `text` is blank.
    pub fn push_recent_topic(&self, text: &str) -> Result<Option<String>> {
        let Some(label) = topic_label(text, self.label_chars) else {
            return Ok(None);
        };
        let mut topics = self.recent_topics()?;
        topics.retain(|t| t != &label);
        topics.insert(0, label.clone());
        topics.truncate(self.recent_cap);
        self.store.set(keys::RECENT_TOPICS, &topics)?;
        Ok(Some(label))
    }
}

/// First sentence of `text`, trimmed and cut to `max_chars` characters.
/// A sentence ends at `.`, `!`, or `?` followed by whitespace or the end of
/// the text, so decimals like "7.5" do not split.
pub fn topic_label(text: &str, max_chars: usize) -> Option<String> {
    let text = text.trim();
    if text.is_empty() {
        return None;
    }

    let mut end = text.len();
    let mut chars = text.char_indices().peekable();
    while let Some((i, c)) = chars.next() {
        if matches!(c, '.' | '!' | '?') {
            let at_boundary = chars.peek().map_or(true, |(_, next)| next.is_whitespace());
            if at_boundary {
                end = i + c.len_utf8();
                break;
            }
        }
    }

    let label: String = text[..end].chars().take(max_chars).collect();
    let label = label.trim().to_string();
    (!label.is_empty()).then_some(label)
}
