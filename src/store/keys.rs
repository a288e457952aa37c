//! Storage key names. These match the keys the web client wrote to local
//! storage, so documents can be migrated across unchanged.

pub const SETTINGS: &str = "gabu-settings";
pub const BOOKMARKS: &str = "gabu-bookmarks";
pub const PROGRESS: &str = "gabu-progress";
pub const STUDY_SESSIONS: &str = "gabu-study-sessions";
pub const CURRENT_SESSION: &str = "gabu-current-session";
pub const REMINDERS: &str = "gabu-reminders";
pub const GOALS: &str = "gabu-goals";
pub const LEARNING_PROFILE: &str = "gabu-learning-profile";
pub const LEARNING_PATHS: &str = "gabu-learning-paths";
pub const RECENT_TOPICS: &str = "gabu-recent-topics";
pub const TUTORIAL: &str = "gabu-tutorial";
pub const PENDING_SYNC: &str = "gabu-pending-sync";
pub const LAST_SYNC: &str = "gabu-last-sync";

/// Prefix for offline snapshots written by `OfflineService::cache_data`.
pub const OFFLINE_PREFIX: &str = "gabu-offline-";

pub fn offline_key(key: &str) -> String {
    format!("{OFFLINE_PREFIX}{key}")
}
