use anyhow::{Context, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};
use tracing::info;

#[derive(Debug, Deserialize, Clone, Default)]
#[serde(default)]
pub struct TutorConfig {
    pub logging: LoggingConfig,
    pub storage: StorageConfig,
    pub ai: AiConfig,
    pub limits: LimitsConfig,
    pub progress: ProgressConfig,
    pub offline: OfflineConfig,
    pub reminders: ReminderConfig,
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct LoggingConfig {
    pub log_level: String,
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct StorageConfig {
    pub db_path: String,
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct AiConfig {
    pub api_key: Option<String>,
    pub base_url: String,
    pub model: String,
    pub image_model: String,
    pub timeout_secs: u64,
}

/// Input validation and list caps used by the application state machine.
#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct LimitsConfig {
    pub max_image_bytes: usize,
    pub max_audio_bytes: usize,
    pub recent_topics_cap: usize,
    pub topic_label_chars: usize,
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct ProgressConfig {
    /// Weekly study goal in minutes, used when no progress document exists yet.
    pub weekly_goal_minutes: u32,
    pub pomodoro_minutes: u64,
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct OfflineConfig {
    pub sync_delay_ms: u64,
    /// Start with connectivity marked lost, so cached writes queue for `sync`.
    pub start_offline: bool,
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct ReminderConfig {
    pub notifications_enabled: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            log_level: "info".into(),
        }
    }
}

impl Default for StorageConfig {
    fn default() -> Self {
        let db_path = default_gabu_dir()
            .join("tutor.db")
            .to_string_lossy()
            .into_owned();
        Self { db_path }
    }
}

impl Default for AiConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            base_url: "https://generativelanguage.googleapis.com/v1beta".into(),
            model: "gemini-2.5-flash".into(),
            image_model: "gemini-2.0-flash-preview-image-generation".into(),
            timeout_secs: 60,
        }
    }
}

impl Default for LimitsConfig {
    fn default() -> Self {
        Self {
            max_image_bytes: 8 * 1024 * 1024,
            max_audio_bytes: 20 * 1024 * 1024,
            recent_topics_cap: 8,
            topic_label_chars: 50,
        }
    }
}

impl Default for ProgressConfig {
    fn default() -> Self {
        Self {
            weekly_goal_minutes: 300,
            pomodoro_minutes: 25,
        }
    }
}

impl Default for OfflineConfig {
    fn default() -> Self {
        Self {
            sync_delay_ms: 500,
            start_offline: false,
        }
    }
}

impl Default for ReminderConfig {
    fn default() -> Self {
        Self {
            notifications_enabled: true,
        }
    }
}

/// Returns `~/.gabu/`, or `./.gabu/` when no home directory can be resolved.
pub fn default_gabu_dir() -> PathBuf {
    dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(".gabu")
}

/// Returns the default config file path: `~/.gabu/config.toml`
pub fn default_config_path() -> PathBuf {
    default_gabu_dir().join("config.toml")
}

impl TutorConfig {
    /// Load config from TOML file (if it exists) then apply env var overrides.
    pub fn load() -> Result<Self> {
        Self::load_from(default_config_path())
    }

    /// Load from a specific path, then apply env var overrides.
    pub fn load_from(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let mut config = if path.exists() {
            let contents =
                std::fs::read_to_string(path).context("failed to read config file")?;
            toml::from_str(&contents).context("failed to parse config TOML")?
        } else {
            info!("no config file at {}, using defaults", path.display());
            TutorConfig::default()
        };

        config.apply_env_overrides();
        Ok(config)
    }

    /// Apply environment variable overrides (GABU_DB, GABU_LOG_LEVEL, GABU_MODEL, GEMINI_API_KEY).
    fn apply_env_overrides(&mut self) {
        if let Ok(val) = std::env::var("GABU_DB") {
            self.storage.db_path = val;
        }
        if let Ok(val) = std::env::var("GABU_LOG_LEVEL") {
            self.logging.log_level = val;
        }
        if let Ok(val) = std::env::var("GABU_MODEL") {
            self.ai.model = val;
        }
        if let Ok(val) = std::env::var("GEMINI_API_KEY") {
            if !val.trim().is_empty() {
                self.ai.api_key = Some(val);
            }
        }
    }

    /// Resolve the database path, expanding `~` if needed.
    pub fn resolved_db_path(&self) -> PathBuf {
        expand_tilde(&self.storage.db_path)
    }
}

pub fn expand_tilde(path: &str) -> PathBuf {
    match (path.strip_prefix("~/"), dirs::home_dir()) {
        (Some(rest), Some(home)) => home.join(rest),
        _ => PathBuf::from(path),
    }
}
