//! Gabu's Tutor: a homework tutor engine.
//!
//! A student photographs, records, or types a question; the tutor forwards it
//! to a hosted language model and layers study bookkeeping on top: sessions
//! and streaks, an adaptive learning profile, periodic reports, reminders,
//! and an offline queue. Every feature area is a JSON document in a small
//! SQLite-backed key-value store.
//!
//! | Area | Document key | Engine |
//! |------|--------------|--------|
//! | Sessions, streak, weekly goal | `gabu-progress`, `gabu-study-sessions` | [`progress`] |
//! | Bookmarks | `gabu-bookmarks` | [`progress`] |
//! | Learning profile and paths | `gabu-learning-profile`, `gabu-learning-paths` | [`adaptive`] |
//! | Reminders and goals | `gabu-reminders`, `gabu-goals` | [`reminders`] |
//! | Offline snapshots | `gabu-offline-*`, `gabu-pending-sync` | [`offline`] |
//! | Settings, recent topics | `gabu-settings`, `gabu-recent-topics` | [`settings`] |
//!
//! # Modules
//!
//! - [`config`]: Configuration loading from TOML files and environment variables
//! - [`db`]: SQLite database initialization, schema, migrations, and health checks
//! - [`store`]: Typed JSON document repository
//! - [`app`]: The application state machine driving scan, ask, and answer
//! - [`ai`]: Model boundary with the Gemini client, prompts, and quiz parsing
//! - [`services`]: Constructs every engine around one store and clock

pub mod adaptive;
pub mod ai;
pub mod app;
pub mod clock;
pub mod collaboration;
pub mod config;
pub mod db;
pub mod error;
pub mod offline;
pub mod progress;
pub mod reminders;
pub mod services;
pub mod settings;
pub mod store;
pub mod streak;
pub mod tutorial;
