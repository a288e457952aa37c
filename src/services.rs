//! Dependency-injection root.
//!
//! Every engine is constructed here around one [`Store`] handle and one
//! [`Clock`], then handed to the state machine or the CLI. Nothing reaches
//! for a global.

use anyhow::Result;
use std::sync::Arc;
use std::time::Duration;

use crate::adaptive::AdaptiveLearningService;
use crate::clock::{Clock, SystemClock};
use crate::collaboration::CollaborationService;
use crate::config::TutorConfig;
use crate::db;
use crate::offline::OfflineService;
use crate::progress::timer::FocusTimer;
use crate::progress::ProgressService;
use crate::reminders::scheduler::{Notifier, ReminderScheduler};
use crate::reminders::ReminderService;
use crate::settings::SettingsService;
use crate::store::Store;
use crate::tutorial::TutorialService;

pub struct Services {
    pub config: TutorConfig,
    pub store: Store,
    pub clock: Arc<dyn Clock>,
    pub settings: Arc<SettingsService>,
    pub progress: Arc<ProgressService>,
    pub adaptive: Arc<AdaptiveLearningService>,
    pub collaboration: Arc<CollaborationService>,
    pub reminders: Arc<ReminderService>,
    pub offline: Arc<OfflineService>,
    pub tutorial: Arc<TutorialService>,
}

impl Services {
    /// Open the configured database and build services on the system clock.
    pub fn open(config: TutorConfig) -> Result<Self> {
        let conn = db::open_database(config.resolved_db_path())?;
        Ok(Self::new(Store::new(conn), Arc::new(SystemClock), config))
    }

    pub fn new(store: Store, clock: Arc<dyn Clock>, config: TutorConfig) -> Self {
        let limits = &config.limits;
        Self {
            settings: Arc::new(SettingsService::new(
                store.clone(),
                limits.recent_topics_cap,
                limits.topic_label_chars,
            )),
            progress: Arc::new(ProgressService::new(
                store.clone(),
                clock.clone(),
                config.progress.weekly_goal_minutes,
            )),
            adaptive: Arc::new(AdaptiveLearningService::new(store.clone(), clock.clone())),
            collaboration: Arc::new(CollaborationService::new(store.clone(), clock.clone())),
            reminders: Arc::new(ReminderService::new(store.clone(), clock.clone())),
            offline: Arc::new(OfflineService::new(
                store.clone(),
                clock.clone(),
                Duration::from_millis(config.offline.sync_delay_ms),
            )
            .with_online(!config.offline.start_offline)),
            tutorial: Arc::new(TutorialService::new(store.clone())),
            store,
            clock,
            config,
        }
    }

    pub fn reminder_scheduler(&self, notifier: Arc<dyn Notifier>) -> ReminderScheduler {
        ReminderScheduler::new(
            self.reminders.clone(),
            self.clock.clone(),
            notifier,
            self.config.reminders.notifications_enabled,
        )
    }

    pub fn focus_timer(&self, minutes: Option<u64>) -> FocusTimer {
        FocusTimer::minutes(
            self.progress.clone(),
            minutes.unwrap_or(self.config.progress.pomodoro_minutes),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::ManualClock;

    #[test]
    fn services_share_one_store() {
        let clock = Arc::new(ManualClock::new(chrono::Utc::now()));
        let services = Services::new(Store::in_memory().unwrap(), clock, TutorConfig::default());

        services.progress.set_weekly_goal(90).unwrap();
        let report = services
            .collaboration
            .generate_learning_report(crate::collaboration::ReportPeriod::Weekly)
            .unwrap();
        assert_eq!(report.sessions_count, 0);
        assert_eq!(services.progress.get_progress().unwrap().weekly_goal, 90);
        assert!(services.store.get_raw(crate::store::keys::PROGRESS).unwrap().is_some());
    }

    #[test]
    fn start_offline_config_reaches_the_tracker() {
        let mut config = TutorConfig::default();
        config.offline.start_offline = true;
        let clock = Arc::new(ManualClock::new(chrono::Utc::now()));
        let services = Services::new(Store::in_memory().unwrap(), clock, config);

        assert!(!services.offline.is_online());
        services.offline.cache_data("last-explanation", &"notes").unwrap();
        assert_eq!(services.offline.pending_keys().unwrap(), vec!["last-explanation"]);
    }
}
