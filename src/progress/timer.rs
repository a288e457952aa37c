//! Pomodoro focus timer: opens a study session, waits out the interval,
//! then closes the session.

use anyhow::Result;
use std::sync::Arc;
use std::time::Duration;

use super::types::StudySession;
use super::ProgressService;

pub struct FocusTimer {
    progress: Arc<ProgressService>,
    duration: Duration,
}

impl FocusTimer {
    pub fn new(progress: Arc<ProgressService>, duration: Duration) -> Self {
        Self { progress, duration }
    }

    pub fn minutes(progress: Arc<ProgressService>, minutes: u64) -> Self {
        Self::new(progress, Duration::from_secs(minutes * 60))
    }

    pub fn duration(&self) -> Duration {
        self.duration
    }

    /// Run one focus interval. Returns the closed session.
    pub async fn run(&self, topics: &[String]) -> Result<Option<StudySession>> {
        let session = self.progress.start_session(topics)?;
        tracing::info!(
            session_id = %session.id,
            seconds = self.duration.as_secs(),
            "focus timer started"
        );

        tokio::time::sleep(self.duration).await;

        let closed = self.progress.end_session()?;
        tracing::info!("focus timer complete");
        Ok(closed)
    }
}
