//! Timer-driven reminder delivery.
//!
//! Each active reminder and goal gets one tokio task that sleeps until the
//! next occurrence, fires, and re-arms for the following one. Calling
//! [`ReminderScheduler::schedule_reminders`] again aborts every armed task
//! before arming fresh ones, so edits take effect and timers never pile up.

use anyhow::Result;
use chrono::{DateTime, Local, NaiveDateTime, TimeZone, Utc};
use serde::Serialize;
use std::future::Future;
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::sync::broadcast;
use tokio::task::JoinHandle;

use super::schedule::next_occurrence;
use super::ReminderService;
use crate::clock::Clock;

/// What the user sees when a reminder fires.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ReminderNotice {
    pub source_id: String,
    pub title: String,
    pub body: String,
    pub fired_at: DateTime<Utc>,
}

/// System-level notification sink (desktop notification, push, ...).
pub trait Notifier: Send + Sync {
    fn notify(&self, notice: &ReminderNotice);
}

/// Writes notices to the log.
#[derive(Debug, Default)]
pub struct LogNotifier;

impl Notifier for LogNotifier {
    fn notify(&self, notice: &ReminderNotice) {
        tracing::info!(title = %notice.title, body = %notice.body, "study reminder");
    }
}

/// A reminder or goal reduced to what the timer needs.
#[derive(Debug, Clone)]
struct Recurrence {
    id: String,
    title: String,
    body: String,
    time: String,
    days: Vec<u8>,
}

pub struct ReminderScheduler {
    reminders: Arc<ReminderService>,
    clock: Arc<dyn Clock>,
    notifier: Arc<dyn Notifier>,
    notifications_enabled: bool,
    in_app: broadcast::Sender<ReminderNotice>,
    armed: Mutex<Vec<JoinHandle<()>>>,
}

impl ReminderScheduler {
    pub fn new(
        reminders: Arc<ReminderService>,
        clock: Arc<dyn Clock>,
        notifier: Arc<dyn Notifier>,
        notifications_enabled: bool,
    ) -> Self {
        let (in_app, _) = broadcast::channel(32);
        Self {
            reminders,
            clock,
            notifier,
            notifications_enabled,
            in_app,
            armed: Mutex::new(Vec::new()),
        }
    }

    /// In-app notices, delivered whether or not system notifications are enabled.
    pub fn subscribe(&self) -> broadcast::Receiver<ReminderNotice> {
        self.in_app.subscribe()
    }

    /// Number of currently armed timers.
    pub fn armed_count(&self) -> usize {
        let mut armed = self.armed.lock().unwrap_or_else(|e| e.into_inner());
        armed.retain(|h| !h.is_finished());
        armed.len()
    }

    /// Abort every armed timer.
    pub fn cancel_all(&self) {
        let mut armed = self.armed.lock().unwrap_or_else(|e| e.into_inner());
        for handle in armed.drain(..) {
            handle.abort();
        }
    }

    /// Re-read reminders and goals and arm one timer per active entry.
    /// Must be called from within a tokio runtime. Returns the number armed.
    pub fn schedule_reminders(&self) -> Result<usize> {
        let mut recurrences: Vec<Recurrence> = self
            .reminders
            .get_reminders()?
            .into_iter()
            .filter(|r| r.is_active)
            .map(|r| Recurrence {
                body: if r.message.trim().is_empty() {
                    "Time to study!".to_string()
                } else {
                    r.message
                },
                id: r.id,
                title: r.title,
                time: r.time,
                days: r.days,
            })
            .collect();

        recurrences.extend(
            self.reminders
                .get_goals()?
                .into_iter()
                .filter(|g| g.is_active)
                .map(|g| Recurrence {
                    body: format!("Goal: study for {} minutes today", g.target_minutes),
                    id: g.id,
                    title: g.title,
                    time: g.time,
                    days: g.days,
                }),
        );

        let mut armed = self.armed.lock().unwrap_or_else(|e| e.into_inner());
        for handle in armed.drain(..) {
            handle.abort();
        }

        for recurrence in recurrences {
            let task = FireLoop {
                recurrence,
                clock: Arc::clone(&self.clock),
                notifier: self
                    .notifications_enabled
                    .then(|| Arc::clone(&self.notifier)),
                in_app: self.in_app.clone(),
            };
            armed.push(tokio::spawn(task.run()));
        }

        tracing::info!(armed = armed.len(), "reminders scheduled");
        Ok(armed.len())
    }

    /// Keep reminders armed until `shutdown` resolves, re-reading the store
    /// every `rescan` so edits from other processes are picked up.
    pub async fn run(&self, rescan: Duration, shutdown: impl Future<Output = ()>) -> Result<()> {
        tokio::pin!(shutdown);
        loop {
            self.schedule_reminders()?;
            tokio::select! {
                _ = &mut shutdown => break,
                _ = tokio::time::sleep(rescan) => {}
            }
        }
        self.cancel_all();
        tracing::info!("reminder scheduler stopped");
        Ok(())
    }
}

impl Drop for ReminderScheduler {
    fn drop(&mut self) {
        self.cancel_all();
    }
}

struct FireLoop {
    recurrence: Recurrence,
    clock: Arc<dyn Clock>,
    notifier: Option<Arc<dyn Notifier>>,
    in_app: broadcast::Sender<ReminderNotice>,
}

impl FireLoop {
    async fn run(self) {
        let mut after = to_local(self.clock.now());
        while let Some(next) = next_occurrence(&self.recurrence.time, &self.recurrence.days, after) {
            after = next;
            // nonexistent local time (DST gap): skip this occurrence
            let Some(fire_at) = from_local(next) else {
                continue;
            };

            let delay = (fire_at - self.clock.now()).to_std().unwrap_or(Duration::ZERO);
            tracing::debug!(id = %self.recurrence.id, at = %fire_at, "reminder armed");
            tokio::time::sleep(delay).await;

            self.fire();
        }
    }

    fn fire(&self) {
        let notice = ReminderNotice {
            source_id: self.recurrence.id.clone(),
            title: self.recurrence.title.clone(),
            body: self.recurrence.body.clone(),
            fired_at: self.clock.now(),
        };
        if let Some(notifier) = &self.notifier {
            notifier.notify(&notice);
        }
        // no subscribers is fine
        let _ = self.in_app.send(notice);
    }
}

fn to_local(instant: DateTime<Utc>) -> NaiveDateTime {
    instant.with_timezone(&Local).naive_local()
}

fn from_local(wall: NaiveDateTime) -> Option<DateTime<Utc>> {
    Local
        .from_local_datetime(&wall)
        .earliest()
        .map(|t| t.with_timezone(&Utc))
}
