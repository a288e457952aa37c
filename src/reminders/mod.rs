//! Study reminders and goals: CRUD over the store plus the timer-driven
//! [`scheduler::ReminderScheduler`].

pub mod schedule;
pub mod scheduler;
pub mod types;

use anyhow::Result;
use chrono::NaiveDateTime;
use std::sync::Arc;

use crate::clock::Clock;
use crate::store::{keys, Store};
use types::{validate_schedule, NewGoal, NewReminder, StudyGoal, StudyReminder};

pub struct ReminderService {
    store: Store,
    clock: Arc<dyn Clock>,
}

impl ReminderService {
    pub fn new(store: Store, clock: Arc<dyn Clock>) -> Self {
        Self { store, clock }
    }

    // ── Reminders ───────────────────────────────────────────────────────────

    pub fn get_reminders(&self) -> Result<Vec<StudyReminder>> {
        self.store.get_or_default(keys::REMINDERS)
    }

    pub fn add_reminder(&self, new: NewReminder) -> Result<StudyReminder> {
        let days = validate_schedule(&new.time, &new.days)?;
        let reminder = StudyReminder {
            id: uuid::Uuid::now_v7().to_string(),
            title: new.title,
            message: new.message,
            time: new.time.trim().to_string(),
            days,
            is_active: true,
            created_at: self.clock.now(),
        };
        let mut reminders = self.get_reminders()?;
        reminders.push(reminder.clone());
        self.store.set(keys::REMINDERS, &reminders)?;
        tracing::info!(reminder_id = %reminder.id, time = %reminder.time, "reminder added");
        Ok(reminder)
    }

    pub fn update_reminder(&self, id: &str, new: NewReminder) -> Result<Option<StudyReminder>> {
        let days = validate_schedule(&new.time, &new.days)?;
        self.modify_reminder(id, |r| {
            r.title = new.title;
            r.message = new.message;
            r.time = new.time.trim().to_string();
            r.days = days;
        })
    }

    pub fn toggle_reminder(&self, id: &str) -> Result<Option<StudyReminder>> {
        self.modify_reminder(id, |r| r.is_active = !r.is_active)
    }

    pub fn delete_reminder(&self, id: &str) -> Result<bool> {
        let mut reminders = self.get_reminders()?;
        let before = reminders.len();
        reminders.retain(|r| r.id != id);
        if reminders.len() == before {
            return Ok(false);
        }
        self.store.set(keys::REMINDERS, &reminders)?;
        Ok(true)
    }

    fn modify_reminder(
        &self,
        id: &str,
        f: impl FnOnce(&mut StudyReminder),
    ) -> Result<Option<StudyReminder>> {
        let mut reminders = self.get_reminders()?;
        let Some(reminder) = reminders.iter_mut().find(|r| r.id == id) else {
            return Ok(None);
        };
        f(reminder);
        let updated = reminder.clone();
        self.store.set(keys::REMINDERS, &reminders)?;
        Ok(Some(updated))
    }

    /// Active reminders with their next fire time after `now` (local wall
    /// clock), soonest first.
    pub fn upcoming(&self, now: NaiveDateTime) -> Result<Vec<(StudyReminder, NaiveDateTime)>> {
        let mut upcoming: Vec<_> = self
            .get_reminders()?
            .into_iter()
            .filter_map(|r| schedule::next_fire_after(&r, now).map(|t| (r, t)))
            .collect();
        upcoming.sort_by_key(|(_, t)| *t);
        Ok(upcoming)
    }

    // ── Goals ───────────────────────────────────────────────────────────────

    pub fn get_goals(&self) -> Result<Vec<StudyGoal>> {
        self.store.get_or_default(keys::GOALS)
    }

    pub fn add_goal(&self, new: NewGoal) -> Result<StudyGoal> {
        let days = validate_schedule(&new.time, &new.days)?;
        anyhow::ensure!(new.target_minutes > 0, "goal target must be at least one minute");
        let goal = StudyGoal {
            id: uuid::Uuid::now_v7().to_string(),
            title: new.title,
            description: new.description,
            target_minutes: new.target_minutes,
            time: new.time.trim().to_string(),
            days,
            is_active: true,
            created_at: self.clock.now(),
        };
        let mut goals = self.get_goals()?;
        goals.push(goal.clone());
        self.store.set(keys::GOALS, &goals)?;
        tracing::info!(goal_id = %goal.id, minutes = goal.target_minutes, "goal added");
        Ok(goal)
    }

    pub fn update_goal(&self, id: &str, new: NewGoal) -> Result<Option<StudyGoal>> {
        let days = validate_schedule(&new.time, &new.days)?;
        self.modify_goal(id, |g| {
            g.title = new.title;
            g.description = new.description;
            g.target_minutes = new.target_minutes;
            g.time = new.time.trim().to_string();
            g.days = days;
        })
    }

    pub fn toggle_goal(&self, id: &str) -> Result<Option<StudyGoal>> {
        self.modify_goal(id, |g| g.is_active = !g.is_active)
    }

    pub fn delete_goal(&self, id: &str) -> Result<bool> {
        let mut goals = self.get_goals()?;
        let before = goals.len();
        goals.retain(|g| g.id != id);
        if goals.len() == before {
            return Ok(false);
        }
        self.store.set(keys::GOALS, &goals)?;
        Ok(true)
    }

    fn modify_goal(&self, id: &str, f: impl FnOnce(&mut StudyGoal)) -> Result<Option<StudyGoal>> {
        let mut goals = self.get_goals()?;
        let Some(goal) = goals.iter_mut().find(|g| g.id == id) else {
            return Ok(None);
        };
        f(goal);
        let updated = goal.clone();
        self.store.set(keys::GOALS, &goals)?;
        Ok(Some(updated))
    }
}
