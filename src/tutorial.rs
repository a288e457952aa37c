//! First-run tutorial progress.

use anyhow::Result;
use serde::{Deserialize, Serialize};

use crate::store::{keys, Store};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TutorialStep {
    pub id: &'static str,
    pub title: &'static str,
    pub body: &'static str,
}

pub const STEPS: &[TutorialStep] = &[
    TutorialStep {
        id: "welcome",
        title: "Welcome to Gabu's Tutor",
        body: "Gabu helps you understand your homework, one step at a time.",
    },
    TutorialStep {
        id: "scan",
        title: "Scan a question",
        body: "Take a photo of a homework problem and Gabu will explain it.",
    },
    TutorialStep {
        id: "ask",
        title: "Ask anything",
        body: "Type or record a question to get a quick explanation.",
    },
    TutorialStep {
        id: "materials",
        title: "Your materials",
        body: "Bookmarks, quizzes, and diagrams you save show up here.",
    },
    TutorialStep {
        id: "profile",
        title: "Track your progress",
        body: "Check your streak, reports, and reminders on your profile.",
    },
];

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct TutorialState {
    pub has_completed: bool,
    pub skipped: bool,
    pub current_step: usize,
    pub completed_steps: Vec<String>,
}

pub struct TutorialService {
    store: Store,
}

impl TutorialService {
    pub fn new(store: Store) -> Self {
        Self { store }
    }

    pub fn state(&self) -> Result<TutorialState> {
        self.store.get_or_default(keys::TUTORIAL)
    }

    pub fn should_show(&self) -> Result<bool> {
        let state = self.state()?;
        Ok(!state.has_completed && !state.skipped)
    }

    pub fn current_step(&self) -> Result<Option<&'static TutorialStep>> {
        let state = self.state()?;
        if state.has_completed || state.skipped {
            return Ok(None);
        }
        Ok(STEPS.get(state.current_step))
    }

    /// Mark the current step done and move on. Returns the next step, or
    /// `None` once the tutorial is complete.
    pub fn advance(&self) -> Result<Option<&'static TutorialStep>> {
        let mut state = self.state()?;
        if state.has_completed || state.skipped {
            return Ok(None);
        }

        if let Some(step) = STEPS.get(state.current_step) {
            if !state.completed_steps.iter().any(|s| s == step.id) {
                state.completed_steps.push(step.id.to_string());
            }
        }
        state.current_step += 1;
        if state.current_step >= STEPS.len() {
            state.has_completed = true;
            tracing::info!("tutorial completed");
        }
        self.store.set(keys::TUTORIAL, &state)?;
        Ok(if state.has_completed { None } else { STEPS.get(state.current_step) })
    }

    pub fn skip(&self) -> Result<()> {
        let mut state = self.state()?;
        state.skipped = true;
        self.store.set(keys::TUTORIAL, &state)
    }

    pub fn reset(&self) -> Result<()> {
        self.store.set(keys::TUTORIAL, &TutorialState::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn walks_every_step_then_completes() {
        let svc = TutorialService::new(Store::in_memory().unwrap());
        assert!(svc.should_show().unwrap());
        assert_eq!(svc.current_step().unwrap().unwrap().id, "welcome");

        for expected in &STEPS[1..] {
            assert_eq!(svc.advance().unwrap().unwrap().id, expected.id);
        }
        assert!(svc.advance().unwrap().is_none());

        let state = svc.state().unwrap();
        assert!(state.has_completed);
        assert_eq!(state.completed_steps.len(), STEPS.len());
        assert!(!svc.should_show().unwrap());
    }

    #[test]
    fn skip_hides_until_reset() {
        let svc = TutorialService::new(Store::in_memory().unwrap());
        svc.skip().unwrap();
        assert!(!svc.should_show().unwrap());
        assert!(svc.current_step().unwrap().is_none());

        svc.reset().unwrap();
        assert!(svc.should_show().unwrap());
    }
}
