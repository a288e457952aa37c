#![allow(dead_code)]

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use tokio::sync::Notify;

use gabu_tutor::ai::{AiOutcome, ChatMessage, Illustration, Quiz, QuizQuestion, TutorModel};
use gabu_tutor::app::TutorApp;
use gabu_tutor::clock::{Clock, ManualClock};
use gabu_tutor::config::TutorConfig;
use gabu_tutor::error::TutorError;
use gabu_tutor::services::Services;
use gabu_tutor::store::Store;

/// Fixed starting instant for clock-driven tests (a Monday).
pub fn t0() -> DateTime<Utc> {
    "2026-06-01T09:00:00Z".parse().unwrap()
}

/// Fresh in-memory store with schema and migrations applied.
pub fn test_store() -> Store {
    Store::in_memory().unwrap()
}

pub fn test_clock() -> Arc<ManualClock> {
    Arc::new(ManualClock::new(t0()))
}

pub fn test_services(clock: Arc<dyn Clock>) -> Arc<Services> {
    Arc::new(Services::new(test_store(), clock, TutorConfig::default()))
}

pub fn test_app(model: Arc<FakeModel>) -> (TutorApp, Arc<ManualClock>) {
    let clock = test_clock();
    let app = TutorApp::new(test_services(clock.clone()), model);
    (app, clock)
}

/// Clock that follows tokio's (pausable) time, so reminder timers and
/// "now" move together under `tokio::time::advance`.
pub struct TokioClock {
    origin: DateTime<Utc>,
    started: tokio::time::Instant,
}

impl TokioClock {
    pub fn new(origin: DateTime<Utc>) -> Self {
        Self {
            origin,
            started: tokio::time::Instant::now(),
        }
    }
}

impl Clock for TokioClock {
    fn now(&self) -> DateTime<Utc> {
        let elapsed = tokio::time::Instant::now() - self.started;
        self.origin + chrono::Duration::from_std(elapsed).unwrap()
    }
}

pub fn four_option_question(question: &str, correct: usize) -> QuizQuestion {
    QuizQuestion {
        question: question.into(),
        options: vec!["A".into(), "B".into(), "C".into(), "D".into()],
        correct_answer_index: correct,
        explanation: String::new(),
    }
}

/// Scripted [`TutorModel`]. Explanations are served from a queue; an
/// exhausted queue answers [`AiOutcome::Empty`].
#[derive(Default)]
pub struct FakeModel {
    outcomes: Mutex<VecDeque<AiOutcome>>,
    quiz: Mutex<Option<Quiz>>,
    gate: Option<Arc<Notify>>,
    calls: AtomicUsize,
    last_history: Mutex<Vec<ChatMessage>>,
    last_instruction: Mutex<String>,
}

impl FakeModel {
    pub fn answering(answers: &[&str]) -> Self {
        Self::scripted(answers.iter().map(|a| AiOutcome::Success(a.to_string())).collect())
    }

    pub fn scripted(outcomes: Vec<AiOutcome>) -> Self {
        Self {
            outcomes: Mutex::new(outcomes.into()),
            ..Self::default()
        }
    }

    pub fn with_quiz(self, quiz: Quiz) -> Self {
        *self.quiz.lock().unwrap() = Some(quiz);
        self
    }

    /// Hold every `explain` call until the returned [`Notify`] is signalled.
    pub fn gated(mut self) -> (Self, Arc<Notify>) {
        let gate = Arc::new(Notify::new());
        self.gate = Some(gate.clone());
        (self, gate)
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn last_history(&self) -> Vec<ChatMessage> {
        self.last_history.lock().unwrap().clone()
    }

    pub fn last_instruction(&self) -> String {
        self.last_instruction.lock().unwrap().clone()
    }
}

#[async_trait]
impl TutorModel for FakeModel {
    async fn explain(&self, history: &[ChatMessage], system_instruction: &str) -> AiOutcome {
        self.calls.fetch_add(1, Ordering::SeqCst);
        *self.last_history.lock().unwrap() = history.to_vec();
        *self.last_instruction.lock().unwrap() = system_instruction.to_string();
        if let Some(gate) = &self.gate {
            gate.notified().await;
        }
        self.outcomes
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or(AiOutcome::Empty)
    }

    async fn generate_quiz(
        &self,
        _topic: &str,
        _count: usize,
        _system_instruction: &str,
    ) -> Result<Quiz, TutorError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.quiz
            .lock()
            .unwrap()
            .clone()
            .ok_or(TutorError::InvalidQuizFormat)
    }

    async fn illustrate(&self, description: &str) -> Illustration {
        self.calls.fetch_add(1, Ordering::SeqCst);
        gabu_tutor::ai::illustration::placeholder(description)
    }
}
