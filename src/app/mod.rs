//! Application state machine.
//!
//! [`TutorApp`] drives the tutor through `IDLE → SCANNING → PROCESSING →
//! RESULT/ERROR`, calls the [`TutorModel`], and writes the side effects of a
//! successful answer into the progress, settings, and offline services.
//!
//! Only one model call may be in flight. Methods take `&self` so the app can
//! be shared across tasks; a second submission while one is running is
//! rejected with [`TutorError::Busy`].

mod capture;
mod input;
mod state;

pub use capture::{capture_guidance, CaptureDevice, CaptureErrorKind};
pub use input::{mime_for_path, InputFile, InputKind};
pub use state::{AppState, InputMode};

use chrono::{DateTime, Utc};
use serde::Serialize;
use std::sync::{Arc, Mutex, MutexGuard};
use tokio::sync::broadcast;
use tracing::{debug, info, warn};

use crate::adaptive::infer_subject;
use crate::adaptive::types::Difficulty;
use crate::ai::prompt::build_system_instruction;
use crate::ai::{AiOutcome, Attachment, ChatMessage, Illustration, Quiz, Role, TutorModel};
use crate::error::TutorError;
use crate::progress::types::{Bookmark, BookmarkType, NewBookmark, StudySession};
use crate::services::Services;
use crate::settings::topic_label;

const IMAGE_PROMPT: &str = "Please explain this homework problem step by step.";
const AUDIO_PROMPT: &str = "Please listen to my question and help me understand it.";
const LAST_EXPLANATION: &str = "last-explanation";

/// A quiz handed to the student, remembered until they submit answers.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct QuizAttempt {
    pub topic: String,
    pub quiz: Quiz,
    pub generated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct QuizResult {
    pub score: f64,
    pub correct: usize,
    pub total: usize,
}

struct Inner {
    state: AppState,
    mode: InputMode,
    error_message: Option<String>,
    history: Vec<ChatMessage>,
    in_flight: bool,
}

pub struct TutorApp {
    services: Arc<Services>,
    model: Arc<dyn TutorModel>,
    inner: Mutex<Inner>,
    transitions: broadcast::Sender<AppState>,
}

impl TutorApp {
    pub fn new(services: Arc<Services>, model: Arc<dyn TutorModel>) -> Self {
        let (transitions, _) = broadcast::channel(64);
        Self {
            services,
            model,
            inner: Mutex::new(Inner {
                state: AppState::Idle,
                mode: InputMode::default(),
                error_message: None,
                history: Vec::new(),
                in_flight: false,
            }),
            transitions,
        }
    }

    fn lock(&self) -> MutexGuard<'_, Inner> {
        self.inner.lock().unwrap_or_else(|e| e.into_inner())
    }

    pub fn services(&self) -> &Arc<Services> {
        &self.services
    }

    pub fn state(&self) -> AppState {
        self.lock().state
    }

    pub fn input_mode(&self) -> InputMode {
        self.lock().mode
    }

    /// User-facing text of the last error, while in `ERROR`.
    pub fn error_message(&self) -> Option<String> {
        self.lock().error_message.clone()
    }

    pub fn chat_history(&self) -> Vec<ChatMessage> {
        self.lock().history.clone()
    }

    /// Every state entered from now on, in order.
    pub fn subscribe(&self) -> broadcast::Receiver<AppState> {
        self.transitions.subscribe()
    }

    pub fn recent_topics(&self) -> Result<Vec<String>, TutorError> {
        Ok(self.services.settings.recent_topics()?)
    }

    fn transition(&self, inner: &mut Inner, next: AppState) -> Result<(), TutorError> {
        if !inner.state.can_transition_to(next) {
            return Err(TutorError::InvalidTransition {
                from: inner.state,
                to: next,
            });
        }
        debug!(from = %inner.state, to = %next, "state transition");
        inner.state = next;
        let _ = self.transitions.send(next);
        Ok(())
    }

    /// Record `err` as the visible error, entering `ERROR` when that edge exists.
    fn fail(&self, inner: &mut Inner, err: TutorError) -> TutorError {
        if inner.state.can_transition_to(AppState::Error) {
            inner.state = AppState::Error;
            let _ = self.transitions.send(AppState::Error);
        }
        warn!(error = %err, state = %inner.state, "tutor error");
        inner.error_message = Some(err.to_string());
        err
    }

    fn ensure_busy_free(inner: &Inner) -> Result<(), TutorError> {
        if inner.in_flight || inner.state == AppState::Processing {
            Err(TutorError::Busy)
        } else {
            Ok(())
        }
    }

    // ── Navigation ──────────────────────────────────────────────────────────

    pub fn start_scan(&self) -> Result<(), TutorError> {
        {
            let mut inner = self.lock();
            Self::ensure_busy_free(&inner)?;
            self.transition(&mut inner, AppState::Scanning)?;
            inner.mode = InputMode::Camera;
            inner.error_message = None;
        }
        self.ensure_session();
        Ok(())
    }

    pub fn cancel_scan(&self) -> Result<(), TutorError> {
        let mut inner = self.lock();
        if inner.state != AppState::Scanning {
            return Err(TutorError::InvalidTransition {
                from: inner.state,
                to: AppState::Idle,
            });
        }
        self.transition(&mut inner, AppState::Idle)
    }

    /// Leave `ERROR` and re-enter the input mode that failed. Returns the new state.
    pub fn try_again(&self) -> Result<AppState, TutorError> {
        let mut inner = self.lock();
        if inner.state != AppState::Error {
            return Err(TutorError::InvalidTransition {
                from: inner.state,
                to: AppState::Idle,
            });
        }
        self.transition(&mut inner, AppState::Idle)?;
        inner.error_message = None;
        if inner.mode == InputMode::Camera {
            self.transition(&mut inner, AppState::Scanning)?;
        }
        Ok(inner.state)
    }

    /// Back to `IDLE` with an empty transcript.
    pub fn reset(&self) -> Result<(), TutorError> {
        let mut inner = self.lock();
        Self::ensure_busy_free(&inner)?;
        if inner.state != AppState::Idle {
            self.transition(&mut inner, AppState::Idle)?;
        }
        inner.history.clear();
        inner.error_message = None;
        inner.mode = InputMode::default();
        Ok(())
    }

    /// Reset and close the open study session.
    pub fn go_home(&self) -> Result<Option<StudySession>, TutorError> {
        self.reset()?;
        Ok(self.services.progress.end_session()?)
    }

    /// Surface a camera or microphone failure. Returns the guidance shown.
    pub fn report_capture_error(
        &self,
        device: CaptureDevice,
        kind: CaptureErrorKind,
    ) -> Result<String, TutorError> {
        let mut inner = self.lock();
        Self::ensure_busy_free(&inner)?;
        Ok(self
            .fail(&mut inner, TutorError::Permission { device, kind })
            .to_string())
    }

    // ── Questions ───────────────────────────────────────────────────────────

    /// Submit a captured camera frame. Only valid while `SCANNING`.
    pub async fn capture_frame(&self, frame: InputFile) -> Result<String, TutorError> {
        self.submit(
            InputMode::Camera,
            None,
            Some((frame, Some(InputKind::Image))),
        )
        .await
    }

    /// Submit an uploaded image or audio file.
    pub async fn upload_file(&self, file: InputFile) -> Result<String, TutorError> {
        self.submit(InputMode::Upload, None, Some((file, None))).await
    }

    pub async fn submit_audio(&self, recording: InputFile) -> Result<String, TutorError> {
        self.submit(
            InputMode::Audio,
            None,
            Some((recording, Some(InputKind::Audio))),
        )
        .await
    }

    /// Ask a typed question. Blank input is rejected without a state change.
    pub async fn quick_ask(&self, question: &str) -> Result<String, TutorError> {
        let question = question.trim();
        if question.is_empty() {
            return Err(TutorError::EmptyQuestion);
        }
        self.submit(InputMode::Text, Some(question.to_string()), None)
            .await
    }

    async fn submit(
        &self,
        mode: InputMode,
        text: Option<String>,
        file: Option<(InputFile, Option<InputKind>)>,
    ) -> Result<String, TutorError> {
        let history = {
            let mut inner = self.lock();
            Self::ensure_busy_free(&inner)?;
            let accepts = match mode {
                InputMode::Camera => inner.state == AppState::Scanning,
                _ => matches!(inner.state, AppState::Idle | AppState::Result),
            };
            if !accepts {
                return Err(TutorError::InvalidTransition {
                    from: inner.state,
                    to: AppState::Processing,
                });
            }
            inner.mode = mode;

            let (content, attachment) = match &file {
                Some((f, expected)) => {
                    match f.validate(&self.services.config.limits, *expected) {
                        Ok(kind) => {
                            let prompt = match kind {
                                InputKind::Image => IMAGE_PROMPT,
                                InputKind::Audio => AUDIO_PROMPT,
                            };
                            let content = text.clone().unwrap_or_else(|| prompt.to_string());
                            (content, Some(Attachment::from_bytes(&f.mime_type, &f.bytes)))
                        }
                        Err(e) => return Err(self.fail(&mut inner, e)),
                    }
                }
                None => (text.clone().unwrap_or_default(), None),
            };

            self.transition(&mut inner, AppState::Processing)?;
            inner.in_flight = true;
            inner.error_message = None;
            inner.history.push(ChatMessage {
                role: Role::User,
                content,
                attachment,
                timestamp: self.services.clock.now(),
            });
            inner.history.clone()
        };
        let call = InFlight::new(self);

        self.ensure_session();
        info!(?mode, turns = history.len(), "asking the tutor");

        let result = match self.system_instruction() {
            Ok(instruction) => match self.model.explain(&history, &instruction).await {
                AiOutcome::Success(answer) => Ok(answer),
                AiOutcome::Empty => Err(TutorError::EmptyResponse),
                AiOutcome::Failure(reason) => Err(TutorError::Ai(reason)),
            },
            Err(e) => Err(e),
        };
        call.complete();

        let answer = {
            let mut inner = self.lock();
            match result {
                Ok(answer) => {
                    inner.history.push(ChatMessage {
                        role: Role::Model,
                        content: answer.clone(),
                        attachment: None,
                        timestamp: self.services.clock.now(),
                    });
                    self.transition(&mut inner, AppState::Result)?;
                    answer
                }
                Err(e) => {
                    inner.history.pop();
                    return Err(self.fail(&mut inner, e));
                }
            }
        };

        self.record_answer(text.as_deref(), &answer);
        Ok(answer)
    }

    /// Side effects of entering `RESULT`. Failures are logged, not surfaced.
    fn record_answer(&self, question: Option<&str>, answer: &str) {
        let source = question.unwrap_or(answer);
        let topic = match self.services.settings.push_recent_topic(source) {
            Ok(label) => label.unwrap_or_default(),
            Err(e) => {
                warn!(error = %e, "failed to update recent topics");
                String::new()
            }
        };

        if let Err(e) = self.services.progress.record_question(&topic) {
            warn!(error = %e, "failed to record question");
        }

        let snapshot = serde_json::json!({
            "question": question.unwrap_or_default(),
            "answer": answer,
            "topic": topic,
        });
        if let Err(e) = self.services.offline.cache_data(LAST_EXPLANATION, &snapshot) {
            warn!(error = %e, "failed to cache explanation");
        }
    }

    /// Open a study session unless one is already running.
    fn ensure_session(&self) {
        let progress = &self.services.progress;
        let result = progress.current_session().and_then(|open| match open {
            Some(_) => Ok(()),
            None => progress.start_session(&[]).map(|_| ()),
        });
        if let Err(e) = result {
            warn!(error = %e, "failed to open study session");
        }
    }

    fn system_instruction(&self) -> Result<String, TutorError> {
        let settings = self.services.settings.get_settings()?;
        let profile = self.services.adaptive.get_profile()?;
        Ok(build_system_instruction(&settings, Some(&profile)))
    }

    fn begin_side_call(&self) -> Result<InFlight<'_>, TutorError> {
        {
            let mut inner = self.lock();
            Self::ensure_busy_free(&inner)?;
            inner.in_flight = true;
        }
        Ok(InFlight::new(self))
    }

    // ── Quizzes, diagrams, bookmarks ────────────────────────────────────────

    /// Generate a quiz. Does not move the state machine; failures are returned
    /// to the caller without entering `ERROR`.
    pub async fn generate_quiz(&self, topic: &str, count: usize) -> Result<QuizAttempt, TutorError> {
        let topic = topic.trim();
        if topic.is_empty() {
            return Err(TutorError::EmptyQuestion);
        }
        let call = self.begin_side_call()?;
        let result = match self.system_instruction() {
            Ok(instruction) => self.model.generate_quiz(topic, count, &instruction).await,
            Err(e) => Err(e),
        };
        call.complete();

        let quiz = result.inspect_err(|e| warn!(error = %e, topic, "quiz generation failed"))?;
        info!(topic, questions = quiz.questions.len(), "quiz generated");
        Ok(QuizAttempt {
            topic: topic.to_string(),
            quiz,
            generated_at: self.services.clock.now(),
        })
    }

    /// Score `answers` and feed the result to the progress and adaptive engines.
    pub fn submit_quiz(
        &self,
        attempt: &QuizAttempt,
        answers: &[usize],
        difficulty: Difficulty,
    ) -> Result<QuizResult, TutorError> {
        let score = attempt.quiz.score(answers);
        let elapsed = self.services.clock.now() - attempt.generated_at;
        let minutes = (elapsed.num_seconds().max(0) as f64 / 60.0).round() as u32;

        self.services.progress.record_quiz_score(score)?;
        self.services
            .adaptive
            .record_learning_activity(&attempt.topic, score, minutes, difficulty)?;

        Ok(QuizResult {
            score,
            correct: attempt.quiz.correct_count(answers),
            total: attempt.quiz.questions.len(),
        })
    }

    pub async fn illustrate(&self, description: &str) -> Result<Illustration, TutorError> {
        let description = description.trim();
        if description.is_empty() {
            return Err(TutorError::EmptyQuestion);
        }
        let call = self.begin_side_call()?;
        let illustration = self.model.illustrate(description).await;
        call.complete();

        info!(
            placeholder = illustration.is_placeholder,
            labels = illustration.labels.len(),
            "illustration ready"
        );
        Ok(illustration)
    }

    /// Bookmark the chat message at `index`, titled after the question it answers.
    pub fn bookmark_message(&self, index: usize) -> Result<Bookmark, TutorError> {
        let (message, question) = {
            let inner = self.lock();
            let message = inner
                .history
                .get(index)
                .cloned()
                .ok_or(TutorError::NoSuchMessage(index))?;
            let question = inner.history[..index]
                .iter()
                .rev()
                .find(|m| m.role == Role::User)
                .map(|m| m.content.clone());
            (message, question)
        };

        let source = match (&message.role, question) {
            (Role::Model, Some(q)) => q,
            _ => message.content.clone(),
        };
        let topic = self.label(&source);
        let tags = vec![infer_subject(&topic).to_lowercase()];
        let bookmark = self.services.progress.save_bookmark(NewBookmark {
            title: topic.clone(),
            content: message.content,
            topic,
            kind: BookmarkType::Explanation,
            tags,
        })?;
        Ok(bookmark)
    }

    pub fn bookmark_illustration(&self, illustration: &Illustration) -> Result<Bookmark, TutorError> {
        let topic = self.label(&illustration.description);
        let bookmark = self.services.progress.save_bookmark(NewBookmark {
            title: topic.clone(),
            content: illustration.data_url(),
            topic,
            kind: BookmarkType::Illustration,
            tags: illustration.labels.clone(),
        })?;
        Ok(bookmark)
    }

    fn label(&self, text: &str) -> String {
        topic_label(text, self.services.config.limits.topic_label_chars)
            .unwrap_or_else(|| "Untitled".to_string())
    }
}

/// Clears the in-flight flag when the call ends. If the call future is
/// dropped mid-request, the pending question is withdrawn and the app
/// lands in `ERROR` instead of staying stuck in `PROCESSING`.
struct InFlight<'a> {
    app: &'a TutorApp,
    completed: bool,
}

impl<'a> InFlight<'a> {
    fn new(app: &'a TutorApp) -> Self {
        Self {
            app,
            completed: false,
        }
    }

    fn complete(mut self) {
        self.completed = true;
    }
}

impl Drop for InFlight<'_> {
    fn drop(&mut self) {
        let mut inner = self.app.lock();
        inner.in_flight = false;
        if !self.completed && inner.state == AppState::Processing {
            inner.history.pop();
            let _ = self
                .app
                .fail(&mut inner, TutorError::Ai("the request was cancelled".into()));
        }
    }
}
