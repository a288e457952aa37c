//! Boundary to the hosted language model.
//!
//! [`TutorModel`] is the seam the application state machine calls through.
//! [`gemini::GeminiClient`] is the production implementation; tests script
//! their own.

pub mod gemini;
pub mod illustration;
pub mod parse;
pub mod prompt;

use async_trait::async_trait;
use base64::Engine;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::TutorError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    User,
    Model,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::User => "user",
            Self::Model => "model",
        }
    }
}

/// Inline media sent alongside a user turn.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Attachment {
    pub mime_type: String,
    /// Base64 (standard alphabet, padded).
    pub data: String,
}

impl Attachment {
    pub fn from_bytes(mime_type: &str, bytes: &[u8]) -> Self {
        Self {
            mime_type: mime_type.to_string(),
            data: base64::engine::general_purpose::STANDARD.encode(bytes),
        }
    }
}

/// One transcript turn. The whole transcript is sent on every request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChatMessage {
    pub role: Role,
    pub content: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub attachment: Option<Attachment>,
    pub timestamp: DateTime<Utc>,
}

/// Result of an explanation request. An empty answer is an expected outcome,
/// not an error.
#[derive(Debug, Clone, PartialEq)]
pub enum AiOutcome {
    Success(String),
    Empty,
    Failure(String),
}

impl AiOutcome {
    /// Classify raw model text: blank becomes [`AiOutcome::Empty`].
    pub fn from_text(text: String) -> Self {
        if text.trim().is_empty() {
            Self::Empty
        } else {
            Self::Success(text)
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QuizQuestion {
    pub question: String,
    pub options: Vec<String>,
    pub correct_answer_index: usize,
    #[serde(default)]
    pub explanation: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Quiz {
    pub questions: Vec<QuizQuestion>,
}

impl Quiz {
    /// Percentage of `answers` that match the correct option. Missing answers
    /// count as wrong.
    pub fn score(&self, answers: &[usize]) -> f64 {
        if self.questions.is_empty() {
            return 0.0;
        }
        self.correct_count(answers) as f64 / self.questions.len() as f64 * 100.0
    }

    pub fn correct_count(&self, answers: &[usize]) -> usize {
        self.questions
            .iter()
            .zip(answers)
            .filter(|(q, a)| q.correct_answer_index == **a)
            .count()
    }
}

/// A generated diagram, or the local placeholder when generation failed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Illustration {
    pub mime_type: String,
    /// Base64 image bytes.
    pub data: String,
    pub description: String,
    pub labels: Vec<String>,
    pub is_placeholder: bool,
}

impl Illustration {
    pub fn data_url(&self) -> String {
        format!("data:{};base64,{}", self.mime_type, self.data)
    }

    pub fn bytes(&self) -> Result<Vec<u8>, base64::DecodeError> {
        base64::engine::general_purpose::STANDARD.decode(&self.data)
    }
}

#[async_trait]
pub trait TutorModel: Send + Sync {
    /// Continue the conversation in `history` (last entry is the new user turn).
    async fn explain(&self, history: &[ChatMessage], system_instruction: &str) -> AiOutcome;

    /// Build a multiple-choice quiz on `topic`.
    async fn generate_quiz(
        &self,
        topic: &str,
        count: usize,
        system_instruction: &str,
    ) -> Result<Quiz, TutorError>;

    /// Draw an educational diagram. Never fails: falls back to a placeholder.
    async fn illustrate(&self, description: &str) -> Illustration;
}
