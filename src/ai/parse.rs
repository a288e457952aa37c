//! Turning model text into quiz and label structures.
//!
//! Quizzes are requested as schema-constrained JSON, so [`JsonQuizParser`]
//! handles the normal path. [`RegexQuizParser`] is the degraded mode for
//! models that answer in numbered plain text anyway.

use regex::Regex;
use std::sync::LazyLock;

use super::{Quiz, QuizQuestion};
use crate::error::TutorError;

pub const OPTIONS_PER_QUESTION: usize = 4;

pub trait QuizParser {
    fn parse_quiz(&self, text: &str) -> Result<Quiz, TutorError>;
}

/// Parses `{"questions": [...]}`, tolerating a Markdown code fence around it.
#[derive(Debug, Default)]
pub struct JsonQuizParser;

impl QuizParser for JsonQuizParser {
    fn parse_quiz(&self, text: &str) -> Result<Quiz, TutorError> {
        let body = strip_code_fence(text);
        let quiz: Quiz = serde_json::from_str(body).map_err(|e| {
            tracing::debug!(error = %e, "quiz JSON did not parse");
            TutorError::InvalidQuizFormat
        })?;
        validate(quiz)
    }
}

static QUESTION_LINE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^\s*(?:\*\*)?(?:Q(?:uestion)?\s*)?\d+\s*[.):]\s*(?:\*\*)?\s*(.+?)(?:\*\*)?\s*$")
        .expect("valid regex")
});
static OPTION_LINE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\s*\(?([A-Da-d])[).:]\s*(.+?)\s*$").expect("valid regex"));
static ANSWER_LINE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)^\s*(?:\*\*)?(?:correct\s+)?answer(?:\*\*)?\s*[:\-]\s*(?:\*\*)?\(?([A-D])\b")
        .expect("valid regex")
});
static EXPLANATION_LINE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)^\s*(?:\*\*)?explanation(?:\*\*)?\s*[:\-]\s*(.+?)\s*$").expect("valid regex")
});

/// Line-oriented parser for numbered questions with `A)`–`D)` options and
/// an `Answer: X` line. Incomplete questions are dropped.
#[derive(Debug, Default)]
pub struct RegexQuizParser;

impl QuizParser for RegexQuizParser {
    fn parse_quiz(&self, text: &str) -> Result<Quiz, TutorError> {
        let mut questions = Vec::new();
        let mut current: Option<Draft> = None;

        for line in text.lines() {
            if let Some(caps) = ANSWER_LINE.captures(line) {
                if let Some(draft) = current.as_mut() {
                    let letter = caps[1].to_ascii_uppercase();
                    draft.answer = letter.bytes().next().map(|b| (b - b'A') as usize);
                }
            } else if let Some(caps) = EXPLANATION_LINE.captures(line) {
                if let Some(draft) = current.as_mut() {
                    draft.explanation = caps[1].to_string();
                }
            } else if let Some(caps) = OPTION_LINE.captures(line) {
                if let Some(draft) = current.as_mut() {
                    draft.options.push(caps[2].to_string());
                }
            } else if let Some(caps) = QUESTION_LINE.captures(line) {
                if let Some(done) = current.take().and_then(Draft::finish) {
                    questions.push(done);
                }
                current = Some(Draft::new(caps[1].to_string()));
            }
        }
        if let Some(done) = current.and_then(Draft::finish) {
            questions.push(done);
        }

        validate(Quiz { questions })
    }
}

struct Draft {
    question: String,
    options: Vec<String>,
    answer: Option<usize>,
    explanation: String,
}

impl Draft {
    fn new(question: String) -> Self {
        Self {
            question,
            options: Vec::new(),
            answer: None,
            explanation: String::new(),
        }
    }

    fn finish(self) -> Option<QuizQuestion> {
        Some(QuizQuestion {
            question: self.question,
            options: self.options,
            correct_answer_index: self.answer?,
            explanation: self.explanation,
        })
        .filter(|q| q.options.len() == OPTIONS_PER_QUESTION)
    }
}

/// Structured parse first, plain-text fallback second.
pub fn parse_quiz_response(text: &str) -> Result<Quiz, TutorError> {
    JsonQuizParser.parse_quiz(text).or_else(|_| {
        tracing::warn!("quiz response was not valid JSON, trying plain-text parser");
        RegexQuizParser.parse_quiz(text)
    })
}

fn validate(quiz: Quiz) -> Result<Quiz, TutorError> {
    let ok = !quiz.questions.is_empty()
        && quiz.questions.iter().all(|q| {
            !q.question.trim().is_empty()
                && q.options.len() == OPTIONS_PER_QUESTION
                && q.correct_answer_index < OPTIONS_PER_QUESTION
        });
    if ok {
        Ok(quiz)
    } else {
        Err(TutorError::InvalidQuizFormat)
    }
}

fn strip_code_fence(text: &str) -> &str {
    let trimmed = text.trim();
    let Some(rest) = trimmed.strip_prefix("```") else {
        return trimmed;
    };
    // drop the language tag line
    let rest = rest.split_once('\n').map_or("", |(_, body)| body);
    rest.trim_end().strip_suffix("```").unwrap_or(rest).trim()
}

static BULLET_LABEL: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?m)^\s*(?:[-*•]|\d+[.)])\s+\*{0,2}([^:*\n]{1,40}?)\*{0,2}\s*[:–-]\s+\S")
        .expect("valid regex")
});
static LABEL_LIST: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?im)^\s*labels?\s*:\s*(.+)$").expect("valid regex"));

const MAX_LABELS: usize = 12;

/// Pull diagram labels out of a free-text description. Recognizes
/// `Labels: a, b, c` lines and bulleted `- **Name**: detail` entries.
pub fn extract_labels(text: &str) -> Vec<String> {
    let mut labels: Vec<String> = Vec::new();
    let mut push = |label: &str| {
        let label = label.trim().trim_matches('*').trim();
        if !label.is_empty() && !labels.iter().any(|l| l.eq_ignore_ascii_case(label)) {
            labels.push(label.to_string());
        }
    };

    for caps in LABEL_LIST.captures_iter(text) {
        for part in caps[1].split(',') {
            push(part);
        }
    }
    for caps in BULLET_LABEL.captures_iter(text) {
        push(&caps[1]);
    }

    labels.truncate(MAX_LABELS);
    labels
}
