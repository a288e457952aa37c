//! Error taxonomy for the application state machine and the AI layer.
//!
//! Storage and service code returns `anyhow::Result`; anything that reaches
//! the user as an ERROR-state message is a [`TutorError`].

use crate::app::{AppState, CaptureDevice, CaptureErrorKind};

#[derive(Debug, thiserror::Error)]
pub enum TutorError {
    /// The file's MIME type does not match the expected input kind.
    #[error("Unsupported file type: {mime_type}. Please choose an image or audio file.")]
    UnsupportedFileType { mime_type: String },

    #[error("{kind} is too large ({size_mb:.1} MB). Please choose a file under {limit_mb} MB.")]
    FileTooLarge {
        kind: &'static str,
        size_mb: f64,
        limit_mb: usize,
    },

    #[error("Please type a question first.")]
    EmptyQuestion,

    #[error("Still working on your last question. Please wait a moment.")]
    Busy,

    #[error("cannot go from {from} to {to}")]
    InvalidTransition { from: AppState, to: AppState },

    #[error("Sorry, the tutor couldn't answer: {0}")]
    Ai(String),

    #[error("Sorry, the tutor returned an empty answer. Please try again.")]
    EmptyResponse,

    #[error("Invalid quiz format")]
    InvalidQuizFormat,

    #[error("{}", crate::app::capture_guidance(.device, .kind))]
    Permission {
        device: CaptureDevice,
        kind: CaptureErrorKind,
    },

    #[error("no message at index {0}")]
    NoSuchMessage(usize),

    #[error(transparent)]
    Storage(#[from] anyhow::Error),
}

impl TutorError {
    /// Errors caught before any network call.
    pub fn is_validation(&self) -> bool {
        matches!(
            self,
            Self::UnsupportedFileType { .. } | Self::FileTooLarge { .. } | Self::EmptyQuestion
        )
    }
}
