use serde::Serialize;

/// Top-level state of the tutor. Exactly one at a time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AppState {
    Idle,
    Scanning,
    Processing,
    Result,
    Error,
}

impl AppState {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Idle => "IDLE",
            Self::Scanning => "SCANNING",
            Self::Processing => "PROCESSING",
            Self::Result => "RESULT",
            Self::Error => "ERROR",
        }
    }

    /// Whether `self -> next` is an edge of the state machine.
    ///
    /// Input validation and capture failures go straight to `Error` from
    /// whichever state accepted the input.
    pub fn can_transition_to(self, next: AppState) -> bool {
        use AppState::*;
        matches!(
            (self, next),
            (Idle, Scanning)
                | (Scanning, Processing)
                | (Scanning, Idle)
                | (Idle | Result, Processing)
                | (Processing, Result | Error)
                | (Idle | Scanning | Result, Error)
                | (Error | Result, Idle)
        )
    }
}

impl std::fmt::Display for AppState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// How the current question was entered. `try_again` re-enters it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum InputMode {
    Camera,
    Upload,
    Audio,
    #[default]
    Text,
}
