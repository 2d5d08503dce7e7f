use thiserror::Error;

//
// ─── ERRORS ────────────────────────────────────────────────────────────────────
//

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum QuizSettingsError {
    #[error("session size must be > 0")]
    InvalidSessionSize,
}

//
// ─── SETTINGS ──────────────────────────────────────────────────────────────────
//

/// Tunables shared by every session of a bank.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct QuizSettings {
    session_size: u32,
    live_feedback: bool,
}

impl QuizSettings {
    pub const DEFAULT_SESSION_SIZE: u32 = 40;

    /// Creates validated settings.
    ///
    /// # Errors
    ///
    /// Returns `QuizSettingsError::InvalidSessionSize` if `session_size` is zero.
    pub fn new(session_size: u32, live_feedback: bool) -> Result<Self, QuizSettingsError> {
        if session_size == 0 {
            return Err(QuizSettingsError::InvalidSessionSize);
        }
        Ok(Self {
            session_size,
            live_feedback,
        })
    }

    /// Number of questions per session; the last session of a bank may be shorter.
    #[must_use]
    pub fn session_size(&self) -> u32 {
        self.session_size
    }

    /// When enabled, each answer is marked immediately and a wrong first answer
    /// must be followed by picking a correct option before moving on.
    #[must_use]
    pub fn live_feedback(&self) -> bool {
        self.live_feedback
    }

    #[must_use]
    pub fn with_live_feedback(mut self, live_feedback: bool) -> Self {
        self.live_feedback = live_feedback;
        self
    }
}

impl Default for QuizSettings {
    /// 40 questions per session, live feedback on.
    fn default() -> Self {
        Self {
            session_size: Self::DEFAULT_SESSION_SIZE,
            live_feedback: true,
        }
    }
}
