use log::{info, warn};

use quiz_core::model::{
    Advance, QuestionBank, QuizSettings, Selection, SessionGrade, SessionNumber, SessionState,
};
use storage::{PersistenceStore, ProgressRecord, ResultRecord};

use crate::Clock;
use crate::error::SessionError;

/// Result of moving forward in a session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StepOutcome {
    Moved { position: usize },
    Completed(CompletedSession),
}

/// A graded session and whether its result reached the store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompletedSession {
    pub grade: SessionGrade,
    pub result_saved: bool,
}

/// Orchestrates session start, answering and persistence.
///
/// Progress is saved after every recorded answer and every move, so leaving a
/// session at any point loses nothing.
#[derive(Clone)]
pub struct SessionLoopService {
    clock: Clock,
    store: PersistenceStore,
    settings: QuizSettings,
}

impl SessionLoopService {
    #[must_use]
    pub fn new(clock: Clock, store: PersistenceStore, settings: QuizSettings) -> Self {
        Self {
            clock,
            store,
            settings,
        }
    }

    #[must_use]
    pub fn settings(&self) -> &QuizSettings {
        &self.settings
    }

    /// Open session `number`, resuming saved progress when there is any.
    ///
    /// Progress that no longer fits the bank is discarded with a warning and
    /// the session starts fresh.
    ///
    /// # Errors
    ///
    /// Returns `SessionError::Bank` if `number` is past the last session.
    pub fn start(
        &self,
        bank: &QuestionBank,
        number: SessionNumber,
    ) -> Result<SessionState, SessionError> {
        let questions = bank.slice(number)?.to_vec();

        if let Some(record) = self.store.load_progress(number) {
            match record.into_session(questions.clone(), &self.settings) {
                Ok(session) => {
                    info!(
                        "resuming session {number} at question {}",
                        session.position() + 1
                    );
                    return Ok(session);
                }
                Err(err) => warn!("saved progress for session {number} is unusable: {err}"),
            }
        }

        info!("starting session {number} ({} questions)", questions.len());
        Ok(SessionState::new(number, questions, &self.settings)?)
    }

    /// Pick an option and save progress if the pick was recorded.
    ///
    /// # Errors
    ///
    /// Returns `SessionError::Transition` for a completed session or an
    /// out-of-range option.
    pub fn select_option(
        &self,
        session: &mut SessionState,
        index: usize,
    ) -> Result<Selection, SessionError> {
        let selection = session.select_option(index)?;
        if selection.recorded_answer() {
            self.save_progress(session);
        }
        Ok(selection)
    }

    /// Move forward; on the last question this grades and stores the result.
    ///
    /// # Errors
    ///
    /// Returns `SessionError::Transition` while forward navigation is disabled.
    pub fn advance(&self, session: &mut SessionState) -> Result<StepOutcome, SessionError> {
        match session.advance(self.clock.now())? {
            Advance::Moved { position } => {
                self.save_progress(session);
                Ok(StepOutcome::Moved { position })
            }
            Advance::Completed(grade) => Ok(StepOutcome::Completed(self.finish(grade))),
        }
    }

    /// # Errors
    ///
    /// Returns `SessionError::Transition` on the first question or after
    /// completion.
    pub fn retreat(&self, session: &mut SessionState) -> Result<usize, SessionError> {
        let position = session.retreat()?;
        self.save_progress(session);
        Ok(position)
    }

    /// Save where the user is.
    ///
    /// Nothing is written before the first recorded answer, so opening a
    /// session and leaving keeps its stored result. Completed sessions are
    /// never saved as progress.
    pub fn save_progress(&self, session: &SessionState) -> bool {
        if session.is_completed() || session.answered_count() == 0 {
            return false;
        }
        self.store
            .save_progress(&ProgressRecord::from_session(session, self.clock.now()))
    }

    fn finish(&self, grade: SessionGrade) -> CompletedSession {
        let number = grade.session_number();
        info!(
            "session {number} completed: {}/{} ({}%)",
            grade.correct_count(),
            grade.total_questions(),
            grade.percentage()
        );

        let result_saved = self.store.save_result(&ResultRecord::from_grade(&grade));
        if result_saved {
            self.store.clear_progress(number);
        } else {
            warn!("result for session {number} was not saved, keeping its progress");
        }
        CompletedSession {
            grade,
            result_saved,
        }
    }
}
