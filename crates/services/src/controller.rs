use std::mem;

use log::{debug, warn};

use quiz_core::model::{QuestionBank, ReviewCursor, ReviewStep, SessionNumber, SessionState};

use crate::app_services::AppServices;
use crate::bank_loader::load_bank;
use crate::error::{AppError, SessionError};
use crate::host::QuizHost;
use crate::sessions::{GradeReport, StepOutcome};

const LEAVE_PROMPT: &str = "Return to the session list? Your progress is saved automatically.";
const CLEAR_PROMPT: &str = "Delete all progress and results? This cannot be undone.";

/// Which screen the controller is showing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScreenKind {
    Loading,
    LoadFailed,
    Selection,
    Question,
    Results,
    Review,
    Stats,
}

enum Screen {
    Loading,
    LoadFailed,
    Selection,
    Question(SessionState),
    /// `review` is the unstarted walk offered from the results screen.
    Results {
        report: GradeReport,
        review: ReviewCursor,
    },
    Review {
        report: GradeReport,
        review: ReviewCursor,
        cursor: ReviewCursor,
    },
    Stats,
}

impl Screen {
    fn kind(&self) -> ScreenKind {
        match self {
            Self::Loading => ScreenKind::Loading,
            Self::LoadFailed => ScreenKind::LoadFailed,
            Self::Selection => ScreenKind::Selection,
            Self::Question(_) => ScreenKind::Question,
            Self::Results { .. } => ScreenKind::Results,
            Self::Review { .. } => ScreenKind::Review,
            Self::Stats => ScreenKind::Stats,
        }
    }
}

/// The quiz application: the loaded bank, the active screen and the host.
///
/// Host event handlers call these methods; each one updates the state and
/// re-renders through the host.
pub struct QuizApp<H> {
    services: AppServices,
    host: H,
    bank: Option<QuestionBank>,
    screen: Screen,
}

impl<H: QuizHost> QuizApp<H> {
    #[must_use]
    pub fn new(services: AppServices, host: H) -> Self {
        Self {
            services,
            host,
            bank: None,
            screen: Screen::Loading,
        }
    }

    #[must_use]
    pub fn screen(&self) -> ScreenKind {
        self.screen.kind()
    }

    #[must_use]
    pub fn host(&self) -> &H {
        &self.host
    }

    pub fn host_mut(&mut self) -> &mut H {
        &mut self.host
    }

    #[must_use]
    pub fn bank(&self) -> Option<&QuestionBank> {
        self.bank.as_ref()
    }

    /// The session being answered, if any.
    #[must_use]
    pub fn session(&self) -> Option<&SessionState> {
        match &self.screen {
            Screen::Question(session) => Some(session),
            _ => None,
        }
    }

    /// Load the configured bank and show the session list.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Load` after the host has been shown the failure.
    pub async fn start(&mut self) -> Result<(), AppError> {
        let source = self.services.source();
        let settings = *self.services.settings();
        let loaded = load_bank(source.as_ref(), &settings).await;
        match loaded {
            Ok(bank) => {
                self.bank = Some(bank);
                self.show(Screen::Selection);
                Ok(())
            }
            Err(err) => {
                warn!("could not load question bank: {err}");
                self.host.render_load_error(&err);
                self.screen = Screen::LoadFailed;
                Err(err.into())
            }
        }
    }

    /// Open a session, resuming saved progress.
    ///
    /// # Errors
    ///
    /// Returns `AppError` if no bank is loaded or `number` is out of range.
    pub fn select_session(&mut self, number: SessionNumber) -> Result<(), AppError> {
        let bank = self.bank.as_ref().ok_or(AppError::NotLoaded)?;
        let session = self.services.session_loop().start(bank, number)?;
        self.show(Screen::Question(session));
        Ok(())
    }

    /// # Errors
    ///
    /// Returns `AppError::Session` outside a session or for an invalid option.
    pub fn select_option(&mut self, index: usize) -> Result<(), AppError> {
        let Screen::Question(session) = &mut self.screen else {
            return Err(SessionError::NoActiveSession.into());
        };
        let selection = self.services.session_loop().select_option(session, index)?;
        debug!("option {index}: {selection:?}");
        self.render();
        Ok(())
    }

    /// Forward button: next question, finish, or next review step.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Session` when forward is disabled or nothing is open.
    pub fn next(&mut self) -> Result<(), AppError> {
        let next = match mem::replace(&mut self.screen, Screen::Loading) {
            Screen::Question(mut session) => {
                match self.services.session_loop().advance(&mut session) {
                    Ok(StepOutcome::Moved { .. }) => Screen::Question(session),
                    Ok(StepOutcome::Completed(done)) => {
                        if !done.result_saved {
                            self.host
                                .notify("Your result could not be saved on this device.");
                        }
                        match session.review() {
                            Ok(review) => Screen::Results {
                                report: GradeReport::from_grade(&done.grade),
                                review,
                            },
                            Err(err) => {
                                self.screen = Screen::Question(session);
                                return Err(SessionError::from(err).into());
                            }
                        }
                    }
                    Err(err) => {
                        self.screen = Screen::Question(session);
                        return Err(err.into());
                    }
                }
            }
            Screen::Review {
                report,
                review,
                mut cursor,
            } => match cursor.forward() {
                ReviewStep::Moved { .. } => Screen::Review {
                    report,
                    review,
                    cursor,
                },
                ReviewStep::BackToResults => Screen::Results { report, review },
            },
            other => {
                self.screen = other;
                return Err(SessionError::NoActiveSession.into());
            }
        };
        self.show(next);
        Ok(())
    }

    /// Back button, in a session or a review.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Session` on the first question or when nothing is open.
    pub fn previous(&mut self) -> Result<(), AppError> {
        match &mut self.screen {
            Screen::Question(session) => {
                self.services.session_loop().retreat(session)?;
            }
            Screen::Review { cursor, .. } => {
                cursor.back().map_err(SessionError::from)?;
            }
            _ => return Err(SessionError::NoActiveSession.into()),
        }
        self.render();
        Ok(())
    }

    /// Leave the active session after confirmation. Returns whether it left.
    ///
    /// Progress was already saved with the last answer or move.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Session` if no session is being answered.
    pub fn leave_session(&mut self) -> Result<bool, AppError> {
        if !matches!(self.screen, Screen::Question(_)) {
            return Err(SessionError::NoActiveSession.into());
        }
        if !self.host.confirm(LEAVE_PROMPT) {
            return Ok(false);
        }
        self.show(Screen::Selection);
        Ok(true)
    }

    /// Delete every stored progress and result after confirmation.
    pub fn clear_all_data(&mut self) -> bool {
        if !self.host.confirm(CLEAR_PROMPT) {
            return false;
        }
        if self.services.store().clear_all() {
            self.host.notify("All data has been deleted.");
        } else {
            self.host.notify("Some data could not be deleted.");
        }
        self.show(Screen::Selection);
        true
    }

    /// # Errors
    ///
    /// Returns `AppError::NotLoaded` before the bank is loaded.
    pub fn show_stats(&mut self) -> Result<(), AppError> {
        let bank = self.bank.as_ref().ok_or(AppError::NotLoaded)?;
        if self.services.stats().aggregate(bank).is_none() {
            self.host.render_no_data();
            return Ok(());
        }
        self.show(Screen::Stats);
        Ok(())
    }

    /// Walk the just-finished session's answers.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Session` unless the results screen is showing.
    pub fn review_answers(&mut self) -> Result<(), AppError> {
        let next = match mem::replace(&mut self.screen, Screen::Loading) {
            Screen::Results { report, review } => Screen::Review {
                report,
                cursor: review.clone(),
                review,
            },
            other => {
                self.screen = other;
                return Err(SessionError::NoActiveSession.into());
            }
        };
        self.show(next);
        Ok(())
    }

    /// Walk the stored result of session `number`. Stepping past the last
    /// question lands on that result's summary.
    ///
    /// # Errors
    ///
    /// Returns `AppError::NotLoaded` before the bank is loaded, and
    /// `AppError::Session` if the session has no stored result or its answers
    /// no longer fit the bank.
    pub fn review_result(&mut self, number: SessionNumber) -> Result<(), AppError> {
        let bank = self.bank.as_ref().ok_or(AppError::NotLoaded)?;
        let questions = bank.slice(number).map_err(SessionError::from)?.to_vec();
        let record = self
            .services
            .store()
            .load_result(number)
            .ok_or(SessionError::NoResult(number))?;
        let review = ReviewCursor::new(number, questions, record.answers.clone())
            .map_err(SessionError::from)?;
        debug!("reviewing stored result of session {number}");
        self.show(Screen::Review {
            report: GradeReport::from_result(&record),
            cursor: review.clone(),
            review,
        });
        Ok(())
    }

    /// # Errors
    ///
    /// Returns `AppError::NotLoaded` before the bank is loaded.
    pub fn back_to_selection(&mut self) -> Result<(), AppError> {
        if self.bank.is_none() {
            return Err(AppError::NotLoaded);
        }
        self.show(Screen::Selection);
        Ok(())
    }

    fn show(&mut self, screen: Screen) {
        self.screen = screen;
        self.render();
    }

    fn render(&mut self) {
        let Self {
            services,
            host,
            bank,
            screen,
        } = self;
        match screen {
            Screen::Loading | Screen::LoadFailed => {}
            Screen::Selection => {
                if let Some(bank) = bank {
                    let listings = services.catalog().list_sessions(bank);
                    host.render_session_list(bank.len(), &listings);
                }
            }
            Screen::Question(session) => host.render_question(&session.question_view()),
            Screen::Results { report, .. } => host.render_results(report),
            Screen::Review { cursor, .. } => host.render_review(&cursor.question_view()),
            Screen::Stats => {
                let Some(bank) = bank else { return };
                let stats = services.stats();
                let results = stats.completed_results(bank);
                match stats.aggregate(bank) {
                    Some(aggregate) => host.render_stats(&aggregate, &results),
                    None => host.render_no_data(),
                }
            }
        }
    }
}
