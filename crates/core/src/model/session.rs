use std::collections::BTreeSet;
use std::fmt;

use chrono::{DateTime, Utc};
use log::{debug, error, warn};
use thiserror::Error;

use crate::model::grading::{SessionGrade, count_correct};
use crate::model::{Question, QuizSettings, SessionNumber, answer_key};

//
// ─── ERRORS ────────────────────────────────────────────────────────────────────
//

/// A transition the current state does not allow.
///
/// Hosts are expected to consult [`SessionState::navigation`] and the option
/// views before calling in, so any of these indicates a caller defect.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum TransitionError {
    #[error("session already completed")]
    SessionCompleted,

    #[error("session is not completed yet")]
    NotCompleted,

    #[error("option {index} out of range (question has {option_count} options)")]
    OptionOutOfRange { index: usize, option_count: usize },

    #[error("current question has not been answered")]
    Unanswered,

    #[error("a correct option must be picked before moving on")]
    RetryPending,

    #[error("already at the first question")]
    AtFirstQuestion,
}

/// Reasons a session cannot be built from a slice or a saved record.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum SessionBuildError {
    #[error("session has no questions")]
    Empty,

    #[error("saved position {position} is outside a session of {len} questions")]
    PositionOutOfRange { position: usize, len: usize },

    #[error("saved answer {index} for question {position} is not a valid option")]
    AnswerOutOfRange { position: usize, index: usize },
}

//
// ─── STATES ────────────────────────────────────────────────────────────────────
//

/// Per-question state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QuestionStatus {
    Unanswered,
    AnsweredCorrect,
    /// Wrong first answer; a correct option must be picked before advancing.
    AnsweredWrongPendingRetry,
    /// Wrong first answer with no retry outstanding.
    AnsweredWrongRetried,
}

/// What a call to [`SessionState::select_option`] did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Selection {
    FirstCorrect,
    FirstWrong { retry_required: bool },
    RetryResolved,
    Ignored,
}

impl Selection {
    /// True when the selection recorded a first answer (and so must be saved).
    #[must_use]
    pub fn recorded_answer(self) -> bool {
        matches!(self, Self::FirstCorrect | Self::FirstWrong { .. })
    }
}

/// What a call to [`SessionState::advance`] did.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Advance {
    Moved { position: usize },
    Completed(SessionGrade),
}

//
// ─── SESSION STATE ─────────────────────────────────────────────────────────────
//

/// In-memory state of the one active session.
pub struct SessionState {
    session_number: SessionNumber,
    questions: Vec<Question>,
    answers: Vec<Option<usize>>,
    position: usize,
    correct_count: u32,
    retry_pending: bool,
    // Correct option picked to clear a retry on the current visit.
    retry_choice: Option<usize>,
    wrong_first_try: BTreeSet<usize>,
    live_feedback: bool,
    completed_at: Option<DateTime<Utc>>,
}

impl SessionState {
    /// Start a session from scratch on the first question.
    ///
    /// # Errors
    ///
    /// Returns `SessionBuildError::Empty` if `questions` is empty.
    pub fn new(
        session_number: SessionNumber,
        questions: Vec<Question>,
        settings: &QuizSettings,
    ) -> Result<Self, SessionBuildError> {
        if questions.is_empty() {
            return Err(SessionBuildError::Empty);
        }
        let answers = vec![None; questions.len()];
        Ok(Self {
            session_number,
            questions,
            answers,
            position: 0,
            correct_count: 0,
            retry_pending: false,
            retry_choice: None,
            wrong_first_try: BTreeSet::new(),
            live_feedback: settings.live_feedback(),
            completed_at: None,
        })
    }

    /// Rehydrate an in-progress session from saved progress.
    ///
    /// Saved answers are padded or truncated to the session length. The score
    /// and the first-try misses are re-derived from the answers; a disagreeing
    /// saved score is logged and ignored. No retry is pending after a resume.
    ///
    /// # Errors
    ///
    /// Returns `SessionBuildError` if the session is empty, or if the saved
    /// position or any saved answer does not fit the questions.
    pub fn from_persisted(
        session_number: SessionNumber,
        questions: Vec<Question>,
        position: usize,
        mut answers: Vec<Option<usize>>,
        saved_correct_count: u32,
        settings: &QuizSettings,
    ) -> Result<Self, SessionBuildError> {
        let mut state = Self::new(session_number, questions, settings)?;
        let len = state.questions.len();
        if position >= len {
            return Err(SessionBuildError::PositionOutOfRange { position, len });
        }

        answers.resize(len, None);
        for (pos, (question, answer)) in state.questions.iter().zip(&answers).enumerate() {
            if let Some(index) = *answer {
                if index >= question.option_count() {
                    return Err(SessionBuildError::AnswerOutOfRange {
                        position: pos,
                        index,
                    });
                }
            }
        }

        state.correct_count = count_correct(&state.questions, &answers);
        if state.correct_count != saved_correct_count {
            warn!(
                "session {session_number}: saved score {saved_correct_count} disagrees with answers ({}), using answers",
                state.correct_count
            );
        }
        state.wrong_first_try = state
            .questions
            .iter()
            .zip(&answers)
            .enumerate()
            .filter_map(|(i, (q, a))| {
                a.is_some_and(|idx| !answer_key::is_correct(q, idx))
                    .then_some(i)
            })
            .collect();
        state.answers = answers;
        state.position = position;
        Ok(state)
    }

    #[must_use]
    pub fn session_number(&self) -> SessionNumber {
        self.session_number
    }

    #[must_use]
    pub fn questions(&self) -> &[Question] {
        &self.questions
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.questions.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.questions.is_empty()
    }

    #[must_use]
    pub fn position(&self) -> usize {
        self.position
    }

    #[must_use]
    pub fn current_question(&self) -> &Question {
        &self.questions[self.position]
    }

    /// Recorded first answers, index-aligned with `questions()`.
    #[must_use]
    pub fn answers(&self) -> &[Option<usize>] {
        &self.answers
    }

    #[must_use]
    pub fn current_answer(&self) -> Option<usize> {
        self.answers[self.position]
    }

    #[must_use]
    pub fn answered_count(&self) -> usize {
        self.answers.iter().filter(|a| a.is_some()).count()
    }

    /// Questions answered correctly on the first attempt.
    #[must_use]
    pub fn correct_count(&self) -> u32 {
        self.correct_count
    }

    #[must_use]
    pub fn retry_pending(&self) -> bool {
        self.retry_pending
    }

    pub(crate) fn retry_choice(&self) -> Option<usize> {
        self.retry_choice
    }

    /// Positions answered wrong on the first attempt.
    #[must_use]
    pub fn wrong_first_try(&self) -> &BTreeSet<usize> {
        &self.wrong_first_try
    }

    #[must_use]
    pub fn live_feedback(&self) -> bool {
        self.live_feedback
    }

    #[must_use]
    pub fn is_last_question(&self) -> bool {
        self.position + 1 == self.questions.len()
    }

    #[must_use]
    pub fn is_completed(&self) -> bool {
        self.completed_at.is_some()
    }

    #[must_use]
    pub fn completed_at(&self) -> Option<DateTime<Utc>> {
        self.completed_at
    }

    /// Status of the question at `position`; `None` past the end.
    #[must_use]
    pub fn status(&self, position: usize) -> Option<QuestionStatus> {
        let question = self.questions.get(position)?;
        let status = match self.answers[position] {
            None => QuestionStatus::Unanswered,
            Some(idx) if answer_key::is_correct(question, idx) => QuestionStatus::AnsweredCorrect,
            Some(_) if self.retry_pending && position == self.position => {
                QuestionStatus::AnsweredWrongPendingRetry
            }
            Some(_) => QuestionStatus::AnsweredWrongRetried,
        };
        Some(status)
    }

    #[must_use]
    pub fn current_status(&self) -> QuestionStatus {
        self.status(self.position)
            .unwrap_or(QuestionStatus::Unanswered)
    }

    /// Pick an option on the current question.
    ///
    /// The first pick on a question is final for scoring. With live feedback a
    /// wrong first pick blocks navigation until a correct option is picked; that
    /// later pick does not replace the recorded answer.
    ///
    /// # Errors
    ///
    /// Returns `TransitionError::SessionCompleted` after completion and
    /// `TransitionError::OptionOutOfRange` for an index past the option list.
    pub fn select_option(&mut self, index: usize) -> Result<Selection, TransitionError> {
        if self.is_completed() {
            return Err(TransitionError::SessionCompleted);
        }
        let question = &self.questions[self.position];
        let option_count = question.option_count();
        if index >= option_count {
            return Err(TransitionError::OptionOutOfRange {
                index,
                option_count,
            });
        }
        let correct = answer_key::is_correct(question, index);

        let selection = if self.retry_pending {
            if correct {
                self.retry_pending = false;
                self.retry_choice = Some(index);
                Selection::RetryResolved
            } else {
                Selection::Ignored
            }
        } else if self.answers[self.position].is_some() {
            Selection::Ignored
        } else {
            self.answers[self.position] = Some(index);
            if correct {
                self.correct_count = self.correct_count.saturating_add(1);
                Selection::FirstCorrect
            } else {
                self.wrong_first_try.insert(self.position);
                self.retry_pending = self.live_feedback;
                Selection::FirstWrong {
                    retry_required: self.retry_pending,
                }
            }
        };

        debug!(
            "session {} q{}: option {index} -> {selection:?}",
            self.session_number, self.position
        );
        Ok(selection)
    }

    /// Move to the next question, or complete the session from the last one.
    ///
    /// # Errors
    ///
    /// Returns `TransitionError::Unanswered` or `TransitionError::RetryPending`
    /// when forward navigation is disabled, and `TransitionError::SessionCompleted`
    /// after completion.
    pub fn advance(&mut self, at: DateTime<Utc>) -> Result<Advance, TransitionError> {
        if self.is_completed() {
            return Err(TransitionError::SessionCompleted);
        }
        if self.current_answer().is_none() {
            return Err(TransitionError::Unanswered);
        }
        if self.retry_pending {
            return Err(TransitionError::RetryPending);
        }

        if self.is_last_question() {
            return self.complete(at).map(Advance::Completed);
        }
        self.position += 1;
        self.retry_choice = None;
        Ok(Advance::Moved {
            position: self.position,
        })
    }

    /// Move to the previous question. Revisiting never re-imposes a retry.
    ///
    /// # Errors
    ///
    /// Returns `TransitionError::AtFirstQuestion` at position 0 and
    /// `TransitionError::SessionCompleted` after completion.
    pub fn retreat(&mut self) -> Result<usize, TransitionError> {
        if self.is_completed() {
            return Err(TransitionError::SessionCompleted);
        }
        if self.position == 0 {
            return Err(TransitionError::AtFirstQuestion);
        }
        self.position -= 1;
        self.retry_pending = false;
        self.retry_choice = None;
        Ok(self.position)
    }

    /// Grade the session and mark it completed.
    ///
    /// The score is recomputed from the recorded answers; it must agree with the
    /// count kept while answering.
    ///
    /// # Errors
    ///
    /// Returns `TransitionError::SessionCompleted` if already completed.
    pub fn complete(&mut self, at: DateTime<Utc>) -> Result<SessionGrade, TransitionError> {
        if self.is_completed() {
            return Err(TransitionError::SessionCompleted);
        }
        let grade = SessionGrade::from_answers(
            self.session_number,
            &self.questions,
            self.answers.clone(),
            self.wrong_first_try.iter().copied().collect(),
            at,
        );
        if grade.correct_count() != self.correct_count {
            error!(
                "session {}: running score {} diverged from graded score {}",
                self.session_number,
                self.correct_count,
                grade.correct_count()
            );
        }
        debug_assert_eq!(grade.correct_count(), self.correct_count);

        self.correct_count = grade.correct_count();
        self.retry_pending = false;
        self.retry_choice = None;
        self.completed_at = Some(at);
        Ok(grade)
    }
}

impl fmt::Debug for SessionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SessionState")
            .field("session_number", &self.session_number)
            .field("questions_len", &self.questions.len())
            .field("position", &self.position)
            .field("answers", &self.answers)
            .field("correct_count", &self.correct_count)
            .field("retry_pending", &self.retry_pending)
            .field("wrong_first_try", &self.wrong_first_try)
            .field("completed_at", &self.completed_at)
            .finish_non_exhaustive()
    }
}

//
// ─── TESTS ─────────────────────────────────────────────────────────────────────
//

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{QuestionDraft, ScoreBand};
    use crate::time::fixed_now;

    // Option 1 is the correct one everywhere.
    fn questions(n: usize) -> Vec<Question> {
        (0..n)
            .map(|i| {
                QuestionDraft::new(format!("Q{i}"), ["wrong", "right*", "also wrong"])
                    .validate()
                    .unwrap()
            })
            .collect()
    }

    fn session(n: usize) -> SessionState {
        SessionState::new(
            SessionNumber::new(1).unwrap(),
            questions(n),
            &QuizSettings::default(),
        )
        .unwrap()
    }

    #[test]
    fn first_correct_answer_scores_and_unblocks() {
        let mut s = session(2);
        assert_eq!(s.current_status(), QuestionStatus::Unanswered);

        assert_eq!(s.select_option(1).unwrap(), Selection::FirstCorrect);
        assert_eq!(s.correct_count(), 1);
        assert_eq!(s.current_status(), QuestionStatus::AnsweredCorrect);
        assert_eq!(
            s.advance(fixed_now()).unwrap(),
            Advance::Moved { position: 1 }
        );
    }

    #[test]
    fn wrong_answer_blocks_until_correct_pick() {
        let mut s = session(2);
        assert_eq!(
            s.select_option(0).unwrap(),
            Selection::FirstWrong {
                retry_required: true
            }
        );
        assert!(s.retry_pending());
        assert_eq!(s.current_status(), QuestionStatus::AnsweredWrongPendingRetry);
        assert_eq!(s.advance(fixed_now()), Err(TransitionError::RetryPending));

        assert_eq!(s.select_option(2).unwrap(), Selection::Ignored);
        assert!(s.retry_pending());

        assert_eq!(s.select_option(1).unwrap(), Selection::RetryResolved);
        assert!(!s.retry_pending());
        assert_eq!(s.current_status(), QuestionStatus::AnsweredWrongRetried);
        assert!(s.advance(fixed_now()).is_ok());
    }

    #[test]
    fn retry_never_changes_score_or_recorded_answer() {
        let mut s = session(1);
        s.select_option(2).unwrap();
        for idx in [0, 2, 0, 1, 1, 0] {
            s.select_option(idx).unwrap();
            assert_eq!(s.correct_count(), 0);
            assert_eq!(s.answers()[0], Some(2));
        }
        assert!(s.wrong_first_try().contains(&0));
    }

    #[test]
    fn answered_question_ignores_further_picks() {
        let mut s = session(1);
        s.select_option(1).unwrap();
        assert_eq!(s.select_option(0).unwrap(), Selection::Ignored);
        assert_eq!(s.answers()[0], Some(1));
        assert_eq!(s.correct_count(), 1);
    }

    #[test]
    fn advancing_unanswered_is_rejected() {
        let mut s = session(2);
        assert_eq!(s.advance(fixed_now()), Err(TransitionError::Unanswered));
    }

    #[test]
    fn out_of_range_option_is_rejected() {
        let mut s = session(1);
        assert_eq!(
            s.select_option(3),
            Err(TransitionError::OptionOutOfRange {
                index: 3,
                option_count: 3
            })
        );
        assert_eq!(s.answers()[0], None);
    }

    #[test]
    fn retreat_clears_pending_retry() {
        let mut s = session(2);
        s.select_option(1).unwrap();
        s.advance(fixed_now()).unwrap();
        s.select_option(0).unwrap();
        assert!(s.retry_pending());

        assert_eq!(s.retreat().unwrap(), 0);
        assert!(!s.retry_pending());
        s.advance(fixed_now()).unwrap();

        // The wrong question is revisited without a retry block.
        assert_eq!(s.current_status(), QuestionStatus::AnsweredWrongRetried);
        assert_eq!(s.select_option(1).unwrap(), Selection::Ignored);
        assert!(matches!(s.advance(fixed_now()), Ok(Advance::Completed(_))));
    }

    #[test]
    fn retreat_at_first_question_is_rejected() {
        let mut s = session(2);
        assert_eq!(s.retreat(), Err(TransitionError::AtFirstQuestion));
    }

    #[test]
    fn completing_from_last_question_grades_session() {
        let mut s = session(3);
        s.select_option(1).unwrap();
        s.advance(fixed_now()).unwrap();
        s.select_option(0).unwrap();
        s.select_option(1).unwrap();
        s.advance(fixed_now()).unwrap();
        s.select_option(1).unwrap();

        let Advance::Completed(grade) = s.advance(fixed_now()).unwrap() else {
            panic!("expected completion");
        };
        assert!(s.is_completed());
        assert_eq!(grade.correct_count(), 2);
        assert_eq!(grade.correct_count(), s.correct_count());
        assert_eq!(grade.wrong_first_try(), &[1]);
        assert_eq!(grade.percentage(), 67);
        assert_eq!(grade.band(), ScoreBand::Good);

        assert_eq!(s.select_option(1), Err(TransitionError::SessionCompleted));
        assert_eq!(s.advance(fixed_now()), Err(TransitionError::SessionCompleted));
        assert_eq!(s.retreat(), Err(TransitionError::SessionCompleted));
    }

    #[test]
    fn incremental_and_graded_scores_agree_under_any_retry_pattern() {
        // Each entry: picks made on one question, first pick is the recorded one.
        let script: [&[usize]; 6] = [&[1], &[0, 2, 1], &[2, 1], &[1, 0], &[0, 0, 0, 1], &[1]];
        let mut s = session(script.len());
        for (pos, picks) in script.iter().enumerate() {
            for &p in *picks {
                s.select_option(p).unwrap();
            }
            let out = s.advance(fixed_now()).unwrap();
            if pos + 1 == script.len() {
                let Advance::Completed(grade) = out else {
                    panic!("expected completion");
                };
                let expected = script.iter().filter(|p| p[0] == 1).count() as u32;
                assert_eq!(grade.correct_count(), expected);
                assert_eq!(grade.wrong_first_try(), &[1, 2, 4]);
            }
        }
    }

    #[test]
    fn quiet_mode_records_wrong_answer_without_retry() {
        let settings = QuizSettings::default().with_live_feedback(false);
        let mut s =
            SessionState::new(SessionNumber::new(1).unwrap(), questions(2), &settings).unwrap();

        assert_eq!(
            s.select_option(0).unwrap(),
            Selection::FirstWrong {
                retry_required: false
            }
        );
        assert!(!s.retry_pending());
        assert_eq!(s.select_option(1).unwrap(), Selection::Ignored);
        assert_eq!(s.answers()[0], Some(0));
        assert!(s.advance(fixed_now()).is_ok());
    }

    #[test]
    fn resume_rederives_score_and_misses() {
        let s = SessionState::from_persisted(
            SessionNumber::new(2).unwrap(),
            questions(4),
            2,
            vec![Some(1), Some(0)],
            1,
            &QuizSettings::default(),
        )
        .unwrap();

        assert_eq!(s.position(), 2);
        assert_eq!(s.answers(), &[Some(1), Some(0), None, None]);
        assert_eq!(s.correct_count(), 1);
        assert_eq!(s.wrong_first_try().iter().copied().collect::<Vec<_>>(), [1]);
        assert!(!s.retry_pending());
    }

    #[test]
    fn resume_rejects_records_that_do_not_fit() {
        let err = SessionState::from_persisted(
            SessionNumber::new(1).unwrap(),
            questions(2),
            2,
            Vec::new(),
            0,
            &QuizSettings::default(),
        )
        .unwrap_err();
        assert_eq!(
            err,
            SessionBuildError::PositionOutOfRange {
                position: 2,
                len: 2
            }
        );

        let err = SessionState::from_persisted(
            SessionNumber::new(1).unwrap(),
            questions(2),
            0,
            vec![Some(7)],
            0,
            &QuizSettings::default(),
        )
        .unwrap_err();
        assert_eq!(
            err,
            SessionBuildError::AnswerOutOfRange {
                position: 0,
                index: 7
            }
        );
    }

    #[test]
    fn resume_truncates_extra_answers() {
        let s = SessionState::from_persisted(
            SessionNumber::new(1).unwrap(),
            questions(2),
            1,
            vec![Some(1), Some(1), Some(1)],
            3,
            &QuizSettings::default(),
        )
        .unwrap();
        assert_eq!(s.answers().len(), 2);
        assert_eq!(s.correct_count(), 2);
    }

    #[test]
    fn empty_session_is_rejected() {
        let err = SessionState::new(
            SessionNumber::new(1).unwrap(),
            Vec::new(),
            &QuizSettings::default(),
        )
        .unwrap_err();
        assert_eq!(err, SessionBuildError::Empty);
    }
}
