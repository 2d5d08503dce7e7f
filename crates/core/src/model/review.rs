use crate::model::session::{SessionBuildError, TransitionError};
use crate::model::view::{ForwardLabel, NavigationView, QuestionView, review_option_views};
use crate::model::{Question, SessionNumber, SessionState};

/// Outcome of stepping forward through a review.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReviewStep {
    Moved { position: usize },
    /// Stepped past the last question; the host returns to the results.
    BackToResults,
}

/// Read-only walk over a graded session's questions and recorded answers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReviewCursor {
    session_number: SessionNumber,
    questions: Vec<Question>,
    answers: Vec<Option<usize>>,
    position: usize,
}

impl ReviewCursor {
    /// Review arbitrary recorded answers, e.g. those of a stored result.
    ///
    /// # Errors
    ///
    /// Returns `SessionBuildError` if there are no questions or an answer is
    /// not a valid option index.
    pub fn new(
        session_number: SessionNumber,
        questions: Vec<Question>,
        mut answers: Vec<Option<usize>>,
    ) -> Result<Self, SessionBuildError> {
        if questions.is_empty() {
            return Err(SessionBuildError::Empty);
        }
        answers.resize(questions.len(), None);
        for (position, (q, a)) in questions.iter().zip(&answers).enumerate() {
            if let Some(index) = *a {
                if index >= q.option_count() {
                    return Err(SessionBuildError::AnswerOutOfRange { position, index });
                }
            }
        }
        Ok(Self {
            session_number,
            questions,
            answers,
            position: 0,
        })
    }

    #[must_use]
    pub fn session_number(&self) -> SessionNumber {
        self.session_number
    }

    #[must_use]
    pub fn position(&self) -> usize {
        self.position
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.questions.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.questions.is_empty()
    }

    pub fn forward(&mut self) -> ReviewStep {
        if self.position + 1 >= self.questions.len() {
            return ReviewStep::BackToResults;
        }
        self.position += 1;
        ReviewStep::Moved {
            position: self.position,
        }
    }

    /// # Errors
    ///
    /// Returns `TransitionError::AtFirstQuestion` at position 0.
    pub fn back(&mut self) -> Result<usize, TransitionError> {
        if self.position == 0 {
            return Err(TransitionError::AtFirstQuestion);
        }
        self.position -= 1;
        Ok(self.position)
    }

    /// Forward is always enabled in a review.
    #[must_use]
    pub fn navigation(&self) -> NavigationView {
        NavigationView {
            back_enabled: self.position > 0,
            forward_enabled: true,
            forward_label: if self.position + 1 >= self.questions.len() {
                ForwardLabel::BackToResults
            } else {
                ForwardLabel::Next
            },
        }
    }

    #[must_use]
    pub fn question_view(&self) -> QuestionView<'_> {
        let question = &self.questions[self.position];
        let correct_count = crate::model::grading::count_correct(&self.questions, &self.answers);
        QuestionView {
            number: self.position + 1,
            total: self.questions.len(),
            prompt: question.prompt(),
            options: review_option_views(question, self.answers[self.position]),
            correct_count,
            navigation: self.navigation(),
        }
    }
}

impl SessionState {
    /// Start reviewing this session's answers.
    ///
    /// # Errors
    ///
    /// Returns `TransitionError::NotCompleted` before completion.
    pub fn review(&self) -> Result<ReviewCursor, TransitionError> {
        if !self.is_completed() {
            return Err(TransitionError::NotCompleted);
        }
        Ok(ReviewCursor {
            session_number: self.session_number(),
            questions: self.questions().to_vec(),
            answers: self.answers().to_vec(),
            position: 0,
        })
    }
}
