//! Presentation state derived from a session.
//!
//! Nothing here is stored: hosts recompute these views after every event and
//! render them as-is, so button enablement can never drift from the session.

use crate::model::{Question, SessionState, answer_key};

/// Label of the forward navigation button.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ForwardLabel {
    Next,
    Finish,
    /// A wrong first answer still has to be followed by a correct pick.
    PickCorrectAnswer,
    /// Last question of a review.
    BackToResults,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NavigationView {
    pub back_enabled: bool,
    pub forward_enabled: bool,
    pub forward_label: ForwardLabel,
}

/// Correctness highlight of one option.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OptionMark {
    Correct,
    Incorrect,
    /// The correct option picked to clear a retry.
    RetryCorrect,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OptionView<'a> {
    pub index: usize,
    pub text: &'a str,
    pub selected: bool,
    pub clickable: bool,
    pub mark: Option<OptionMark>,
}

/// Everything a host needs to draw the current question.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QuestionView<'a> {
    /// 1-based number within the session.
    pub number: usize,
    pub total: usize,
    pub prompt: &'a str,
    pub options: Vec<OptionView<'a>>,
    pub correct_count: u32,
    pub navigation: NavigationView,
}

impl QuestionView<'_> {
    /// Share of the session reached, `number / total` as a percentage.
    #[must_use]
    pub fn progress_percent(&self) -> u32 {
        let reached = self.number * 100 / self.total.max(1);
        u32::try_from(reached).unwrap_or(100)
    }
}

impl SessionState {
    /// Forward is enabled iff the current question has an answer and no retry is
    /// pending; back iff this is not the first question.
    #[must_use]
    pub fn navigation(&self) -> NavigationView {
        let forward_label = if self.retry_pending() {
            ForwardLabel::PickCorrectAnswer
        } else if self.is_last_question() {
            ForwardLabel::Finish
        } else {
            ForwardLabel::Next
        };
        NavigationView {
            back_enabled: self.position() > 0,
            forward_enabled: self.current_answer().is_some() && !self.retry_pending(),
            forward_label,
        }
    }

    /// Per-option selection, clickability and correctness marks.
    ///
    /// With live feedback, an answered question shows its correct options and
    /// the recorded wrong pick. While a retry is pending the correct options are
    /// not highlighted, so the user has to find one.
    #[must_use]
    pub fn option_views(&self) -> Vec<OptionView<'_>> {
        let question = self.current_question();
        let recorded = self.current_answer();
        let retry_choice = self.retry_choice();

        question
            .options()
            .iter()
            .enumerate()
            .map(|(index, option)| {
                let is_recorded = recorded == Some(index);
                let wrong_pick = is_recorded && !option.correct;

                let (selected, clickable, mark) = if !self.live_feedback() {
                    (is_recorded, recorded.is_none(), None)
                } else if recorded.is_none() {
                    (false, true, None)
                } else if self.retry_pending() {
                    (is_recorded, true, wrong_pick.then_some(OptionMark::Incorrect))
                } else if let Some(choice) = retry_choice {
                    let mark = if choice == index {
                        Some(OptionMark::RetryCorrect)
                    } else {
                        wrong_pick.then_some(OptionMark::Incorrect)
                    };
                    (false, false, mark)
                } else {
                    let mark = if option.correct {
                        Some(OptionMark::Correct)
                    } else {
                        wrong_pick.then_some(OptionMark::Incorrect)
                    };
                    (is_recorded, false, mark)
                };

                OptionView {
                    index,
                    text: &option.text,
                    selected,
                    clickable,
                    mark,
                }
            })
            .collect()
    }

    #[must_use]
    pub fn question_view(&self) -> QuestionView<'_> {
        let question = self.current_question();
        QuestionView {
            number: self.position() + 1,
            total: self.len(),
            prompt: question.prompt(),
            options: self.option_views(),
            correct_count: self.correct_count(),
            navigation: self.navigation(),
        }
    }
}

/// Review marks: every correct option, plus the recorded pick when it was wrong.
pub(crate) fn review_option_views<'a>(
    question: &'a Question,
    recorded: Option<usize>,
) -> Vec<OptionView<'a>> {
    question
        .options()
        .iter()
        .enumerate()
        .map(|(index, option)| {
            let is_recorded = recorded == Some(index);
            let mark = if answer_key::is_correct(question, index) {
                Some(OptionMark::Correct)
            } else {
                is_recorded.then_some(OptionMark::Incorrect)
            };
            OptionView {
                index,
                text: &option.text,
                selected: is_recorded,
                clickable: false,
                mark,
            }
        })
        .collect()
}
