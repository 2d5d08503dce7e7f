use std::ops::Range;

use thiserror::Error;

use crate::model::{Question, QuizSettings, SessionNumber};

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum BankError {
    #[error("question bank is empty")]
    Empty,

    #[error("session {number} is outside 1..={count}")]
    SessionOutOfRange { number: SessionNumber, count: u32 },
}

/// The full, immutable list of questions, split into fixed-size sessions.
///
/// Session `n` covers `[(n-1)*size, min(n*size, len))`; only the last session can
/// be shorter than `size`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QuestionBank {
    questions: Vec<Question>,
    session_size: usize,
}

impl QuestionBank {
    /// # Errors
    ///
    /// Returns `BankError::Empty` if there are no questions.
    pub fn new(questions: Vec<Question>, settings: &QuizSettings) -> Result<Self, BankError> {
        if questions.is_empty() {
            return Err(BankError::Empty);
        }
        Ok(Self {
            questions,
            session_size: usize::try_from(settings.session_size()).unwrap_or(usize::MAX),
        })
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
    pub fn questions(&self) -> &[Question] {
        &self.questions
    }

    #[must_use]
    pub fn session_size(&self) -> usize {
        self.session_size
    }

    /// `ceil(len / session_size)`.
    #[must_use]
    pub fn session_count(&self) -> u32 {
        u32::try_from(self.questions.len().div_ceil(self.session_size)).unwrap_or(u32::MAX)
    }

    /// Every valid session number, in order.
    pub fn session_numbers(&self) -> impl Iterator<Item = SessionNumber> {
        (1..=self.session_count()).filter_map(SessionNumber::new)
    }

    /// Question index range of a session.
    ///
    /// # Errors
    ///
    /// Returns `BankError::SessionOutOfRange` if `number > session_count()`.
    pub fn session_range(&self, number: SessionNumber) -> Result<Range<usize>, BankError> {
        let count = self.session_count();
        if number.value() > count {
            return Err(BankError::SessionOutOfRange { number, count });
        }
        let start = number.index() * self.session_size;
        let end = start.saturating_add(self.session_size).min(self.questions.len());
        Ok(start..end)
    }

    /// Questions of one session.
    ///
    /// # Errors
    ///
    /// Returns `BankError::SessionOutOfRange` if `number > session_count()`.
    pub fn slice(&self, number: SessionNumber) -> Result<&[Question], BankError> {
        let range = self.session_range(number)?;
        Ok(&self.questions[range])
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::QuestionDraft;

    fn bank(len: usize, size: u32) -> QuestionBank {
        let questions = (0..len)
            .map(|i| {
                QuestionDraft::new(format!("Q{i}"), ["right*", "wrong"])
                    .validate()
                    .unwrap()
            })
            .collect();
        QuestionBank::new(questions, &QuizSettings::new(size, true).unwrap()).unwrap()
    }

    fn sizes(bank: &QuestionBank) -> Vec<usize> {
        bank.session_numbers()
            .map(|n| bank.slice(n).unwrap().len())
            .collect()
    }

    #[test]
    fn eighty_five_by_forty_has_short_tail() {
        let bank = bank(85, 40);
        assert_eq!(bank.session_count(), 3);
        assert_eq!(sizes(&bank), [40, 40, 5]);
        assert_eq!(bank.session_range(SessionNumber::new(3).unwrap()).unwrap(), 80..85);
    }

    #[test]
    fn exact_multiple_has_no_short_session() {
        let bank = bank(120, 40);
        assert_eq!(bank.session_count(), 3);
        assert_eq!(sizes(&bank), [40, 40, 40]);
    }

    #[test]
    fn one_less_than_multiple_has_one_short_session() {
        let bank = bank(119, 40);
        assert_eq!(sizes(&bank), [40, 40, 39]);
    }

    #[test]
    fn slices_partition_the_bank_in_order() {
        for (len, size) in [(1, 40), (7, 3), (40, 40), (41, 40), (100, 7)] {
            let bank = bank(len, size);
            let joined: Vec<&str> = bank
                .session_numbers()
                .flat_map(|n| bank.slice(n).unwrap().iter().map(Question::prompt))
                .collect();
            let all: Vec<&str> = bank.questions().iter().map(Question::prompt).collect();
            assert_eq!(joined, all, "len={len} size={size}");

            let sizes = sizes(&bank);
            let (last, rest) = sizes.split_last().unwrap();
            assert!(rest.iter().all(|s| *s == size as usize));
            assert!(*last <= size as usize && *last > 0);
        }
    }

    #[test]
    fn out_of_range_session_is_an_error() {
        let bank = bank(10, 40);
        let err = bank.slice(SessionNumber::new(2).unwrap()).unwrap_err();
        assert!(matches!(err, BankError::SessionOutOfRange { count: 1, .. }));
    }

    #[test]
    fn empty_bank_is_rejected() {
        let err = QuestionBank::new(Vec::new(), &QuizSettings::default()).unwrap_err();
        assert_eq!(err, BankError::Empty);
    }
}
