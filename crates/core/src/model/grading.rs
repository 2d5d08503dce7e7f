use chrono::{DateTime, Utc};

use crate::model::{Question, SessionNumber, answer_key};

/// Result band of a graded session. Lower bounds are inclusive.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScoreBand {
    /// 80% and above.
    Excellent,
    /// 60% to 79%.
    Good,
    /// Below 60%.
    Poor,
}

impl ScoreBand {
    #[must_use]
    pub fn from_percentage(percentage: u32) -> Self {
        match percentage {
            80.. => Self::Excellent,
            60..=79 => Self::Good,
            _ => Self::Poor,
        }
    }
}

/// `round(100 * correct / total)` with halves rounded up.
///
/// Returns `None` when `total` is zero.
#[must_use]
pub fn percentage(correct: u32, total: u32) -> Option<u32> {
    percentage_of_totals(u64::from(correct), u64::from(total))
}

/// [`percentage`] over totals summed across sessions.
#[must_use]
pub fn percentage_of_totals(correct: u64, total: u64) -> Option<u32> {
    if total == 0 {
        return None;
    }
    let (correct, total) = (u128::from(correct), u128::from(total));
    u32::try_from((200 * correct + total) / (2 * total)).ok()
}

/// Count of recorded answers that pick a correct option.
#[must_use]
pub fn count_correct(questions: &[Question], answers: &[Option<usize>]) -> u32 {
    let count = questions
        .iter()
        .zip(answers)
        .filter(|(q, a)| a.is_some_and(|idx| answer_key::is_correct(q, idx)))
        .count();
    u32::try_from(count).unwrap_or(u32::MAX)
}

/// Final grade of a completed session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionGrade {
    session_number: SessionNumber,
    correct_count: u32,
    total_questions: u32,
    percentage: u32,
    band: ScoreBand,
    wrong_first_try: Vec<usize>,
    answers: Vec<Option<usize>>,
    completed_at: DateTime<Utc>,
}

impl SessionGrade {
    /// Grade a session by re-scanning every recorded answer.
    #[must_use]
    pub fn from_answers(
        session_number: SessionNumber,
        questions: &[Question],
        answers: Vec<Option<usize>>,
        wrong_first_try: Vec<usize>,
        completed_at: DateTime<Utc>,
    ) -> Self {
        let correct_count = count_correct(questions, &answers);
        let total_questions = u32::try_from(questions.len()).unwrap_or(u32::MAX);
        let percentage = percentage(correct_count, total_questions).unwrap_or(0);

        Self {
            session_number,
            correct_count,
            total_questions,
            percentage,
            band: ScoreBand::from_percentage(percentage),
            wrong_first_try,
            answers,
            completed_at,
        }
    }

    #[must_use]
    pub fn session_number(&self) -> SessionNumber {
        self.session_number
    }

    #[must_use]
    pub fn correct_count(&self) -> u32 {
        self.correct_count
    }

    #[must_use]
    pub fn total_questions(&self) -> u32 {
        self.total_questions
    }

    #[must_use]
    pub fn percentage(&self) -> u32 {
        self.percentage
    }

    #[must_use]
    pub fn band(&self) -> ScoreBand {
        self.band
    }

    /// Positions answered wrong on the first attempt, ascending.
    #[must_use]
    pub fn wrong_first_try(&self) -> &[usize] {
        &self.wrong_first_try
    }

    #[must_use]
    pub fn answers(&self) -> &[Option<usize>] {
        &self.answers
    }

    #[must_use]
    pub fn completed_at(&self) -> DateTime<Utc> {
        self.completed_at
    }
}
