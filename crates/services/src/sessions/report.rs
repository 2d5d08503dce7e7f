use quiz_core::model::{ScoreBand, SessionGrade, SessionNumber};
use storage::ResultRecord;

/// What the results screen shows for a graded session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GradeReport {
    pub session_number: SessionNumber,
    pub correct_count: u32,
    pub total_questions: u32,
    pub percentage: u32,
    pub band: ScoreBand,
    pub first_try_misses: usize,
    pub message: String,
}

impl GradeReport {
    #[must_use]
    pub fn from_grade(grade: &SessionGrade) -> Self {
        let first_try_misses = grade.wrong_first_try().len();
        Self {
            session_number: grade.session_number(),
            correct_count: grade.correct_count(),
            total_questions: grade.total_questions(),
            percentage: grade.percentage(),
            band: grade.band(),
            first_try_misses,
            message: message(grade.band(), first_try_misses),
        }
    }

    /// Summary of a stored result.
    ///
    /// Stored answers are the first picks, so every question not scored was
    /// missed on the first try.
    #[must_use]
    pub fn from_result(record: &ResultRecord) -> Self {
        let band = ScoreBand::from_percentage(record.percentage);
        let misses = record.total_questions.saturating_sub(record.correct_count);
        let first_try_misses = usize::try_from(misses).unwrap_or(usize::MAX);
        Self {
            session_number: record.session_number,
            correct_count: record.correct_count,
            total_questions: record.total_questions,
            percentage: record.percentage,
            band,
            first_try_misses,
            message: message(band, first_try_misses),
        }
    }

    /// `correct/total (percentage%)`
    #[must_use]
    pub fn score_line(&self) -> String {
        format!(
            "{}/{} ({}%)",
            self.correct_count, self.total_questions, self.percentage
        )
    }
}

fn message(band: ScoreBand, first_try_misses: usize) -> String {
    let mut message = match band {
        ScoreBand::Excellent => "Congratulations! That is an excellent score!",
        ScoreBand::Good => "Good! A little more study and you are there.",
        ScoreBand::Poor => "Better study some more before the exam.",
    }
    .to_owned();
    match first_try_misses {
        0 => {}
        1 => message.push_str(" You missed 1 question on the first try."),
        n => message.push_str(&format!(" You missed {n} questions on the first try.")),
    }
    message
}
