use serde::Serialize;

use quiz_core::model::{QuestionBank, grading};
use storage::{PersistenceStore, ResultRecord};

/// Totals over every completed session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct AggregateStats {
    pub sessions_completed: u32,
    pub total_correct: u64,
    pub total_questions: u64,
    /// Weighted by question count, not a mean of per-session percentages.
    pub average_percentage: u32,
}

impl AggregateStats {
    /// `None` when there are no results or they hold no questions.
    #[must_use]
    pub fn from_results(results: &[ResultRecord]) -> Option<Self> {
        if results.is_empty() {
            return None;
        }
        let total_correct = results.iter().map(|r| u64::from(r.correct_count)).sum();
        let total_questions = results.iter().map(|r| u64::from(r.total_questions)).sum();
        Some(Self {
            sessions_completed: u32::try_from(results.len()).unwrap_or(u32::MAX),
            total_correct,
            total_questions,
            average_percentage: grading::percentage_of_totals(total_correct, total_questions)?,
        })
    }
}

#[derive(Clone)]
pub struct StatsAggregator {
    store: PersistenceStore,
}

impl StatsAggregator {
    #[must_use]
    pub fn new(store: PersistenceStore) -> Self {
        Self { store }
    }

    /// Stored results of the bank's sessions, ordered by session number.
    #[must_use]
    pub fn completed_results(&self, bank: &QuestionBank) -> Vec<ResultRecord> {
        bank.session_numbers()
            .filter_map(|number| self.store.load_result(number))
            .collect()
    }

    #[must_use]
    pub fn aggregate(&self, bank: &QuestionBank) -> Option<AggregateStats> {
        AggregateStats::from_results(&self.completed_results(bank))
    }
}
