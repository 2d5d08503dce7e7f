use std::ops::Range;

use serde::Serialize;

use quiz_core::model::{QuestionBank, SessionNumber, grading};
use storage::PersistenceStore;

/// Where a session stands, as far as the store knows.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum SessionStatus {
    New,
    /// `position` is 0-based.
    InProgress { position: usize, total: usize },
    Completed {
        correct: u32,
        total: u32,
        percentage: u32,
    },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SessionListing {
    pub number: SessionNumber,
    /// 0-based question range in the bank.
    pub range: Range<usize>,
    pub status: SessionStatus,
}

impl SessionListing {
    #[must_use]
    pub fn question_count(&self) -> usize {
        self.range.len()
    }
}

/// Lists every session of a bank with its stored status.
#[derive(Clone)]
pub struct SessionCatalog {
    store: PersistenceStore,
}

impl SessionCatalog {
    #[must_use]
    pub fn new(store: PersistenceStore) -> Self {
        Self { store }
    }

    /// One listing per session, in session order. A stored result wins over
    /// stored progress.
    #[must_use]
    pub fn list_sessions(&self, bank: &QuestionBank) -> Vec<SessionListing> {
        bank.session_numbers()
            .filter_map(|number| {
                let range = bank.session_range(number).ok()?;
                let status = self.status(number, range.len());
                Some(SessionListing {
                    number,
                    range,
                    status,
                })
            })
            .collect()
    }

    fn status(&self, number: SessionNumber, len: usize) -> SessionStatus {
        if let Some(result) = self.store.load_result(number) {
            let percentage = grading::percentage(result.correct_count, result.total_questions)
                .unwrap_or(result.percentage);
            return SessionStatus::Completed {
                correct: result.correct_count,
                total: result.total_questions,
                percentage,
            };
        }
        match self.store.load_progress(number) {
            Some(progress) => SessionStatus::InProgress {
                position: progress.position,
                total: len,
            },
            None => SessionStatus::New,
        }
    }
}
