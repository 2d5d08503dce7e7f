use quiz_core::model::QuestionView;
use storage::ResultRecord;

use crate::error::LoadError;
use crate::sessions::{AggregateStats, GradeReport, SessionListing};

/// Rendering and dialog surface the controller drives.
///
/// Implementations only draw what they are handed; every decision about what
/// to show next is made by `QuizApp`.
pub trait QuizHost {
    fn render_session_list(&mut self, total_questions: usize, listings: &[SessionListing]);

    fn render_question(&mut self, view: &QuestionView<'_>);

    fn render_results(&mut self, report: &GradeReport);

    fn render_review(&mut self, view: &QuestionView<'_>);

    fn render_stats(&mut self, stats: &AggregateStats, results: &[ResultRecord]);

    /// Shown instead of stats when no session has been completed yet.
    fn render_no_data(&mut self);

    fn render_load_error(&mut self, error: &LoadError);

    /// Ask a yes/no question; `true` means yes.
    fn confirm(&mut self, prompt: &str) -> bool;

    fn notify(&mut self, message: &str);
}
