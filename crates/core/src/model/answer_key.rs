//! Correctness lookup for question options.
//!
//! Source documents flag a correct option by embedding [`CORRECT_MARKER`] in its
//! text. The marker is read once, at import, and never reaches the presentation
//! layer: every `Question` stores plain text plus a `correct` flag.

use crate::model::Question;

/// Marker character that flags a correct option in the source document.
pub const CORRECT_MARKER: char = '*';

/// True iff the selected option is marked correct.
///
/// Selecting any one of several correct options counts; an index outside the
/// option list is never correct.
#[must_use]
pub fn is_correct(question: &Question, option_index: usize) -> bool {
    question
        .options()
        .get(option_index)
        .is_some_and(|o| o.correct)
}

/// Option text as shown to the user, with every marker removed.
#[must_use]
pub fn display_text(raw: &str) -> String {
    raw.replace(CORRECT_MARKER, "").trim().to_owned()
}

#[must_use]
pub(crate) fn has_marker(raw: &str) -> bool {
    raw.contains(CORRECT_MARKER)
}
