use serde::Deserialize;
use thiserror::Error;

use crate::model::answer_key;

//
// ─── ERRORS ────────────────────────────────────────────────────────────────────
//

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum QuestionError {
    #[error("question prompt cannot be empty")]
    EmptyPrompt,

    #[error("question has no options")]
    NoOptions,

    #[error("option {index} is empty")]
    EmptyOption { index: usize },

    #[error("question has no option marked correct")]
    NoCorrectOption,
}

//
// ─── QUESTION TYPES ────────────────────────────────────────────────────────────
//

/// A question as it appears in the source document: option strings still carry
/// the correctness marker inline.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct QuestionDraft {
    #[serde(alias = "intrebare", default)]
    pub prompt: String,
    #[serde(alias = "raspunsuri", default)]
    pub options: Vec<String>,
}

/// One selectable option. `text` is already free of the marker.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AnswerOption {
    pub text: String,
    pub correct: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Question {
    prompt: String,
    options: Vec<AnswerOption>,
}

impl QuestionDraft {
    pub fn new(
        prompt: impl Into<String>,
        options: impl IntoIterator<Item = impl Into<String>>,
    ) -> Self {
        Self {
            prompt: prompt.into(),
            options: options.into_iter().map(Into::into).collect(),
        }
    }

    /// Split marker-encoded options into text and correctness.
    ///
    /// # Errors
    ///
    /// Returns `QuestionError` if the prompt or an option is blank, if there are no
    /// options, or if no option carries the marker.
    pub fn validate(self) -> Result<Question, QuestionError> {
        let options = self
            .options
            .iter()
            .map(|raw| AnswerOption {
                correct: answer_key::has_marker(raw),
                text: answer_key::display_text(raw),
            })
            .collect();
        Question::new(self.prompt, options)
    }
}

impl Question {
    /// Build a question from already separated options.
    ///
    /// # Errors
    ///
    /// Returns `QuestionError` for blank text, missing options or no correct option.
    pub fn new(
        prompt: impl Into<String>,
        options: Vec<AnswerOption>,
    ) -> Result<Self, QuestionError> {
        let prompt = prompt.into();
        if prompt.trim().is_empty() {
            return Err(QuestionError::EmptyPrompt);
        }
        if options.is_empty() {
            return Err(QuestionError::NoOptions);
        }
        if let Some(index) = options.iter().position(|o| o.text.trim().is_empty()) {
            return Err(QuestionError::EmptyOption { index });
        }
        if !options.iter().any(|o| o.correct) {
            return Err(QuestionError::NoCorrectOption);
        }

        Ok(Self {
            prompt: prompt.trim().to_owned(),
            options,
        })
    }

    #[must_use]
    pub fn prompt(&self) -> &str {
        &self.prompt
    }

    #[must_use]
    pub fn options(&self) -> &[AnswerOption] {
        &self.options
    }

    #[must_use]
    pub fn option_count(&self) -> usize {
        self.options.len()
    }

    /// Indices of every option marked correct.
    pub fn correct_indices(&self) -> impl Iterator<Item = usize> + '_ {
        self.options
            .iter()
            .enumerate()
            .filter_map(|(i, o)| o.correct.then_some(i))
    }
}

//
// ─── TESTS ─────────────────────────────────────────────────────────────────────
//
