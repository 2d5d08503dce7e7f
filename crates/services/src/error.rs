//! Shared error types for the services crate.

use std::path::PathBuf;

use thiserror::Error;

use quiz_core::model::{
    BankError, QuestionError, QuizSettingsError, SessionBuildError, SessionNumber,
    TransitionError,
};
use storage::FileStoreError;

/// Errors emitted while fetching and parsing the question bank.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum LoadError {
    #[error("could not read question bank {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error(transparent)]
    Http(#[from] reqwest::Error),
    #[error("question bank request failed with status {0}")]
    HttpStatus(reqwest::StatusCode),
    #[error("question bank is not valid JSON: {0}")]
    Json(#[from] serde_json::Error),
    #[error("question {number} is malformed: {source}")]
    InvalidQuestion {
        /// 1-based position in the bank.
        number: usize,
        #[source]
        source: QuestionError,
    },
    #[error("question bank is empty")]
    Empty,
    #[error(transparent)]
    Bank(#[from] BankError),
}

/// Errors emitted by session workflows.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum SessionError {
    #[error("no session is active")]
    NoActiveSession,
    #[error("session {0} has no stored result")]
    NoResult(SessionNumber),
    #[error(transparent)]
    Bank(#[from] BankError),
    #[error(transparent)]
    Build(#[from] SessionBuildError),
    #[error(transparent)]
    Transition(#[from] TransitionError),
}

/// Errors emitted while reading configuration from the environment.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum ConfigError {
    #[error("{var} must be a whole number, got {raw:?}")]
    InvalidNumber { var: &'static str, raw: String },
    #[error("{var} must be true or false, got {raw:?}")]
    InvalidBool { var: &'static str, raw: String },
    #[error(transparent)]
    Settings(#[from] QuizSettingsError),
}

/// Top-level error for app assembly and the controller.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum AppError {
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error(transparent)]
    Store(#[from] FileStoreError),
    #[error(transparent)]
    Load(#[from] LoadError),
    #[error(transparent)]
    Session(#[from] SessionError),
    #[error("question bank is not loaded")]
    NotLoaded,
}
