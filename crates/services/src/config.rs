use std::env;
use std::path::PathBuf;
use std::sync::Arc;

use quiz_core::model::QuizSettings;

use crate::bank_loader::{FileSource, HttpSource, QuestionSource};
use crate::error::ConfigError;

pub const BANK_VAR: &str = "QUIZ_BANK";
pub const STORE_VAR: &str = "QUIZ_STORE";
pub const SESSION_SIZE_VAR: &str = "QUIZ_SESSION_SIZE";
pub const LIVE_FEEDBACK_VAR: &str = "QUIZ_LIVE_FEEDBACK";

pub const DEFAULT_BANK: &str = "chestionar_grupat.json";

/// Where the question bank is fetched from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BankLocation {
    File(PathBuf),
    Url(String),
}

impl BankLocation {
    /// `http://` and `https://` values are URLs, anything else is a path.
    #[must_use]
    pub fn parse(raw: &str) -> Self {
        let raw = raw.trim();
        if raw.starts_with("http://") || raw.starts_with("https://") {
            Self::Url(raw.to_owned())
        } else {
            Self::File(PathBuf::from(raw))
        }
    }

    #[must_use]
    pub fn source(&self) -> Arc<dyn QuestionSource> {
        match self {
            Self::File(path) => Arc::new(FileSource::new(path.clone())),
            Self::Url(url) => Arc::new(HttpSource::new(url.clone())),
        }
    }
}

/// Runtime configuration, read from `QUIZ_*` environment variables.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QuizConfig {
    pub bank: BankLocation,
    /// JSON store file; `None` keeps progress in memory only.
    pub store_path: Option<PathBuf>,
    pub settings: QuizSettings,
}

impl Default for QuizConfig {
    fn default() -> Self {
        Self {
            bank: BankLocation::File(PathBuf::from(DEFAULT_BANK)),
            store_path: None,
            settings: QuizSettings::default(),
        }
    }
}

impl QuizConfig {
    /// # Errors
    ///
    /// Returns `ConfigError` if a variable is set to an unusable value.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|var| env::var(var).ok())
    }

    /// Build from an arbitrary variable lookup. Blank values count as unset.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if a variable is set to an unusable value.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let get = |var: &str| lookup(var).filter(|v| !v.trim().is_empty());

        let bank = get(BANK_VAR).map_or_else(
            || BankLocation::File(PathBuf::from(DEFAULT_BANK)),
            |raw| BankLocation::parse(&raw),
        );
        let store_path = get(STORE_VAR).map(|raw| PathBuf::from(raw.trim()));

        let session_size = match get(SESSION_SIZE_VAR) {
            Some(raw) => raw
                .trim()
                .parse::<u32>()
                .map_err(|_| ConfigError::InvalidNumber {
                    var: SESSION_SIZE_VAR,
                    raw,
                })?,
            None => QuizSettings::DEFAULT_SESSION_SIZE,
        };
        let live_feedback = match get(LIVE_FEEDBACK_VAR) {
            Some(raw) => parse_bool(&raw).ok_or(ConfigError::InvalidBool {
                var: LIVE_FEEDBACK_VAR,
                raw,
            })?,
            None => true,
        };

        Ok(Self {
            bank,
            store_path,
            settings: QuizSettings::new(session_size, live_feedback)?,
        })
    }
}

fn parse_bool(raw: &str) -> Option<bool> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}
