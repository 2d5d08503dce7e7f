use std::path::PathBuf;

use async_trait::async_trait;
use log::{debug, info};
use reqwest::Client;

use quiz_core::model::{QuestionBank, QuestionDraft, QuizSettings};

use crate::error::LoadError;

/// Where the raw question bank document comes from.
#[async_trait]
pub trait QuestionSource: Send + Sync {
    /// Human-readable origin, used in logs.
    fn describe(&self) -> String;

    /// Fetch the raw JSON document.
    ///
    /// # Errors
    ///
    /// Returns `LoadError` if the document cannot be fetched.
    async fn fetch(&self) -> Result<String, LoadError>;
}

/// Bank stored in a local file.
#[derive(Debug, Clone)]
pub struct FileSource {
    path: PathBuf,
}

impl FileSource {
    #[must_use]
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

#[async_trait]
impl QuestionSource for FileSource {
    fn describe(&self) -> String {
        self.path.display().to_string()
    }

    async fn fetch(&self) -> Result<String, LoadError> {
        tokio::fs::read_to_string(&self.path)
            .await
            .map_err(|source| LoadError::Io {
                path: self.path.clone(),
                source,
            })
    }
}

/// Bank served over HTTP.
#[derive(Clone)]
pub struct HttpSource {
    client: Client,
    url: String,
}

impl HttpSource {
    #[must_use]
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            client: Client::new(),
            url: url.into(),
        }
    }
}

#[async_trait]
impl QuestionSource for HttpSource {
    fn describe(&self) -> String {
        self.url.clone()
    }

    async fn fetch(&self) -> Result<String, LoadError> {
        let response = self.client.get(&self.url).send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(LoadError::HttpStatus(status));
        }
        Ok(response.text().await?)
    }
}

/// Bank held in memory, for tests and embedded banks.
#[derive(Debug, Clone)]
pub struct StaticSource {
    body: String,
}

impl StaticSource {
    #[must_use]
    pub fn new(body: impl Into<String>) -> Self {
        Self { body: body.into() }
    }
}

#[async_trait]
impl QuestionSource for StaticSource {
    fn describe(&self) -> String {
        "in-memory bank".to_owned()
    }

    async fn fetch(&self) -> Result<String, LoadError> {
        Ok(self.body.clone())
    }
}

/// Fetch and parse a bank from `source`.
///
/// # Errors
///
/// Returns `LoadError` if fetching fails or the document is not a valid bank.
pub async fn load_bank(
    source: &dyn QuestionSource,
    settings: &QuizSettings,
) -> Result<QuestionBank, LoadError> {
    debug!("loading question bank from {}", source.describe());
    let raw = source.fetch().await?;
    let bank = parse_bank(&raw, settings)?;
    info!(
        "loaded {} questions from {} ({} sessions of up to {})",
        bank.len(),
        source.describe(),
        bank.session_count(),
        bank.session_size()
    );
    Ok(bank)
}

/// Parse a bank document: a JSON array of `{prompt, options}` objects.
///
/// # Errors
///
/// Returns `LoadError::Json` for a document of the wrong shape,
/// `LoadError::InvalidQuestion` for the first malformed question and
/// `LoadError::Empty` for an empty array.
pub fn parse_bank(raw: &str, settings: &QuizSettings) -> Result<QuestionBank, LoadError> {
    let drafts: Vec<QuestionDraft> = serde_json::from_str(raw)?;
    if drafts.is_empty() {
        return Err(LoadError::Empty);
    }
    let questions = drafts
        .into_iter()
        .enumerate()
        .map(|(i, draft)| {
            draft.validate().map_err(|source| LoadError::InvalidQuestion {
                number: i + 1,
                source,
            })
        })
        .collect::<Result<Vec<_>, _>>()?;
    Ok(QuestionBank::new(questions, settings)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use quiz_core::model::QuestionError;

    fn settings(size: u32) -> QuizSettings {
        QuizSettings::new(size, true).unwrap()
    }

    #[test]
    fn parses_legacy_field_names_and_strips_markers() {
        let raw = r#"[
            {"intrebare": "Capital of France?", "raspunsuri": ["Paris*", "Lyon", " Nice "]},
            {"prompt": "2 + 2?", "options": ["3", "*4"]}
        ]"#;
        let bank = parse_bank(raw, &settings(40)).unwrap();
        assert_eq!(bank.len(), 2);
        assert_eq!(bank.session_count(), 1);

        let first = &bank.questions()[0];
        assert_eq!(first.prompt(), "Capital of France?");
        let texts: Vec<_> = first.options().iter().map(|o| o.text.as_str()).collect();
        assert_eq!(texts, ["Paris", "Lyon", "Nice"]);
        assert_eq!(first.correct_indices().collect::<Vec<_>>(), [0]);
        assert_eq!(bank.questions()[1].correct_indices().collect::<Vec<_>>(), [1]);
    }

    #[test]
    fn empty_bank_is_rejected() {
        assert!(matches!(parse_bank("[]", &settings(40)), Err(LoadError::Empty)));
    }

    #[test]
    fn wrong_shape_is_a_json_error() {
        assert!(matches!(
            parse_bank(r#"{"questions": []}"#, &settings(40)),
            Err(LoadError::Json(_))
        ));
    }

    #[test]
    fn question_without_correct_option_is_reported_by_number() {
        let raw = r#"[
            {"prompt": "ok", "options": ["a*", "b"]},
            {"prompt": "broken", "options": ["a", "b"]}
        ]"#;
        match parse_bank(raw, &settings(40)) {
            Err(LoadError::InvalidQuestion { number, source }) => {
                assert_eq!(number, 2);
                assert_eq!(source, QuestionError::NoCorrectOption);
            }
            other => panic!("unexpected: {other:?}"),
        }
    }

    #[test]
    fn missing_prompt_is_a_malformed_question() {
        let raw = r#"[{"options": ["a*"]}]"#;
        assert!(matches!(
            parse_bank(raw, &settings(40)),
            Err(LoadError::InvalidQuestion {
                number: 1,
                source: QuestionError::EmptyPrompt
            })
        ));
    }

    #[tokio::test]
    async fn static_source_loads_through_load_bank() {
        let body = serde_json::json!([
            {"prompt": "Q1", "options": ["a*", "b"]},
            {"prompt": "Q2", "options": ["a", "b*"]},
            {"prompt": "Q3", "options": ["a*"]}
        ])
        .to_string();
        let bank = load_bank(&StaticSource::new(body), &settings(2))
            .await
            .unwrap();
        assert_eq!(bank.session_count(), 2);
    }

    #[tokio::test]
    async fn missing_file_is_an_io_error() {
        let source = FileSource::new("/definitely/not/here/bank.json");
        let err = load_bank(&source, &settings(40)).await.unwrap_err();
        assert!(matches!(err, LoadError::Io { .. }));
        assert!(err.to_string().contains("bank.json"));
    }
}
