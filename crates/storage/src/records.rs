use chrono::{DateTime, Utc};
use quiz_core::model::{
    Question, QuizSettings, SessionBuildError, SessionGrade, SessionNumber, SessionState,
};
use serde::{Deserialize, Serialize};

/// Persisted shape of an in-progress session.
///
/// Older saves used different field names; those are accepted on read.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProgressRecord {
    #[serde(alias = "quizNumber")]
    pub session_number: SessionNumber,
    #[serde(alias = "currentQuestion")]
    pub position: usize,
    #[serde(alias = "userAnswers", default)]
    pub answers: Vec<Option<usize>>,
    #[serde(alias = "correctAnswers", default)]
    pub correct_count: u32,
    #[serde(alias = "timestamp")]
    pub saved_at: DateTime<Utc>,
}

impl ProgressRecord {
    #[must_use]
    pub fn from_session(session: &SessionState, saved_at: DateTime<Utc>) -> Self {
        Self {
            session_number: session.session_number(),
            position: session.position(),
            answers: session.answers().to_vec(),
            correct_count: session.correct_count(),
            saved_at,
        }
    }

    /// Rebuild the live session this record was saved from.
    ///
    /// # Errors
    ///
    /// Returns `SessionBuildError` if the record does not fit `questions`.
    pub fn into_session(
        self,
        questions: Vec<Question>,
        settings: &QuizSettings,
    ) -> Result<SessionState, SessionBuildError> {
        SessionState::from_persisted(
            self.session_number,
            questions,
            self.position,
            self.answers,
            self.correct_count,
            settings,
        )
    }
}

/// Persisted shape of a completed session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResultRecord {
    #[serde(alias = "quizNumber")]
    pub session_number: SessionNumber,
    #[serde(alias = "correctAnswers")]
    pub correct_count: u32,
    pub total_questions: u32,
    pub percentage: u32,
    pub completed_at: DateTime<Utc>,
    #[serde(alias = "userAnswers", default)]
    pub answers: Vec<Option<usize>>,
}

impl ResultRecord {
    #[must_use]
    pub fn from_grade(grade: &SessionGrade) -> Self {
        Self {
            session_number: grade.session_number(),
            correct_count: grade.correct_count(),
            total_questions: grade.total_questions(),
            percentage: grade.percentage(),
            completed_at: grade.completed_at(),
            answers: grade.answers().to_vec(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use quiz_core::model::QuestionDraft;
    use quiz_core::time::fixed_now;

    #[test]
    fn progress_uses_camel_case_fields() {
        let record = ProgressRecord {
            session_number: SessionNumber::new(2).unwrap(),
            position: 3,
            answers: vec![Some(1), None],
            correct_count: 1,
            saved_at: fixed_now(),
        };
        let json = serde_json::to_value(&record).unwrap();
        assert_eq!(json["sessionNumber"], 2);
        assert_eq!(json["correctCount"], 1);
        assert_eq!(json["answers"][1], serde_json::Value::Null);
        assert_eq!(json["savedAt"], "2023-11-14T22:13:20Z");
    }

    #[test]
    fn legacy_progress_fields_are_accepted() {
        let json = r#"{
            "quizNumber": 3,
            "currentQuestion": 1,
            "userAnswers": [0, null, 2],
            "correctAnswers": 1,
            "timestamp": "2024-05-01T10:00:00.000Z"
        }"#;
        let record: ProgressRecord = serde_json::from_str(json).unwrap();
        assert_eq!(record.session_number.value(), 3);
        assert_eq!(record.position, 1);
        assert_eq!(record.answers, [Some(0), None, Some(2)]);
        assert_eq!(record.correct_count, 1);
    }

    #[test]
    fn progress_rebuilds_session() {
        let questions: Vec<_> = (0..3)
            .map(|i| {
                QuestionDraft::new(format!("Q{i}"), ["a*", "b"])
                    .validate()
                    .unwrap()
            })
            .collect();
        let mut live = SessionState::new(
            SessionNumber::new(1).unwrap(),
            questions.clone(),
            &QuizSettings::default(),
        )
        .unwrap();
        live.select_option(0).unwrap();
        live.advance(fixed_now()).unwrap();

        let record = ProgressRecord::from_session(&live, fixed_now());
        let restored = record
            .into_session(questions, &QuizSettings::default())
            .unwrap();
        assert_eq!(restored.position(), 1);
        assert_eq!(restored.answers(), live.answers());
        assert_eq!(restored.correct_count(), 1);
    }
}
