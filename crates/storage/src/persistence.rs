use std::path::PathBuf;
use std::sync::Arc;

use log::{debug, warn};
use quiz_core::model::SessionNumber;
use serde::Serialize;
use serde::de::DeserializeOwned;

use crate::file_store::{FileStore, FileStoreError};
use crate::records::{ProgressRecord, ResultRecord};
use crate::repository::{InMemoryStore, KeyValueStore};

const PROGRESS_PREFIX: &str = "quiz_progress_";
const RESULT_PREFIX: &str = "quiz_results_";

fn progress_key(number: SessionNumber) -> String {
    format!("{PROGRESS_PREFIX}{number}")
}

fn result_key(number: SessionNumber) -> String {
    format!("{RESULT_PREFIX}{number}")
}

/// Progress and result slots per session number, on top of a key-value port.
///
/// Never fails the caller: backend errors and unreadable records are logged,
/// reads then report "absent" and writes report `false`. Progress and result
/// live in disjoint key spaces, and at most one of them exists per session.
#[derive(Clone)]
pub struct PersistenceStore {
    backend: Arc<dyn KeyValueStore>,
}

impl PersistenceStore {
    #[must_use]
    pub fn new(backend: Arc<dyn KeyValueStore>) -> Self {
        Self { backend }
    }

    #[must_use]
    pub fn in_memory() -> Self {
        Self::new(Arc::new(InMemoryStore::new()))
    }

    /// Persist to a JSON file at `path`.
    ///
    /// # Errors
    ///
    /// Returns `FileStoreError` if an existing file cannot be read or parsed.
    pub fn file(path: impl Into<PathBuf>) -> Result<Self, FileStoreError> {
        Ok(Self::new(Arc::new(FileStore::open(path)?)))
    }

    /// Save progress under `record.session_number`, dropping any stored result
    /// for that session (a retake supersedes it).
    ///
    /// Returns `false` if the progress could not be written.
    pub fn save_progress(&self, record: &ProgressRecord) -> bool {
        let number = record.session_number;
        if !self.write(&progress_key(number), record) {
            return false;
        }
        self.clear_result(number);
        true
    }

    #[must_use]
    pub fn load_progress(&self, number: SessionNumber) -> Option<ProgressRecord> {
        let record: ProgressRecord = self.read(&progress_key(number))?;
        if record.session_number != number {
            warn!(
                "progress slot {number} holds session {}, ignoring",
                record.session_number
            );
            return None;
        }
        Some(record)
    }

    pub fn clear_progress(&self, number: SessionNumber) -> bool {
        self.remove(&progress_key(number))
    }

    /// Save a result under `record.session_number`.
    ///
    /// Returns `false` if the result could not be written.
    pub fn save_result(&self, record: &ResultRecord) -> bool {
        self.write(&result_key(record.session_number), record)
    }

    /// Stored result of session `number`.
    ///
    /// A record with no questions, or with more correct answers than
    /// questions, is treated as absent.
    #[must_use]
    pub fn load_result(&self, number: SessionNumber) -> Option<ResultRecord> {
        let record: ResultRecord = self.read(&result_key(number))?;
        if record.session_number != number {
            warn!(
                "result slot {number} holds session {}, ignoring",
                record.session_number
            );
            return None;
        }
        if record.total_questions == 0 || record.correct_count > record.total_questions {
            warn!(
                "result slot {number} claims {}/{}, ignoring",
                record.correct_count, record.total_questions
            );
            return None;
        }
        Some(record)
    }

    pub fn clear_result(&self, number: SessionNumber) -> bool {
        self.remove(&result_key(number))
    }

    /// Drop every progress and result slot. Unrelated keys are left alone.
    pub fn clear_all(&self) -> bool {
        let keys = match self.backend.keys() {
            Ok(keys) => keys,
            Err(err) => {
                warn!("could not list stored keys: {err}");
                return false;
            }
        };
        keys.iter()
            .filter(|k| k.starts_with(PROGRESS_PREFIX) || k.starts_with(RESULT_PREFIX))
            .fold(true, |ok, key| self.remove(key) && ok)
    }

    fn read<T: DeserializeOwned>(&self, key: &str) -> Option<T> {
        let raw = match self.backend.get(key) {
            Ok(raw) => raw?,
            Err(err) => {
                warn!("could not read {key}: {err}");
                return None;
            }
        };
        match serde_json::from_str(&raw) {
            Ok(value) => Some(value),
            Err(err) => {
                warn!("malformed record under {key}, treating as absent: {err}");
                None
            }
        }
    }

    fn write<T: Serialize>(&self, key: &str, value: &T) -> bool {
        let raw = match serde_json::to_string(value) {
            Ok(raw) => raw,
            Err(err) => {
                warn!("could not serialize {key}: {err}");
                return false;
            }
        };
        match self.backend.set(key, &raw) {
            Ok(()) => {
                debug!("saved {key}");
                true
            }
            Err(err) => {
                warn!("could not save {key}, continuing unsaved: {err}");
                false
            }
        }
    }

    fn remove(&self, key: &str) -> bool {
        match self.backend.remove(key) {
            Ok(()) => true,
            Err(err) => {
                warn!("could not remove {key}: {err}");
                false
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::repository::StorageError;
    use chrono::Duration;
    use quiz_core::time::fixed_now;

    struct UnavailableStore;

    impl KeyValueStore for UnavailableStore {
        fn get(&self, _key: &str) -> Result<Option<String>, StorageError> {
            Err(StorageError::Unavailable("quota exceeded".into()))
        }
        fn set(&self, _key: &str, _value: &str) -> Result<(), StorageError> {
            Err(StorageError::Unavailable("quota exceeded".into()))
        }
        fn remove(&self, _key: &str) -> Result<(), StorageError> {
            Err(StorageError::Unavailable("quota exceeded".into()))
        }
        fn keys(&self) -> Result<Vec<String>, StorageError> {
            Err(StorageError::Unavailable("quota exceeded".into()))
        }
    }

    fn n(v: u32) -> SessionNumber {
        SessionNumber::new(v).unwrap()
    }

    fn progress(number: u32, position: usize) -> ProgressRecord {
        ProgressRecord {
            session_number: n(number),
            position,
            answers: vec![Some(1), Some(0), None],
            correct_count: 1,
            saved_at: fixed_now(),
        }
    }

    fn result(number: u32) -> ResultRecord {
        ResultRecord {
            session_number: n(number),
            correct_count: 4,
            total_questions: 5,
            percentage: 80,
            completed_at: fixed_now() + Duration::minutes(3),
            answers: vec![Some(0); 5],
        }
    }

    #[test]
    fn progress_round_trips_and_loads_idempotently() {
        let store = PersistenceStore::in_memory();
        let record = progress(2, 2);
        assert!(store.save_progress(&record));

        let first = store.load_progress(n(2));
        let second = store.load_progress(n(2));
        assert_eq!(first.as_ref(), Some(&record));
        assert_eq!(first, second);
        assert_eq!(store.load_progress(n(1)), None);
    }

    #[test]
    fn progress_and_results_use_disjoint_slots() {
        let backend = InMemoryStore::new();
        let store = PersistenceStore::new(Arc::new(backend.clone()));
        store.save_result(&result(1));
        store.save_progress(&progress(2, 0));

        let mut keys = backend.keys().unwrap();
        keys.sort();
        assert_eq!(keys, ["quiz_progress_2", "quiz_results_1"]);
        assert_eq!(store.load_result(n(2)), None);
        assert_eq!(store.load_progress(n(1)), None);
    }

    #[test]
    fn saving_progress_supersedes_result() {
        let store = PersistenceStore::in_memory();
        store.save_result(&result(3));
        store.save_progress(&progress(3, 0));
        assert_eq!(store.load_result(n(3)), None);
        assert!(store.load_progress(n(3)).is_some());
    }

    #[test]
    fn clear_operations_are_idempotent() {
        let store = PersistenceStore::in_memory();
        store.save_progress(&progress(1, 0));
        assert!(store.clear_progress(n(1)));
        assert!(store.clear_progress(n(1)));
        assert_eq!(store.load_progress(n(1)), None);
    }

    #[test]
    fn clearing_a_result_leaves_progress_of_other_sessions() {
        let store = PersistenceStore::in_memory();
        store.save_result(&result(1));
        store.save_progress(&progress(2, 1));

        assert!(store.clear_result(n(1)));
        assert!(store.clear_result(n(1)));
        assert_eq!(store.load_result(n(1)), None);
        assert!(store.load_progress(n(2)).is_some());
    }

    #[test]
    fn inconsistent_results_are_absent() {
        let store = PersistenceStore::in_memory();
        store.save_result(&ResultRecord {
            correct_count: 6,
            ..result(1)
        });
        store.save_result(&ResultRecord {
            correct_count: 0,
            total_questions: 0,
            percentage: 0,
            answers: Vec::new(),
            ..result(2)
        });
        assert_eq!(store.load_result(n(1)), None);
        assert_eq!(store.load_result(n(2)), None);
        assert_eq!(store.load_result(n(3)), None);
        store.save_result(&result(3));
        assert_eq!(store.load_result(n(3)), Some(result(3)));
    }

    #[test]
    fn clear_all_keeps_foreign_keys() {
        let backend = InMemoryStore::new();
        backend.set("theme", "dark").unwrap();
        let store = PersistenceStore::new(Arc::new(backend.clone()));
        store.save_progress(&progress(1, 0));
        store.save_result(&result(2));
        store.save_result(&result(9));

        assert!(store.clear_all());
        assert_eq!(backend.keys().unwrap(), ["theme"]);
    }

    #[test]
    fn malformed_and_mismatched_records_are_absent() {
        let backend = InMemoryStore::new();
        backend.set("quiz_progress_1", "{not json").unwrap();
        backend
            .set(
                "quiz_results_4",
                &serde_json::to_string(&result(5)).unwrap(),
            )
            .unwrap();
        let store = PersistenceStore::new(Arc::new(backend));

        assert_eq!(store.load_progress(n(1)), None);
        assert_eq!(store.load_result(n(4)), None);
    }

    #[test]
    fn unavailable_backend_never_fails_the_caller() {
        let store = PersistenceStore::new(Arc::new(UnavailableStore));
        assert!(!store.save_progress(&progress(1, 0)));
        assert!(!store.save_result(&result(1)));
        assert_eq!(store.load_progress(n(1)), None);
        assert_eq!(store.load_result(n(1)), None);
        assert!(!store.clear_progress(n(1)));
        assert!(!store.clear_all());
    }
}
