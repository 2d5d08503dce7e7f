#![forbid(unsafe_code)]

pub mod file_store;
pub mod persistence;
pub mod records;
pub mod repository;

pub use file_store::{FileStore, FileStoreError};
pub use persistence::PersistenceStore;
pub use records::{ProgressRecord, ResultRecord};
pub use repository::{InMemoryStore, KeyValueStore, StorageError};
