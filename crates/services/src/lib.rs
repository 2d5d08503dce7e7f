#![forbid(unsafe_code)]

pub mod app_services;
pub mod bank_loader;
pub mod config;
pub mod controller;
pub mod error;
pub mod host;
pub mod sessions;

pub use quiz_core::Clock;

pub use app_services::AppServices;
pub use bank_loader::{FileSource, HttpSource, QuestionSource, StaticSource, load_bank, parse_bank};
pub use config::{BankLocation, QuizConfig};
pub use controller::{QuizApp, ScreenKind};
pub use error::{AppError, ConfigError, LoadError, SessionError};
pub use host::QuizHost;

pub use sessions::{
    AggregateStats, CompletedSession, GradeReport, SessionCatalog, SessionListing,
    SessionLoopService, SessionStatus, StatsAggregator, StepOutcome,
};
