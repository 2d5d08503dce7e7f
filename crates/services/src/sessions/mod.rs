mod catalog;
mod report;
mod stats;
mod workflow;

// Public API of the session subsystem.
pub use crate::error::SessionError;
pub use catalog::{SessionCatalog, SessionListing, SessionStatus};
pub use report::GradeReport;
pub use stats::{AggregateStats, StatsAggregator};
pub use workflow::{CompletedSession, SessionLoopService, StepOutcome};
