use std::sync::Arc;

use log::info;

use quiz_core::model::QuizSettings;
use storage::PersistenceStore;

use crate::Clock;
use crate::bank_loader::QuestionSource;
use crate::config::QuizConfig;
use crate::error::AppError;
use crate::sessions::{SessionCatalog, SessionLoopService, StatsAggregator};

/// Assembles app-facing services around one store and one bank source.
#[derive(Clone)]
pub struct AppServices {
    settings: QuizSettings,
    source: Arc<dyn QuestionSource>,
    store: PersistenceStore,
    session_loop: Arc<SessionLoopService>,
    catalog: Arc<SessionCatalog>,
    stats: Arc<StatsAggregator>,
}

impl AppServices {
    #[must_use]
    pub fn new(
        clock: Clock,
        settings: QuizSettings,
        source: Arc<dyn QuestionSource>,
        store: PersistenceStore,
    ) -> Self {
        let session_loop = Arc::new(SessionLoopService::new(clock, store.clone(), settings));
        let catalog = Arc::new(SessionCatalog::new(store.clone()));
        let stats = Arc::new(StatsAggregator::new(store.clone()));
        Self {
            settings,
            source,
            store,
            session_loop,
            catalog,
            stats,
        }
    }

    /// Build services from runtime configuration.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Store` if the configured store file cannot be opened.
    pub fn from_config(config: &QuizConfig, clock: Clock) -> Result<Self, AppError> {
        let store = match &config.store_path {
            Some(path) => {
                info!("persisting progress to {}", path.display());
                PersistenceStore::file(path.clone())?
            }
            None => {
                info!("persisting progress in memory only");
                PersistenceStore::in_memory()
            }
        };
        Ok(Self::new(clock, config.settings, config.bank.source(), store))
    }

    #[must_use]
    pub fn settings(&self) -> &QuizSettings {
        &self.settings
    }

    #[must_use]
    pub fn source(&self) -> Arc<dyn QuestionSource> {
        Arc::clone(&self.source)
    }

    #[must_use]
    pub fn store(&self) -> &PersistenceStore {
        &self.store
    }

    #[must_use]
    pub fn session_loop(&self) -> Arc<SessionLoopService> {
        Arc::clone(&self.session_loop)
    }

    #[must_use]
    pub fn catalog(&self) -> Arc<SessionCatalog> {
        Arc::clone(&self.catalog)
    }

    #[must_use]
    pub fn stats(&self) -> Arc<StatsAggregator> {
        Arc::clone(&self.stats)
    }
}
