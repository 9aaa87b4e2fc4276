//! Application State
//!
//! Services shared by every command, built once at startup.

use std::sync::Arc;

use tracing::info;

use crate::models::settings::AppSettings;
use crate::services::analysis::AnalysisRouter;
use crate::services::suggest::SuggestionService;
use crate::storage::{ConfigService, Database};
use crate::utils::error::AppResult;

/// Application state
#[derive(Clone)]
pub struct AppState {
    settings: Arc<AppSettings>,
    router: Arc<AnalysisRouter>,
    suggestions: SuggestionService,
}

impl AppState {
    /// Open the database and build the router from loaded configuration
    pub fn initialize(config: ConfigService) -> AppResult<Self> {
        let db_path = config.database_path()?;
        let database = Database::new(&db_path)?;
        info!(database = %db_path.display(), "database opened");
        Ok(Self::from_parts(config.into_settings(), database))
    }

    /// Build state around an already-open database
    pub fn from_parts(settings: AppSettings, database: Database) -> Self {
        let router = Arc::new(AnalysisRouter::from_config(settings.analysis.clone()));
        Self::with_router(settings, database, router)
    }

    /// Build state around an explicit router
    pub fn with_router(settings: AppSettings, database: Database, router: Arc<AnalysisRouter>) -> Self {
        info!(
            remote_ai = router.remote_enabled(),
            models = ?router.model_preferences(),
            "analysis router ready"
        );
        let suggestions = SuggestionService::new(database, router.clone());
        Self {
            settings: Arc::new(settings),
            router,
            suggestions,
        }
    }

    /// In-memory state with the given settings
    pub fn in_memory(settings: AppSettings) -> AppResult<Self> {
        Ok(Self::from_parts(settings, Database::new_in_memory()?))
    }

    pub fn settings(&self) -> &AppSettings {
        &self.settings
    }

    pub fn router(&self) -> &Arc<AnalysisRouter> {
        &self.router
    }

    pub fn suggestions(&self) -> &SuggestionService {
        &self.suggestions
    }
}
