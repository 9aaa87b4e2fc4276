//! Suggestion Service
//!
//! Glue between stored events and the analysis router. Storage is
//! best-effort here: a failing database degrades the response (no stored
//! suggestion id, analysis without payload) but never fails the request.

use std::sync::Arc;

use rand::seq::SliceRandom;
use serde_json::json;
use tracing::{info, warn};

use crate::models::event::{EventRecord, NewEvent, SuggestionRecord};
use crate::models::response::{StatusResponse, SuggestRequest, SuggestResponse};
use crate::services::analysis::AnalysisRouter;
use crate::storage::database::Database;
use crate::utils::error::{AppError, AppResult};

const SAMPLE_LEVELS: [&str; 3] = ["Info", "Warning", "Critical"];

/// Service producing and storing AI suggestions for events
#[derive(Clone)]
pub struct SuggestionService {
    db: Database,
    router: Arc<AnalysisRouter>,
}

impl SuggestionService {
    pub fn new(db: Database, router: Arc<AnalysisRouter>) -> Self {
        Self { db, router }
    }

    pub fn router(&self) -> &AnalysisRouter {
        &self.router
    }

    /// Run a database call on the blocking pool.
    async fn with_db<T, F>(&self, f: F) -> AppResult<T>
    where
        F: FnOnce(&Database) -> AppResult<T> + Send + 'static,
        T: Send + 'static,
    {
        let db = self.db.clone();
        tokio::task::spawn_blocking(move || f(&db))
            .await
            .map_err(|e| AppError::internal(format!("database task failed: {}", e)))?
    }

    /// Analyze a stored event and record the suggestion.
    ///
    /// Only a missing event id is an error.
    pub async fn suggest(&self, request: SuggestRequest) -> AppResult<SuggestResponse> {
        let event_id = request
            .resolved_event_id()
            .map(str::to_string)
            .ok_or_else(|| AppError::validation("event_id is required"))?;

        let lookup_id = event_id.clone();
        let record = match self.with_db(move |db| db.get_event(&lookup_id)).await {
            Ok(Some(record)) => Some(record),
            Ok(None) => {
                warn!(event_id = %event_id, "event not found, analyzing without payload");
                None
            }
            Err(e) => {
                warn!(event_id = %event_id, error = %e, "event lookup failed, analyzing without payload");
                None
            }
        };

        let result = match &record {
            Some(record) => self.router.analyze_event(&record.to_event()).await,
            None => self.router.analyze(&event_id, None, None).await,
        };

        let store_id = event_id.clone();
        let stored = result.clone();
        let suggestion_id = match self
            .with_db(move |db| db.insert_suggestion(&store_id, &stored))
            .await
        {
            Ok(id) => Some(id),
            Err(e) => {
                warn!(event_id = %event_id, error = %e, "failed to store suggestion");
                None
            }
        };

        if record.is_some() {
            let mark_id = event_id.clone();
            if let Err(e) = self.with_db(move |db| db.mark_event_processed(&mark_id)).await {
                warn!(event_id = %event_id, error = %e, "failed to mark event processed");
            }
        }

        info!(
            event_id = %event_id,
            provider = %result.provider,
            stored = suggestion_id.is_some(),
            "suggestion produced"
        );

        Ok(SuggestResponse {
            event_id,
            analysis: result.analysis,
            suggestion: result.suggestion,
            provider: result.provider,
            suggestion_id,
        })
    }

    /// Store a new event
    pub async fn ingest(&self, event: NewEvent) -> AppResult<EventRecord> {
        let record = self.with_db(move |db| db.insert_event(event)).await?;
        info!(event_id = %record.id, service = %record.service, "event ingested");
        Ok(record)
    }

    /// Store a synthetic "selector missing" event for demos
    pub async fn create_sample(&self) -> AppResult<EventRecord> {
        let level = SAMPLE_LEVELS
            .choose(&mut rand::thread_rng())
            .copied()
            .unwrap_or("Info");

        self.ingest(NewEvent {
            id: None,
            tenant_id: "demo".to_string(),
            service: "web-automation".to_string(),
            event_type: "selector_missing".to_string(),
            trace_id: None,
            meta_info: Some(json!({
                "title": "Selector missing on page",
                "level": level,
            })),
            payload: Some(json!({
                "selector": "#objective",
                "errorCode": "META-SEL-001",
            })),
        })
        .await
    }

    pub async fn recent_events(&self, limit: usize) -> AppResult<Vec<EventRecord>> {
        self.with_db(move |db| db.list_recent_events(limit)).await
    }

    pub async fn suggestions_for(&self, event_id: &str) -> AppResult<Vec<SuggestionRecord>> {
        let event_id = event_id.to_string();
        self.with_db(move |db| db.list_suggestions(&event_id)).await
    }

    /// Readiness of storage and the remote analysis path
    pub async fn status(&self) -> StatusResponse {
        let database_ok = self.with_db(|db| db.ping()).await.is_ok();
        let remote = self.router.remote_enabled();
        StatusResponse {
            ok: database_ok,
            database: if database_ok { "ok" } else { "down" }.to_string(),
            remote_ai: if remote { "configured" } else { "disabled" }.to_string(),
            models: self.router.model_preferences(),
            version: env!("CARGO_PKG_VERSION").to_string(),
        }
    }
}
