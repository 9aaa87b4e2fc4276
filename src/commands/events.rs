//! Event Commands

use crate::models::event::{EventRecord, NewEvent, SuggestionRecord};
use crate::models::response::{CommandResponse, IngestResponse};
use crate::state::AppState;

/// Store an event
pub async fn ingest_event(state: &AppState, event: NewEvent) -> CommandResponse<IngestResponse> {
    state
        .suggestions()
        .ingest(event)
        .await
        .map(|record| IngestResponse {
            ok: true,
            event_id: record.id,
        })
        .into()
}

/// Store a synthetic demo event
pub async fn create_sample(state: &AppState) -> CommandResponse<IngestResponse> {
    state
        .suggestions()
        .create_sample()
        .await
        .map(|record| IngestResponse {
            ok: true,
            event_id: record.id,
        })
        .into()
}

/// Most recent events first
pub async fn list_events(state: &AppState, limit: usize) -> CommandResponse<Vec<EventRecord>> {
    state.suggestions().recent_events(limit).await.into()
}

/// Stored suggestions for one event
pub async fn list_event_suggestions(
    state: &AppState,
    event_id: &str,
) -> CommandResponse<Vec<SuggestionRecord>> {
    state.suggestions().suggestions_for(event_id).await.into()
}
