//! Suggestion Commands

use nexus_core::{AnalysisResult, Event};

use crate::models::response::{CommandResponse, SuggestRequest, SuggestResponse};
use crate::state::AppState;

/// Analyze a stored event and record the suggestion
pub async fn suggest(state: &AppState, request: SuggestRequest) -> CommandResponse<SuggestResponse> {
    state.suggestions().suggest(request).await.into()
}

/// Analyze an event without touching storage
pub async fn analyze_event(state: &AppState, event: Event) -> CommandResponse<AnalysisResult> {
    CommandResponse::ok(state.router().analyze_event(&event).await)
}
