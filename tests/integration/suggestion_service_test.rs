//! Suggestion Service Integration Tests
//!
//! Ingest, analyze and persist through `SuggestionService` and the command
//! layer, against an in-memory SQLite database.

use std::sync::Arc;

use serde_json::json;

use nexus_llm::LlmProvider;
use nexus_system::commands;
use nexus_system::models::event::NewEvent;
use nexus_system::models::response::SuggestRequest;
use nexus_system::models::settings::{AnalysisConfig, AppSettings};
use nexus_system::services::analysis::AnalysisRouter;
use nexus_system::services::suggest::SuggestionService;
use nexus_system::storage::Database;
use nexus_system::{AppError, AppState};

use crate::support::MockLlmProvider;

fn new_event(payload: serde_json::Value) -> NewEvent {
    serde_json::from_value(json!({
        "tenant_id": "acme",
        "service": "checkout",
        "type": "error",
        "trace_id": "tr-42",
        "payload": payload,
    }))
    .unwrap()
}

fn remote_state(provider: Arc<MockLlmProvider>) -> AppState {
    let settings = AppSettings {
        analysis: AnalysisConfig {
            api_key: Some("sk-test".to_string()),
            ..Default::default()
        },
        database_path: None,
    };
    let router = Arc::new(AnalysisRouter::new(
        settings.analysis.clone(),
        Some(provider as Arc<dyn LlmProvider>),
    ));
    AppState::with_router(settings, Database::new_in_memory().unwrap(), router)
}

#[tokio::test]
async fn test_ingest_then_suggest_local() {
    let db = Database::new_in_memory().unwrap();
    let router = Arc::new(AnalysisRouter::local_only(AnalysisConfig::default()));
    let service = SuggestionService::new(db.clone(), router);

    let record = service
        .ingest(new_event(json!({"message": "deadlock detected on orders table"})))
        .await
        .unwrap();
    let response = service
        .suggest(SuggestRequest::from_value(&json!({"eventId": record.id})))
        .await
        .unwrap();

    assert_eq!(response.provider, "local-heuristic");
    assert!(response.suggestion.contains("DB connection pool"));

    let stored = db.list_suggestions(&record.id).unwrap();
    assert_eq!(stored.len(), 1);
    assert_eq!(Some(stored[0].id.clone()), response.suggestion_id);
    assert!(db.get_event(&record.id).unwrap().unwrap().processed);
}

#[tokio::test]
async fn test_remote_answer_is_persisted_with_model_tag() {
    let provider = MockLlmProvider::with_text_response(
        r#"{"analysis": "Checkout DB pool saturated", "suggestion": "Raise pool to 50"}"#,
    )
    .into_arc();
    let state = remote_state(provider.clone());

    let created = commands::ingest_event(&state, new_event(json!({"message": "pool exhausted"})))
        .await
        .data
        .unwrap();
    let response = commands::suggest(&state, SuggestRequest::for_event(created.event_id.clone()))
        .await
        .data
        .unwrap();

    assert_eq!(response.provider, "gpt-4o-mini");
    assert_eq!(response.analysis, "Checkout DB pool saturated");
    assert_eq!(provider.calls(), 1);

    let prompt = provider.last_prompt().unwrap();
    assert!(prompt.contains(&created.event_id));
    assert!(prompt.contains("tr-42"));
    assert!(prompt.contains("pool exhausted"));

    let stored = commands::list_event_suggestions(&state, &created.event_id)
        .await
        .data
        .unwrap();
    assert_eq!(stored[0].provider, "gpt-4o-mini");
}

#[tokio::test]
async fn test_generic_fallback_carries_trace_id() {
    let state = AppState::in_memory(AppSettings::default()).unwrap();
    let created = commands::ingest_event(&state, new_event(json!({"message": "unexpected state"})))
        .await
        .data
        .unwrap();

    let response = commands::suggest(&state, SuggestRequest::for_event(created.event_id))
        .await
        .data
        .unwrap();

    assert!(response.suggestion.contains("tr-42"));
}

#[tokio::test]
async fn test_missing_event_id_is_the_only_error() {
    let state = AppState::in_memory(AppSettings::default()).unwrap();

    let missing = state.suggestions().suggest(SuggestRequest::default()).await;
    assert!(matches!(missing, Err(AppError::Validation(_))));

    let unknown = commands::suggest(&state, SuggestRequest::for_event("ev_unknown")).await;
    assert!(unknown.success);
    assert_eq!(unknown.data.unwrap().provider, "local-heuristic");
}

#[tokio::test]
async fn test_sample_event_flow() {
    let state = AppState::in_memory(AppSettings::default()).unwrap();
    let created = commands::create_sample(&state).await.data.unwrap();

    let response = commands::suggest(&state, SuggestRequest::for_event(created.event_id.clone()))
        .await
        .data
        .unwrap();
    assert!(!response.analysis.is_empty());

    let events = commands::list_events(&state, 10).await.data.unwrap();
    assert_eq!(events.len(), 1);
    assert!(events[0].processed);
}

#[tokio::test]
async fn test_status_reports_configured_remote() {
    let provider = MockLlmProvider::without_credentials().into_arc();
    let disabled = remote_state(provider);
    let status = commands::get_status(&disabled).await.data.unwrap();
    assert_eq!(status.remote_ai, "disabled");

    let enabled = remote_state(MockLlmProvider::with_text_response("ok").into_arc());
    let status = commands::get_status(&enabled).await.data.unwrap();
    assert_eq!(status.remote_ai, "configured");
    assert_eq!(status.models, vec!["gpt-4o-mini"]);
    assert_eq!(status.database, "ok");
}
