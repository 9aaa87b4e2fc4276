//! Analysis Router Integration Tests
//!
//! Drives `AnalysisRouter` end to end against scripted providers: the
//! no-credential shortcut, retry exhaustion under timeouts, model fallback,
//! tolerant response parsing and prompt bounds. Time is paused so retries
//! and timeouts run instantly.

use std::sync::Arc;
use std::time::Duration;

use serde_json::json;

use nexus_core::{Event, LOCAL_HEURISTIC_PROVIDER};
use nexus_llm::LlmProvider;
use nexus_system::models::settings::AnalysisConfig;
use nexus_system::services::analysis::{build_prompt, AnalysisRouter, RemoteAnalysisClient};

use crate::support::{server_error, text_response, Exhausted, MockLlmProvider};

fn config(models: &[&str], max_retries: u32) -> AnalysisConfig {
    AnalysisConfig {
        api_key: Some("sk-test".to_string()),
        models: models.iter().map(|m| m.to_string()).collect(),
        max_retries,
        timeout_secs: 15,
        backoff_base_ms: 100,
        ..Default::default()
    }
}

fn router_with(provider: Arc<MockLlmProvider>, config: AnalysisConfig) -> AnalysisRouter {
    AnalysisRouter::new(config, Some(provider as Arc<dyn LlmProvider>))
}

// ============================================================================
// Fallback without credentials
// ============================================================================

#[tokio::test]
async fn test_no_credential_never_calls_provider() {
    let provider = MockLlmProvider::without_credentials().into_arc();
    let router = router_with(provider.clone(), config(&["gpt-4o-mini"], 3));

    let result = router
        .analyze("ev_1", Some(&json!({"message": "connection timeout to db"})), None)
        .await;

    assert_eq!(result.provider, LOCAL_HEURISTIC_PROVIDER);
    assert_eq!(provider.calls(), 0);
    assert!(!router.remote_enabled());
}

#[tokio::test]
async fn test_upstream_scenario_without_credential() {
    let router = AnalysisRouter::from_config(AnalysisConfig::default());
    let event = Event::new("ev_502").with_payload(json!({"message": "502 Bad Gateway from upstream"}));

    let result = router.analyze_event(&event).await;

    assert_eq!(result.provider, "local-heuristic");
    assert!(!result.analysis.is_empty());
    assert!(result.suggestion.contains("upstream"));
}

// ============================================================================
// Retry exhaustion
// ============================================================================

#[tokio::test(start_paused = true)]
async fn test_always_timing_out_exhausts_every_attempt() {
    let provider = MockLlmProvider::always(Exhausted::Hang).into_arc();
    let router = router_with(provider.clone(), config(&["model-a", "model-b"], 2));

    let started = tokio::time::Instant::now();
    let result = router
        .analyze("ev_1", Some(&json!({"message": "OOMKilled"})), None)
        .await;

    assert_eq!(result.provider, LOCAL_HEURISTIC_PROVIDER);
    assert!(result.suggestion.to_lowercase().contains("memory"));
    assert_eq!(provider.calls(), 2 * 2);
    assert_eq!(
        provider.models_seen(),
        vec!["model-a", "model-a", "model-b", "model-b"]
    );
    // four timed-out calls of 15s each, plus backoff
    assert!(started.elapsed() >= Duration::from_secs(60));
    assert!(started.elapsed() <= router.latency_budget() + Duration::from_secs(1));
}

#[tokio::test(start_paused = true)]
async fn test_backoff_is_non_decreasing_within_a_model() {
    let provider = MockLlmProvider::always(Exhausted::Fail(server_error())).into_arc();
    let cfg = config(&["model-a", "model-b"], 4);
    let client = RemoteAnalysisClient::new(provider.clone(), &cfg);
    let prompt = build_prompt("ev_1", None, None, &cfg).unwrap();

    let failure = client.try_call(&prompt).await.unwrap_err();

    assert_eq!(failure.attempts.len(), 8);
    assert_eq!(provider.calls(), 8);
    for model in ["model-a", "model-b"] {
        let delays: Vec<u64> = failure
            .attempts
            .iter()
            .filter(|a| a.model == model)
            .filter_map(|a| a.backoff_ms)
            .collect();
        assert_eq!(delays.len(), 3, "no sleep after the last attempt of {}", model);
        assert!(
            delays.windows(2).all(|w| w[0] <= w[1]),
            "backoff decreased for {}: {:?}",
            model,
            delays
        );
    }
    assert!(failure.attempts.iter().all(|a| a.error.is_some()));
}

#[tokio::test(start_paused = true)]
async fn test_panicking_provider_is_contained() {
    let provider = MockLlmProvider::always(Exhausted::Panic).into_arc();
    let router = router_with(provider.clone(), config(&["model-a"], 2));

    let result = router.analyze("ev_1", None, None).await;

    assert_eq!(result.provider, LOCAL_HEURISTIC_PROVIDER);
    assert!(result.is_well_formed());
    assert_eq!(provider.calls(), 2);
}

// ============================================================================
// Model fallback and success
// ============================================================================

#[tokio::test(start_paused = true)]
async fn test_second_model_answers_after_first_exhausted() {
    let provider = MockLlmProvider::new(
        vec![
            Err(server_error()),
            Err(server_error()),
            Ok(text_response(r#"{"analysis": "Pool exhausted", "suggestion": "Raise pool size"}"#)),
        ],
        Exhausted::Panic,
    )
    .into_arc();
    let router = router_with(provider.clone(), config(&["model-a", "model-b"], 2));

    let result = router.analyze("ev_1", None, None).await;

    assert_eq!(result.provider, "model-b");
    assert_eq!(result.analysis, "Pool exhausted");
    assert_eq!(result.suggestion, "Raise pool size");
    assert_eq!(provider.models_seen(), vec!["model-a", "model-a", "model-b"]);
}

#[tokio::test]
async fn test_json_embedded_in_prose() {
    let provider = MockLlmProvider::with_text_response(
        "Some preamble {\"analysis\":\"A\",\"suggestion\":\"B\"} trailing",
    )
    .into_arc();
    let router = router_with(provider.clone(), config(&["gpt-4o-mini"], 2));

    let result = router.analyze("ev_1", None, None).await;

    assert_eq!(result.analysis, "A");
    assert_eq!(result.suggestion, "B");
    assert_eq!(result.provider, "gpt-4o-mini");
    assert_eq!(provider.calls(), 1);
}

#[tokio::test]
async fn test_synonym_keys_are_normalized() {
    let provider = MockLlmProvider::with_text_response(
        r#"```json
{"explanation": "Lock contention", "recommendations": ["kill long txn", "add index"]}
```"#,
    )
    .into_arc();
    let router = router_with(provider, config(&["gpt-4o-mini"], 1));

    let result = router.analyze("ev_1", None, None).await;

    assert_eq!(result.analysis, "Lock contention");
    assert_eq!(result.suggestion, "kill long txn; add index");
}

#[tokio::test]
async fn test_plain_text_answer_used_for_both_fields() {
    let provider = MockLlmProvider::with_text_response("Restart the checkout pods.").into_arc();
    let router = router_with(provider, config(&["gpt-4o-mini"], 1));

    let result = router.analyze("ev_1", None, None).await;

    assert_eq!(result.analysis, "Restart the checkout pods.");
    assert_eq!(result.suggestion, "Restart the checkout pods.");
    assert_eq!(result.provider, "gpt-4o-mini");
}

#[tokio::test(start_paused = true)]
async fn test_blank_answer_counts_as_failed_attempt() {
    let provider = MockLlmProvider::new(
        vec![Ok(text_response("   ")), Ok(text_response("Check the pool."))],
        Exhausted::Panic,
    )
    .into_arc();
    let router = router_with(provider.clone(), config(&["gpt-4o-mini"], 2));

    let result = router.analyze("ev_1", None, None).await;

    assert_eq!(result.analysis, "Check the pool.");
    assert_eq!(provider.calls(), 2);
}

// ============================================================================
// Prompt bounds
// ============================================================================

#[tokio::test]
async fn test_huge_payload_is_truncated_in_prompt() {
    let provider = MockLlmProvider::with_text_response(r#"{"analysis": "a", "suggestion": "s"}"#)
        .into_arc();
    let cfg = config(&["gpt-4o-mini"], 1);
    let router = router_with(provider.clone(), cfg.clone());
    let payload = json!({"blob": "x".repeat(100_000)});
    let meta = json!({"trace_id": "tr-1", "notes": "y".repeat(50_000)});

    router.analyze("ev_big", Some(&payload), Some(&meta)).await;

    let prompt = provider.last_prompt().unwrap();
    assert!(prompt.contains("ev_big"));
    let x_count = prompt.chars().filter(|c| *c == 'x').count();
    let y_count = prompt.chars().filter(|c| *c == 'y').count();
    assert!(x_count <= cfg.payload_preview_chars);
    assert!(y_count <= cfg.meta_preview_chars);
    assert!(prompt.chars().count() < cfg.payload_preview_chars + cfg.meta_preview_chars + 1_000);
}

// ============================================================================
// Arbitrary payload and meta shapes
// ============================================================================

fn nested(depth: usize) -> serde_json::Value {
    (0..depth).fold(json!({"message": "deep leaf"}), |inner, i| {
        let mut level = serde_json::Map::new();
        level.insert(format!("level_{}", i), inner);
        serde_json::Value::Object(level)
    })
}

fn payload_shapes() -> Vec<(&'static str, Option<serde_json::Value>)> {
    vec![
        ("absent", None),
        ("null", Some(serde_json::Value::Null)),
        ("number", Some(json!(42))),
        ("string", Some(json!("connection timeout to upstream"))),
        ("array", Some(json!(["OOMKilled", {"code": 137}, null]))),
        ("nested", Some(nested(64))),
    ]
}

fn meta_shapes() -> Vec<(&'static str, Option<serde_json::Value>)> {
    vec![
        ("absent", None),
        ("string", Some(json!("free-form meta"))),
        ("object", Some(json!({"trace_id": "tr-shape"}))),
    ]
}

#[tokio::test]
async fn test_any_input_shape_yields_local_result() {
    let router = AnalysisRouter::local_only(AnalysisConfig::default());

    for (payload_name, payload) in payload_shapes() {
        for (meta_name, meta) in meta_shapes() {
            let result = router
                .analyze("ev_shape", payload.as_ref(), meta.as_ref())
                .await;
            assert!(
                result.is_well_formed(),
                "payload {} / meta {}: {:?}",
                payload_name,
                meta_name,
                result
            );
            assert_eq!(
                result.provider, LOCAL_HEURISTIC_PROVIDER,
                "payload {} / meta {}",
                payload_name, meta_name
            );
        }
    }
}

#[tokio::test]
async fn test_any_input_shape_reaches_remote_model() {
    for (payload_name, payload) in payload_shapes() {
        for (meta_name, meta) in meta_shapes() {
            let provider = MockLlmProvider::with_text_response(
                r#"{"analysis": "Shape handled", "suggestion": "Nothing to do"}"#,
            )
            .into_arc();
            let router = router_with(provider.clone(), config(&["gpt-4o-mini"], 1));

            let result = router
                .analyze("ev_shape", payload.as_ref(), meta.as_ref())
                .await;

            assert!(
                result.is_well_formed(),
                "payload {} / meta {}: {:?}",
                payload_name,
                meta_name,
                result
            );
            assert_eq!(
                result.provider, "gpt-4o-mini",
                "payload {} / meta {}",
                payload_name, meta_name
            );
            assert_eq!(result.analysis, "Shape handled");
            assert_eq!(provider.calls(), 1);
            assert!(provider.last_prompt().unwrap().contains("ev_shape"));
        }
    }
}

#[tokio::test]
async fn test_string_payload_is_classified() {
    let router = AnalysisRouter::local_only(AnalysisConfig::default());
    let payload = json!("connection timeout to upstream");

    let result = router.analyze("ev_str", Some(&payload), None).await;

    assert_eq!(result.provider, LOCAL_HEURISTIC_PROVIDER);
    assert!(result.suggestion.to_lowercase().contains("timeout"));
}

// ============================================================================
// Concurrency
// ============================================================================

#[tokio::test]
async fn test_router_is_shareable_across_tasks() {
    let router = Arc::new(AnalysisRouter::local_only(AnalysisConfig::default()));
    let handles: Vec<_> = (0..8)
        .map(|i| {
            let router = router.clone();
            tokio::spawn(async move {
                let payload = json!({"message": format!("p99 latency spike #{}", i)});
                router.analyze(&format!("ev_{}", i), Some(&payload), None).await
            })
        })
        .collect();

    for handle in handles {
        let result = handle.await.unwrap();
        assert_eq!(result.provider, LOCAL_HEURISTIC_PROVIDER);
        assert!(result.suggestion.contains("p95/p99"));
    }
}
