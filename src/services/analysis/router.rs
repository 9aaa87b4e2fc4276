//! Analysis Router
//!
//! The single public entry point of incident analysis. `analyze` always
//! returns a well-formed `AnalysisResult` and never panics or errors:
//!
//! 1. No usable remote provider: the local heuristic answers directly.
//! 2. Otherwise a bounded prompt goes to the remote client.
//! 3. Remote failure of any kind falls through to the heuristic.
//! 4. Anything unexpected (including panics) yields a minimal safe result.
//!
//! The `provider` field of the result tells callers which tier answered.

use std::panic::AssertUnwindSafe;
use std::sync::Arc;
use std::time::Duration;

use futures_util::FutureExt;
use serde_json::Value;
use tracing::{debug, error, info, warn};

use nexus_core::{find_correlation_id, AnalysisResult, Event};
use nexus_llm::{LlmProvider, OpenAIProvider, ProviderConfig};

use crate::models::settings::AnalysisConfig;

use super::error::AnalysisError;
use super::heuristic::{HeuristicRule, LocalHeuristicAnalyzer};
use super::prompt::build_prompt;
use super::remote::RemoteAnalysisClient;

const BACKSTOP_ANALYSIS: &str = "Local heuristic used: an unexpected error occurred during analysis.";
const BACKSTOP_SUGGESTION: &str =
    "Inspect the application logs for the analysis error, then retry the request.";

/// Attempt-then-fallback orchestrator.
///
/// Holds only immutable configuration, so one instance can be shared behind
/// an `Arc` by any number of concurrent callers.
pub struct AnalysisRouter {
    config: Arc<AnalysisConfig>,
    remote: Option<RemoteAnalysisClient>,
    heuristic: LocalHeuristicAnalyzer,
}

impl AnalysisRouter {
    /// Build a router from configuration.
    ///
    /// The OpenAI provider is created only when an API key is configured; a
    /// failure to build its HTTP client leaves the router heuristic-only.
    pub fn from_config(config: AnalysisConfig) -> Self {
        let provider = match config.api_key() {
            Some(key) => {
                let provider_config = ProviderConfig {
                    api_key: Some(key.to_string()),
                    base_url: Some(config.base_url.clone()),
                    model: config.primary_model(),
                    max_tokens: config.max_tokens,
                    temperature: config.temperature,
                    timeout_secs: config.timeout_secs,
                };
                match OpenAIProvider::new(provider_config) {
                    Ok(p) => Some(Arc::new(p) as Arc<dyn LlmProvider>),
                    Err(e) => {
                        warn!(error = %e, "remote provider disabled");
                        None
                    }
                }
            }
            None => None,
        };
        Self::new(config, provider)
    }

    /// Build a router around an explicit provider (or none).
    pub fn new(config: AnalysisConfig, provider: Option<Arc<dyn LlmProvider>>) -> Self {
        let remote = provider.map(|p| RemoteAnalysisClient::new(p, &config));
        Self {
            config: Arc::new(config),
            remote,
            heuristic: LocalHeuristicAnalyzer::new(),
        }
    }

    /// Router that never leaves the process.
    pub fn local_only(config: AnalysisConfig) -> Self {
        Self::new(config, None)
    }

    pub fn config(&self) -> &AnalysisConfig {
        &self.config
    }

    /// Whether `analyze` will attempt the remote provider at all.
    pub fn remote_enabled(&self) -> bool {
        self.remote.as_ref().is_some_and(|r| r.is_available())
    }

    /// Models the remote path would try, in order; empty when disabled.
    pub fn model_preferences(&self) -> Vec<String> {
        match &self.remote {
            Some(remote) if remote.is_available() => remote.models().to_vec(),
            _ => Vec::new(),
        }
    }

    /// Upper bound on how long `analyze` can take.
    pub fn latency_budget(&self) -> Duration {
        match &self.remote {
            Some(remote) if remote.is_available() => remote.latency_budget(),
            _ => Duration::ZERO,
        }
    }

    /// Analyze an event. Never fails.
    pub async fn analyze_event(&self, event: &Event) -> AnalysisResult {
        self.analyze(&event.id, event.payload.as_ref(), event.meta.as_ref())
            .await
    }

    /// Analyze an event given as its parts. Never fails.
    pub async fn analyze(
        &self,
        event_id: &str,
        payload: Option<&Value>,
        meta: Option<&Value>,
    ) -> AnalysisResult {
        let outcome = AssertUnwindSafe(self.analyze_inner(event_id, payload, meta))
            .catch_unwind()
            .await;

        match outcome {
            Ok(Ok(result)) if result.is_well_formed() => {
                info!(event_id, provider = %result.provider, "analysis served");
                result
            }
            Ok(Ok(result)) => {
                error!(event_id, provider = %result.provider, "analysis produced blank fields");
                Self::backstop()
            }
            Ok(Err(e)) => {
                error!(event_id, kind = e.kind(), error = %e, "analysis failed unexpectedly");
                Self::backstop()
            }
            Err(_) => {
                error!(event_id, "analysis panicked");
                Self::backstop()
            }
        }
    }

    async fn analyze_inner(
        &self,
        event_id: &str,
        payload: Option<&Value>,
        meta: Option<&Value>,
    ) -> Result<AnalysisResult, AnalysisError> {
        let remote = match &self.remote {
            Some(remote) if remote.is_available() => remote,
            _ => {
                debug!(event_id, "remote provider not configured, using local heuristic");
                return Ok(self.local(payload, meta));
            }
        };

        let prompt = build_prompt(event_id, payload, meta, &self.config)?;
        if prompt.payload_preview.is_truncated() {
            debug!(
                event_id,
                original_chars = prompt.payload_preview.original_chars,
                "payload preview truncated"
            );
        }

        match remote.try_call(&prompt).await {
            Ok(completion) => {
                if !completion.structured {
                    debug!(event_id, model = %completion.model, "model answered without JSON");
                }
                Ok(AnalysisResult::new(
                    completion.analysis,
                    completion.suggestion,
                    completion.model,
                ))
            }
            Err(failure) => {
                warn!(
                    event_id,
                    attempts = failure.attempts.len(),
                    kind = failure.last_error.kind(),
                    error = %failure.last_error,
                    "remote analysis failed, falling back to local heuristic"
                );
                Ok(self.local(payload, meta))
            }
        }
    }

    /// Heuristic answer, pointing at the correlation id when one is known.
    fn local(&self, payload: Option<&Value>, meta: Option<&Value>) -> AnalysisResult {
        let verdict = self.heuristic.classify(payload);
        let mut result = verdict.into_result();
        if verdict.rule == HeuristicRule::Generic {
            if let Some(id) = find_correlation_id(meta, payload) {
                result.suggestion = format!("{} Correlation id: {}.", result.suggestion, id);
            }
        }
        result
    }

    fn backstop() -> AnalysisResult {
        AnalysisResult::local(BACKSTOP_ANALYSIS, BACKSTOP_SUGGESTION)
    }
}
