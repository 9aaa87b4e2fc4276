//! Remote Analysis Client
//!
//! Walks the model-preference list against the remote provider. Each model
//! gets its own full retry budget; every attempt is bounded by the per-call
//! timeout; attempts within a model are separated by a non-decreasing,
//! jittered backoff. No provider error or panic escapes `try_call`.

use std::panic::AssertUnwindSafe;
use std::sync::Arc;
use std::time::{Duration, Instant};

use futures_util::FutureExt;
use rand::Rng;
use serde::Serialize;
use tracing::{debug, warn};

use nexus_llm::{LlmError, LlmProvider, LlmRequestOptions, Message};

use crate::models::settings::AnalysisConfig;

use super::error::AnalysisError;
use super::prompt::AnalysisPrompt;
use super::response::{parse_completion, ParsedCompletion};

/// Retry and timeout parameters for one `try_call`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Attempts per model
    pub max_retries: u32,
    /// Bound on each individual provider call
    pub attempt_timeout: Duration,
    /// Delay after the first failed attempt; doubles afterwards
    pub backoff_base: Duration,
}

impl RetryPolicy {
    pub fn from_config(config: &AnalysisConfig) -> Self {
        Self {
            max_retries: config.max_retries.max(1),
            attempt_timeout: Duration::from_secs(config.timeout_secs.max(1)),
            backoff_base: Duration::from_millis(config.backoff_base_ms),
        }
    }

    /// Worst-case wall time across `models` models, ignoring jitter.
    /// Saturates instead of overflowing.
    pub fn latency_budget(&self, models: usize) -> Duration {
        let per_model_calls = self.attempt_timeout.saturating_mul(self.max_retries);
        let per_model = (1..self.max_retries)
            .map(|n| backoff_delay(self.backoff_base, n, 0.0))
            .fold(per_model_calls, Duration::saturating_add);
        per_model.saturating_mul(u32::try_from(models).unwrap_or(u32::MAX))
    }
}

/// Delay before the next attempt after `failed_attempt` (1-based) failed.
///
/// `base * 2^(failed_attempt - 1)`, stretched by `jitter` (clamped to
/// `[0, 0.5)`). Doubling dominates any jitter in that range, so the sequence is
/// non-decreasing for every jitter draw.
pub fn backoff_delay(base: Duration, failed_attempt: u32, jitter: f64) -> Duration {
    let exponent = failed_attempt.saturating_sub(1).min(16);
    let step = base.saturating_mul(1u32 << exponent);
    let factor = 1.0 + jitter.clamp(0.0, 0.49);
    Duration::try_from_secs_f64(step.as_secs_f64() * factor).unwrap_or(Duration::MAX)
}

fn draw_jitter() -> f64 {
    rand::thread_rng().gen_range(0.0..0.1)
}

/// Record of a single provider call.
#[derive(Debug, Clone, Serialize)]
pub struct AttemptRecord {
    pub model: String,
    /// 1-based attempt number within this model
    pub attempt: u32,
    pub error: Option<String>,
    pub duration_ms: u64,
    /// Sleep taken after this attempt before retrying the same model
    pub backoff_ms: Option<u64>,
}

/// Successful remote analysis.
#[derive(Debug, Clone)]
pub struct RemoteCompletion {
    pub analysis: String,
    pub suggestion: String,
    /// Model that produced the answer
    pub model: String,
    pub structured: bool,
    pub attempts: Vec<AttemptRecord>,
}

/// Every model and attempt failed.
#[derive(Debug, Clone)]
pub struct RemoteFailure {
    pub last_error: AnalysisError,
    pub attempts: Vec<AttemptRecord>,
}

/// Client that turns a prompt into an analysis via the remote provider.
pub struct RemoteAnalysisClient {
    provider: Arc<dyn LlmProvider>,
    models: Vec<String>,
    policy: RetryPolicy,
    max_tokens: u32,
    temperature: f32,
}

impl RemoteAnalysisClient {
    pub fn new(provider: Arc<dyn LlmProvider>, config: &AnalysisConfig) -> Self {
        Self {
            provider,
            models: config.model_preferences(),
            policy: RetryPolicy::from_config(config),
            max_tokens: config.max_tokens,
            temperature: config.temperature,
        }
    }

    /// Whether the provider has a credential to call with.
    pub fn is_available(&self) -> bool {
        self.provider.has_credentials()
    }

    pub fn models(&self) -> &[String] {
        &self.models
    }

    /// Worst-case wall time of one `try_call`, ignoring jitter.
    pub fn latency_budget(&self) -> Duration {
        self.policy.latency_budget(self.models.len())
    }

    /// Try every model in preference order until one yields a usable analysis.
    pub async fn try_call(&self, prompt: &AnalysisPrompt) -> Result<RemoteCompletion, RemoteFailure> {
        if !self.is_available() {
            return Err(RemoteFailure {
                last_error: AnalysisError::ProviderUnavailable(format!(
                    "{} has no credential",
                    self.provider.name()
                )),
                attempts: Vec::new(),
            });
        }

        let mut attempts = Vec::new();
        let mut last_error =
            AnalysisError::ProviderUnavailable("model preference list is empty".to_string());

        for model in &self.models {
            for attempt in 1..=self.policy.max_retries {
                let started = Instant::now();
                let outcome = self.attempt_once(model, prompt).await;
                let duration_ms = started.elapsed().as_millis() as u64;

                match outcome {
                    Ok(parsed) => {
                        attempts.push(AttemptRecord {
                            model: model.clone(),
                            attempt,
                            error: None,
                            duration_ms,
                            backoff_ms: None,
                        });
                        debug!(
                            model = %model,
                            attempt,
                            structured = parsed.structured,
                            "remote analysis succeeded"
                        );
                        return Ok(RemoteCompletion {
                            analysis: parsed.analysis,
                            suggestion: parsed.suggestion,
                            model: model.clone(),
                            structured: parsed.structured,
                            attempts,
                        });
                    }
                    Err(err) => {
                        let backoff = (attempt < self.policy.max_retries)
                            .then(|| backoff_delay(self.policy.backoff_base, attempt, draw_jitter()));

                        warn!(
                            model = %model,
                            attempt,
                            kind = err.kind(),
                            transient = err.is_transient(),
                            error = %err,
                            backoff = ?backoff,
                            "remote analysis attempt failed"
                        );

                        attempts.push(AttemptRecord {
                            model: model.clone(),
                            attempt,
                            error: Some(err.to_string()),
                            duration_ms,
                            backoff_ms: backoff.map(|d| d.as_millis() as u64),
                        });
                        last_error = err;

                        if let Some(delay) = backoff {
                            tokio::time::sleep(delay).await;
                        }
                    }
                }
            }
            debug!(model = %model, "retry budget exhausted, advancing to next model");
        }

        Err(RemoteFailure {
            last_error,
            attempts,
        })
    }

    /// One bounded provider call, with timeout and panic isolation.
    async fn attempt_once(
        &self,
        model: &str,
        prompt: &AnalysisPrompt,
    ) -> Result<ParsedCompletion, AnalysisError> {
        let options = LlmRequestOptions {
            model_override: Some(model.to_string()),
            temperature_override: Some(self.temperature),
            max_tokens_override: Some(self.max_tokens),
            timeout_override_secs: Some(self.policy.attempt_timeout.as_secs()),
        };
        let call = self.provider.send_message(
            vec![Message::user(prompt.user.clone())],
            Some(prompt.system.clone()),
            options,
        );

        let guarded = AssertUnwindSafe(call).catch_unwind();
        let response = match tokio::time::timeout(self.policy.attempt_timeout, guarded).await {
            Err(_) => {
                return Err(LlmError::Timeout {
                    seconds: self.policy.attempt_timeout.as_secs(),
                }
                .into())
            }
            Ok(Err(_panic)) => {
                return Err(AnalysisError::UnexpectedInternal(format!(
                    "provider {} panicked",
                    self.provider.name()
                )))
            }
            Ok(Ok(result)) => result?,
        };

        let text = response.text_content().ok_or_else(|| {
            AnalysisError::MalformedResponse(format!(
                "{} returned no text (stop reason {:?})",
                response.model, response.stop_reason
            ))
        })?;

        parse_completion(text)
    }
}
