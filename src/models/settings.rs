//! Settings Models
//!
//! Analysis and application configuration. Loaded once at startup, validated,
//! and never mutated afterwards.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use nexus_llm::DEFAULT_BASE_URL;

pub const DEFAULT_MODEL: &str = "gpt-4o-mini";

fn default_base_url() -> String {
    DEFAULT_BASE_URL.to_string()
}

fn default_models() -> Vec<String> {
    vec![DEFAULT_MODEL.to_string()]
}

/// Upper bounds keeping the worst-case remote latency small
pub const MAX_TIMEOUT_SECS: u64 = 120;
pub const MAX_RETRIES: u32 = 10;
pub const MAX_BACKOFF_BASE_MS: u64 = 30_000;

fn default_timeout_secs() -> u64 {
    15
}

fn default_max_retries() -> u32 {
    2
}

fn default_backoff_base_ms() -> u64 {
    1000
}

fn default_payload_preview_chars() -> usize {
    3000
}

fn default_meta_preview_chars() -> usize {
    2000
}

fn default_max_tokens() -> u32 {
    300
}

fn default_temperature() -> f32 {
    0.2
}

/// System prompt and response instructions sent with every event.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PromptTemplate {
    pub system: String,
    pub instructions: String,
}

impl Default for PromptTemplate {
    fn default() -> Self {
        Self {
            system: "You are a pragmatic site reliability engineer. Given an incident event, \
                     identify the most likely root cause and give concrete remediation steps."
                .to_string(),
            instructions: "Respond in JSON with keys: analysis (1-3 sentences), \
                           suggestion (1-5 concrete steps)."
                .to_string(),
        }
    }
}

/// Configuration of the analysis pipeline.
#[derive(Clone, Serialize, Deserialize)]
pub struct AnalysisConfig {
    /// Remote provider credential; absent or blank disables the remote path
    #[serde(default, skip_serializing)]
    pub api_key: Option<String>,
    #[serde(default = "default_base_url")]
    pub base_url: String,
    /// Model preference list, tried in order
    #[serde(default = "default_models")]
    pub models: Vec<String>,
    /// Per-attempt timeout
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
    /// Attempts per model
    #[serde(default = "default_max_retries")]
    pub max_retries: u32,
    #[serde(default = "default_backoff_base_ms")]
    pub backoff_base_ms: u64,
    #[serde(default = "default_payload_preview_chars")]
    pub payload_preview_chars: usize,
    #[serde(default = "default_meta_preview_chars")]
    pub meta_preview_chars: usize,
    #[serde(default = "default_max_tokens")]
    pub max_tokens: u32,
    #[serde(default = "default_temperature")]
    pub temperature: f32,
    #[serde(default)]
    pub prompt: PromptTemplate,
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            base_url: default_base_url(),
            models: default_models(),
            timeout_secs: default_timeout_secs(),
            max_retries: default_max_retries(),
            backoff_base_ms: default_backoff_base_ms(),
            payload_preview_chars: default_payload_preview_chars(),
            meta_preview_chars: default_meta_preview_chars(),
            max_tokens: default_max_tokens(),
            temperature: default_temperature(),
            prompt: PromptTemplate::default(),
        }
    }
}

impl std::fmt::Debug for AnalysisConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AnalysisConfig")
            .field("api_key", &self.api_key.as_ref().map(|_| "<redacted>"))
            .field("base_url", &self.base_url)
            .field("models", &self.models)
            .field("timeout_secs", &self.timeout_secs)
            .field("max_retries", &self.max_retries)
            .field("backoff_base_ms", &self.backoff_base_ms)
            .field("payload_preview_chars", &self.payload_preview_chars)
            .field("meta_preview_chars", &self.meta_preview_chars)
            .field("max_tokens", &self.max_tokens)
            .field("temperature", &self.temperature)
            .finish()
    }
}

impl AnalysisConfig {
    /// The credential, if one is set and non-blank.
    pub fn api_key(&self) -> Option<&str> {
        self.api_key
            .as_deref()
            .map(str::trim)
            .filter(|k| !k.is_empty())
    }

    pub fn has_api_key(&self) -> bool {
        self.api_key().is_some()
    }

    /// Non-empty model list with blanks removed.
    pub fn model_preferences(&self) -> Vec<String> {
        let models: Vec<String> = self
            .models
            .iter()
            .map(|m| m.trim())
            .filter(|m| !m.is_empty())
            .map(str::to_string)
            .collect();
        if models.is_empty() {
            default_models()
        } else {
            models
        }
    }

    /// First model in the preference list.
    pub fn primary_model(&self) -> String {
        self.model_preferences()
            .into_iter()
            .next()
            .unwrap_or_else(|| DEFAULT_MODEL.to_string())
    }

    /// Apply overrides from the process environment.
    pub fn apply_env(&mut self) {
        self.apply_env_from(|key| std::env::var(key).ok());
    }

    /// Apply overrides from an arbitrary variable lookup.
    ///
    /// Unparseable numeric values are ignored and leave the current value.
    pub fn apply_env_from<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(key) = lookup("OPENAI_API_KEY").filter(|k| !k.trim().is_empty()) {
            self.api_key = Some(key.trim().to_string());
        }
        if let Some(url) = lookup("OPENAI_BASE_URL").filter(|u| !u.trim().is_empty()) {
            self.base_url = url.trim().to_string();
        }
        if let Some(list) = lookup("OPENAI_MODELS") {
            self.models = list.split(',').map(|m| m.trim().to_string()).collect();
        } else if let Some(model) = lookup("OPENAI_MODEL") {
            self.models = vec![model.trim().to_string()];
        }
        if let Some(v) = parse_var(&lookup, "OPENAI_TIMEOUT") {
            self.timeout_secs = v;
        }
        if let Some(v) = parse_var(&lookup, "OPENAI_MAX_RETRIES") {
            self.max_retries = v;
        }
        if let Some(v) = parse_var(&lookup, "NEXUS_BACKOFF_BASE_MS") {
            self.backoff_base_ms = v;
        }
        if let Some(v) = parse_var(&lookup, "NEXUS_PAYLOAD_PREVIEW_CHARS") {
            self.payload_preview_chars = v;
        }
        if let Some(v) = parse_var(&lookup, "NEXUS_META_PREVIEW_CHARS") {
            self.meta_preview_chars = v;
        }
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<(), String> {
        if self.max_retries < 1 {
            return Err("max_retries must be at least 1".to_string());
        }
        if self.max_retries > MAX_RETRIES {
            return Err(format!("max_retries must be at most {}", MAX_RETRIES));
        }
        if self.timeout_secs < 1 {
            return Err("timeout_secs must be at least 1".to_string());
        }
        if self.timeout_secs > MAX_TIMEOUT_SECS {
            return Err(format!("timeout_secs must be at most {}", MAX_TIMEOUT_SECS));
        }
        if self.backoff_base_ms > MAX_BACKOFF_BASE_MS {
            return Err(format!(
                "backoff_base_ms must be at most {}",
                MAX_BACKOFF_BASE_MS
            ));
        }
        if self.payload_preview_chars < 1 || self.meta_preview_chars < 1 {
            return Err("preview caps must be at least 1 character".to_string());
        }
        if !(0.0..=2.0).contains(&self.temperature) {
            return Err(format!(
                "Invalid temperature: {}. Must be between 0.0 and 2.0",
                self.temperature
            ));
        }
        if self.max_tokens == 0 {
            return Err("max_tokens must be positive".to_string());
        }
        if !self.base_url.starts_with("http://") && !self.base_url.starts_with("https://") {
            return Err(format!("Invalid base_url: {}", self.base_url));
        }
        Ok(())
    }
}

fn parse_var<T, F>(lookup: &F, key: &str) -> Option<T>
where
    T: std::str::FromStr,
    F: Fn(&str) -> Option<String>,
{
    lookup(key).and_then(|raw| raw.trim().parse().ok())
}

/// Application settings stored in config.json
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppSettings {
    #[serde(default)]
    pub analysis: AnalysisConfig,
    /// SQLite file; `None` resolves to the default under the app directory
    #[serde(default)]
    pub database_path: Option<PathBuf>,
}

impl AppSettings {
    pub fn apply_env_from<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(path) = lookup("NEXUS_DATABASE_PATH").filter(|p| !p.trim().is_empty()) {
            self.database_path = Some(PathBuf::from(path.trim()));
        }
        self.analysis.apply_env_from(lookup);
    }

    pub fn validate(&self) -> Result<(), String> {
        self.analysis.validate()
    }
}
