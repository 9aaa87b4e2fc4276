//! Analysis Result
//!
//! The value object every analysis path produces. The `provider` field is the
//! caller-visible signal of which tier served the request.

use serde::{Deserialize, Serialize};

/// Provider tag used whenever the deterministic fallback produced the result.
pub const LOCAL_HEURISTIC_PROVIDER: &str = "local-heuristic";

/// Root-cause analysis plus remediation for one event.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnalysisResult {
    /// 1-3 sentence root-cause summary
    pub analysis: String,
    /// 1-5 remediation steps, possibly a delimited list
    pub suggestion: String,
    /// Remote model identifier, or `local-heuristic`
    pub provider: String,
}

impl AnalysisResult {
    /// Create a result from any string-like parts.
    pub fn new(
        analysis: impl Into<String>,
        suggestion: impl Into<String>,
        provider: impl Into<String>,
    ) -> Self {
        Self {
            analysis: analysis.into(),
            suggestion: suggestion.into(),
            provider: provider.into(),
        }
    }

    /// Create a result tagged with the local heuristic provider.
    pub fn local(analysis: impl Into<String>, suggestion: impl Into<String>) -> Self {
        Self::new(analysis, suggestion, LOCAL_HEURISTIC_PROVIDER)
    }

    /// True when the local heuristic served this result.
    pub fn is_fallback(&self) -> bool {
        self.provider == LOCAL_HEURISTIC_PROVIDER
    }

    /// All three fields carry non-blank text.
    pub fn is_well_formed(&self) -> bool {
        !self.analysis.trim().is_empty()
            && !self.suggestion.trim().is_empty()
            && !self.provider.trim().is_empty()
    }
}
