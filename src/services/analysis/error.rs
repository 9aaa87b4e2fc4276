//! Analysis Errors
//!
//! Internal failure taxonomy of the analysis pipeline. None of these ever
//! reaches a caller of `AnalysisRouter::analyze`; they drive fallback and
//! logging only.

use nexus_llm::LlmError;
use thiserror::Error;

#[derive(Error, Debug, Clone)]
pub enum AnalysisError {
    /// No credential or client configured for the remote provider
    #[error("remote provider unavailable: {0}")]
    ProviderUnavailable(String),

    /// Timeout, rate limit, 5xx or any other provider-side failure
    #[error("provider error: {0}")]
    TransientProvider(#[from] LlmError),

    /// The provider answered but yielded no usable analysis
    #[error("malformed response: {0}")]
    MalformedResponse(String),

    /// Anything else: prompt construction, serialization, panics
    #[error("unexpected internal error: {0}")]
    UnexpectedInternal(String),
}

impl AnalysisError {
    /// Short stable label for structured logs.
    pub fn kind(&self) -> &'static str {
        match self {
            AnalysisError::ProviderUnavailable(_) => "provider_unavailable",
            AnalysisError::TransientProvider(_) => "transient_provider",
            AnalysisError::MalformedResponse(_) => "malformed_response",
            AnalysisError::UnexpectedInternal(_) => "unexpected_internal",
        }
    }

    /// Whether the underlying provider error is likely to clear on retry.
    /// Logged only; every failure still consumes an attempt.
    pub fn is_transient(&self) -> bool {
        match self {
            AnalysisError::TransientProvider(e) => e.is_transient(),
            _ => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_llm_error_converts_to_transient() {
        let err: AnalysisError = LlmError::Timeout { seconds: 15 }.into();
        assert_eq!(err.kind(), "transient_provider");
        assert!(err.to_string().contains("Timed out after 15s"));
        assert!(err.is_transient());
    }

    #[test]
    fn test_kind_labels() {
        assert_eq!(
            AnalysisError::MalformedResponse("empty".into()).kind(),
            "malformed_response"
        );
        assert_eq!(
            AnalysisError::UnexpectedInternal("boom".into()).kind(),
            "unexpected_internal"
        );
        assert!(!AnalysisError::MalformedResponse("empty".into()).is_transient());
    }
}
