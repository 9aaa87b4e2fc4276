//! Core Error Types
//!
//! Defines the foundational error types shared across the Nexus workspace.
//! These error types are dependency-free (only thiserror + serde_json) to keep
//! the core crate lightweight.
//!
//! The application crate extends these with storage variants (Database,
//! Sqlite) that require heavier dependencies.

use thiserror::Error;

/// Core error type for the Nexus workspace.
#[derive(Error, Debug)]
pub enum CoreError {
    /// JSON serialization/deserialization errors
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Validation errors
    #[error("Validation error: {0}")]
    Validation(String),
}

/// Result type alias for core errors
pub type CoreResult<T> = Result<T, CoreError>;

impl CoreError {
    /// Create a validation error
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }
}

impl From<CoreError> for String {
    fn from(err: CoreError) -> String {
        err.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = CoreError::validation("tenant_id must not be blank");
        assert_eq!(err.to_string(), "Validation error: tenant_id must not be blank");
    }

    #[test]
    fn test_error_conversion() {
        let err = CoreError::validation("event id is required");
        let msg: String = err.into();
        assert!(msg.contains("Validation error"));
    }

    #[test]
    fn test_serde_error_conversion() {
        let serde_err = serde_json::from_str::<serde_json::Value>("{not json").unwrap_err();
        let core_err: CoreError = serde_err.into();
        assert!(matches!(core_err, CoreError::Serialization(_)));
    }
}
