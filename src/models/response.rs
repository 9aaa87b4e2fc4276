//! Response Types
//!
//! Standard response types for all commands.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Generic command response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CommandResponse<T> {
    pub success: bool,
    pub data: Option<T>,
    pub error: Option<String>,
}

impl<T> CommandResponse<T> {
    /// Create a successful response with data
    pub fn ok(data: T) -> Self {
        Self {
            success: true,
            data: Some(data),
            error: None,
        }
    }

    /// Create an error response with message
    pub fn err(message: impl Into<String>) -> Self {
        Self {
            success: false,
            data: None,
            error: Some(message.into()),
        }
    }
}

impl<T> From<Result<T, crate::utils::error::AppError>> for CommandResponse<T> {
    fn from(result: Result<T, crate::utils::error::AppError>) -> Self {
        match result {
            Ok(data) => Self::ok(data),
            Err(e) => Self::err(e.to_string()),
        }
    }
}

/// Liveness check response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    pub ok: bool,
    pub version: String,
}

impl Default for HealthResponse {
    fn default() -> Self {
        Self {
            ok: true,
            version: env!("CARGO_PKG_VERSION").to_string(),
        }
    }
}

/// Readiness/status response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StatusResponse {
    pub ok: bool,
    /// "ok" or "down"
    pub database: String,
    /// "configured" or "disabled"
    pub remote_ai: String,
    /// Model preference list when the remote path is configured
    pub models: Vec<String>,
    pub version: String,
}

/// Suggestion request body.
///
/// The event id may arrive under any of `event_id`, `eventId` or `id`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SuggestRequest {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub event_id: Option<String>,
    #[serde(default, rename = "eventId", skip_serializing_if = "Option::is_none")]
    pub event_id_camel: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
}

impl SuggestRequest {
    pub fn for_event(event_id: impl Into<String>) -> Self {
        Self {
            event_id: Some(event_id.into()),
            ..Default::default()
        }
    }

    /// Build from an arbitrary JSON body. Non-object bodies carry no id.
    pub fn from_value(body: &Value) -> Self {
        let field = |key: &str| {
            body.get(key).and_then(|v| match v {
                Value::String(s) => Some(s.clone()),
                Value::Number(n) => Some(n.to_string()),
                _ => None,
            })
        };
        Self {
            event_id: field("event_id"),
            event_id_camel: field("eventId"),
            id: field("id"),
        }
    }

    /// First non-blank of `event_id`, `eventId`, `id`.
    pub fn resolved_event_id(&self) -> Option<&str> {
        [&self.event_id, &self.event_id_camel, &self.id]
            .into_iter()
            .filter_map(|v| v.as_deref())
            .map(str::trim)
            .find(|v| !v.is_empty())
    }
}

/// Suggestion response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SuggestResponse {
    pub event_id: String,
    pub analysis: String,
    pub suggestion: String,
    pub provider: String,
    /// Id of the stored suggestion row; `None` when persistence failed
    pub suggestion_id: Option<String>,
}

/// Result of creating an event
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IngestResponse {
    pub ok: bool,
    pub event_id: String,
}
