//! Event Types
//!
//! The ingested incident/error record as seen by the analysis subsystem.
//! Payload and meta are opaque JSON; nothing here validates their shape.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// An ingested incident/error event.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Event {
    /// Opaque unique identifier assigned at ingestion
    pub id: String,
    /// Unstructured event attributes
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub payload: Option<Value>,
    /// Contextual tags (service name, tenant, trace id)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub meta: Option<Value>,
}

impl Event {
    /// Create an event with no payload or meta.
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            payload: None,
            meta: None,
        }
    }

    /// Attach a payload.
    pub fn with_payload(mut self, payload: Value) -> Self {
        self.payload = Some(payload);
        self
    }

    /// Attach meta tags.
    pub fn with_meta(mut self, meta: Value) -> Self {
        self.meta = Some(meta);
        self
    }

    /// Look up a correlation identifier in meta, then payload.
    pub fn correlation_id(&self) -> Option<&str> {
        find_correlation_id(self.meta.as_ref(), self.payload.as_ref())
    }
}

/// Find a correlation identifier in meta, then payload.
///
/// Recognizes `trace_id`, `traceId`, `correlation_id` and `correlationId`
/// at the top level of either object.
pub fn find_correlation_id<'a>(meta: Option<&'a Value>, payload: Option<&'a Value>) -> Option<&'a str> {
    const KEYS: [&str; 4] = ["trace_id", "traceId", "correlation_id", "correlationId"];
    [meta, payload]
        .into_iter()
        .flatten()
        .filter_map(Value::as_object)
        .find_map(|obj| KEYS.iter().find_map(|k| obj.get(*k).and_then(Value::as_str)))
}
