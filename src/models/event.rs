//! Event Models
//!
//! Stored incident events and the suggestions produced for them.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use nexus_core::{CoreError, CoreResult, Event};

fn default_tenant() -> String {
    "demo".to_string()
}

fn default_service() -> String {
    "unknown".to_string()
}

fn default_event_type() -> String {
    "error".to_string()
}

/// Generate a prefixed identifier such as `ev_1a2b3c4d5e6f`.
pub fn generate_id(prefix: &str) -> String {
    let hex = uuid::Uuid::new_v4().simple().to_string();
    format!("{}_{}", prefix, &hex[..12])
}

/// Event submitted for ingestion.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct NewEvent {
    /// Caller-supplied id; generated when absent
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(default = "default_tenant")]
    pub tenant_id: String,
    #[serde(default = "default_service")]
    pub service: String,
    #[serde(default = "default_event_type", rename = "type")]
    pub event_type: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub trace_id: Option<String>,
    #[serde(default, alias = "meta", skip_serializing_if = "Option::is_none")]
    pub meta_info: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub payload: Option<Value>,
}

impl NewEvent {
    /// Reject events with blank identity columns.
    pub fn validate(&self) -> CoreResult<()> {
        if self.tenant_id.trim().is_empty() {
            return Err(CoreError::validation("tenant_id must not be empty"));
        }
        if self.service.trim().is_empty() {
            return Err(CoreError::validation("service must not be empty"));
        }
        if self.event_type.trim().is_empty() {
            return Err(CoreError::validation("type must not be empty"));
        }
        if matches!(&self.id, Some(id) if id.trim().is_empty()) {
            return Err(CoreError::validation("id must not be blank when supplied"));
        }
        Ok(())
    }
}

/// A persisted event row.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EventRecord {
    pub id: String,
    pub tenant_id: String,
    pub service: String,
    /// RFC 3339 ingestion time
    pub ts: String,
    #[serde(rename = "type")]
    pub event_type: String,
    pub trace_id: Option<String>,
    pub meta_info: Option<Value>,
    pub payload: Option<Value>,
    pub processed: bool,
}

impl EventRecord {
    /// Meta as seen by the analyzer: the stored meta plus the identity
    /// columns, so the trace id is always available for correlation.
    pub fn analysis_meta(&self) -> Value {
        let mut meta = match &self.meta_info {
            Some(Value::Object(map)) => map.clone(),
            Some(other) => {
                let mut map = serde_json::Map::new();
                map.insert("meta_info".to_string(), other.clone());
                map
            }
            None => serde_json::Map::new(),
        };
        meta.entry("tenant_id")
            .or_insert_with(|| Value::String(self.tenant_id.clone()));
        meta.entry("service")
            .or_insert_with(|| Value::String(self.service.clone()));
        meta.entry("type")
            .or_insert_with(|| Value::String(self.event_type.clone()));
        if let Some(trace_id) = &self.trace_id {
            meta.entry("trace_id")
                .or_insert_with(|| Value::String(trace_id.clone()));
        }
        Value::Object(meta)
    }

    pub fn to_event(&self) -> Event {
        let event = Event::new(self.id.clone()).with_meta(self.analysis_meta());
        match &self.payload {
            Some(payload) => event.with_payload(payload.clone()),
            None => event,
        }
    }
}

/// A persisted analysis result.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SuggestionRecord {
    pub id: String,
    pub event_id: String,
    pub created_at: String,
    pub analysis: String,
    pub suggestion: String,
    pub provider: String,
}
