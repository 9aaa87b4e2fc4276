//! Prompt Building
//!
//! Turns an event into a bounded-size prompt. Payload and meta are previewed
//! independently, each capped to its own character budget, so a huge payload
//! cannot inflate token cost or call latency.

use serde_json::Value;

use crate::models::settings::{AnalysisConfig, PromptTemplate};

use super::error::AnalysisError;

/// A fully assembled prompt for one event.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AnalysisPrompt {
    /// System-role instruction
    pub system: String,
    /// User-role content
    pub user: String,
    /// Payload preview embedded in `user`
    pub payload_preview: Preview,
    /// Meta preview embedded in `user`
    pub meta_preview: Preview,
}

/// A possibly truncated text rendering of a JSON value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Preview {
    pub text: String,
    /// Character count before truncation
    pub original_chars: usize,
}

impl Preview {
    pub fn is_truncated(&self) -> bool {
        self.text.chars().count() < self.original_chars
    }
}

/// Render a JSON value for the prompt, keeping at most `max_chars` characters.
///
/// Strings are embedded raw; everything else is compact JSON. An absent value
/// renders as `(none)`.
pub fn json_preview(value: Option<&Value>, max_chars: usize) -> Result<Preview, AnalysisError> {
    let full = match value {
        None | Some(Value::Null) => "(none)".to_string(),
        Some(Value::String(s)) => s.clone(),
        Some(other) => serde_json::to_string(other)
            .map_err(|e| AnalysisError::UnexpectedInternal(format!("serialize preview: {}", e)))?,
    };

    let original_chars = full.chars().count();
    let text = if original_chars > max_chars {
        full.chars().take(max_chars).collect()
    } else {
        full
    };

    Ok(Preview {
        text,
        original_chars,
    })
}

/// Assemble the system and user messages for an event.
pub fn build_prompt(
    event_id: &str,
    payload: Option<&Value>,
    meta: Option<&Value>,
    config: &AnalysisConfig,
) -> Result<AnalysisPrompt, AnalysisError> {
    let payload_preview = json_preview(payload, config.payload_preview_chars)?;
    let meta_preview = json_preview(meta, config.meta_preview_chars)?;
    let user = render_user_message(event_id, &payload_preview, &meta_preview, &config.prompt);

    Ok(AnalysisPrompt {
        system: config.prompt.system.clone(),
        user,
        payload_preview,
        meta_preview,
    })
}

fn render_user_message(
    event_id: &str,
    payload: &Preview,
    meta: &Preview,
    template: &PromptTemplate,
) -> String {
    let mut lines = Vec::with_capacity(6);
    lines.push(format!("Event ID: {}", event_id));
    lines.push(format!("Meta: {}", meta.text));
    if meta.is_truncated() {
        lines.push(format!("(meta truncated from {} characters)", meta.original_chars));
    }
    lines.push(format!("Payload: {}", payload.text));
    if payload.is_truncated() {
        lines.push(format!(
            "(payload truncated from {} characters)",
            payload.original_chars
        ));
    }
    lines.push(String::new());
    lines.push(template.instructions.clone());
    lines.join("\n")
}
