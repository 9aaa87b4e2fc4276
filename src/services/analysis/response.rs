//! Completion Parsing
//!
//! Tolerant extraction of `{analysis, suggestion}` from free model text.
//! The model may answer with bare JSON, JSON wrapped in prose or markdown
//! fences, or plain prose. Field names are matched against a fixed synonym
//! list; anything unparseable falls back to the raw text exactly once.

use serde_json::{Map, Value};

use super::error::AnalysisError;

/// Keys accepted for the root-cause summary, in preference order.
pub const ANALYSIS_KEYS: &[&str] = &["analysis", "explanation", "root_cause", "rootCause"];

/// Keys accepted for the remediation, in preference order.
pub const SUGGESTION_KEYS: &[&str] = &[
    "suggestion",
    "suggestions",
    "advice",
    "recommendation",
    "recommendations",
    "remediation",
];

/// Analysis and suggestion pulled out of a completion.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedCompletion {
    pub analysis: String,
    pub suggestion: String,
    /// False when the raw text was used because no JSON object was found.
    /// Downstream consumers may want to treat such text as unstructured.
    pub structured: bool,
}

/// Slice from the first `{` to the last `}`, if that forms a range.
pub fn extract_json_object(text: &str) -> Option<&str> {
    let start = text.find('{')?;
    let end = text.rfind('}')?;
    (start < end).then(|| &text[start..=end])
}

/// Parse model output into analysis and suggestion.
///
/// Fails with `MalformedResponse` only when the text is blank.
pub fn parse_completion(text: &str) -> Result<ParsedCompletion, AnalysisError> {
    let raw = text.trim();
    if raw.is_empty() {
        return Err(AnalysisError::MalformedResponse(
            "completion contained no text".to_string(),
        ));
    }

    let object = extract_json_object(raw)
        .and_then(|candidate| serde_json::from_str::<Value>(candidate).ok())
        .and_then(|value| match value {
            Value::Object(map) => Some(map),
            _ => None,
        });

    let Some(map) = object else {
        return Ok(ParsedCompletion {
            analysis: raw.to_string(),
            suggestion: raw.to_string(),
            structured: false,
        });
    };

    // A JSON object without any recognized analysis key still carries
    // information; keep the whole text rather than dropping it.
    let analysis = pick_field(&map, ANALYSIS_KEYS).unwrap_or_else(|| raw.to_string());
    let suggestion = pick_field(&map, SUGGESTION_KEYS).unwrap_or_else(|| analysis.clone());

    Ok(ParsedCompletion {
        analysis,
        suggestion,
        structured: true,
    })
}

/// First synonym whose value renders to non-blank text.
fn pick_field(map: &Map<String, Value>, keys: &[&str]) -> Option<String> {
    keys.iter()
        .filter_map(|k| map.get(*k))
        .filter_map(render_value)
        .find(|s| !s.is_empty())
}

/// Render a field value as text. Lists become `; `-joined steps.
fn render_value(value: &Value) -> Option<String> {
    match value {
        Value::Null => None,
        Value::String(s) => Some(s.trim().to_string()),
        Value::Array(items) => {
            let parts: Vec<String> = items
                .iter()
                .filter_map(render_value)
                .filter(|s| !s.is_empty())
                .collect();
            (!parts.is_empty()).then(|| parts.join("; "))
        }
        other => Some(other.to_string()),
    }
}
