// Output coercion: untrusted model JSON → strict TriageResult.
// Never fails. Unrecognized or malformed content degrades to documented defaults.

use serde_json::{Map, Value};

use super::classify::{normalize_priority, normalize_profile};
use super::types::{RawModelOutput, SourceRef, TriageResult};
use super::vitals::{parse_number, scalar_text};
use super::TriageError;

/// Confidence used when the model gives none or an unreadable one.
pub const DEFAULT_CONFIDENCE: f64 = 0.7;

/// Coerce a decoded model answer into the strict triage contract.
pub fn coerce_triage_output(raw: &RawModelOutput) -> TriageResult {
    TriageResult {
        priority: normalize_priority(raw.get("priority")),
        reason: raw.get("reason").map(value_text).unwrap_or_default(),
        hint_for_doctor: raw.get("hint_for_doctor").map(value_text),
        profile: normalize_profile(raw.get("profile")),
        confidence: normalize_confidence(raw.get("confidence")),
        red_flags: normalize_red_flags(raw.get("red_flags")),
        sources: normalize_sources(raw.get("sources")),
    }
}

/// Parse as a float (comma decimal accepted), default 0.7, clamp into [0, 1].
pub fn normalize_confidence(value: Option<&Value>) -> f64 {
    parse_number(value)
        .unwrap_or(DEFAULT_CONFIDENCE)
        .clamp(0.0, 1.0)
}

/// Scalar → one-element list, array → every element as text, anything else → empty.
/// Null and blank entries carry no flag and are dropped.
pub fn normalize_red_flags(value: Option<&Value>) -> Vec<String> {
    match value {
        Some(Value::Array(items)) => items
            .iter()
            .map(value_text)
            .filter(|flag| !flag.trim().is_empty())
            .collect(),
        Some(v @ (Value::String(_) | Value::Number(_) | Value::Bool(_))) => Some(value_text(v))
            .filter(|flag| !flag.trim().is_empty())
            .into_iter()
            .collect(),
        _ => Vec::new(),
    }
}

/// Keep well-formed source entries, drop the rest individually.
pub fn normalize_sources(value: Option<&Value>) -> Vec<SourceRef> {
    let Some(Value::Array(entries)) = value else {
        return Vec::new();
    };

    let sources: Vec<SourceRef> = entries.iter().filter_map(parse_source).collect();

    let dropped = entries.len() - sources.len();
    if dropped > 0 {
        tracing::debug!(dropped, kept = sources.len(), "Dropped malformed source references");
    }
    sources
}

fn parse_source(entry: &Value) -> Option<SourceRef> {
    let obj = entry.as_object()?;
    let id = obj
        .get("id")
        .and_then(scalar_text)
        .filter(|id| !id.trim().is_empty())?;

    Some(SourceRef {
        id,
        section: optional_text(obj, "section"),
        version_date: optional_text(obj, "version_date"),
    })
}

/// Null, missing and empty string are all "absent".
fn optional_text(obj: &Map<String, Value>, key: &str) -> Option<String> {
    match obj.get(key) {
        None | Some(Value::Null) => None,
        Some(v) => Some(value_text(v)).filter(|s| !s.is_empty()),
    }
}

/// Text form of any JSON value. Strings are unquoted, null is empty,
/// arrays and objects are compact JSON.
pub fn value_text(value: &Value) -> String {
    match value {
        Value::Null => String::new(),
        Value::Array(_) | Value::Object(_) => value.to_string(),
        scalar => scalar_text(scalar).unwrap_or_default(),
    }
}

/// Defensive double-check of a coerced result. Cannot fail on output of
/// `coerce_triage_output`; enum membership is guaranteed by the type.
pub fn check_schema(result: &TriageResult) -> Result<(), TriageError> {
    if !result.confidence.is_finite() || !(0.0..=1.0).contains(&result.confidence) {
        return Err(TriageError::Schema(format!(
            "confidence {} outside [0, 1]",
            result.confidence
        )));
    }
    if let Some(pos) = result.sources.iter().position(|s| s.id.trim().is_empty()) {
        return Err(TriageError::Schema(format!("source #{pos} has an empty id")));
    }
    Ok(())
}
