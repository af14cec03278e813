use std::sync::LazyLock;

use regex::Regex;
use serde_json::Value;

use super::types::RawModelOutput;
use super::TriageError;

/// Greedy first-`{` to last-`}` match across lines. Can misfire when the
/// text holds several objects; that is accepted behavior.
static JSON_OBJECT: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?s)\{.*\}").expect("json object pattern compiles"));

/// Longest excerpt of model text carried inside a parse error.
const ERROR_EXCERPT_CHARS: usize = 500;

/// Decode the model's answer into a JSON object.
///
/// The whole text is tried first; if it is not valid JSON, the first
/// brace-delimited span is salvaged from the surrounding prose.
pub fn extract_model_output(text: &str) -> Result<RawModelOutput, TriageError> {
    let value = match serde_json::from_str::<Value>(text.trim()) {
        Ok(value) => value,
        Err(_) => {
            let span = JSON_OBJECT
                .find(text)
                .ok_or_else(|| TriageError::MalformedResponse(excerpt(text)))?;
            serde_json::from_str::<Value>(span.as_str())
                .map_err(|e| TriageError::JsonParsing(e.to_string()))?
        }
    };

    match value {
        Value::Object(map) => Ok(map),
        other => Err(TriageError::MalformedResponse(format!(
            "expected a JSON object, got {}",
            json_kind(&other)
        ))),
    }
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

fn excerpt(text: &str) -> String {
    text.chars().take(ERROR_EXCERPT_CHARS).collect()
}
