//! Tolerant JSON decoding for model output and pasted resume JSON.

use serde::de::DeserializeOwned;
use tracing::debug;

/// Decodes `raw` as JSON, recovering from the usual wrappers around it.
///
/// Attempts, in order: the text as-is, the text with markdown code fences removed, and the span
/// from the first `{` to the last `}`. The error of the first attempt is returned when all fail.
pub fn decode_lenient<T: DeserializeOwned>(raw: &str) -> Result<T, serde_json::Error> {
    let first_error = match serde_json::from_str(raw) {
        Ok(value) => return Ok(value),
        Err(e) => e,
    };
    debug!("JSON decode failed ({first_error}), retrying without fences");

    let unfenced = strip_json_fences(raw);
    if let Ok(value) = serde_json::from_str(unfenced) {
        return Ok(value);
    }

    if let Some(object) = outermost_object(unfenced) {
        if let Ok(value) = serde_json::from_str(object) {
            return Ok(value);
        }
    }

    Err(first_error)
}

/// Strips ```json ... ``` or ``` ... ``` code fences from LLM output.
pub fn strip_json_fences(text: &str) -> &str {
    let text = text.trim();
    if let Some(stripped) = text.strip_prefix("```json") {
        stripped
            .trim_start()
            .strip_suffix("```")
            .map(|s| s.trim())
            .unwrap_or(stripped.trim_start())
    } else if let Some(stripped) = text.strip_prefix("```") {
        stripped
            .trim_start()
            .strip_suffix("```")
            .map(|s| s.trim())
            .unwrap_or(stripped.trim_start())
    } else {
        text
    }
}

fn outermost_object(text: &str) -> Option<&str> {
    let start = text.find('{')?;
    let end = text.rfind('}')?;
    (start < end).then(|| &text[start..=end])
}
