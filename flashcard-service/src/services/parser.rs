//! Turns raw completion text into validated flashcards.
//!
//! Model output is untrusted: it is usually a JSON array, often wrapped in
//! a markdown code fence, and occasionally something else entirely. The
//! parser strips fencing, parses the remainder as JSON and checks every
//! element against the flashcard shape. Any element that does not fit
//! fails the whole parse; nothing is dropped or coerced.

use crate::error::GenerationError;
use crate::models::Flashcard;
use serde_json::{Map, Value};

const FENCE: &str = "```";

/// Remove a surrounding markdown code fence, if any.
///
/// The opening fence may be any run of three or more backticks followed by
/// an optional language tag (`json`, `JSON`, `jsonc`, ...). Text without
/// fences is returned trimmed and otherwise unchanged.
pub fn strip_code_fences(raw: &str) -> &str {
    let mut text = raw.trim();

    if text.starts_with(FENCE) {
        text = text.trim_start_matches('`');
        let tag_len = text
            .find(|c: char| !(c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | '+' | '.')))
            .unwrap_or(text.len());
        text = &text[tag_len..];
    }

    if text.ends_with(FENCE) {
        text = text.trim_end_matches('`');
    }

    text.trim()
}

/// Parse raw completion text into cards, preserving model order.
pub fn parse_flashcards(raw: &str) -> Result<Vec<Flashcard>, GenerationError> {
    let sanitized = strip_code_fences(raw);

    let value: Value =
        serde_json::from_str(sanitized).map_err(|e| GenerationError::MalformedResponse {
            reason: e.to_string(),
            text: sanitized.to_string(),
        })?;

    let items = match value {
        Value::Array(items) => items,
        other => {
            return Err(GenerationError::MalformedResponse {
                reason: format!("expected a JSON array, found {}", json_type(&other)),
                text: sanitized.to_string(),
            })
        }
    };

    items
        .iter()
        .enumerate()
        .map(|(index, item)| flashcard_from_value(index, item))
        .collect()
}

fn flashcard_from_value(index: usize, item: &Value) -> Result<Flashcard, GenerationError> {
    let object = item
        .as_object()
        .ok_or_else(|| GenerationError::SchemaViolation {
            index,
            reason: format!("expected an object, found {}", json_type(item)),
        })?;

    Ok(Flashcard {
        question: required_text(index, object, "question")?,
        answer: required_text(index, object, "answer")?,
    })
}

fn required_text(
    index: usize,
    object: &Map<String, Value>,
    field: &str,
) -> Result<String, GenerationError> {
    let violation = |reason: String| GenerationError::SchemaViolation { index, reason };

    match object.get(field) {
        None => Err(violation(format!("\"{}\" is missing", field))),
        Some(Value::String(s)) if s.trim().is_empty() => {
            Err(violation(format!("\"{}\" is empty", field)))
        }
        Some(Value::String(s)) => Ok(s.clone()),
        Some(other) => Err(violation(format!(
            "\"{}\" must be a string, found {}",
            field,
            json_type(other)
        ))),
    }
}

fn json_type(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
