//! Best-effort recovery of a JSON document from free-form model output.
//!
//! Models are asked for bare JSON but regularly wrap it in markdown fences or
//! chatty prose. [`parse_llm_response`] tries increasingly permissive
//! extractions and returns the first one that decodes.

use regex::Regex;
use serde_json::Value as JsonValue;
use std::sync::OnceLock;

#[derive(Debug, thiserror::Error)]
pub enum ParseError {
    #[error("Could not parse valid JSON from response")]
    Unrecoverable,

    #[error("expected a JSON object, got {0}")]
    NotAnObject(&'static str),
}

fn fenced_block() -> &'static Regex {
    static FENCE: OnceLock<Regex> = OnceLock::new();
    FENCE.get_or_init(|| {
        Regex::new(r"(?s)```(?:json|JSON)?\s*(.*?)\s*```").expect("fence pattern is valid")
    })
}

pub fn parse_llm_response(raw: &str) -> Result<JsonValue, ParseError> {
    if let Ok(value) = serde_json::from_str(raw.trim()) {
        return Ok(value);
    }

    if let Some(value) = fenced_json(raw) {
        return Ok(value);
    }

    if let Some(value) = first_balanced_object(raw) {
        return Ok(value);
    }

    Err(ParseError::Unrecoverable)
}

fn fenced_json(raw: &str) -> Option<JsonValue> {
    let captures = fenced_block().captures(raw)?;
    serde_json::from_str(captures.get(1)?.as_str()).ok()
}

/// Decodes the span from the first `{` to its matching `}`. Braces inside
/// string literals are counted like any other.
fn first_balanced_object(raw: &str) -> Option<JsonValue> {
    let start = raw.find('{')?;
    let mut depth = 0usize;
    for (offset, ch) in raw[start..].char_indices() {
        match ch {
            '{' => depth += 1,
            '}' => {
                depth -= 1;
                if depth == 0 {
                    let end = start + offset + ch.len_utf8();
                    return serde_json::from_str(&raw[start..end]).ok();
                }
            }
            _ => {}
        }
    }
    None
}
