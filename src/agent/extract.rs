//! Model Output Extraction
//!
//! Recovers a JSON payload from raw model text. Models rarely emit pure
//! JSON, so extraction is two-tier:
//!
//! 1. Strict parse of the full text. Preferred when it works, since it
//!    never truncates a legitimately nested final `}`.
//! 2. Greedy brace-span recovery: the substring from the first `{` to the
//!    last `}` inclusive, parsed strictly. Handles models that wrap the
//!    payload in prose.
//!
//! If both fail the output is malformed and the raw text is carried in the
//! error for caller-side debugging. No multi-object recovery is attempted.

use serde_json::Value;
use thiserror::Error;

/// Raised when no JSON object can be recovered from model output
#[derive(Debug, Error)]
#[error("Could not parse JSON from LLM output")]
pub struct MalformedOutput {
    /// The raw model text, for diagnostics
    pub raw: String,
}

/// Extract a JSON payload from `raw` model text.
pub fn extract_json(raw: &str) -> Result<Value, MalformedOutput> {
    if let Ok(value) = serde_json::from_str::<Value>(raw) {
        return Ok(value);
    }

    if let Some(span) = brace_span(raw) {
        if let Ok(value) = serde_json::from_str::<Value>(span) {
            return Ok(value);
        }
    }

    Err(MalformedOutput {
        raw: raw.to_string(),
    })
}

/// Substring from the first `{` to the last `}`, inclusive
fn brace_span(text: &str) -> Option<&str> {
    let start = text.find('{')?;
    let end = text.rfind('}')?;
    if end < start {
        return None;
    }
    Some(&text[start..=end])
}
