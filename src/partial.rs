//! Lenient decoding of half-streamed turn content.
//!
//! The completion service delivers the turn object as raw JSON text chunks.
//! After every chunk the accumulated buffer is an arbitrary prefix of a valid
//! document; these helpers repair such a prefix into something parseable so
//! the session can project live snapshots before the stream finishes.

use serde::Deserialize;
use serde_json::Value;

/// Balances an unterminated JSON prefix by closing the open string and any
/// open braces and brackets. Returns `None` when the input is not a prefix of
/// a JSON object (wrong opener, mismatched close).
pub fn complete_json(src: &str) -> Option<String> {
    let trimmed = src.trim_start();
    if !trimmed.starts_with('{') {
        return None;
    }

    let mut stack: Vec<char> = Vec::new();
    let mut in_string = false;
    let mut escaped = false;
    for ch in trimmed.chars() {
        if in_string {
            if escaped {
                escaped = false;
            } else if ch == '\\' {
                escaped = true;
            } else if ch == '"' {
                in_string = false;
            }
            continue;
        }
        match ch {
            '"' => in_string = true,
            '{' => stack.push('}'),
            '[' => stack.push(']'),
            '}' | ']' => {
                if stack.pop() != Some(ch) {
                    return None;
                }
            }
            _ => {}
        }
    }

    let mut repaired = trimmed.to_string();
    if escaped {
        // A dangling backslash cannot be closed, drop it.
        repaired.pop();
    }
    if in_string {
        repaired.push('"');
    }
    while let Some(close) = stack.pop() {
        repaired.push(close);
    }
    Some(repaired)
}

/// Parses the longest repairable prefix of `buffer` as a JSON value.
///
/// Trailing tokens that cannot be completed (a lone `"key":`, a dangling
/// comma) are backed out one character at a time until the repaired text
/// parses. Buffers are a few kilobytes at most, so the backtracking is cheap
/// and in practice stops within a handful of characters.
pub fn parse_partial(buffer: &str) -> Option<Value> {
    let trimmed = buffer.trim_start();
    if !trimmed.starts_with('{') {
        return None;
    }

    let mut end = trimmed.len();
    while end > 0 {
        if let Some(candidate) = complete_json(&trimmed[..end]) {
            if let Ok(value) = serde_json::from_str::<Value>(&candidate) {
                return Some(value);
            }
        }
        end -= 1;
        while end > 0 && !trimmed.is_char_boundary(end) {
            end -= 1;
        }
    }
    None
}

/// An all-fields-optional projection of [`crate::TurnContent`].
///
/// `risk` is kept as a raw string here: a half-streamed tier token ("mod")
/// must not invalidate the whole snapshot. The strict enum only applies to
/// the finished object.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct TurnSnapshot {
    pub location_name: Option<String>,
    pub description: Option<String>,
    pub hp: Option<i64>,
    pub hp_change_reason: Option<String>,
    pub inventory: Option<Vec<String>>,
    pub choices: Option<Vec<ChoiceSnapshot>>,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ChoiceSnapshot {
    pub label: Option<String>,
    pub action_id: Option<String>,
    pub risk: Option<String>,
}

impl TurnSnapshot {
    /// Decodes whatever is recoverable from an incomplete buffer.
    pub fn from_partial(buffer: &str) -> Option<Self> {
        let value = parse_partial(buffer)?;
        serde_json::from_value(value).ok()
    }
}
