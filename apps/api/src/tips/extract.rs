//! Model Response Extractor — recovers a structured value from a raw model
//! reply that was supposed to be JSON.
//!
//! Model output is unreliable by nature: replies arrive bare, wrapped in
//! code fences, or buried in explanatory prose. Strategies are tried in
//! order and each is independently testable:
//!
//! 1. parse the whole reply as JSON;
//! 2. parse the interior of a fenced code block (```json or bare ```);
//! 3. parse the first balanced `{...}` span.
//!
//! Every caller must hold a fallback value for `MalformedModelOutput`;
//! this error never reaches an end user directly.

use once_cell::sync::Lazy;
use regex::Regex;
use serde::de::DeserializeOwned;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ExtractError {
    #[error("malformed model output: no parseable JSON found")]
    MalformedModelOutput,
}

static FENCED_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?s)```(?:json)?\s*(.*?)\s*```").expect("fence regex"));

/// Runs the strategy cascade.
pub fn extract_json<T: DeserializeOwned>(raw: &str) -> Result<T, ExtractError> {
    parse_direct(raw)
        .or_else(|| parse_fenced(raw))
        .or_else(|| parse_embedded(raw))
        .ok_or(ExtractError::MalformedModelOutput)
}

/// Strategy 1: the whole (trimmed) reply is JSON.
pub fn parse_direct<T: DeserializeOwned>(raw: &str) -> Option<T> {
    serde_json::from_str(raw.trim()).ok()
}

/// Strategy 2: JSON inside a triple-backtick fence, optionally tagged
/// `json`.
pub fn parse_fenced<T: DeserializeOwned>(raw: &str) -> Option<T> {
    let captures = FENCED_RE.captures(raw)?;
    serde_json::from_str(captures[1].trim()).ok()
}

/// Strategy 3: the first balanced `{...}` span, brace-counted with string
/// awareness so braces inside JSON strings do not end the span early. If
/// the balanced span does not parse, fall back to the greedy span from the
/// first `{` to the last `}`.
pub fn parse_embedded<T: DeserializeOwned>(raw: &str) -> Option<T> {
    if let Some(span) = balanced_object_span(raw) {
        if let Ok(value) = serde_json::from_str(span) {
            return Some(value);
        }
    }
    let start = raw.find('{')?;
    let end = raw.rfind('}')?;
    if end <= start {
        return None;
    }
    serde_json::from_str(&raw[start..=end]).ok()
}

fn balanced_object_span(raw: &str) -> Option<&str> {
    let start = raw.find('{')?;
    let mut depth = 0usize;
    let mut in_string = false;
    let mut escaped = false;

    for (offset, ch) in raw[start..].char_indices() {
        if escaped {
            escaped = false;
            continue;
        }
        match ch {
            '\\' if in_string => escaped = true,
            '"' => in_string = !in_string,
            '{' if !in_string => depth += 1,
            '}' if !in_string => {
                depth -= 1;
                if depth == 0 {
                    return Some(&raw[start..start + offset + ch.len_utf8()]);
                }
            }
            _ => {}
        }
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::{json, Value};

    const BARE: &str = r#"{"category": "Recipes", "priority": 7}"#;

    fn expected() -> Value {
        json!({"category": "Recipes", "priority": 7})
    }

    #[test]
    fn test_bare_json() {
        let value: Value = extract_json(BARE).unwrap();
        assert_eq!(value, expected());
    }

    #[test]
    fn test_json_fence() {
        let raw = format!("```json\n{BARE}\n```");
        let value: Value = extract_json(&raw).unwrap();
        assert_eq!(value, expected());
    }

    #[test]
    fn test_unlabeled_fence() {
        let raw = format!("```\n{BARE}\n```");
        let value: Value = extract_json(&raw).unwrap();
        assert_eq!(value, expected());
    }

    #[test]
    fn test_json_embedded_in_prose() {
        let raw = format!("Sure! Here is the classification you asked for:\n{BARE}\nLet me know if you need anything else.");
        let value: Value = extract_json(&raw).unwrap();
        assert_eq!(value, expected());
    }

    #[test]
    fn test_fenced_json_with_surrounding_prose() {
        let raw = format!("Here you go:\n```json\n{BARE}\n```\nHope that helps!");
        let value: Value = extract_json(&raw).unwrap();
        assert_eq!(value, expected());
    }

    #[test]
    fn test_pure_prose_fails_cleanly() {
        let result: Result<Value, _> =
            extract_json("I could not classify this tip, sorry about that.");
        assert!(matches!(result, Err(ExtractError::MalformedModelOutput)));
    }

    #[test]
    fn test_empty_reply_fails_cleanly() {
        let result: Result<Value, _> = extract_json("");
        assert!(result.is_err());
    }

    #[test]
    fn test_braces_inside_strings_do_not_truncate_span() {
        let raw = r#"note: {"summary": "use {braces} carefully", "ok": true} done"#;
        let value: Value = extract_json(raw).unwrap();
        assert_eq!(value["summary"], "use {braces} carefully");
    }

    #[test]
    fn test_strategies_are_individually_exercisable() {
        assert!(parse_direct::<Value>(BARE).is_some());
        assert!(parse_direct::<Value>("prose").is_none());
        assert!(parse_fenced::<Value>(&format!("```{BARE}```")).is_some());
        assert!(parse_fenced::<Value>(BARE).is_none());
        assert!(parse_embedded::<Value>(&format!("x {BARE} y")).is_some());
    }

    #[test]
    fn test_typed_extraction() {
        #[derive(serde::Deserialize)]
        struct Reply {
            category: String,
        }
        let reply: Reply = extract_json(&format!("```json\n{BARE}\n```")).unwrap();
        assert_eq!(reply.category, "Recipes");
    }
}
