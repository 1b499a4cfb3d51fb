//! Classifier output parsing.
//!
//! The classification model is asked for JSON but routinely wraps it in a
//! fenced code block or surrounds it with prose. Parsing is kept as pure
//! functions so every edge case is testable without a model:
//!
//! 1. [`extract_json`]: strip a ```` ``` ```` / ```` ```json ```` fence, fall
//!    back to the outermost `{...}` / `[...]` span.
//! 2. [`parse_intents`]: accept a single `{type, keyword}` object, an array
//!    of them, or `{"intents": [...]}`.
//! 3. [`classify_output`]: both of the above, degrading to
//!    [`Intent::fallback`] instead of failing.

use serde_json::Value;
use thiserror::Error;

use super::entities::{Intent, RawIntent};

/// Why classifier output could not be turned into intents.
///
/// Never surfaced to the user; it selects the fallback intent.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ClassificationParseError {
    #[error("classifier returned no output")]
    Empty,

    #[error("classifier output is not valid JSON: {error}\nRaw output: {raw}")]
    InvalidJson { error: String, raw: String },

    #[error("classifier JSON has unexpected shape: {0}")]
    UnexpectedShape(String),

    #[error("classifier JSON contains no usable intents")]
    NoIntents,
}

/// Result of interpreting one classifier response
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Classification {
    pub intents: Vec<RawIntent>,
    /// Set when `intents` is the synthesized fallback
    pub fallback_reason: Option<ClassificationParseError>,
}

impl Classification {
    pub fn is_fallback(&self) -> bool {
        self.fallback_reason.is_some()
    }
}

/// Return the body of the first fenced code block, or the trimmed input when
/// there is no fence. An optional language tag after the opening fence is
/// skipped; an unterminated fence runs to the end of the input.
pub fn strip_code_fence(raw: &str) -> &str {
    let trimmed = raw.trim();
    let Some(start) = trimmed.find("```") else {
        return trimmed;
    };

    let mut body = &trimmed[start + 3..];
    let tag_len = body.find(char::is_whitespace).unwrap_or(body.len());
    if tag_len > 0 && body[..tag_len].chars().all(|c| c.is_ascii_alphanumeric()) {
        body = &body[tag_len..];
    }

    match body.find("```") {
        Some(end) => body[..end].trim(),
        None => body.trim(),
    }
}

/// Extract a JSON value from raw model output
pub fn extract_json(raw: &str) -> Result<Value, ClassificationParseError> {
    if raw.trim().is_empty() {
        return Err(ClassificationParseError::Empty);
    }

    let body = strip_code_fence(raw);
    let first_error = match serde_json::from_str::<Value>(body) {
        Ok(value) => return Ok(value),
        Err(e) => e.to_string(),
    };

    if let Some(value) = embedded_json(body) {
        return Ok(value);
    }

    Err(ClassificationParseError::InvalidJson {
        error: first_error,
        raw: raw.to_string(),
    })
}

/// JSON embedded in prose: the widest span from each opening bracket to the
/// last matching closer, tried left to right.
fn embedded_json(text: &str) -> Option<Value> {
    text.match_indices(['{', '['])
        .filter_map(|(start, open)| {
            let close = if open == "{" { '}' } else { ']' };
            let end = text.rfind(close)?;
            (end > start).then(|| &text[start..=end])
        })
        .find_map(|span| serde_json::from_str::<Value>(span).ok())
}

fn json_string(value: Option<&Value>) -> Option<String> {
    match value? {
        Value::String(s) if !s.trim().is_empty() => Some(s.trim().to_string()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

/// Interpret a JSON value as a list of raw intents.
///
/// Entries without a usable `keyword` are dropped; a missing `type` is kept
/// as an empty name and coerced later like any other unknown type.
pub fn parse_intents(value: &Value) -> Result<Vec<RawIntent>, ClassificationParseError> {
    let entries: Vec<&Value> = match value {
        Value::Array(items) => items.iter().collect(),
        Value::Object(obj) => match obj.get("intents") {
            Some(Value::Array(items)) => items.iter().collect(),
            _ => vec![value],
        },
        other => {
            return Err(ClassificationParseError::UnexpectedShape(format!(
                "expected object or array, got {}",
                json_kind(other)
            )));
        }
    };

    let intents: Vec<RawIntent> = entries
        .into_iter()
        .filter_map(|entry| {
            let keyword = json_string(entry.get("keyword"))?;
            let type_name = json_string(entry.get("type")).unwrap_or_default();
            Some(RawIntent::new(type_name, keyword))
        })
        .collect();

    if intents.is_empty() {
        return Err(ClassificationParseError::NoIntents);
    }
    Ok(intents)
}

/// Turn raw classifier output into intents, never failing.
///
/// Any parse failure yields a single fallback intent searching the original
/// `query` as a track, with the reason recorded in
/// [`Classification::fallback_reason`].
pub fn classify_output(raw: &str, query: &str) -> Classification {
    match extract_json(raw).and_then(|value| parse_intents(&value)) {
        Ok(intents) => Classification {
            intents,
            fallback_reason: None,
        },
        Err(reason) => Classification::fallback(query, reason),
    }
}

impl Classification {
    pub fn fallback(query: &str, reason: ClassificationParseError) -> Self {
        let fallback = Intent::fallback(query);
        Self {
            intents: vec![RawIntent::new(
                fallback.search_type.as_str(),
                fallback.keyword,
            )],
            fallback_reason: Some(reason),
        }
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

#[cfg(test)]
mod tests {
    use super::*;
    use crate::intent::entities::SearchType;
    use serde_json::json;

    #[test]
    fn test_strip_json_fence() {
        let raw = "```json\n{\"type\": \"track\", \"keyword\": \"Lemon\"}\n```";
        assert_eq!(strip_code_fence(raw), r#"{"type": "track", "keyword": "Lemon"}"#);
    }

    #[test]
    fn test_strip_fence_uppercase_tag_and_prose() {
        let raw = "Here you go:\n```JSON\n[1]\n```\nThanks";
        assert_eq!(strip_code_fence(raw), "[1]");
    }

    #[test]
    fn test_strip_bare_fence_and_unterminated() {
        assert_eq!(strip_code_fence("```\n{}\n```"), "{}");
        assert_eq!(strip_code_fence("```json\n{\"a\":1}"), r#"{"a":1}"#);
    }

    #[test]
    fn test_strip_inline_fence_keeps_body() {
        assert_eq!(strip_code_fence("```{\"a\":1}```"), r#"{"a":1}"#);
    }

    #[test]
    fn test_extract_plain_json() {
        let value = extract_json(r#" {"type": "artist", "keyword": "米津玄師"} "#).unwrap();
        assert_eq!(value["keyword"], "米津玄師");
    }

    #[test]
    fn test_extract_json_surrounded_by_prose() {
        let value = extract_json(r#"Output: {"type": "album", "keyword": "First Love"} done"#)
            .unwrap();
        assert_eq!(value["type"], "album");
    }

    #[test]
    fn test_extract_json_after_bracketed_prose() {
        let value =
            extract_json(r#"Result [JSON]: {"type": "artist", "keyword": "Ado"}"#).unwrap();
        assert_eq!(value, json!({"type": "artist", "keyword": "Ado"}));

        let value = extract_json(r#"{note} then {"type": "album", "keyword": "狂言"}"#).unwrap();
        assert_eq!(value["keyword"], "狂言");
    }

    #[test]
    fn test_classify_keeps_object_after_bracketed_prose() {
        let classification =
            classify_output(r#"Result [JSON]: {"type": "artist", "keyword": "Ado"}"#, "Ado");
        assert!(!classification.is_fallback());
        assert_eq!(classification.intents[0].type_name, "artist");
    }

    #[test]
    fn test_extract_empty() {
        assert_eq!(extract_json("  \n"), Err(ClassificationParseError::Empty));
    }

    #[test]
    fn test_extract_invalid_json() {
        let err = extract_json("I think this is a track").unwrap_err();
        assert!(matches!(err, ClassificationParseError::InvalidJson { .. }));
    }

    #[test]
    fn test_parse_single_object() {
        let intents = parse_intents(&json!({"type": "track", "keyword": "Lemon"})).unwrap();
        assert_eq!(intents, vec![RawIntent::new("track", "Lemon")]);
    }

    #[test]
    fn test_parse_array_skips_entries_without_keyword() {
        let intents = parse_intents(&json!([
            {"type": "artist", "keyword": "Ado"},
            {"type": "album"},
            {"keyword": "Idol"}
        ]))
        .unwrap();
        assert_eq!(
            intents,
            vec![RawIntent::new("artist", "Ado"), RawIntent::new("", "Idol")]
        );
    }

    #[test]
    fn test_parse_wrapped_intents() {
        let intents =
            parse_intents(&json!({"intents": [{"type": "album", "keyword": "BOOTLEG"}]})).unwrap();
        assert_eq!(intents.len(), 1);
    }

    #[test]
    fn test_parse_rejects_scalar() {
        assert!(matches!(
            parse_intents(&json!("track")),
            Err(ClassificationParseError::UnexpectedShape(_))
        ));
        assert_eq!(parse_intents(&json!([])), Err(ClassificationParseError::NoIntents));
    }

    #[test]
    fn test_classify_malformed_output_falls_back() {
        let classification = classify_output("Sorry, I can't help with that.", "Lemon");

        assert!(classification.is_fallback());
        let intents: Vec<_> = classification
            .intents
            .into_iter()
            .map(RawIntent::validate)
            .collect();
        assert_eq!(intents, vec![Intent::new(SearchType::Track, "Lemon")]);
    }

    #[test]
    fn test_classify_fenced_array() {
        let raw = "```json\n[{\"type\":\"track\",\"keyword\":\"Lemon\"},{\"type\":\"artist\",\"keyword\":\"米津玄師\"}]\n```";
        let classification = classify_output(raw, "Lemon 米津玄師");

        assert!(!classification.is_fallback());
        assert_eq!(classification.intents.len(), 2);
        assert_eq!(classification.intents[1].keyword, "米津玄師");
    }
}
