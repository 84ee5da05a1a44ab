//! Structured-output recovery from free-form model text.
//!
//! [`extract`] runs an ordered list of strategies and stops at the first one
//! that yields a JSON object. Failing every strategy is an ordinary outcome
//! (`None`), not an error.

use serde_json::{Map, Value};

pub type JsonObject = Map<String, Value>;

const FENCE: &str = "```";

/// Remove every code-fence marker, including a `json` language tag (any case).
pub fn strip_code_fences(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut rest = text;

    while let Some(pos) = rest.find(FENCE) {
        out.push_str(&rest[..pos]);
        rest = &rest[pos + FENCE.len()..];
        if rest.get(..4).is_some_and(|tag| tag.eq_ignore_ascii_case("json")) {
            rest = &rest[4..];
        }
    }
    out.push_str(rest);
    out
}

/// Parse `text` and accept it only if it is a JSON object.
pub fn parse_object(text: &str) -> Option<JsonObject> {
    match serde_json::from_str::<Value>(text) {
        Ok(Value::Object(map)) => Some(map),
        _ => None,
    }
}

/// Span from the first `{` to the last `}` inclusive.
///
/// With several objects in the text this is the outermost span, which may
/// itself not be valid JSON.
pub fn outermost_braces(text: &str) -> Option<&str> {
    let start = text.find('{')?;
    let end = text.rfind('}')?;
    (start < end).then(|| &text[start..=end])
}

/// Collapse every whitespace run to a single space.
pub fn collapse_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Naive quote repair: every `'` becomes `"`.
pub fn repair_single_quotes(text: &str) -> String {
    text.replace('\'', "\"")
}

/// Recover a JSON object from `raw`, or `None`.
pub fn extract(raw: &str) -> Option<JsonObject> {
    if raw.trim().is_empty() {
        return None;
    }

    let cleaned = strip_code_fences(raw);
    let cleaned = cleaned.trim();

    if let Some(object) = parse_object(cleaned) {
        return Some(object);
    }

    let span = outermost_braces(cleaned)?;
    if let Some(object) = parse_object(span) {
        return Some(object);
    }

    let collapsed = collapse_whitespace(span);
    if let Some(object) = parse_object(&collapsed) {
        return Some(object);
    }

    parse_object(&repair_single_quotes(&collapsed))
}
