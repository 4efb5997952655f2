// ── Value extraction ──
//
// Turns a fetched body into the single value substituted for a tag.
// Two grammars: a dot-separated key path through JSON objects, and the
// first hit of a multi-line regular expression. A blank selector means
// pass-through: the whole body is the value.

use regex::RegexBuilder;
use serde_json::Value;

use crate::connection::ContentType;
use crate::error::{ExtractError, ParseError};

/// Pull a value out of `raw` using the grammar selected by `content_type`.
///
/// The result is trimmed of surrounding whitespace.
pub fn extract(raw: &str, content_type: ContentType, selector: &str) -> Result<String, ExtractError> {
    let value = if selector.trim().is_empty() {
        raw.to_owned()
    } else {
        match content_type {
            ContentType::Json => json_path(raw, selector)?,
            ContentType::Text => first_match(raw, selector)?,
        }
    };

    Ok(value.trim().to_owned())
}

/// Walk `path` segment by segment through object properties only.
fn json_path(raw: &str, path: &str) -> Result<String, ExtractError> {
    let root: Value = serde_json::from_str(raw).map_err(ParseError::Json)?;

    let mut node = &root;
    for key in path.split('.') {
        node = node
            .as_object()
            .and_then(|object| object.get(key))
            .ok_or(ExtractError::NoMatch)?;
    }

    Ok(node_text(node))
}

/// Strings lose their quotes, `null` is empty, everything else is JSON text.
fn node_text(node: &Value) -> String {
    match node {
        Value::String(text) => text.clone(),
        Value::Null => String::new(),
        other => other.to_string(),
    }
}

/// First capture group if it matched something, else the whole match.
fn first_match(raw: &str, pattern: &str) -> Result<String, ExtractError> {
    let regex = RegexBuilder::new(pattern)
        .multi_line(true)
        .build()
        .map_err(ParseError::Regex)?;

    let captures = regex.captures(raw).ok_or(ExtractError::NoMatch)?;
    let group = captures
        .get(1)
        .map(|m| m.as_str())
        .filter(|text| !text.is_empty());
    let whole = captures.get(0).map_or("", |m| m.as_str());

    Ok(group.unwrap_or(whole).to_owned())
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn json(raw: &str, path: &str) -> Result<String, ExtractError> {
        extract(raw, ContentType::Json, path)
    }

    fn text(raw: &str, pattern: &str) -> Result<String, ExtractError> {
        extract(raw, ContentType::Text, pattern)
    }

    // ── JSON ─────────────────────────────────────────────────────────

    #[test]
    fn json_nested_path_hits() {
        assert_eq!(json(r#"{"a":{"b":"42"}}"#, "a.b").unwrap(), "42");
    }

    #[test]
    fn json_missing_segment_is_no_match() {
        assert!(matches!(
            json(r#"{"a":{"b":"42"}}"#, "a.c"),
            Err(ExtractError::NoMatch)
        ));
    }

    #[test]
    fn json_walking_through_scalar_is_no_match() {
        assert!(matches!(
            json(r#"{"a":"flat"}"#, "a.b"),
            Err(ExtractError::NoMatch)
        ));
    }

    #[test]
    fn json_arrays_are_not_indexed() {
        assert!(matches!(
            json(r#"{"items":[{"v":1}]}"#, "items.0"),
            Err(ExtractError::NoMatch)
        ));
    }

    #[test]
    fn json_terminal_scalars_render_as_literals() {
        let raw = r#"{"n":3.5,"ok":true,"none":null,"s":"  padded  "}"#;
        assert_eq!(json(raw, "n").unwrap(), "3.5");
        assert_eq!(json(raw, "ok").unwrap(), "true");
        assert_eq!(json(raw, "none").unwrap(), "");
        assert_eq!(json(raw, "s").unwrap(), "padded");
    }

    #[test]
    fn json_terminal_containers_render_as_json() {
        let raw = r#"{"a":{"list":[1,2],"obj":{"k":"v"}}}"#;
        assert_eq!(json(raw, "a.list").unwrap(), "[1,2]");
        assert_eq!(json(raw, "a.obj").unwrap(), r#"{"k":"v"}"#);
    }

    #[test]
    fn json_malformed_body_is_parse_error() {
        assert!(matches!(
            json("<html>oops</html>", "a"),
            Err(ExtractError::Parse(ParseError::Json(_)))
        ));
    }

    #[test]
    fn json_blank_path_passes_through() {
        assert_eq!(json("  not even json\n", "").unwrap(), "not even json");
        assert_eq!(json("raw", "   ").unwrap(), "raw");
    }

    // ── Text ─────────────────────────────────────────────────────────

    #[test]
    fn text_capture_group_wins() {
        assert_eq!(text("value=99\n", r"value=(\d+)").unwrap(), "99");
    }

    #[test]
    fn text_without_group_returns_whole_match() {
        assert_eq!(text("value=99\n", r"\d+").unwrap(), "99");
        assert_eq!(text("value=99\n", r"value=\d+").unwrap(), "value=99");
    }

    #[test]
    fn text_empty_group_falls_back_to_whole_match() {
        assert_eq!(text("key=\n", r"key=(\d*)").unwrap(), "key=");
    }

    #[test]
    fn text_is_multiline() {
        let raw = "header\nload: 0.42\nfooter\n";
        assert_eq!(text(raw, r"^load: (.+)$").unwrap(), "0.42");
    }

    #[test]
    fn text_takes_first_match() {
        assert_eq!(text("v=1\nv=2\n", r"v=(\d)").unwrap(), "1");
    }

    #[test]
    fn text_no_hit_is_no_match() {
        assert!(matches!(
            text("nothing here", r"value=(\d+)"),
            Err(ExtractError::NoMatch)
        ));
    }

    #[test]
    fn text_invalid_pattern_is_parse_error() {
        assert!(matches!(
            text("anything", r"(unclosed"),
            Err(ExtractError::Parse(ParseError::Regex(_)))
        ));
    }

    #[test]
    fn text_blank_pattern_passes_through() {
        assert_eq!(text("\n raw body \n", "").unwrap(), "raw body");
    }
}
