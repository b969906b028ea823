//! Tolerant decoding of model output.
//!
//! Models are asked for bare JSON or a bare list, but routinely wrap their
//! answer in Markdown fences or use Python-style quoting. Everything here
//! returns `None` instead of failing so callers can skip the unit of work.

use serde_json::{Map, Value};

/// Strips surrounding whitespace and a Markdown code fence, if present.
pub fn strip_code_fence(text: &str) -> &str {
    let trimmed = text.trim();
    let Some(rest) = trimmed.strip_prefix("```") else {
        return trimmed;
    };
    // Drop the info string ("json", "python", ...) on the opening line.
    let body = rest.split_once('\n').map_or("", |(_, body)| body);
    body.trim_end()
        .strip_suffix("```")
        .unwrap_or(body)
        .trim()
}

/// Parses a JSON object. Anything else (arrays, scalars, prose) is `None`.
pub fn parse_json_object(text: &str) -> Option<Map<String, Value>> {
    match serde_json::from_str(strip_code_fence(text)) {
        Ok(Value::Object(map)) => Some(map),
        _ => None,
    }
}

/// Parses a list of strings, accepting either a JSON array or a list
/// literal with single-quoted items (`['a', 'b']`). The text must begin
/// with `[`.
pub fn parse_string_list(text: &str) -> Option<Vec<String>> {
    let text = strip_code_fence(text);
    if !text.starts_with('[') {
        return None;
    }
    if let Ok(items) = serde_json::from_str::<Vec<String>>(text) {
        return Some(items);
    }
    parse_quoted_list(text)
}

fn parse_quoted_list(text: &str) -> Option<Vec<String>> {
    let inner = text.strip_prefix('[')?.trim_end().strip_suffix(']')?;
    let mut items = Vec::new();
    let mut chars = inner.chars().peekable();

    loop {
        while chars.peek().is_some_and(|c| c.is_whitespace()) {
            chars.next();
        }
        let Some(quote) = chars.next() else {
            return Some(items);
        };
        if quote != '\'' && quote != '"' {
            return None;
        }

        let mut item = String::new();
        loop {
            match chars.next()? {
                '\\' => item.push(chars.next()?),
                c if c == quote => break,
                c => item.push(c),
            }
        }
        items.push(item);

        while chars.peek().is_some_and(|c| c.is_whitespace()) {
            chars.next();
        }
        match chars.next() {
            None => return Some(items),
            Some(',') => {}
            Some(_) => return None,
        }
    }
}

/// A string field from a decoded object, trimmed; empty strings and
/// non-string values count as absent.
pub fn string_field(map: &Map<String, Value>, key: &str) -> Option<String> {
    match map.get(key)? {
        Value::String(s) if !s.trim().is_empty() => Some(s.trim().to_string()),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn strips_fences() {
        assert_eq!(strip_code_fence("```json\n{\"a\": 1}\n```"), "{\"a\": 1}");
        assert_eq!(strip_code_fence("  {}  "), "{}");
        assert_eq!(strip_code_fence("```\n[]```"), "[]");
    }

    #[test]
    fn objects_only() {
        assert!(parse_json_object("{\"primary_color\": \"#fff\"}").is_some());
        assert!(parse_json_object("[1, 2]").is_none());
        assert!(parse_json_object("The primary color is blue.").is_none());
    }

    #[test]
    fn string_lists_in_both_quote_styles() {
        let expected = vec!["https://a.com/x.css".to_string(), "https://a.com/y.css".to_string()];
        assert_eq!(
            parse_string_list(r#"["https://a.com/x.css", "https://a.com/y.css"]"#),
            Some(expected.clone())
        );
        assert_eq!(
            parse_string_list("['https://a.com/x.css', 'https://a.com/y.css']"),
            Some(expected)
        );
        assert_eq!(parse_string_list("[]"), Some(vec![]));
        assert_eq!(parse_string_list("['trailing',]"), Some(vec!["trailing".to_string()]));
    }

    #[test]
    fn rejects_non_lists() {
        assert_eq!(parse_string_list("not a list"), None);
        assert_eq!(parse_string_list("[1, 2]"), None);
        assert_eq!(parse_string_list("['unterminated"), None);
        assert_eq!(parse_string_list("Here you go: ['a']"), None);
    }
}
