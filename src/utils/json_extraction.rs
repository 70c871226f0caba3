//! JSON extraction utilities for parsing LLM responses.
//!
//! LLM responses that are supposed to be JSON often arrive wrapped in
//! markdown code blocks or preceded by explanatory prose. This module
//! extracts the JSON payload using multiple strategies tried in order:
//!
//! 1. Direct JSON (content starts with '{' or '[')
//! 2. JSON in ```json or generic code blocks
//! 3. JSON object/array anywhere in content using bracket matching

use regex::Regex;

/// Extracts a JSON string from an LLM response.
///
/// Returns the extracted JSON candidate, or the trimmed input unchanged when
/// no JSON-like content is found (the caller's parse will produce the error).
pub fn extract_json_from_response(content: &str) -> String {
    let trimmed = content.trim();

    // Strategy 1: content is already bare JSON
    if trimmed.starts_with('{') || trimmed.starts_with('[') {
        return trimmed.to_string();
    }

    // Strategy 2: fenced code block, with or without a language tag
    if let Some(json) = extract_from_code_block(trimmed) {
        return json;
    }

    // Strategy 3: first balanced object or array anywhere in the content
    if let Some(json) = extract_balanced(trimmed, '{', '}') {
        return json;
    }
    if let Some(json) = extract_balanced(trimmed, '[', ']') {
        return json;
    }

    trimmed.to_string()
}

/// Extracts the body of the first fenced code block containing JSON.
fn extract_from_code_block(content: &str) -> Option<String> {
    let re = Regex::new(r"(?s)```(?:json)?\s*(.*?)```").ok()?;
    for cap in re.captures_iter(content) {
        let body = cap.get(1)?.as_str().trim();
        if body.starts_with('{') || body.starts_with('[') {
            return Some(body.to_string());
        }
    }
    None
}

/// Extracts the first balanced `open`..`close` span, honoring string
/// literals and escapes so braces inside strings don't end the match.
fn extract_balanced(content: &str, open: char, close: char) -> Option<String> {
    let start = content.find(open)?;
    let mut depth = 0usize;
    let mut in_string = false;
    let mut escape_next = false;

    for (i, c) in content[start..].char_indices() {
        if escape_next {
            escape_next = false;
            continue;
        }
        match c {
            '\\' if in_string => escape_next = true,
            '"' => in_string = !in_string,
            c if c == open && !in_string => depth += 1,
            c if c == close && !in_string => {
                depth -= 1;
                if depth == 0 {
                    return Some(content[start..start + i + c.len_utf8()].to_string());
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

    #[test]
    fn test_bare_json_object() {
        let input = r#"{"themes": ["a", "b", "c"], "summary": "s"}"#;
        assert_eq!(extract_json_from_response(input), input);
    }

    #[test]
    fn test_bare_json_array() {
        assert_eq!(extract_json_from_response("[1, 2, 3]"), "[1, 2, 3]");
    }

    #[test]
    fn test_json_in_markdown_block() {
        let input = "Here you go:\n```json\n{\"summary\": \"text\"}\n```";
        assert_eq!(extract_json_from_response(input), r#"{"summary": "text"}"#);
    }

    #[test]
    fn test_json_in_generic_block() {
        let input = "```\n{\"key\": 1}\n```";
        assert_eq!(extract_json_from_response(input), r#"{"key": 1}"#);
    }

    #[test]
    fn test_json_after_prose() {
        let input = r#"Sure, here is the analysis: {"themes": ["x"]} hope that helps"#;
        assert_eq!(extract_json_from_response(input), r#"{"themes": ["x"]}"#);
    }

    #[test]
    fn test_braces_inside_strings_ignored() {
        let input = r#"result: {"summary": "uses { and } freely"} trailing"#;
        assert_eq!(
            extract_json_from_response(input),
            r#"{"summary": "uses { and } freely"}"#
        );
    }

    #[test]
    fn test_escaped_quotes_inside_strings() {
        let input = r#"out: {"summary": "she said \"hi\" {"}"#;
        assert_eq!(
            extract_json_from_response(input),
            r#"{"summary": "she said \"hi\" {"}"#
        );
    }

    #[test]
    fn test_nested_objects() {
        let input = r#"note {"a": {"b": 2}} done"#;
        assert_eq!(extract_json_from_response(input), r#"{"a": {"b": 2}}"#);
    }

    #[test]
    fn test_no_json_returns_input() {
        assert_eq!(extract_json_from_response("  no json here  "), "no json here");
    }
}
