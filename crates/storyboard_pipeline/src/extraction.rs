//! Utilities for extracting structured data from model responses.
//!
//! Responses often wrap JSON in Markdown code blocks or surround it with
//! commentary. These helpers recover the JSON payload.

use storyboard_error::JsonError;

/// Extract JSON from a response that may contain Markdown or extra text.
///
/// Strategies, in order:
/// 1. Markdown code blocks: ```json ... ```
/// 2. The balanced `[...]` or `{...}` that appears first
///
/// # Errors
///
/// Returns an error if no JSON-looking payload is found.
///
/// # Examples
///
/// ```
/// use storyboard_pipeline::extract_json;
///
/// let response = "Here are the lines:\n```json\n[\"one\", \"two\"]\n```\nEnjoy!";
/// assert_eq!(extract_json(response).unwrap(), "[\"one\", \"two\"]");
///
/// let response = "Sure! {\"theme\": \"Loss\"} Anything else?";
/// assert_eq!(extract_json(response).unwrap(), "{\"theme\": \"Loss\"}");
/// ```
pub fn extract_json(response: &str) -> Result<String, JsonError> {
    if let Some(json) = extract_from_code_block(response) {
        return Ok(json);
    }

    let bracket_pos = response.find('[');
    let brace_pos = response.find('{');

    let order = match (bracket_pos, brace_pos) {
        (Some(b), Some(c)) if b < c => [('[', ']'), ('{', '}')],
        (Some(_), None) => [('[', ']'), ('{', '}')],
        _ => [('{', '}'), ('[', ']')],
    };

    for (open, close) in order {
        if let Some(json) = extract_balanced(response, open, close) {
            return Ok(json);
        }
    }

    tracing::debug!(response_length = response.len(), "No JSON found in response");

    Err(JsonError::new(format!("no JSON in {} byte response", response.len())).with_preview(response))
}

/// Extract content from a Markdown code block, with or without a language tag.
fn extract_from_code_block(response: &str) -> Option<String> {
    let start = response.find("```")?;
    let content_start = start + 3;
    // Skip the language tag line
    let skip_to = response[content_start..]
        .find('\n')
        .map(|n| content_start + n + 1)
        .unwrap_or(content_start);

    let content = match response[skip_to..].find("```") {
        Some(end) => &response[skip_to..skip_to + end],
        // Truncated response
        None => &response[skip_to..],
    };

    let content = content.trim();
    (content.starts_with('[') || content.starts_with('{')).then(|| content.to_string())
}

/// Extract content between balanced delimiters, ignoring delimiters in strings.
fn extract_balanced(response: &str, open: char, close: char) -> Option<String> {
    let start = response.find(open)?;
    let mut depth = 0;
    let mut in_string = false;
    let mut escape_next = false;

    for (i, ch) in response[start..].char_indices() {
        if escape_next {
            escape_next = false;
            continue;
        }

        match ch {
            '\\' if in_string => escape_next = true,
            '"' => in_string = !in_string,
            c if c == open && !in_string => depth += 1,
            c if c == close && !in_string => {
                depth -= 1;
                if depth == 0 {
                    return Some(response[start..start + i + c.len_utf8()].to_string());
                }
            }
            _ => {}
        }
    }

    None
}

/// Parse JSON into `T`.
///
/// # Errors
///
/// Returns an error if the string is not valid JSON for `T`.
///
/// # Examples
///
/// ```
/// use storyboard_pipeline::parse_json;
///
/// let lines: Vec<String> = parse_json("[\"a\", \"b\"]").unwrap();
/// assert_eq!(lines.len(), 2);
/// ```
pub fn parse_json<T>(json_str: &str) -> Result<T, JsonError>
where
    T: serde::de::DeserializeOwned,
{
    serde_json::from_str(json_str).map_err(|e| {
        let err = JsonError::new(e.to_string()).with_preview(json_str);
        tracing::debug!(error = %e, json_preview = %err.preview, "JSON parsing failed");
        err
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extract_json_from_code_block() {
        let response = r#"
Here's the JSON you requested:

```json
{
  "characters": []
}
```

Hope this helps!
"#;
        let json = extract_json(response).unwrap();
        assert!(json.contains("\"characters\""));
    }

    #[test]
    fn test_extract_json_untagged_code_block() {
        let response = "```\n[\"x\"]\n```";
        assert_eq!(extract_json(response).unwrap(), "[\"x\"]");
    }

    #[test]
    fn test_extract_json_balanced_braces() {
        let response = r#"Sure! Here it is: {"id": 456, "nested": {"value": "test"}} bye"#;
        let json = extract_json(response).unwrap();
        assert!(json.starts_with('{'));
        assert!(json.ends_with('}'));
        assert!(json.contains("nested"));
    }

    #[test]
    fn test_extract_json_array_before_object() {
        let response = "Lines: [\"a {b}\", \"c\"] and {\"x\": 1}";
        assert_eq!(extract_json(response).unwrap(), "[\"a {b}\", \"c\"]");
    }

    #[test]
    fn test_brackets_inside_strings_are_ignored() {
        let response = r#"{"text": "She said \"[hello]\"", "n": 1}"#;
        assert_eq!(extract_json(response).unwrap(), response);
    }

    #[test]
    fn test_no_json_found() {
        assert!(extract_json("This is just plain text").is_err());
        assert!(extract_json("unterminated [\"a\", ").is_err());
    }

    #[test]
    fn test_parse_json_error_has_preview() {
        let err = parse_json::<Vec<String>>("{not json").unwrap_err();
        assert_eq!(err.preview, "{not json");
    }
}
