use serde_json::Value;
use thiserror::Error;

/// Failure modes of best-effort JSON extraction from LLM output
///
/// The reasoning service is asked for a bare JSON object but routinely wraps
/// it in markdown fences or prose. Each way that recovery can fail is a
/// distinct kind so callers can report it precisely.
#[derive(Debug, Error)]
pub enum JsonExtractError {
    #[error("no JSON object found in response")]
    NoObject,

    #[error("extracted span is not valid JSON: {0}")]
    Syntax(#[from] serde_json::Error),

    #[error("required field missing: {0}")]
    MissingField(&'static str),

    #[error("field {field} has wrong type, expected {expected}")]
    WrongType {
        field: &'static str,
        expected: &'static str,
    },
}

/// Remove markdown code-fence wrappers if the whole response is fenced
pub fn strip_code_fences(text: &str) -> &str {
    let trimmed = text.trim();
    let Some(rest) = trimmed.strip_prefix("```") else {
        return trimmed;
    };
    // Skip the optional language tag on the opening fence line
    let rest = match rest.find('\n') {
        Some(idx) => &rest[idx + 1..],
        None => rest,
    };
    rest.strip_suffix("```").unwrap_or(rest).trim()
}

/// Locate the first balanced `{...}` span, aware of strings and escapes
pub fn first_object_span(text: &str) -> Option<&str> {
    let start = text.find('{')?;
    let bytes = text.as_bytes();
    let mut depth = 0usize;
    let mut in_string = false;
    let mut escaped = false;

    for (offset, &b) in bytes[start..].iter().enumerate() {
        if in_string {
            if escaped {
                escaped = false;
            } else if b == b'\\' {
                escaped = true;
            } else if b == b'"' {
                in_string = false;
            }
            continue;
        }
        match b {
            b'"' => in_string = true,
            b'{' => depth += 1,
            b'}' => {
                depth -= 1;
                if depth == 0 {
                    return Some(&text[start..start + offset + 1]);
                }
            }
            _ => {}
        }
    }
    None
}

/// Extract and parse the first JSON object embedded in free text
pub fn extract_object(text: &str) -> Result<Value, JsonExtractError> {
    let cleaned = strip_code_fences(text);
    let span = first_object_span(cleaned).ok_or(JsonExtractError::NoObject)?;
    let value: Value = serde_json::from_str(span)?;
    Ok(value)
}

/// Read a field as a number, accepting a numeric string
pub fn coerce_number(value: &Value) -> Option<f64> {
    match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse::<f64>().ok(),
        _ => None,
    }
}

/// Read a string field, empty if absent or non-string
pub fn field_str(object: &Value, key: &str) -> String {
    object
        .get(key)
        .and_then(Value::as_str)
        .unwrap_or_default()
        .to_string()
}

/// Read a string-list field, empty if absent; non-string entries are dropped
pub fn field_str_list(object: &Value, key: &str) -> Vec<String> {
    object
        .get(key)
        .and_then(Value::as_array)
        .map(|items| {
            items
                .iter()
                .filter_map(Value::as_str)
                .map(str::to_string)
                .collect()
        })
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_strip_fences_with_language_tag() {
        let text = "```json\n{\"score\": 80}\n```";
        assert_eq!(strip_code_fences(text), "{\"score\": 80}");
    }

    #[test]
    fn test_strip_fences_passthrough() {
        let text = "{\"score\": 80}";
        assert_eq!(strip_code_fences(text), text);
    }

    #[test]
    fn test_object_span_in_prose() {
        let text = "Sure! Here is my evaluation: {\"score\": 72, \"reason\": \"ok\"} Hope that helps.";
        let span = first_object_span(text).unwrap();
        assert_eq!(span, "{\"score\": 72, \"reason\": \"ok\"}");
    }

    #[test]
    fn test_object_span_nested_and_braces_in_strings() {
        let text = "x {\"a\": {\"b\": \"contains } brace\"}, \"c\": 1} y";
        let span = first_object_span(text).unwrap();
        assert_eq!(span, "{\"a\": {\"b\": \"contains } brace\"}, \"c\": 1}");
    }

    #[test]
    fn test_no_object() {
        assert!(matches!(
            extract_object("the model refused to answer"),
            Err(JsonExtractError::NoObject)
        ));
    }

    #[test]
    fn test_unbalanced_object() {
        assert!(matches!(
            extract_object("{\"score\": 50"),
            Err(JsonExtractError::NoObject)
        ));
    }

    #[test]
    fn test_coerce_number_variants() {
        assert_eq!(coerce_number(&serde_json::json!(42)), Some(42.0));
        assert_eq!(coerce_number(&serde_json::json!("42")), Some(42.0));
        assert_eq!(coerce_number(&serde_json::json!(" 78.5 ")), Some(78.5));
        assert_eq!(coerce_number(&serde_json::json!("high")), None);
        assert_eq!(coerce_number(&serde_json::json!([1])), None);
    }

    #[test]
    fn test_field_helpers() {
        let obj = serde_json::json!({
            "name": "Ada",
            "skills": ["Rust", 7, "C"],
        });
        assert_eq!(field_str(&obj, "name"), "Ada");
        assert_eq!(field_str(&obj, "missing"), "");
        assert_eq!(field_str_list(&obj, "skills"), vec!["Rust", "C"]);
        assert!(field_str_list(&obj, "missing").is_empty());
    }
}
