//! Size-bounded serialisation of pipeline input into prompt text.
use serde_json::Value;

/// Pretty JSON of `value`, cut to at most `max_chars` characters.
///
/// When the text is cut, a `[truncated N chars]` marker follows the kept
/// prefix. Strings are emitted bare rather than quoted.
pub fn bounded_json(value: &Value, max_chars: usize) -> String {
    let text = match value {
        Value::String(s) => s.clone(),
        other => serde_json::to_string_pretty(other).unwrap_or_else(|_| other.to_string()),
    };
    bound_text(&text, max_chars)
}

/// Cut `text` to `max_chars` characters at a char boundary.
pub fn bound_text(text: &str, max_chars: usize) -> String {
    let total = text.chars().count();
    if total <= max_chars {
        return text.to_string();
    }

    let cut = text
        .char_indices()
        .nth(max_chars)
        .map(|(idx, _)| idx)
        .unwrap_or(text.len());
    format!("{}\n[truncated {} chars]", &text[..cut], total - max_chars)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_small_values_pass_through() {
        let value = json!({ "likes": 10 });
        assert_eq!(bounded_json(&value, 1000), serde_json::to_string_pretty(&value).unwrap());
        assert_eq!(bounded_json(&json!("plain topic"), 1000), "plain topic");
    }

    #[test]
    fn test_truncates_on_char_boundary() {
        let text = "ñandú".repeat(10);
        let out = bound_text(&text, 7);
        assert!(out.starts_with("ñandúña"));
        assert!(out.ends_with("[truncated 43 chars]"));
    }

    #[test]
    fn test_bounded_len() {
        let posts: Vec<_> = (0..500).map(|i| json!({ "caption": format!("post {i}") })).collect();
        let out = bounded_json(&json!(posts), 2_000);
        let kept = out.split("\n[truncated").next().unwrap();
        assert_eq!(kept.chars().count(), 2_000);
    }

    #[test]
    fn test_empty_list_renders() {
        assert_eq!(bounded_json(&json!([]), 100), "[]");
    }
}
