//! Best-effort extraction of a JSON object embedded in free text.
//!
//! Model completions and test-runner stdout both wrap JSON in prose, code fences
//! or log noise. These helpers locate the object without ever failing loudly.

use serde_json::Value;

/// Give up after this many candidate opening braces.
const MAX_CANDIDATES: usize = 64;

/// Returns the first balanced `{...}` span starting at or after `from`.
///
/// Braces inside JSON string literals are ignored.
fn balanced_span_from(text: &str, from: usize) -> Option<(usize, usize)> {
    let start = from + text[from..].find('{')?;
    let mut depth = 0usize;
    let mut in_string = false;
    let mut escaped = false;

    for (offset, ch) in text[start..].char_indices() {
        if in_string {
            match ch {
                _ if escaped => escaped = false,
                '\\' => escaped = true,
                '"' => in_string = false,
                _ => {}
            }
            continue;
        }
        match ch {
            '"' => in_string = true,
            '{' => depth += 1,
            '}' => {
                depth -= 1;
                if depth == 0 {
                    return Some((start, start + offset + ch.len_utf8()));
                }
            }
            _ => {}
        }
    }
    None
}

/// Finds the first span that parses as a JSON object.
///
/// Candidates are tried in order of their opening brace. If none parses, the
/// widest span (first `{` to last `}`) gets one last attempt.
pub fn extract_json_object(text: &str) -> Option<serde_json::Map<String, Value>> {
    let mut cursor = 0;
    for _ in 0..MAX_CANDIDATES {
        let Some((start, end)) = balanced_span_from(text, cursor) else {
            break;
        };
        if let Ok(Value::Object(map)) = serde_json::from_str::<Value>(&text[start..end]) {
            return Some(map);
        }
        cursor = start + 1;
    }

    let start = text.find('{')?;
    let end = text.rfind('}')?;
    if end <= start {
        return None;
    }
    match serde_json::from_str::<Value>(&text[start..=end]) {
        Ok(Value::Object(map)) => Some(map),
        _ => None,
    }
}
