//! Locating JSON inside free-text model responses

use serde_json::{Map, Value};

/// First well-formed JSON object embedded in `raw`.
///
/// Candidates start at each `{` in order; each is closed by brace matching
/// that skips braces inside string literals. The first candidate that parses
/// as a JSON object wins. Markdown fences and surrounding prose are ignored.
pub fn extract_json_object(raw: &str) -> Option<Map<String, Value>> {
    raw.char_indices()
        .filter(|(_, ch)| *ch == '{')
        .find_map(|(start, _)| {
            let end = balanced_end(&raw[start..])?;
            match serde_json::from_str::<Value>(&raw[start..start + end]) {
                Ok(Value::Object(map)) => Some(map),
                _ => None,
            }
        })
}

/// Byte length of the balanced `{...}` block at the start of `text`.
fn balanced_end(text: &str) -> Option<usize> {
    let mut depth = 0i32;
    let mut in_string = false;
    let mut escaped = false;

    for (idx, ch) in text.char_indices() {
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
                    return Some(idx + ch.len_utf8());
                }
            }
            _ => {}
        }
    }
    None
}

/// First `max_chars` characters of `dom`, cut on a character boundary.
pub fn truncate_snapshot(dom: &str, max_chars: usize) -> &str {
    match dom.char_indices().nth(max_chars) {
        Some((cut, _)) => &dom[..cut],
        None => dom,
    }
}
