//! Element Redaction
//!
//! Renders elements for log output with credentials scrubbed and long
//! payloads truncated.

use regex::Regex;
use serde_json::Value;
use std::sync::LazyLock;

use streamhook_core::Element;

/// Longest rendering emitted before truncation.
pub const MAX_RENDERED_LEN: usize = 256;

const REDACTED: &str = "[REDACTED]";

static SENSITIVE_KEY_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)^(password|passwd|secret|token|api[_-]?key|authorization|access[_-]?token)$")
        .unwrap()
});
static API_KEY_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(sk-[a-zA-Z0-9]{32,})|(Bearer\s+[a-zA-Z0-9\-\._~+/]+=*)").unwrap()
});

/// Render an element for a log line.
pub fn render_element(element: &Element) -> String {
    let scrubbed = scrub(element);
    let rendered = match &scrubbed {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    };
    truncate(rendered)
}

fn scrub(value: &Value) -> Value {
    match value {
        Value::String(s) => Value::String(API_KEY_RE.replace_all(s, REDACTED).into_owned()),
        Value::Array(items) => Value::Array(items.iter().map(scrub).collect()),
        Value::Object(map) => Value::Object(
            map.iter()
                .map(|(k, v)| {
                    let v = if SENSITIVE_KEY_RE.is_match(k) {
                        Value::String(REDACTED.to_string())
                    } else {
                        scrub(v)
                    };
                    (k.clone(), v)
                })
                .collect(),
        ),
        other => other.clone(),
    }
}

fn truncate(mut rendered: String) -> String {
    if rendered.len() <= MAX_RENDERED_LEN {
        return rendered;
    }
    let mut cut = MAX_RENDERED_LEN;
    while !rendered.is_char_boundary(cut) {
        cut -= 1;
    }
    rendered.truncate(cut);
    rendered.push('…');
    rendered
}
