//! Field mapping resolution: submission values into per-object payloads.

use formsync_core::{FieldMapping, ObjectPayload, Submission};
use serde_json::Value;

/// Evaluate a form-field reference against a submission.
///
/// A reference that is exactly one `{handle}` placeholder yields the raw
/// submission value, preserving its type. Anything else renders as text,
/// substituting each `{handle}` with the field's string form (missing
/// fields render empty). Literal text with no placeholders passes
/// through unchanged.
pub fn render_reference(submission: &Submission, source: &str) -> Value {
    if let Some(handle) = single_placeholder(source) {
        return submission.value(handle).cloned().unwrap_or(Value::String(String::new()));
    }

    let mut out = String::new();
    let mut rest = source;
    while let Some(open) = rest.find('{') {
        out.push_str(&rest[..open]);
        match rest[open..].find('}') {
            Some(close) => {
                let handle = &rest[open + 1..open + close];
                out.push_str(&submission.value_str(handle));
                rest = &rest[open + close + 1..];
            }
            None => {
                // Unterminated brace, keep it literally.
                out.push_str(&rest[open..]);
                rest = "";
            }
        }
    }
    out.push_str(rest);
    Value::String(out)
}

fn single_placeholder(source: &str) -> Option<&str> {
    let inner = source.strip_prefix('{')?.strip_suffix('}')?;
    if inner.is_empty() || inner.contains('{') || inner.contains('}') {
        return None;
    }
    Some(inner)
}

/// True for values the omit-if-empty policy drops.
pub fn is_empty_value(value: &Value) -> bool {
    match value {
        Value::Null => true,
        Value::String(s) => s.trim().is_empty(),
        _ => false,
    }
}

/// Resolve a stored mapping against a submission, in mapping order.
/// Empty resolved values stay in the payload unless `omit_empty`.
pub fn resolve(submission: &Submission, mapping: &FieldMapping, omit_empty: bool) -> ObjectPayload {
    let mut payload = ObjectPayload::new();

    for entry in &mapping.entries {
        let value = render_reference(submission, &entry.source);
        if omit_empty && is_empty_value(&value) {
            continue;
        }
        payload.insert(&entry.field, value);
    }

    payload
}
