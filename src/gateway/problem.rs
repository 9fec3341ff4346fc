//! Failure-message normalization: every failed request becomes exactly one user-facing line.
//!
//! Precedence:
//! 1. textual body: parse as problem JSON and use `detail`, then `message`; if it is not JSON use the text;
//! 2. structured body: `detail`, then `message`, then the `{"error": {"message"}}` envelope;
//! 3. if the conflict marker occurs, keep the text from the marker onward;
//! 4. nothing usable: `"<operation> failed (code <status>)"`.

use crate::error::Operation;
use crate::gateway::transport::ResponseBody;
use serde_json::Value;

/// Prefix the persistence layer puts on "record in use" delete failures.
pub const DEFAULT_CONFLICT_MARKER: &str = "No se puede borrar";

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Normalized {
    pub message: String,
    pub conflict: bool,
}

pub fn normalize_failure(
    operation: Operation,
    status: Option<u16>,
    body: &ResponseBody,
    conflict_marker: &str,
) -> Normalized {
    let extracted = match body {
        ResponseBody::Empty => None,
        ResponseBody::Text(text) => from_text(text),
        ResponseBody::Json(value) => from_structured(value),
    };

    let mut conflict = status == Some(409) || envelope_code(body).as_deref() == Some("conflict");
    let mut message = extracted.unwrap_or_default();

    if !conflict_marker.is_empty() {
        if let Some(at) = message.find(conflict_marker) {
            message = message[at..].to_string();
            conflict = true;
        }
    }

    if message.trim().is_empty() {
        message = format!("{} failed (code {})", operation, status.unwrap_or(0));
    }
    Normalized { message, conflict }
}

fn from_text(text: &str) -> Option<String> {
    match serde_json::from_str::<Value>(text) {
        // parsed problem data yields its fields or nothing, never the raw JSON
        Ok(v @ (Value::Object(_) | Value::String(_))) => from_structured(&v),
        _ => non_blank(text),
    }
}

fn from_structured(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => non_blank(s),
        Value::Object(obj) => obj
            .get("detail")
            .and_then(field_text)
            .or_else(|| obj.get("message").and_then(field_text))
            .or_else(|| {
                obj.get("error")
                    .and_then(|e| e.get("message"))
                    .and_then(field_text)
            }),
        _ => None,
    }
}

fn field_text(v: &Value) -> Option<String> {
    match v {
        Value::String(s) => non_blank(s),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}

fn non_blank(s: &str) -> Option<String> {
    if s.trim().is_empty() {
        None
    } else {
        Some(s.to_string())
    }
}

fn envelope_code(body: &ResponseBody) -> Option<String> {
    let parsed;
    let value = match body {
        ResponseBody::Json(v) => v,
        ResponseBody::Text(t) => {
            parsed = serde_json::from_str::<Value>(t).ok()?;
            &parsed
        }
        ResponseBody::Empty => return None,
    };
    value
        .get("error")
        .and_then(|e| e.get("code"))
        .and_then(Value::as_str)
        .map(str::to_string)
}
