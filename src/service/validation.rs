//! Request body validation from per-field rules.

use crate::error::AppError;
use regex::Regex;
use serde_json::Value;
use std::collections::HashMap;
use std::sync::OnceLock;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Format {
    /// Absolute http(s) URL.
    Url,
    /// Positive integer (numeric string accepted).
    Id,
}

#[derive(Clone, Copy, Debug, Default)]
pub struct FieldRule {
    pub required: bool,
    pub format: Option<Format>,
    pub max_length: Option<usize>,
}

pub struct RequestValidator;

impl RequestValidator {
    /// Validate body against `(field, rule)` pairs in order; the first violation wins.
    pub fn validate(body: &HashMap<String, Value>, rules: &[(&str, FieldRule)]) -> Result<(), AppError> {
        for (field, rule) in rules {
            let val = body.get(*field).filter(|v| !is_blank(v));
            match val {
                None if rule.required => {
                    return Err(AppError::Validation(format!("{} is required", field)));
                }
                None => {}
                Some(v) => validate_field(field, v, rule)?,
            }
        }
        Ok(())
    }
}

fn is_blank(v: &Value) -> bool {
    match v {
        Value::Null => true,
        Value::String(s) => s.trim().is_empty(),
        _ => false,
    }
}

fn validate_field(field: &str, v: &Value, rule: &FieldRule) -> Result<(), AppError> {
    if let Some(max) = rule.max_length {
        if let Some(s) = v.as_str() {
            if s.trim().chars().count() > max {
                return Err(AppError::Validation(format!(
                    "{} must be at most {} characters",
                    field, max
                )));
            }
        }
    }
    match rule.format {
        Some(Format::Url) => {
            let ok = v.as_str().map(|s| is_http_url(s.trim())).unwrap_or(false);
            if !ok {
                return Err(AppError::Validation(format!("{} must be a valid http(s) URL", field)));
            }
        }
        Some(Format::Id) => {
            if as_id(v).filter(|n| *n > 0).is_none() {
                return Err(AppError::Validation(format!("{} must be a positive id", field)));
            }
        }
        None => {}
    }
    Ok(())
}

fn is_http_url(s: &str) -> bool {
    static RE: OnceLock<Option<Regex>> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"^(?i)https?://[a-z0-9](?:[a-z0-9.-]*[a-z0-9])?(?::\d{1,5})?(?:[/?#]\S*)?$").ok()
    })
    .as_ref()
    .map(|re| re.is_match(s))
    .unwrap_or(false)
}

/// Integer id from a number or numeric string.
pub fn as_id(v: &Value) -> Option<i64> {
    match v {
        Value::Number(n) => n.as_i64(),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

/// Trimmed string value, empty when absent.
pub fn text(body: &HashMap<String, Value>, field: &str) -> String {
    body.get(field)
        .and_then(Value::as_str)
        .map(|s| s.trim().to_string())
        .unwrap_or_default()
}
