//! Permission template expansion.
//!
//! `@admin:{user}:api.v1.admin` with `{ "user": 42 }` becomes
//! `@admin:42:api.v1.admin`.

use crate::models::TemplateData;
use regex::{Captures, Regex};
use serde_json::Value;
use std::sync::OnceLock;
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TemplateError {
    #[error("no value for placeholder '{{{key}}}' in '{permission}'")]
    MissingKey { key: String, permission: String },

    #[error("invalid placeholder pattern: {0}")]
    InvalidPattern(String),
}

fn placeholder_pattern() -> Result<&'static Regex, TemplateError> {
    static PATTERN: OnceLock<Result<Regex, regex::Error>> = OnceLock::new();
    PATTERN
        .get_or_init(|| Regex::new(r"\{([a-zA-Z0-9]+)\}"))
        .as_ref()
        .map_err(|e| TemplateError::InvalidPattern(e.to_string()))
}

/// String form of a template value. `null` has none.
fn value_to_string(value: &Value) -> Option<String> {
    match value {
        Value::Null => None,
        Value::String(s) => Some(s.clone()),
        other => Some(other.to_string()),
    }
}

/// Substitute every `{identifier}` in `permission` from `data`.
///
/// Substituted text is never re-scanned. Fails on the first placeholder
/// without a value, so a half-expanded permission is never produced.
pub fn expand(permission: &str, data: &TemplateData) -> Result<String, TemplateError> {
    let pattern = placeholder_pattern()?;

    for captures in pattern.captures_iter(permission) {
        let key = &captures[1];
        if data.get(key).and_then(value_to_string).is_none() {
            return Err(TemplateError::MissingKey {
                key: key.to_string(),
                permission: permission.to_string(),
            });
        }
    }

    let expanded = pattern.replace_all(permission, |captures: &Captures| {
        data.get(&captures[1])
            .and_then(value_to_string)
            .unwrap_or_default()
    });

    Ok(expanded.into_owned())
}

/// Expand a batch of permissions; stops at the first failure.
pub fn expand_all(permissions: &[String], data: &TemplateData) -> Result<Vec<String>, TemplateError> {
    permissions
        .iter()
        .map(|permission| expand(permission, data))
        .collect()
}
