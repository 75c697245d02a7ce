//! Field-level validation errors returned by the `validate` methods on the
//! request parameter types.

use std::fmt;

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// A single field that failed validation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct FieldError {
    /// The name of the offending field, as it appears on the wire.
    pub field: String,

    /// Why the field was rejected.
    pub message: String,
}

/// Every field error found while validating one request.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ValidationErrors {
    pub fields: Vec<FieldError>,
}

impl ValidationErrors {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn single(field: &str, message: impl Into<String>) -> Self {
        let mut errors = Self::new();
        errors.add(field, message);
        errors
    }

    pub fn add(&mut self, field: &str, message: impl Into<String>) {
        self.fields.push(FieldError {
            field: field.to_string(),
            message: message.into(),
        });
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// `Ok(value)` when nothing was recorded, otherwise `Err(self)`.
    pub fn finish<T>(self, value: T) -> Result<T, Self> {
        if self.is_empty() { Ok(value) } else { Err(self) }
    }

    pub fn contains(&self, field: &str) -> bool {
        self.fields.iter().any(|f| f.field == field)
    }
}

impl fmt::Display for ValidationErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let fields = self
            .fields
            .iter()
            .map(|e| format!("{}: {}", e.field, e.message))
            .collect::<Vec<_>>()
            .join("; ");
        write!(f, "validation failed ({fields})")
    }
}

impl std::error::Error for ValidationErrors {}

/// Trims a required string field, recording an error when it is absent or
/// blank.
pub(crate) fn required(
    errors: &mut ValidationErrors,
    field: &str,
    value: Option<&str>,
) -> Option<String> {
    match value.map(str::trim) {
        Some(v) if !v.is_empty() => Some(v.to_string()),
        _ => {
            errors.add(field, format!("{field} is required"));
            None
        }
    }
}

/// Trims an optional string field; present-but-blank is an error because
/// the field would otherwise be cleared.
pub(crate) fn optional_non_blank(
    errors: &mut ValidationErrors,
    field: &str,
    value: Option<&str>,
) -> Option<String> {
    match value.map(str::trim) {
        Some("") => {
            errors.add(field, format!("{field} must not be empty"));
            None
        }
        Some(v) => Some(v.to_string()),
        None => None,
    }
}
