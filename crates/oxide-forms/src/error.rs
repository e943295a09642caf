//! Error types for forms.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Form-specific errors.
///
/// These are caller-level faults. Validation problems in submitted data
/// never surface here; they are collected in [`ValidationErrors`].
#[derive(Debug, Error)]
pub enum FormError {
    /// The payload has no entry under this name.
    #[error("missing field: {0}")]
    MissingField(String),

    /// The entry exists but holds text where an uploaded file was expected.
    #[error("field {0} is not a file")]
    NotAFile(String),

    /// The schema definition is inconsistent.
    #[error("invalid schema: {0}")]
    InvalidSchema(String),

    /// A pattern constraint failed to compile.
    #[error("invalid pattern for field {field}: {source}")]
    InvalidPattern {
        field: String,
        #[source]
        source: regex::Error,
    },

    /// JSON (de)serialization failed.
    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Collection of validation errors keyed by field path.
///
/// Keys are dotted paths (`address.city`) or indexed paths (`tags[1]`);
/// form-level errors live under [`ValidationErrors::NON_FIELD`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ValidationErrors {
    errors: BTreeMap<String, Vec<String>>,
}

impl ValidationErrors {
    /// Key used for errors that do not belong to a single field.
    pub const NON_FIELD: &'static str = "__all__";

    /// Creates a new empty ValidationErrors.
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds an error for a field.
    pub fn add(&mut self, field: &str, message: impl Into<String>) {
        self.errors
            .entry(field.to_string())
            .or_default()
            .push(message.into());
    }

    /// Returns whether there are any errors.
    pub fn is_empty(&self) -> bool {
        self.errors.is_empty()
    }

    /// Returns the number of fields with errors.
    pub fn len(&self) -> usize {
        self.errors.len()
    }

    /// Returns errors for a specific field.
    pub fn get(&self, field: &str) -> Option<&Vec<String>> {
        self.errors.get(field)
    }

    /// Returns whether a field has at least one error.
    pub fn contains(&self, field: &str) -> bool {
        self.errors.contains_key(field)
    }

    /// Removes every error recorded for a field.
    pub fn remove(&mut self, field: &str) -> Option<Vec<String>> {
        self.errors.remove(field)
    }

    /// Removes all errors.
    pub fn clear(&mut self) {
        self.errors.clear();
    }

    /// Iterates over field paths in sorted order.
    pub fn fields(&self) -> impl Iterator<Item = &str> {
        self.errors.keys().map(String::as_str)
    }

    /// Iterates over `(field, messages)` pairs in sorted order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &[String])> {
        self.errors
            .iter()
            .map(|(field, messages)| (field.as_str(), messages.as_slice()))
    }

    /// Returns all errors as a flat list.
    pub fn all_errors(&self) -> Vec<(&str, &str)> {
        self.errors
            .iter()
            .flat_map(|(field, messages)| {
                messages
                    .iter()
                    .map(move |msg| (field.as_str(), msg.as_str()))
            })
            .collect()
    }
}

impl std::fmt::Display for ValidationErrors {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        for (field, messages) in &self.errors {
            for message in messages {
                writeln!(f, "{field}: {message}")?;
            }
        }
        Ok(())
    }
}

/// Result type alias for form operations.
pub type Result<T> = std::result::Result<T, FormError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_errors_are_grouped_by_field() {
        let mut errors = ValidationErrors::new();
        errors.add("email", "This field is required.");
        errors.add("email", "Enter a valid email address.");
        errors.add("age", "Enter a whole number.");

        assert_eq!(errors.len(), 2);
        assert_eq!(errors.get("email").map(Vec::len), Some(2));
        assert_eq!(errors.all_errors().len(), 3);
        assert_eq!(errors.fields().collect::<Vec<_>>(), vec!["age", "email"]);
    }

    #[test]
    fn test_errors_serialize_as_plain_map() {
        let mut errors = ValidationErrors::new();
        errors.add("name", "Too short.");

        let json = serde_json::to_value(&errors).unwrap();
        assert_eq!(json, serde_json::json!({"name": ["Too short."]}));

        let back: ValidationErrors = serde_json::from_value(json).unwrap();
        assert_eq!(back, errors);
    }

    #[test]
    fn test_display_lists_every_message() {
        let mut errors = ValidationErrors::new();
        errors.add(ValidationErrors::NON_FIELD, "Passwords do not match.");
        assert_eq!(errors.to_string(), "__all__: Passwords do not match.\n");
    }
}
