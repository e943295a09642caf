//! The outcome of validating a payload against a schema.

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::error::{Result, ValidationErrors};
use crate::path::{get_path, insert_path};

/// Structured outcome of validating a payload.
///
/// `valid` is only ever true while `errors` is empty; every constructor
/// and mutator keeps it that way, deserialization included.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(from = "ResultRepr")]
pub struct ValidationResult {
    id: String,
    valid: bool,
    posted: bool,
    data: Map<String, Value>,
    errors: ValidationErrors,
}

#[derive(Deserialize)]
struct ResultRepr {
    #[serde(default)]
    id: String,
    #[serde(default)]
    valid: bool,
    #[serde(default)]
    posted: bool,
    #[serde(default)]
    data: Map<String, Value>,
    #[serde(default)]
    errors: ValidationErrors,
}

impl From<ResultRepr> for ValidationResult {
    fn from(repr: ResultRepr) -> Self {
        Self {
            valid: repr.valid && repr.errors.is_empty(),
            id: repr.id,
            posted: repr.posted,
            data: repr.data,
            errors: repr.errors,
        }
    }
}

impl ValidationResult {
    /// Creates the result of a submission: valid exactly when there are no errors.
    pub fn posted(id: impl Into<String>, data: Map<String, Value>, errors: ValidationErrors) -> Self {
        Self {
            id: id.into(),
            valid: errors.is_empty(),
            posted: true,
            data,
            errors,
        }
    }

    /// Creates an initial-load result: not posted, not valid, no errors.
    pub fn initial(id: impl Into<String>, data: Map<String, Value>) -> Self {
        Self {
            id: id.into(),
            valid: false,
            posted: false,
            data,
            errors: ValidationErrors::new(),
        }
    }

    /// Returns the form id.
    pub fn id(&self) -> &str {
        &self.id
    }

    /// Returns whether the data passed validation.
    pub fn is_valid(&self) -> bool {
        self.valid
    }

    /// Returns whether this result comes from a submission.
    pub fn is_posted(&self) -> bool {
        self.posted
    }

    /// Returns the parsed data (partial when invalid).
    pub fn data(&self) -> &Map<String, Value> {
        &self.data
    }

    /// Returns the field errors.
    pub fn errors(&self) -> &ValidationErrors {
        &self.errors
    }

    /// Returns the value at a dotted field path.
    pub fn value(&self, path: &str) -> Option<&Value> {
        get_path(&self.data, path)
    }

    /// Returns the messages recorded for a field path.
    pub fn errors_for(&self, path: &str) -> &[String] {
        self.errors.get(path).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Records an error found by the handler after validation.
    ///
    /// The result becomes invalid.
    pub fn set_error(&mut self, path: &str, message: impl Into<String>) {
        self.errors.add(path, message);
        self.valid = false;
    }

    /// Overwrites a value, e.g. to blank a password before echoing it back.
    pub fn set_value(&mut self, path: &str, value: impl Into<Value>) {
        insert_path(&mut self.data, path, value.into());
    }

    /// Deserializes the parsed data into a typed value.
    pub fn data_as<T: DeserializeOwned>(&self) -> Result<T> {
        Ok(serde_json::from_value(Value::Object(self.data.clone()))?)
    }

    /// Splits the result into its data and errors.
    pub fn into_parts(self) -> (Map<String, Value>, ValidationErrors) {
        (self.data, self.errors)
    }
}
