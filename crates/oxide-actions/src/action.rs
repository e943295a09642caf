//! Action results: what a form handler returns.
//!
//! A handler answers a submission with one of four outcomes. Success and
//! failure carry a data object shaped `{ form, ...fields }`, where `form` is
//! the [`ValidationResult`] and the remaining keys are application fields
//! such as a status message.

use oxide_forms::ValidationResult;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use tracing::warn;

use crate::error::Result;
use crate::response::Response;

/// Key of the validation result inside action data.
pub const FORM_KEY: &str = "form";
/// Key of the conventional status message inside action data.
pub const MESSAGE_KEY: &str = "message";

/// The `{ form, ...fields }` payload of a form action.
#[derive(Debug, Clone, PartialEq)]
pub struct FormPayload {
    form: ValidationResult,
    fields: Map<String, Value>,
}

impl FormPayload {
    /// Creates a payload carrying only the form.
    pub fn new(form: ValidationResult) -> Self {
        Self {
            form,
            fields: Map::new(),
        }
    }

    /// Adds an application field next to the form.
    ///
    /// The `form` key is reserved and ignored here.
    #[must_use]
    pub fn with(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        let key = key.into();
        if key == FORM_KEY {
            warn!("ignoring application field named `form`");
        } else {
            self.fields.insert(key, value.into());
        }
        self
    }

    /// Adds a serializable application field.
    pub fn with_serialized<T: Serialize>(self, key: impl Into<String>, value: &T) -> Result<Self> {
        let value = serde_json::to_value(value)?;
        Ok(self.with(key, value))
    }

    /// Attaches a status message.
    pub fn message<T: Serialize>(self, message: &T) -> Result<Self> {
        self.with_serialized(MESSAGE_KEY, message)
    }

    /// Returns the form.
    pub fn form(&self) -> &ValidationResult {
        &self.form
    }

    /// Returns the form mutably, e.g. to add an error found after validation.
    pub fn form_mut(&mut self) -> &mut ValidationResult {
        &mut self.form
    }

    /// Flattens the payload into an action data object.
    pub fn into_data(self) -> Result<Map<String, Value>> {
        let mut data = Map::new();
        data.insert(FORM_KEY.to_string(), serde_json::to_value(&self.form)?);
        data.extend(self.fields);
        Ok(data)
    }
}

impl From<ValidationResult> for FormPayload {
    fn from(form: ValidationResult) -> Self {
        Self::new(form)
    }
}

/// The kind of an action result.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ActionKind {
    /// The submission was accepted.
    Success,
    /// The submission was rejected; the page re-renders with errors.
    Failure,
    /// The client should navigate elsewhere.
    Redirect,
    /// The handler itself failed.
    Error,
}

impl ActionKind {
    /// Default status code for this kind.
    pub fn default_status(self) -> u16 {
        match self {
            Self::Success => 200,
            Self::Failure => 400,
            Self::Redirect => 303,
            Self::Error => 500,
        }
    }
}

/// The outcome of a form action, serialized as a tagged envelope:
/// `{"type": "failure", "status": 400, "data": {...}}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum ActionResult {
    /// Accepted submission.
    Success {
        status: u16,
        #[serde(default)]
        data: Map<String, Value>,
    },
    /// Rejected submission.
    Failure {
        status: u16,
        #[serde(default)]
        data: Map<String, Value>,
    },
    /// Navigate to `location`.
    Redirect { status: u16, location: String },
    /// Handler error.
    Error { status: u16, message: String },
}

/// Wraps a payload in a failure result.
///
/// Statuses outside 400..=599 fall back to 400.
pub fn fail(status: u16, payload: impl Into<FormPayload>) -> ActionResult {
    let status = if (400..=599).contains(&status) {
        status
    } else {
        warn!(status, "failure status must be 4xx or 5xx, using 400");
        400
    };
    ActionResult::with_payload(ActionKind::Failure, status, payload.into())
}

/// Wraps a payload in a success result.
pub fn success(payload: impl Into<FormPayload>) -> ActionResult {
    ActionResult::with_payload(ActionKind::Success, 200, payload.into())
}

/// Builds an action-result response from a bare endpoint.
///
/// `data` is the `{ form, ... }` object for success and failure, the target
/// location for redirects and the message for errors. Without an explicit
/// status the kind's default is used. The response body is the same
/// envelope a form action produces, so a form session reconciles it the
/// same way.
pub fn action_result(kind: ActionKind, data: impl Into<Value>, status: Option<u16>) -> Response {
    let status = status.unwrap_or_else(|| kind.default_status());
    let result = match (kind, data.into()) {
        (ActionKind::Success, Value::Object(data)) => ActionResult::Success { status, data },
        (ActionKind::Failure, Value::Object(data)) => ActionResult::Failure { status, data },
        (ActionKind::Redirect, Value::String(location)) => {
            ActionResult::Redirect { status, location }
        }
        (ActionKind::Error, Value::String(message)) => ActionResult::Error { status, message },
        (ActionKind::Error, other) => ActionResult::Error {
            status,
            message: other.to_string(),
        },
        (kind, _) => {
            warn!(?kind, "action data has the wrong shape for its kind");
            ActionResult::Error {
                status: 500,
                message: format!("invalid data for a {kind:?} action result"),
            }
        }
    };
    result.into_response()
}

impl ActionResult {
    fn with_payload(kind: ActionKind, status: u16, payload: FormPayload) -> Self {
        match payload.into_data() {
            Ok(data) if kind == ActionKind::Failure => Self::Failure { status, data },
            Ok(data) => Self::Success { status, data },
            Err(err) => {
                warn!(error = %err, "failed to serialize form payload");
                Self::Error {
                    status: 500,
                    message: err.to_string(),
                }
            }
        }
    }

    /// Success for a valid form, failure with status 400 otherwise.
    pub fn for_form(payload: impl Into<FormPayload>) -> Self {
        let payload = payload.into();
        if payload.form().is_valid() {
            success(payload)
        } else {
            fail(400, payload)
        }
    }

    /// Creates a redirect result.
    pub fn redirect(status: u16, location: impl Into<String>) -> Self {
        Self::Redirect {
            status,
            location: location.into(),
        }
    }

    /// Creates an error result.
    pub fn error(status: u16, message: impl Into<String>) -> Self {
        Self::Error {
            status,
            message: message.into(),
        }
    }

    /// Returns the kind of this result.
    pub fn kind(&self) -> ActionKind {
        match self {
            Self::Success { .. } => ActionKind::Success,
            Self::Failure { .. } => ActionKind::Failure,
            Self::Redirect { .. } => ActionKind::Redirect,
            Self::Error { .. } => ActionKind::Error,
        }
    }

    /// Returns the status code.
    pub fn status(&self) -> u16 {
        match self {
            Self::Success { status, .. }
            | Self::Failure { status, .. }
            | Self::Redirect { status, .. }
            | Self::Error { status, .. } => *status,
        }
    }

    /// Returns the data object of a success or failure.
    pub fn data(&self) -> Option<&Map<String, Value>> {
        match self {
            Self::Success { data, .. } | Self::Failure { data, .. } => Some(data),
            _ => None,
        }
    }

    /// Returns an application field of the data object.
    pub fn field(&self, key: &str) -> Option<&Value> {
        self.data().and_then(|data| data.get(key))
    }

    /// Decodes the validation result carried by this action, if any.
    pub fn form(&self) -> Result<Option<ValidationResult>> {
        match self.field(FORM_KEY) {
            Some(form) => Ok(Some(serde_json::from_value(form.clone())?)),
            None => Ok(None),
        }
    }

    /// Encodes the result as a JSON response.
    ///
    /// The HTTP status mirrors the result status, except for redirects,
    /// which travel as a 200 envelope the client follows itself.
    pub fn into_response(self) -> Response {
        let http_status = match &self {
            Self::Redirect { .. } => 200,
            other => other.status(),
        };
        Response::json(&self).status(http_status)
    }

    /// Decodes an action-result envelope from a response body.
    pub fn from_response(response: &Response) -> Result<Self> {
        response.json_body()
    }
}
