//! The form session: observable state for one form on a page.

use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};
use std::sync::Arc;

use oxide_actions::{ActionResult, MESSAGE_KEY};
use oxide_forms::path::{flatten, get_path, insert_path};
use oxide_forms::{FormData, ValidationErrors, ValidationResult, FORM_ID_FIELD};
use serde::de::DeserializeOwned;
use serde_json::{Map, Value};
use tracing::debug;

use crate::config::{SessionConfig, SessionOptions};
use crate::enhance::Enhancer;
use crate::error::Result;
use crate::message::StatusMessage;
use crate::store::Store;
use crate::transport::Transport;

/// Where a session stands in its submit cycle.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum SubmitState {
    /// Nothing submitted yet.
    #[default]
    Idle,
    /// A submission is in flight.
    Submitting,
    /// The action accepted the last submission.
    Succeeded,
    /// The action rejected the last submission with errors.
    Rejected,
    /// The action asked for navigation; see the `redirect` store.
    Redirected,
    /// The action errored or the transport failed; see the `failure` store.
    Failed,
}

/// Bounds for the message type carried by a session.
pub trait SessionMessage: Clone + PartialEq + DeserializeOwned + Send + Sync + 'static {}

impl<T> SessionMessage for T where T: Clone + PartialEq + DeserializeOwned + Send + Sync + 'static {}

#[derive(Debug)]
struct Inner {
    id: String,
    config: SessionConfig,
    initial: Map<String, Value>,
    generation: AtomicU64,
    in_flight: AtomicUsize,
}

/// Client-side state of one form.
///
/// A session is a cheap handle: clones observe and mutate the same state.
/// Two sessions created separately share nothing, so every form on a page
/// gets its own.
#[derive(Debug)]
pub struct FormSession<M = StatusMessage> {
    inner: Arc<Inner>,
    values: Store<Map<String, Value>>,
    errors: Store<ValidationErrors>,
    valid: Store<bool>,
    posted: Store<bool>,
    submitting: Store<bool>,
    delayed: Store<bool>,
    timeout: Store<bool>,
    message: Store<Option<M>>,
    redirect: Store<Option<String>>,
    failure: Store<Option<String>>,
    state: Store<SubmitState>,
}

impl<M> Clone for FormSession<M> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
            values: self.values.clone(),
            errors: self.errors.clone(),
            valid: self.valid.clone(),
            posted: self.posted.clone(),
            submitting: self.submitting.clone(),
            delayed: self.delayed.clone(),
            timeout: self.timeout.clone(),
            message: self.message.clone(),
            redirect: self.redirect.clone(),
            failure: self.failure.clone(),
            state: self.state.clone(),
        }
    }
}

impl<M: SessionMessage> FormSession<M> {
    /// Creates a session from an initial validation result.
    ///
    /// `options` are merged over the library defaults.
    pub fn new(initial: ValidationResult, options: &SessionOptions) -> Self {
        Self::with_config(initial, SessionConfig::from_options(options))
    }

    /// Creates a session with an already merged configuration.
    pub fn with_config(initial: ValidationResult, config: SessionConfig) -> Self {
        let valid = initial.is_valid();
        let posted = initial.is_posted();
        let id = initial.id().to_string();
        let (data, errors) = initial.into_parts();

        debug!(form = %id, fields = data.len(), "created form session");
        Self {
            inner: Arc::new(Inner {
                id,
                config,
                initial: data.clone(),
                generation: AtomicU64::new(0),
                in_flight: AtomicUsize::new(0),
            }),
            values: Store::new(data),
            errors: Store::new(errors),
            valid: Store::new(valid),
            posted: Store::new(posted),
            submitting: Store::new(false),
            delayed: Store::new(false),
            timeout: Store::new(false),
            message: Store::new(None),
            redirect: Store::new(None),
            failure: Store::new(None),
            state: Store::new(SubmitState::Idle),
        }
    }

    /// Returns the form id.
    pub fn id(&self) -> &str {
        &self.inner.id
    }

    /// Returns the effective configuration.
    pub fn config(&self) -> &SessionConfig {
        &self.inner.config
    }

    /// The current field values, nested by dotted path.
    pub fn values(&self) -> &Store<Map<String, Value>> {
        &self.values
    }

    /// Errors from the last reconciled result, keyed by field path.
    pub fn errors(&self) -> &Store<ValidationErrors> {
        &self.errors
    }

    /// Whether the last reconciled form was valid.
    pub fn valid(&self) -> &Store<bool> {
        &self.valid
    }

    /// Whether the values came back from a submission.
    pub fn posted(&self) -> &Store<bool> {
        &self.posted
    }

    /// True while at least one submission is in flight.
    pub fn submitting(&self) -> &Store<bool> {
        &self.submitting
    }

    /// Raised once the pending submission outlasts `delay_ms`.
    pub fn delayed(&self) -> &Store<bool> {
        &self.delayed
    }

    /// Raised once the pending submission outlasts `timeout_ms`.
    pub fn timeout(&self) -> &Store<bool> {
        &self.timeout
    }

    /// The message published by the last result.
    pub fn message(&self) -> &Store<Option<M>> {
        &self.message
    }

    /// Where the last result asked to navigate.
    pub fn redirect(&self) -> &Store<Option<String>> {
        &self.redirect
    }

    /// What went wrong with the last submission, if it failed.
    pub fn failure(&self) -> &Store<Option<String>> {
        &self.failure
    }

    /// Where the session stands in its submit cycle.
    pub fn state(&self) -> &Store<SubmitState> {
        &self.state
    }

    /// Returns the current value at a dotted path.
    pub fn value(&self, path: &str) -> Option<Value> {
        self.values.with(|values| get_path(values, path).cloned())
    }

    /// Sets the value at a dotted path, as user input would.
    pub fn set_value(&self, path: &str, value: impl Into<Value>) {
        let value = value.into();
        self.values
            .update(|values| insert_path(values, path, value));
    }

    /// Restores the initial values and clears every outcome.
    pub fn reset(&self) {
        self.values.set(self.inner.initial.clone());
        self.errors.set(ValidationErrors::new());
        self.message.set(None);
        self.redirect.set(None);
        self.failure.set(None);
        self.state.set(SubmitState::Idle);
    }

    /// Selectors of the inputs whose field has errors.
    ///
    /// Each target is scoped under the configured error selector, so a UI
    /// layer can highlight or focus the first one.
    pub fn error_targets(&self) -> Vec<String> {
        let selector = self.inner.config.error_selector.as_str();
        self.errors.with(|errors| {
            let mut targets: Vec<String> = Vec::new();
            for field in errors.fields() {
                if field == ValidationErrors::NON_FIELD {
                    continue;
                }
                let name = field.split('[').next().unwrap_or(field);
                let target = format!("{selector} [name=\"{name}\"]");
                if !targets.contains(&target) {
                    targets.push(target);
                }
            }
            targets
        })
    }

    /// Encodes the current values as a submission payload.
    ///
    /// Checked booleans become `on`, arrays become repeated entries, and
    /// unchecked booleans and nulls are left out. The form id travels as a
    /// hidden field.
    pub fn form_data(&self) -> FormData {
        let mut data = FormData::new();
        data.append_text(FORM_ID_FIELD, self.inner.id.clone());
        self.values.with(|values| {
            for (path, value) in flatten(values) {
                match value {
                    Value::Array(items) => {
                        for item in items {
                            append_scalar(&mut data, &path, item);
                        }
                    }
                    scalar => append_scalar(&mut data, &path, scalar),
                }
            }
        });
        data
    }

    /// Applies an action result to the session.
    ///
    /// Success and failure replace values and errors with the returned
    /// form and publish its message; a successful submit resets the values
    /// instead when `reset_form` is on. Redirects and errors leave values
    /// and errors untouched.
    ///
    /// The form and message are decoded before any store changes, so a
    /// result that fails to decode leaves the session as it was. A result
    /// carrying another form's id is ignored as a whole and the current
    /// state is returned.
    pub fn reconcile(&self, result: &ActionResult) -> Result<SubmitState> {
        let state = match result {
            ActionResult::Success { .. } | ActionResult::Failure { .. } => {
                let succeeded = matches!(result, ActionResult::Success { .. });
                let form = result.form()?;
                let message: Option<M> = result
                    .field(MESSAGE_KEY)
                    .map(|message| serde_json::from_value(message.clone()))
                    .transpose()?;
                if let Some(returned) = form.as_ref().filter(|form| form.id() != self.inner.id) {
                    debug!(form = %self.inner.id, returned = %returned.id(), "ignoring result of another form");
                    return Ok(self.state.get());
                }
                if let Some(form) = form {
                    self.apply_form(form, succeeded);
                }
                if let Some(message) = message {
                    self.message.set(Some(message));
                }
                if succeeded {
                    SubmitState::Succeeded
                } else {
                    SubmitState::Rejected
                }
            }
            ActionResult::Redirect { location, .. } => {
                self.redirect.set(Some(location.clone()));
                SubmitState::Redirected
            }
            ActionResult::Error { message, .. } => {
                self.failure.set(Some(message.clone()));
                SubmitState::Failed
            }
        };

        debug!(form = %self.inner.id, kind = ?result.kind(), status = result.status(), "reconciled action result");
        self.state.set(state);
        Ok(state)
    }

    /// Applies a returned validation result directly.
    pub fn reconcile_form(&self, form: ValidationResult) {
        let succeeded = form.is_valid();
        self.apply_form(form, succeeded);
    }

    fn apply_form(&self, form: ValidationResult, succeeded: bool) {
        let valid = form.is_valid();
        let posted = form.is_posted();
        if succeeded && self.inner.config.reset_form {
            self.values.set(self.inner.initial.clone());
            self.errors.set(ValidationErrors::new());
        } else {
            let (data, errors) = form.into_parts();
            self.values.set(data);
            self.errors.set(errors);
        }
        self.valid.set(valid);
        self.posted.set(posted);
    }

    /// Hooks a transport into this session's submissions.
    pub fn enhance<T: Transport>(&self, transport: T) -> Enhancer<M, T> {
        Enhancer::new(self.clone(), transport)
    }

    /// Marks the start of a submission.
    ///
    /// Returns `None` when another submission is in flight and the policy
    /// forbids a second one. Dropping the returned guard settles the
    /// submission, whether or not it ran to completion.
    pub(crate) fn begin_submit(&self, exclusive: bool) -> Option<Submission<M>> {
        if exclusive {
            self.inner
                .in_flight
                .compare_exchange(0, 1, Ordering::AcqRel, Ordering::Acquire)
                .ok()?;
        } else {
            self.inner.in_flight.fetch_add(1, Ordering::AcqRel);
        }
        let generation = self.inner.generation.fetch_add(1, Ordering::AcqRel) + 1;

        let clear = self.inner.config.clear_on_submit;
        if clear.clears_errors() {
            self.errors.set(ValidationErrors::new());
        }
        if clear.clears_message() {
            self.message.set(None);
        }
        self.redirect.set(None);
        self.failure.set(None);
        self.delayed.set(false);
        self.timeout.set(false);
        self.submitting.set(true);
        self.state.set(SubmitState::Submitting);
        Some(Submission {
            session: self.clone(),
            generation,
        })
    }

    pub(crate) fn fail_transport(&self, message: String) {
        self.failure.set(Some(message));
        self.state.set(SubmitState::Failed);
    }
}

impl<M> FormSession<M> {
    /// Marks the end of a submission; flags clear when none is left.
    ///
    /// A submission that never reached a result leaves the state at
    /// `Submitting`, which falls back to `Idle` here.
    fn finish_submit(&self) {
        let previous = self.inner.in_flight.fetch_sub(1, Ordering::AcqRel);
        if previous <= 1 {
            self.submitting.set(false);
            self.delayed.set(false);
            self.timeout.set(false);
            self.state.update(|state| {
                if *state == SubmitState::Submitting {
                    *state = SubmitState::Idle;
                }
            });
        }
    }
}

/// One in-flight submission of a session.
///
/// Settles the session when dropped, so a submit future cancelled by a
/// timeout or a `select!` does not leave it submitting.
#[derive(Debug)]
pub(crate) struct Submission<M> {
    session: FormSession<M>,
    generation: u64,
}

impl<M> Submission<M> {
    pub(crate) const fn generation(&self) -> u64 {
        self.generation
    }

    /// Whether no newer submission has started since this one.
    pub(crate) fn is_current(&self) -> bool {
        self.session.inner.generation.load(Ordering::Acquire) == self.generation
    }
}

impl<M> Drop for Submission<M> {
    fn drop(&mut self) {
        self.session.finish_submit();
    }
}

fn append_scalar(data: &mut FormData, path: &str, value: &Value) {
    match value {
        Value::Null | Value::Bool(false) => {}
        Value::Bool(true) => data.append_text(path, "on"),
        Value::String(text) => data.append_text(path, text.clone()),
        other => data.append_text(path, other.to_string()),
    }
}
