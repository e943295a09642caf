//! Session configuration.
//!
//! [`SessionConfig`] is the effective configuration of a session. It is
//! built by merging [`SessionOptions`] over the library defaults, one key
//! at a time: a key present in the options replaces the default, a missing
//! key keeps it.

use serde::{Deserialize, Serialize};

/// What happens when a submit starts while another is in flight.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum MultipleSubmits {
    /// Reject the new submit.
    #[default]
    Prevent,
    /// Let the new submit win; the older response is discarded.
    Abort,
    /// Reconcile every response in arrival order.
    Allow,
}

/// Which session state is cleared when a submit starts.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ClearOnSubmit {
    None,
    Errors,
    Message,
    #[default]
    ErrorsAndMessage,
}

impl ClearOnSubmit {
    /// Whether errors are cleared when a submission starts.
    pub fn clears_errors(self) -> bool {
        matches!(self, Self::Errors | Self::ErrorsAndMessage)
    }

    /// Whether the message is cleared when a submission starts.
    pub fn clears_message(self) -> bool {
        matches!(self, Self::Message | Self::ErrorsAndMessage)
    }
}

/// Effective configuration of a form session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionConfig {
    /// Selector of the element that marks a field as invalid.
    pub error_selector: String,
    /// Milliseconds before a pending submission is flagged as delayed.
    pub delay_ms: u64,
    /// Milliseconds before a pending submission is flagged as timed out.
    pub timeout_ms: u64,
    /// Reset values to the initial data after a successful submit.
    pub reset_form: bool,
    pub multiple_submits: MultipleSubmits,
    pub clear_on_submit: ClearOnSubmit,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            error_selector: ".has-error".to_string(),
            delay_ms: 300,
            timeout_ms: 8000,
            reset_form: false,
            multiple_submits: MultipleSubmits::Prevent,
            clear_on_submit: ClearOnSubmit::ErrorsAndMessage,
        }
    }
}

impl SessionConfig {
    /// Overrides every key present in `options`.
    #[must_use]
    pub fn merge(&self, options: &SessionOptions) -> Self {
        Self {
            error_selector: options
                .error_selector
                .clone()
                .unwrap_or_else(|| self.error_selector.clone()),
            delay_ms: options.delay_ms.unwrap_or(self.delay_ms),
            timeout_ms: options.timeout_ms.unwrap_or(self.timeout_ms),
            reset_form: options.reset_form.unwrap_or(self.reset_form),
            multiple_submits: options.multiple_submits.unwrap_or(self.multiple_submits),
            clear_on_submit: options.clear_on_submit.unwrap_or(self.clear_on_submit),
        }
    }

    /// The library defaults with `options` merged over them.
    pub fn from_options(options: &SessionOptions) -> Self {
        Self::default().merge(options)
    }

    /// The class name behind a plain `.class` error selector.
    pub fn error_class(&self) -> Option<&str> {
        let class = self.error_selector.strip_prefix('.')?;
        let plain = !class.is_empty()
            && class
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_');
        plain.then_some(class)
    }
}

/// Partial configuration; every key is optional.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SessionOptions {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error_selector: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub delay_ms: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub timeout_ms: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reset_form: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub multiple_submits: Option<MultipleSubmits>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub clear_on_submit: Option<ClearOnSubmit>,
}

impl SessionOptions {
    /// Options that override nothing.
    pub fn new() -> Self {
        Self::default()
    }

    /// Parses options from a JSON object.
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    /// Overrides `error_selector`.
    #[must_use]
    pub fn error_selector(mut self, selector: impl Into<String>) -> Self {
        self.error_selector = Some(selector.into());
        self
    }

    /// Overrides `delay_ms`.
    #[must_use]
    pub fn delay_ms(mut self, ms: u64) -> Self {
        self.delay_ms = Some(ms);
        self
    }

    /// Overrides `timeout_ms`.
    #[must_use]
    pub fn timeout_ms(mut self, ms: u64) -> Self {
        self.timeout_ms = Some(ms);
        self
    }

    /// Overrides `reset_form`.
    #[must_use]
    pub fn reset_form(mut self, reset: bool) -> Self {
        self.reset_form = Some(reset);
        self
    }

    /// Overrides `multiple_submits`.
    #[must_use]
    pub fn multiple_submits(mut self, policy: MultipleSubmits) -> Self {
        self.multiple_submits = Some(policy);
        self
    }

    /// Overrides `clear_on_submit`.
    #[must_use]
    pub fn clear_on_submit(mut self, clear: ClearOnSubmit) -> Self {
        self.clear_on_submit = Some(clear);
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_merge_overrides_only_given_keys() {
        let options = SessionOptions::new().delay_ms(500);
        let config = SessionConfig::from_options(&options);

        assert_eq!(config.delay_ms, 500);
        let defaults = SessionConfig::default();
        assert_eq!(config.error_selector, defaults.error_selector);
        assert_eq!(config.timeout_ms, defaults.timeout_ms);
        assert_eq!(config.reset_form, defaults.reset_form);
        assert_eq!(config.multiple_submits, defaults.multiple_submits);
        assert_eq!(config.clear_on_submit, defaults.clear_on_submit);
    }

    #[test]
    fn test_merge_with_empty_options_is_identity() {
        let config = SessionConfig::default();
        assert_eq!(config.merge(&SessionOptions::default()), config);
    }

    #[test]
    fn test_layers_apply_in_order() {
        let project = SessionOptions::new().delay_ms(500).reset_form(true);
        let form = SessionOptions::new().delay_ms(100);
        let config = SessionConfig::default().merge(&project).merge(&form);

        assert_eq!(config.delay_ms, 100);
        assert!(config.reset_form);
    }

    #[test]
    fn test_options_from_json() {
        let options = SessionOptions::from_json(
            r#"{"delay_ms": 500, "multiple_submits": "abort", "clear_on_submit": "errors-and-message"}"#,
        )
        .unwrap();
        assert_eq!(options.delay_ms, Some(500));
        assert_eq!(options.multiple_submits, Some(MultipleSubmits::Abort));
        assert_eq!(options.timeout_ms, None);

        assert!(SessionOptions::from_json(r#"{"delay": 1}"#).is_err());
    }

    #[test]
    fn test_error_class() {
        assert_eq!(SessionConfig::default().error_class(), Some("has-error"));
        let config = SessionConfig::from_options(
            &SessionOptions::new().error_selector("[aria-invalid=\"true\"]"),
        );
        assert_eq!(config.error_class(), None);
    }

    #[test]
    fn test_clear_on_submit_flags() {
        assert!(ClearOnSubmit::ErrorsAndMessage.clears_errors());
        assert!(ClearOnSubmit::ErrorsAndMessage.clears_message());
        assert!(!ClearOnSubmit::Errors.clears_message());
        assert!(!ClearOnSubmit::None.clears_errors());
    }
}
