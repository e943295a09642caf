//! Project-wide session defaults.

use oxide_forms::ValidationResult;

use crate::config::{SessionConfig, SessionOptions};
use crate::session::{FormSession, SessionMessage};

/// Creates sessions from shared defaults.
///
/// Configuration is layered: library defaults, then the project options
/// held here, then the per-form options given to [`FormDefaults::session`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FormDefaults {
    options: SessionOptions,
}

impl FormDefaults {
    /// Holds `options` as the project layer.
    pub fn new(options: SessionOptions) -> Self {
        Self { options }
    }

    /// Parses the project options from JSON.
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        SessionOptions::from_json(json).map(Self::new)
    }

    /// Returns the project options.
    pub fn options(&self) -> &SessionOptions {
        &self.options
    }

    /// The effective configuration for a form with `overrides`.
    pub fn config(&self, overrides: &SessionOptions) -> SessionConfig {
        SessionConfig::default()
            .merge(&self.options)
            .merge(overrides)
    }

    /// Creates a session for `initial`.
    pub fn session<M: SessionMessage>(
        &self,
        initial: ValidationResult,
        overrides: &SessionOptions,
    ) -> FormSession<M> {
        FormSession::with_config(initial, self.config(overrides))
    }
}
