//! The default message type of a session.

use serde::{Deserialize, Serialize};

/// Severity of a [`StatusMessage`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MessageStatus {
    Success,
    Error,
    Warning,
}

/// A status message sent by an action next to its form.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatusMessage {
    pub status: MessageStatus,
    pub text: String,
}

impl StatusMessage {
    /// Creates a message with `status`.
    pub fn new(status: MessageStatus, text: impl Into<String>) -> Self {
        Self {
            status,
            text: text.into(),
        }
    }

    /// A success message.
    pub fn success(text: impl Into<String>) -> Self {
        Self::new(MessageStatus::Success, text)
    }

    /// An error message.
    pub fn error(text: impl Into<String>) -> Self {
        Self::new(MessageStatus::Error, text)
    }

    /// A warning message.
    pub fn warning(text: impl Into<String>) -> Self {
        Self::new(MessageStatus::Warning, text)
    }
}
