//! Error types for form sessions.

use oxide_actions::ActionError;
use thiserror::Error;

/// Errors raised while sending a submission.
#[derive(Debug, Error)]
pub enum TransportError {
    #[error("request failed: {0}")]
    Request(String),

    #[error("invalid action response: {0}")]
    Action(#[from] ActionError),
}

/// Errors raised by a form session.
#[derive(Debug, Error)]
pub enum SessionError {
    #[error("a submission is already in flight")]
    AlreadySubmitting,

    #[error("submission was superseded by a newer one")]
    Superseded,

    #[error(transparent)]
    Transport(#[from] TransportError),

    #[error("failed to decode action result: {0}")]
    Decode(#[from] ActionError),

    #[error("failed to decode message: {0}")]
    Message(#[from] serde_json::Error),
}

/// Result type alias for session operations.
pub type Result<T> = std::result::Result<T, SessionError>;
