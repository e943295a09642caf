//! Error types for the action boundary.

use thiserror::Error;

/// Errors raised while extracting a request body or decoding a response.
///
/// None of these describe invalid form input; that is reported inside the
/// validation result.
#[derive(Debug, Error)]
pub enum ActionError {
    /// The request carries no `Content-Type` header.
    #[error("missing Content-Type header")]
    MissingContentType,

    /// The body is neither form-encoded nor multipart.
    #[error("unsupported content type: {0}")]
    UnsupportedContentType(String),

    /// The form-encoded body could not be decoded.
    #[error("malformed form body: {0}")]
    MalformedBody(String),

    /// The multipart body could not be decoded.
    #[error("multipart error: {0}")]
    Multipart(#[from] multer::Error),

    /// JSON (de)serialization failed.
    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Result type alias for action operations.
pub type Result<T> = std::result::Result<T, ActionError>;
