//! Error types for formcheck.

use std::path::PathBuf;

use thiserror::Error;

/// Errors raised while loading command inputs.
///
/// An invalid submission is not an error: it is reported in the printed
/// action result.
#[derive(Debug, Error)]
pub enum CheckError {
    #[error("failed to read {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid schema: {0}")]
    Schema(#[from] oxide_forms::FormError),

    #[error("invalid session options: {0}")]
    Options(#[from] serde_json::Error),
}

/// Result type alias for formcheck operations.
pub type Result<T> = std::result::Result<T, CheckError>;
