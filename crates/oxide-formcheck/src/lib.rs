//! # oxide-formcheck
//!
//! Runs form schemas outside an application: validate a recorded
//! submission, print the effective session configuration, or render the
//! no-script fallback form.

pub mod cli;
pub mod commands;
mod error;

pub use error::{CheckError, Result};
