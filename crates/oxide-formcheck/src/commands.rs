//! Command implementations.

use std::path::Path;

use oxide_actions::{validate_request, ActionError, ActionResult, Request};
use oxide_form_session::{FormDefaults, SessionConfig, SessionOptions};
use oxide_forms::{render_bootstrap_form, RenderOptions, Schema};
use tracing::debug;

use crate::error::{CheckError, Result};

/// Reads a file, keeping its path in the error.
pub async fn read_file(path: &Path) -> Result<Vec<u8>> {
    tokio::fs::read(path).await.map_err(|source| CheckError::Read {
        path: path.to_path_buf(),
        source,
    })
}

/// Loads a schema from a JSON file.
pub async fn load_schema(path: &Path) -> Result<Schema> {
    let json = read_file(path).await?;
    let schema = Schema::from_json(&String::from_utf8_lossy(&json))?;
    debug!(path = %path.display(), fields = schema.fields().len(), "loaded schema");
    Ok(schema)
}

fn request(body: Vec<u8>, content_type: &str) -> Request {
    Request::post("/")
        .header("Content-Type", content_type)
        .body(body)
}

/// Status of the error envelope for a body that could not be extracted.
fn extraction_status(err: &ActionError) -> u16 {
    match err {
        ActionError::MissingContentType | ActionError::UnsupportedContentType(_) => 415,
        _ => 400,
    }
}

/// Validates a request body the way a form action would.
///
/// The returned envelope is a success for a valid form, a failure with
/// status 400 for an invalid one, and an error when the body cannot be
/// read as a form at all.
pub async fn validate_body(schema: &Schema, body: Vec<u8>, content_type: &str) -> ActionResult {
    match validate_request(&request(body, content_type), schema).await {
        Ok((form, _)) => ActionResult::for_form(form),
        Err(err) => ActionResult::error(extraction_status(&err), err.to_string()),
    }
}

/// Merges project defaults and per-form options over the library defaults.
pub fn effective_config(defaults: Option<&str>, options: Option<&str>) -> Result<SessionConfig> {
    let defaults = match defaults {
        Some(json) => FormDefaults::from_json(json)?,
        None => FormDefaults::default(),
    };
    let options = match options {
        Some(json) => SessionOptions::from_json(json)?,
        None => SessionOptions::default(),
    };
    Ok(defaults.config(&options))
}

/// Renders the fallback form, re-populated from `body` when given.
///
/// A body that cannot be read as a form renders the initial form.
pub async fn render_form(
    schema: &Schema,
    body: Option<(Vec<u8>, &str)>,
    options: &RenderOptions,
) -> String {
    let result = match body {
        Some((body, content_type)) => {
            match validate_request(&request(body, content_type), schema).await {
                Ok((form, _)) => form,
                Err(err) => {
                    debug!(error = %err, "body is not a form, rendering initial state");
                    schema.initial()
                }
            }
        }
        None => schema.initial(),
    };
    render_bootstrap_form(schema, &result, options)
}
