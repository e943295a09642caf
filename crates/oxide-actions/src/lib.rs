//! # oxide-actions
//!
//! The request/response boundary of a form action.
//!
//! This crate provides:
//! - Form body extraction for `application/x-www-form-urlencoded` and
//!   `multipart/form-data` requests
//! - The `{ form, ...fields }` payload and the four action outcomes
//!   (success, failure, redirect, error)
//! - An `action_result` helper so bare endpoints answer with the same
//!   envelope as form actions
//!
//! ## Quick Start
//!
//! ```ignore
//! use oxide_actions::{fail, success, validate_request, FormPayload, Request, ActionResult};
//! use oxide_forms::{FieldDef, Schema};
//!
//! async fn contact(req: Request) -> ActionResult {
//!     let schema = Schema::new().field(FieldDef::email("email").required());
//!     let (form, _payload) = match validate_request(&req, &schema).await {
//!         Ok(extracted) => extracted,
//!         Err(err) => return ActionResult::error(415, err.to_string()),
//!     };
//!
//!     if !form.is_valid() {
//!         return fail(400, form);
//!     }
//!
//!     // persist...
//!     success(FormPayload::new(form).with("message", "Thanks!"))
//! }
//! ```
//!
//! ## File uploads
//!
//! ```ignore
//! let (mut form, payload) = validate_request(&req, &schema).await?;
//! if !form.is_valid() {
//!     return fail(400, form);
//! }
//! match payload.file("avatar") {
//!     Ok(file) => store(&file.file_name, file.data.clone()).await,
//!     Err(_) => {
//!         form.set_error("avatar", "Please upload an image.");
//!         return fail(400, form);
//!     }
//! }
//! ```
//!
//! ## Endpoints
//!
//! ```ignore
//! use oxide_actions::{action_result, ActionKind, FormPayload};
//!
//! let data = FormPayload::new(form).into_data()?;
//! let response = action_result(ActionKind::Failure, data, None); // 400
//! ```

mod action;
pub mod body;
mod error;
mod handler;
mod request;
mod response;

pub use action::{
    action_result, fail, success, ActionKind, ActionResult, FormPayload, FORM_KEY, MESSAGE_KEY,
};
pub use error::{ActionError, Result};
pub use handler::{handler, BoxFuture, Handler};
pub use request::{validate_request, Method, Request};
pub use response::Response;
