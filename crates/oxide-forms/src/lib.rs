//! # oxide-forms
//!
//! Schema-driven validation of submitted forms.
//!
//! This crate provides:
//! - Declarative schemas with typed field kinds and constraints
//! - A validation gateway that turns a payload into a [`ValidationResult`]
//!   and never fails on bad input
//! - Form payloads carrying text values and uploaded files
//! - Bootstrap 5 rendering for the no-script fallback
//!
//! ## Quick Start
//!
//! ```rust
//! use oxide_forms::{validate, FieldDef, FormData, Schema};
//!
//! let schema = Schema::new()
//!     .field(FieldDef::text("name").required().max_length(150))
//!     .field(FieldDef::email("email").required())
//!     .field(FieldDef::integer("age").range(Some(18.0), None));
//!
//! let payload: FormData = [("name", "Ada"), ("age", "36")].into_iter().collect();
//! let result = validate(&payload, &schema);
//!
//! assert!(!result.is_valid());
//! assert_eq!(result.errors_for("email"), ["This field is required.".to_string()]);
//! assert_eq!(result.value("age"), Some(&serde_json::json!(36)));
//! ```
//!
//! ## File uploads
//!
//! Files are never validated. Validate the text fields first, then pull
//! the attachment out of the same payload; [`FormData::file`] refuses to
//! hand out a text entry as a file.
//!
//! ```rust
//! use oxide_forms::{validate, FieldDef, FormData, Schema, UploadedFile};
//!
//! let schema = Schema::new().field(FieldDef::text("title").required());
//! let payload = FormData::new()
//!     .text_field("title", "Holiday")
//!     .file_field("photo", UploadedFile::new("beach.jpg", &b"..."[..]));
//!
//! let result = validate(&payload, &schema);
//! assert!(result.is_valid());
//!
//! let photo = payload.file("photo").expect("photo was uploaded");
//! assert_eq!(photo.file_name, "beach.jpg");
//! assert!(payload.file("title").is_err());
//! ```
//!
//! ## Several forms on one page
//!
//! Give each schema its own id. The rendered form posts it back in a
//! hidden `__form_id` field, and the result's [`ValidationResult::id`]
//! tells the handler which form was submitted.

mod error;
mod gateway;
pub mod path;
mod payload;
pub mod render;
mod result;
mod schema;
pub mod validation;

pub use error::{FormError, Result, ValidationErrors};
pub use gateway::validate;
pub use payload::{FormData, FormEntry, UploadedFile, FORM_ID_FIELD};
pub use render::{render_bootstrap_field, render_bootstrap_form, RenderOptions};
pub use result::ValidationResult;
pub use schema::{FieldDef, FieldKind, FieldSpec, Schema, SchemaSpec};
