//! # oxide-form-session
//!
//! Client-side state for forms validated by `oxide-forms`.
//!
//! A [`FormSession`] holds the observable state of one form: its values,
//! errors, status message and submit flags. Each piece is a [`Store`] that
//! can be read, updated and subscribed to. Hooking a [`Transport`] into a
//! session with [`FormSession::enhance`] gives an [`Enhancer`] that submits
//! without a page reload and reconciles the action's response.
//!
//! ## Quick Start
//!
//! ```ignore
//! use oxide_form_session::{FormSession, HandlerTransport, SessionOptions};
//!
//! let session: FormSession = FormSession::new(schema.initial(), &SessionOptions::new().delay_ms(500));
//! let enhancer = session.enhance(HandlerTransport::new("/contact", handler(contact)));
//!
//! session.set_value("email", "ada@example.com");
//! enhancer.submit_values().await?;
//!
//! if let Some(message) = session.message().get() {
//!     println!("{}", message.text);
//! }
//! ```
//!
//! ## Several forms on one page
//!
//! Give every form its own session and its own schema id. Sessions share
//! nothing, and the form id travels with each submission, so the action
//! can tell which form posted by comparing
//! [`FormData::form_id`](oxide_forms::FormData::form_id) with the schema id.
//!
//! ```ignore
//! let login: FormSession = defaults.session(login_schema.initial(), &SessionOptions::default());
//! let register: FormSession = defaults.session(register_schema.initial(), &SessionOptions::default());
//! ```

mod config;
mod defaults;
mod enhance;
mod error;
mod message;
mod session;
mod store;
mod transport;

pub use config::{ClearOnSubmit, MultipleSubmits, SessionConfig, SessionOptions};
pub use defaults::FormDefaults;
pub use enhance::Enhancer;
pub use error::{Result, SessionError, TransportError};
pub use message::{MessageStatus, StatusMessage};
pub use session::{FormSession, SessionMessage, SubmitState};
pub use store::Store;
pub use transport::{transport_fn, FnTransport, HandlerTransport, Transport};
