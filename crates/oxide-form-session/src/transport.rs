//! Ways of delivering a submission to its action.

use std::future::Future;

use oxide_actions::{ActionResult, BoxFuture, Handler, Request};
use oxide_forms::FormData;
use tracing::debug;

use crate::error::TransportError;

/// Delivers a form submission and returns the action's result.
pub trait Transport: Send + Sync {
    fn send(&self, data: FormData) -> BoxFuture<'_, Result<ActionResult, TransportError>>;
}

/// Posts submissions to an in-process action handler.
///
/// The payload goes through the same body encoding and envelope decoding
/// as a network round trip.
#[derive(Clone)]
pub struct HandlerTransport {
    path: String,
    handler: Handler,
}

impl HandlerTransport {
    /// Routes submissions to `handler` as a request to `path`.
    pub fn new(path: impl Into<String>, handler: Handler) -> Self {
        Self {
            path: path.into(),
            handler,
        }
    }
}

impl std::fmt::Debug for HandlerTransport {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HandlerTransport")
            .field("path", &self.path)
            .finish_non_exhaustive()
    }
}

impl Transport for HandlerTransport {
    fn send(&self, data: FormData) -> BoxFuture<'_, Result<ActionResult, TransportError>> {
        Box::pin(async move {
            let request = Request::post_form(self.path.clone(), &data)?;
            let response = (self.handler)(request).await;
            debug!(path = %self.path, status = response.status, "action responded");
            Ok(ActionResult::from_response(&response)?)
        })
    }
}

/// A transport backed by an async closure.
#[derive(Debug, Clone)]
pub struct FnTransport<F> {
    f: F,
}

/// Wraps an async closure into a [`Transport`].
pub fn transport_fn<F, Fut>(f: F) -> FnTransport<F>
where
    F: Fn(FormData) -> Fut + Send + Sync,
    Fut: Future<Output = Result<ActionResult, TransportError>> + Send + 'static,
{
    FnTransport { f }
}

impl<F, Fut> Transport for FnTransport<F>
where
    F: Fn(FormData) -> Fut + Send + Sync,
    Fut: Future<Output = Result<ActionResult, TransportError>> + Send + 'static,
{
    fn send(&self, data: FormData) -> BoxFuture<'_, Result<ActionResult, TransportError>> {
        Box::pin((self.f)(data))
    }
}
