//! Enhanced submission: send a form without a page reload.
//!
//! An [`Enhancer`] intercepts a submission, marks the session as
//! submitting, races the transport against the delay and timeout timers,
//! then reconciles the action result into the session.

use std::time::Duration;

use oxide_forms::FormData;
use tokio::time::sleep;
use tracing::{debug, warn};

use crate::config::MultipleSubmits;
use crate::error::{Result, SessionError};
use crate::session::{FormSession, SessionMessage, SubmitState};
use crate::transport::Transport;

/// A session hooked to a transport.
#[derive(Debug, Clone)]
pub struct Enhancer<M, T> {
    session: FormSession<M>,
    transport: T,
}

impl<M: SessionMessage, T: Transport> Enhancer<M, T> {
    pub(crate) fn new(session: FormSession<M>, transport: T) -> Self {
        Self { session, transport }
    }

    /// Returns the session this enhancer submits for.
    pub const fn session(&self) -> &FormSession<M> {
        &self.session
    }

    /// Submits the current values of the session.
    pub async fn submit_values(&self) -> Result<SubmitState> {
        self.submit(self.session.form_data()).await
    }

    /// Submits `data` and reconciles the response.
    ///
    /// `submitting` is set before the transport is called and always
    /// cleared once the last in-flight submission settles, including when
    /// the returned future is dropped before completing. With the
    /// `abort` policy a response overtaken by a newer submission is
    /// dropped with [`SessionError::Superseded`].
    pub async fn submit(&self, data: FormData) -> Result<SubmitState> {
        let session = &self.session;
        let config = session.config();
        let policy = config.multiple_submits;

        let Some(submission) = session.begin_submit(policy == MultipleSubmits::Prevent) else {
            debug!(form = %session.id(), "submission rejected, another is in flight");
            return Err(SessionError::AlreadySubmitting);
        };
        let generation = submission.generation();
        debug!(form = %session.id(), generation, entries = data.len(), "submitting form");

        let mut response = self.transport.send(data);
        let delay = sleep(Duration::from_millis(config.delay_ms));
        let timeout = sleep(Duration::from_millis(config.timeout_ms));
        tokio::pin!(delay);
        tokio::pin!(timeout);
        let mut delay_elapsed = false;
        let mut timeout_elapsed = false;

        let outcome = loop {
            tokio::select! {
                outcome = &mut response => break outcome,
                () = &mut delay, if !delay_elapsed => {
                    delay_elapsed = true;
                    if submission.is_current() {
                        debug!(form = %session.id(), generation, "submission delayed");
                        session.delayed().set(true);
                    }
                }
                () = &mut timeout, if !timeout_elapsed => {
                    timeout_elapsed = true;
                    if submission.is_current() {
                        debug!(form = %session.id(), generation, "submission timed out");
                        session.timeout().set(true);
                    }
                }
            }
        };

        let settled = if policy == MultipleSubmits::Abort && !submission.is_current() {
            debug!(form = %session.id(), generation, "discarding superseded response");
            Err(SessionError::Superseded)
        } else {
            match outcome {
                Ok(result) => session
                    .reconcile(&result)
                    .inspect_err(|err| session.fail_transport(err.to_string())),
                Err(err) => {
                    warn!(form = %session.id(), error = %err, "form submission failed");
                    session.fail_transport(err.to_string());
                    Err(SessionError::Transport(err))
                }
            }
        };

        drop(submission);
        settled
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::SessionOptions;
    use crate::error::TransportError;
    use crate::transport::transport_fn;
    use oxide_actions::ActionResult;
    use oxide_forms::{validate, FieldDef, Schema};
    use serde_json::json;

    fn schema() -> Schema {
        Schema::new()
            .with_id("contact")
            .field(FieldDef::text("name"))
            .field(FieldDef::email("email").required())
    }

    fn session(options: &SessionOptions) -> FormSession {
        FormSession::new(schema().initial(), options)
    }

    /// Validates the payload after a latency read from the `wait` field.
    fn echo(data: FormData) -> impl std::future::Future<Output = std::result::Result<ActionResult, TransportError>> {
        async move {
            let wait = data.text("wait").and_then(|w| w.parse().ok()).unwrap_or(0);
            sleep(Duration::from_millis(wait)).await;
            Ok(ActionResult::for_form(validate(&data, &schema())))
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_flags_while_pending() {
        let s = session(&SessionOptions::new().delay_ms(300).timeout_ms(1000));
        let watched = s.clone();
        let enhancer = s.enhance(transport_fn(move |_data: FormData| {
            let watched = watched.clone();
            async move {
                sleep(Duration::from_millis(500)).await;
                let early = (watched.submitting().get(), watched.delayed().get(), watched.timeout().get());
                sleep(Duration::from_millis(1000)).await;
                let late = watched.timeout().get();
                Ok(ActionResult::redirect(
                    303,
                    format!("/{}/{}/{}/{}", early.0, early.1, early.2, late),
                ))
            }
        }));

        let state = enhancer.submit(FormData::new()).await.unwrap();
        assert_eq!(state, SubmitState::Redirected);
        assert_eq!(s.redirect().get(), Some("/true/true/false/true".to_string()));
        assert!(!s.submitting().get());
        assert!(!s.delayed().get());
        assert!(!s.timeout().get());
    }

    #[tokio::test(start_paused = true)]
    async fn test_fast_response_never_flags_delay() {
        let s = session(&SessionOptions::default());
        let mut delayed = s.delayed().subscribe();
        let enhancer = s.enhance(transport_fn(echo));

        s.set_value("email", "ada@example.com");
        let state = enhancer.submit_values().await.unwrap();

        assert_eq!(state, SubmitState::Succeeded);
        assert!(!delayed.has_changed().unwrap());
        assert!(s.valid().get());
    }

    #[tokio::test]
    async fn test_failure_reconciles_errors() {
        let s = session(&SessionOptions::default());
        let enhancer = s.enhance(transport_fn(echo));

        let state = enhancer
            .submit(FormData::new().text_field("name", "Ada"))
            .await
            .unwrap();

        assert_eq!(state, SubmitState::Rejected);
        assert!(s.errors().get().contains("email"));
        assert_eq!(s.value("name"), Some(json!("Ada")));
        assert!(!s.submitting().get());
    }

    #[tokio::test]
    async fn test_transport_failure_clears_submitting() {
        let s = session(&SessionOptions::default());
        s.set_value("name", "Ada");
        let enhancer = s.enhance(transport_fn(|_data: FormData| async {
            Err(TransportError::Request("connection refused".to_string()))
        }));

        let err = enhancer.submit_values().await.unwrap_err();
        assert!(matches!(err, SessionError::Transport(_)));
        assert_eq!(s.state().get(), SubmitState::Failed);
        assert_eq!(
            s.failure().get(),
            Some("request failed: connection refused".to_string())
        );
        assert!(!s.submitting().get());
        assert_eq!(s.value("name"), Some(json!("Ada")));
    }

    #[tokio::test(start_paused = true)]
    async fn test_prevent_rejects_second_submit() {
        let s = session(&SessionOptions::default());
        let enhancer = s.enhance(transport_fn(echo));

        let (first, second) = tokio::join!(
            enhancer.submit(FormData::new().text_field("wait", "100")),
            enhancer.submit(FormData::new()),
        );

        assert_eq!(first.unwrap(), SubmitState::Rejected);
        assert!(matches!(second, Err(SessionError::AlreadySubmitting)));
        assert!(!s.submitting().get());
    }

    #[tokio::test(start_paused = true)]
    async fn test_cancelled_submit_releases_session() {
        let s = session(&SessionOptions::default());
        let enhancer = s.enhance(transport_fn(echo));

        let cancelled = tokio::time::timeout(
            Duration::from_millis(10),
            enhancer.submit(FormData::new().text_field("wait", "60000")),
        )
        .await;

        assert!(cancelled.is_err());
        assert!(!s.submitting().get());
        assert_eq!(s.state().get(), SubmitState::Idle);

        let state = enhancer
            .submit(FormData::new().text_field("email", "ada@example.com"))
            .await
            .unwrap();
        assert_eq!(state, SubmitState::Succeeded);
        assert!(!s.submitting().get());
    }

    #[tokio::test(start_paused = true)]
    async fn test_abort_discards_stale_response() {
        let s = session(&SessionOptions::new().multiple_submits(MultipleSubmits::Abort));
        let enhancer = s.enhance(transport_fn(echo));

        let (first, second) = tokio::join!(
            enhancer.submit(
                FormData::new()
                    .text_field("wait", "200")
                    .text_field("name", "stale")
            ),
            enhancer.submit(
                FormData::new()
                    .text_field("wait", "50")
                    .text_field("name", "fresh")
                    .text_field("email", "ada@example.com")
            ),
        );

        assert!(matches!(first, Err(SessionError::Superseded)));
        assert_eq!(second.unwrap(), SubmitState::Succeeded);
        assert_eq!(s.value("name"), Some(json!("fresh")));
        assert_eq!(s.state().get(), SubmitState::Succeeded);
        assert!(!s.submitting().get());
    }

    #[tokio::test(start_paused = true)]
    async fn test_allow_reconciles_in_arrival_order() {
        let s = session(&SessionOptions::new().multiple_submits(MultipleSubmits::Allow));
        let enhancer = s.enhance(transport_fn(echo));

        let (slow, fast) = tokio::join!(
            enhancer.submit(
                FormData::new()
                    .text_field("wait", "200")
                    .text_field("name", "slow")
            ),
            enhancer.submit(
                FormData::new()
                    .text_field("wait", "50")
                    .text_field("name", "fast")
                    .text_field("email", "ada@example.com")
            ),
        );

        assert_eq!(fast.unwrap(), SubmitState::Succeeded);
        assert_eq!(slow.unwrap(), SubmitState::Rejected);
        assert_eq!(s.value("name"), Some(json!("slow")));
        assert!(!s.submitting().get());
    }
}
