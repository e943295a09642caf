//! A page with two enhanced forms posting to in-process actions.

use oxide_actions::{fail, handler, success, validate_request, ActionResult, FormPayload, Request, Response};
use oxide_form_session::{
    FormDefaults, FormSession, HandlerTransport, MessageStatus, SessionError, SessionOptions,
    StatusMessage, SubmitState,
};
use oxide_forms::{FieldDef, Schema};
use serde_json::json;

fn newsletter() -> Schema {
    Schema::new()
        .with_id("newsletter")
        .field(FieldDef::email("email").required())
        .field(FieldDef::boolean("weekly"))
}

fn feedback() -> Schema {
    Schema::new()
        .with_id("feedback")
        .field(FieldDef::email("email"))
        .field(FieldDef::text("comment").required().min_length(5))
}

async fn subscribe(req: Request) -> Response {
    let (form, _) = match validate_request(&req, &newsletter()).await {
        Ok(extracted) => extracted,
        Err(err) => return ActionResult::error(415, err.to_string()).into_response(),
    };
    if !form.is_valid() {
        let payload = FormPayload::new(form)
            .message(&StatusMessage::error("Please check the form."))
            .unwrap();
        return fail(400, payload).into_response();
    }
    if form.value("email") == Some(&json!("taken@example.com")) {
        return ActionResult::redirect(303, "/already-subscribed").into_response();
    }
    let payload = FormPayload::new(form)
        .message(&StatusMessage::success("Subscribed!"))
        .unwrap();
    success(payload).into_response()
}

async fn crash(_req: Request) -> Response {
    ActionResult::error(500, "database unavailable").into_response()
}

#[tokio::test]
async fn test_missing_email_comes_back_as_field_error() {
    let session: FormSession = FormSession::new(newsletter().initial(), &SessionOptions::default());
    let enhancer = session.enhance(HandlerTransport::new("/subscribe", handler(subscribe)));

    let state = enhancer.submit_values().await.unwrap();

    assert_eq!(state, SubmitState::Rejected);
    assert_eq!(
        session.errors().get().get("email"),
        Some(&vec!["This field is required.".to_string()])
    );
    assert_eq!(
        session.message().get().map(|m| m.status),
        Some(MessageStatus::Error)
    );
    assert_eq!(
        session.error_targets(),
        vec![".has-error [name=\"email\"]".to_string()]
    );
}

#[tokio::test]
async fn test_valid_submission_then_resubmit_clears_old_message() {
    let session: FormSession = FormSession::new(newsletter().initial(), &SessionOptions::default());
    let enhancer = session.enhance(HandlerTransport::new("/subscribe", handler(subscribe)));

    enhancer.submit_values().await.unwrap();
    assert!(session.message().get().is_some());

    session.set_value("email", "ada@example.com");
    session.set_value("weekly", true);
    let state = enhancer.submit_values().await.unwrap();

    assert_eq!(state, SubmitState::Succeeded);
    assert!(session.errors().get().is_empty());
    assert_eq!(session.message().get(), Some(StatusMessage::success("Subscribed!")));
    assert_eq!(session.value("weekly"), Some(json!(true)));
    assert!(session.valid().get());
    assert!(session.posted().get());
}

#[tokio::test]
async fn test_redirect_and_action_error() {
    let session: FormSession = FormSession::new(newsletter().initial(), &SessionOptions::default());
    session.set_value("email", "taken@example.com");

    let enhancer = session.enhance(HandlerTransport::new("/subscribe", handler(subscribe)));
    assert_eq!(enhancer.submit_values().await.unwrap(), SubmitState::Redirected);
    assert_eq!(session.redirect().get(), Some("/already-subscribed".to_string()));

    let broken = session.enhance(HandlerTransport::new("/subscribe", handler(crash)));
    assert_eq!(broken.submit_values().await.unwrap(), SubmitState::Failed);
    assert_eq!(session.failure().get(), Some("database unavailable".to_string()));
    assert_eq!(session.value("email"), Some(json!("taken@example.com")));
    assert!(!session.submitting().get());
}

#[tokio::test]
async fn test_two_forms_on_one_page_stay_independent() {
    let defaults = FormDefaults::new(SessionOptions::new().delay_ms(100));
    let news: FormSession = defaults.session(newsletter().initial(), &SessionOptions::default());
    let notes: FormSession = defaults.session(feedback().initial(), &SessionOptions::default());

    news.set_value("email", "ada@example.com");
    assert_eq!(notes.value("email"), Some(json!("")));

    let enhancer = news.enhance(HandlerTransport::new("/subscribe", handler(subscribe)));
    enhancer.submit_values().await.unwrap();

    assert!(news.valid().get());
    assert!(!notes.posted().get());
    assert!(notes.message().get().is_none());
    assert_ne!(news.id(), notes.id());
}

#[tokio::test]
async fn test_enhancer_from_an_unsupported_endpoint_fails_cleanly() {
    let session: FormSession = FormSession::new(feedback().initial(), &SessionOptions::default());
    let enhancer = session.enhance(HandlerTransport::new(
        "/static",
        handler(|_req: Request| async { Response::html("<h1>Not an action</h1>") }),
    ));

    let err = enhancer.submit_values().await.unwrap_err();
    assert!(matches!(err, SessionError::Transport(_)));
    assert_eq!(session.state().get(), SubmitState::Failed);
    assert!(session.failure().get().is_some());
}
