//! Tests for the HTTP error envelope.

use actix_web::body::to_bytes;
use rstest::rstest;
use serde_json::{Value, json};

use super::*;

const TRACE_ID: &str = "3f1c2b8e-5a4d-4e6f-8a9b-0c1d2e3f4a5b";

async fn render(err: &Error) -> (StatusCode, Option<String>, Value) {
    let response = err.error_response();
    let status = response.status();
    let header = response
        .headers()
        .get(TRACE_ID_HEADER)
        .and_then(|value| value.to_str().ok())
        .map(str::to_owned);
    let bytes = to_bytes(response.into_body()).await.expect("body bytes");
    let body = serde_json::from_slice(&bytes).expect("json envelope");
    (status, header, body)
}

#[rstest]
#[case(ErrorCode::InvalidRequest, StatusCode::BAD_REQUEST)]
#[case(ErrorCode::Unauthorized, StatusCode::UNAUTHORIZED)]
#[case(ErrorCode::Forbidden, StatusCode::FORBIDDEN)]
#[case(ErrorCode::NotFound, StatusCode::NOT_FOUND)]
#[case(ErrorCode::Conflict, StatusCode::CONFLICT)]
#[case(ErrorCode::ServiceUnavailable, StatusCode::SERVICE_UNAVAILABLE)]
#[case(ErrorCode::InternalError, StatusCode::INTERNAL_SERVER_ERROR)]
fn each_code_has_a_status(#[case] code: ErrorCode, #[case] status: StatusCode) {
    assert_eq!(Error::new(code, "message").status_code(), status);
}

#[rstest]
#[actix_web::test]
async fn not_found_envelope_carries_message_and_trace() {
    let err = Error::not_found("User not found!").with_trace_id(TRACE_ID);

    let (status, header, body) = render(&err).await;

    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(header.as_deref(), Some(TRACE_ID));
    assert_eq!(
        body,
        json!({ "code": "not_found", "message": "User not found!", "traceId": TRACE_ID })
    );
}

#[rstest]
#[actix_web::test]
async fn conflict_envelope_keeps_field_details() {
    let err = Error::conflict("email already registered")
        .with_details(json!({ "field": "email", "code": "duplicate_value" }));

    let (status, header, body) = render(&err).await;

    assert_eq!(status, StatusCode::CONFLICT);
    assert!(header.is_none());
    assert_eq!(body["details"]["field"], "email");
    assert!(body.get("traceId").is_none());
}

#[rstest]
#[actix_web::test]
async fn internal_failures_are_redacted_but_traceable() {
    let err = Error::internal("relation \"users\" does not exist")
        .with_trace_id(TRACE_ID)
        .with_details(json!({ "sql": "select 1" }));

    let (status, header, body) = render(&err).await;

    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(header.as_deref(), Some(TRACE_ID));
    assert_eq!(body["message"], REDACTED_MESSAGE);
    assert_eq!(body["traceId"], TRACE_ID);
    assert!(body.get("details").is_none());
}

#[rstest]
fn store_outages_keep_their_message() {
    let err = Error::service_unavailable("user store unavailable: refused");

    assert_eq!(client_view(&err), err);
}

#[rstest]
fn framework_errors_become_internal() {
    let err: Error = actix_web::error::ErrorBadRequest("payload overflow").into();

    assert_eq!(err.code(), ErrorCode::InternalError);
    assert_eq!(err.message(), REDACTED_MESSAGE);
    assert!(err.details().is_none());
}
