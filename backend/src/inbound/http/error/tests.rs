//! Tests for HTTP error mapping.

use super::*;
use crate::domain::Error;
use actix_web::ResponseError;
use actix_web::body::to_bytes;
use actix_web::http::StatusCode;
use rstest::{fixture, rstest};
use serde_json::{Value, json};

const TRACE_ID: &str = "00000000-0000-0000-0000-000000000000";

#[fixture]
fn expected_trace_id() -> String {
    TRACE_ID.to_owned()
}

#[rstest]
#[case(Error::invalid_request("bad"), StatusCode::BAD_REQUEST)]
#[case(Error::unauthorized("no auth"), StatusCode::UNAUTHORIZED)]
#[case(Error::forbidden("denied"), StatusCode::FORBIDDEN)]
#[case(Error::not_found("missing"), StatusCode::NOT_FOUND)]
#[case(Error::bad_gateway("upstream"), StatusCode::BAD_GATEWAY)]
#[case(Error::internal("boom"), StatusCode::INTERNAL_SERVER_ERROR)]
fn status_code_matches_error_code(#[case] error: Error, #[case] status: StatusCode) {
    assert_eq!(ResponseError::status_code(&error), status);
}

async fn response_body(error: &Error, expected_status: StatusCode) -> (Option<String>, Value) {
    let response = ResponseError::error_response(error);
    assert_eq!(response.status(), expected_status);

    let header = response
        .headers()
        .get(TRACE_ID_HEADER)
        .map(|value| value.to_str().expect("trace-id is ASCII").to_owned());
    let bytes = to_bytes(response.into_body())
        .await
        .expect("reading response body succeeds");
    let body = serde_json::from_slice(&bytes).expect("error body is JSON");
    (header, body)
}

#[rstest]
#[actix_web::test]
async fn internal_errors_are_redacted(expected_trace_id: String) {
    let error = Error::internal("connection refused by 10.0.0.4")
        .with_trace_id(expected_trace_id.clone())
        .with_details(json!({"secret": "x"}));

    let (header, body) = response_body(&error, StatusCode::INTERNAL_SERVER_ERROR).await;

    assert_eq!(header.as_deref(), Some(expected_trace_id.as_str()));
    assert_eq!(body["success"], json!(false));
    assert_eq!(body["code"], json!("internal_error"));
    assert_eq!(body["message"], json!(INTERNAL_MESSAGE));
    assert_eq!(body["traceId"], json!(expected_trace_id));
    assert!(body.get("details").is_none());
}

#[rstest]
#[actix_web::test]
async fn client_errors_keep_message_and_details(expected_trace_id: String) {
    let error = Error::invalid_request("uid is required")
        .with_trace_id(expected_trace_id)
        .with_details(json!({"field": "uid"}));

    let (_, body) = response_body(&error, StatusCode::BAD_REQUEST).await;

    assert_eq!(body["success"], json!(false));
    assert_eq!(body["message"], json!("uid is required"));
    assert_eq!(body["details"], json!({"field": "uid"}));
}

#[rstest]
#[actix_web::test]
async fn upstream_failures_are_not_redacted() {
    let error = Error::bad_gateway("report generator failed");

    let (header, body) = response_body(&error, StatusCode::BAD_GATEWAY).await;

    assert!(header.is_none(), "no trace id outside a traced request");
    assert_eq!(body["code"], json!("bad_gateway"));
    assert_eq!(body["message"], json!("report generator failed"));
}
