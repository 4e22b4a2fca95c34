//! Tests for the sign-in flow handlers.

use std::sync::Arc;

use actix_web::http::StatusCode;
use actix_web::{App, test as actix_test, web};
use rstest::rstest;
use serde_json::Value;

use super::*;
use crate::domain::UpsertOutcome;
use crate::domain::ports::{MockIdentityProvider, MockStudentAccountCommand};
use crate::inbound::http::state::HttpStatePorts;
use crate::inbound::http::test_utils::{fixture_ports, test_app};

fn auth_app(
    ports: HttpStatePorts,
) -> App<
    impl actix_web::dev::ServiceFactory<
        actix_web::dev::ServiceRequest,
        Config = (),
        Response = actix_web::dev::ServiceResponse,
        Error = actix_web::Error,
        InitError = (),
    >,
> {
    test_app(ports, |cfg| {
        cfg.service(landing).service(
            web::scope("/api")
                .service(sign_in)
                .service(callback)
                .service(sign_out),
        );
    })
}

fn accepting_accounts(expected_uid: &'static str) -> MockStudentAccountCommand {
    let mut accounts = MockStudentAccountCommand::new();
    accounts
        .expect_upsert_student()
        .withf(move |principal| principal.id().as_str() == expected_uid)
        .times(1)
        .return_once(|_| Ok(UpsertOutcome { created: true }));
    accounts
}

fn location(response: &actix_web::dev::ServiceResponse) -> String {
    response
        .headers()
        .get(header::LOCATION)
        .and_then(|value| value.to_str().ok())
        .expect("location header")
        .to_owned()
}

fn state_param(location: &str) -> String {
    let url = url::Url::parse(&format!("http://portal.test{location}")).expect("redirect URL");
    url.query_pairs()
        .find(|(key, _)| key == "state")
        .map(|(_, value)| value.into_owned())
        .expect("state parameter")
}

/// Start sign-in and return the session cookie plus the issued state.
async fn begin_sign_in(
    app: &impl actix_web::dev::Service<
        actix_http::Request,
        Response = actix_web::dev::ServiceResponse,
        Error = actix_web::Error,
    >,
) -> (actix_web::cookie::Cookie<'static>, String) {
    let res = actix_test::call_service(
        app,
        actix_test::TestRequest::get()
            .uri("/api/auth/signin")
            .to_request(),
    )
    .await;
    assert_eq!(res.status(), StatusCode::FOUND);
    let state = state_param(&location(&res));
    let cookie = res
        .response()
        .cookies()
        .find(|cookie| cookie.name() == "session")
        .expect("session cookie")
        .into_owned();
    (cookie, state)
}

#[rstest]
#[actix_web::test]
async fn institutional_sign_in_lands_on_student_area() {
    let ports = HttpStatePorts {
        accounts: Arc::new(accepting_accounts("dev-ana")),
        ..fixture_ports()
    };
    let app = actix_test::init_service(auth_app(ports)).await;
    let (cookie, state) = begin_sign_in(&app).await;

    let res = actix_test::call_service(
        &app,
        actix_test::TestRequest::get()
            .uri(&format!("/api/auth/callback?code=ana&state={state}"))
            .cookie(cookie)
            .to_request(),
    )
    .await;

    assert_eq!(res.status(), StatusCode::FOUND);
    assert_eq!(location(&res), SIGNED_IN_TARGET);
    let session = res
        .response()
        .cookies()
        .find(|cookie| cookie.name() == "session")
        .expect("session cookie")
        .into_owned();

    let landing_res = actix_test::call_service(
        &app,
        actix_test::TestRequest::get().uri("/").cookie(session).to_request(),
    )
    .await;
    let body: Value = actix_test::read_body_json(landing_res).await;
    assert_eq!(body["signedIn"], Value::Bool(true));
}

#[rstest]
#[actix_web::test]
async fn foreign_domain_is_sent_back_to_landing() {
    let mut accounts = MockStudentAccountCommand::new();
    accounts.expect_upsert_student().never();
    let ports = HttpStatePorts {
        accounts: Arc::new(accounts),
        ..fixture_ports()
    };
    let app = actix_test::init_service(auth_app(ports)).await;
    let (cookie, state) = begin_sign_in(&app).await;

    let res = actix_test::call_service(
        &app,
        actix_test::TestRequest::get()
            .uri(&format!("/api/auth/callback?code=eve@evil.com&state={state}"))
            .cookie(cookie)
            .to_request(),
    )
    .await;

    assert_eq!(res.status(), StatusCode::FOUND);
    assert_eq!(location(&res), "/");
}

#[rstest]
#[case("/api/auth/callback?code=ana&state=forged")]
#[case("/api/auth/callback?state=forged")]
#[case("/api/auth/callback?code=ana")]
#[actix_web::test]
async fn callback_without_matching_state_is_rejected(#[case] uri: &str) {
    let mut accounts = MockStudentAccountCommand::new();
    accounts.expect_upsert_student().never();
    let ports = HttpStatePorts {
        accounts: Arc::new(accounts),
        ..fixture_ports()
    };
    let app = actix_test::init_service(auth_app(ports)).await;
    let (cookie, _) = begin_sign_in(&app).await;

    let res = actix_test::call_service(
        &app,
        actix_test::TestRequest::get().uri(uri).cookie(cookie).to_request(),
    )
    .await;

    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    let body: Value = actix_test::read_body_json(res).await;
    assert_eq!(body["success"], Value::Bool(false));
}

#[rstest]
#[case(IdentityProviderError::rejected(400_u16, "invalid_grant"), StatusCode::UNAUTHORIZED)]
#[case(IdentityProviderError::transport("connection reset"), StatusCode::BAD_GATEWAY)]
#[case(IdentityProviderError::decode("missing sub"), StatusCode::BAD_GATEWAY)]
#[actix_web::test]
async fn provider_failures_map_to_statuses(
    #[case] failure: IdentityProviderError,
    #[case] expected: StatusCode,
) {
    let mut identity = MockIdentityProvider::new();
    identity
        .expect_authorization_url()
        .returning(|state| Ok(format!("https://login.test/authorize?state={state}")));
    identity
        .expect_exchange_code()
        .return_once(move |_| Err(failure));
    let ports = HttpStatePorts {
        identity: Arc::new(identity),
        ..fixture_ports()
    };
    let app = actix_test::init_service(auth_app(ports)).await;
    let res = actix_test::call_service(
        &app,
        actix_test::TestRequest::get()
            .uri("/api/auth/signin")
            .to_request(),
    )
    .await;
    let redirect_to = location(&res);
    assert!(redirect_to.starts_with("https://login.test/authorize"));
    let state = url::Url::parse(&redirect_to)
        .expect("authorize URL")
        .query_pairs()
        .find(|(key, _)| key == "state")
        .map(|(_, value)| value.into_owned())
        .expect("state parameter");
    let cookie = res
        .response()
        .cookies()
        .find(|cookie| cookie.name() == "session")
        .expect("session cookie")
        .into_owned();

    let res = actix_test::call_service(
        &app,
        actix_test::TestRequest::get()
            .uri(&format!("/api/auth/callback?code=ana&state={state}"))
            .cookie(cookie)
            .to_request(),
    )
    .await;

    assert_eq!(res.status(), expected);
}

#[rstest]
#[actix_web::test]
async fn sign_out_redirects_to_landing() {
    let app = actix_test::init_service(auth_app(fixture_ports())).await;

    let res = actix_test::call_service(
        &app,
        actix_test::TestRequest::post()
            .uri("/api/auth/signout")
            .to_request(),
    )
    .await;

    assert_eq!(res.status(), StatusCode::FOUND);
    assert_eq!(location(&res), "/");
}

#[rstest]
#[actix_web::test]
async fn landing_reports_anonymous_visitors() {
    let app = actix_test::init_service(auth_app(fixture_ports())).await;

    let res =
        actix_test::call_service(&app, actix_test::TestRequest::get().uri("/").to_request()).await;

    assert_eq!(res.status(), StatusCode::OK);
    let body: Value = actix_test::read_body_json(res).await;
    assert_eq!(body["signInUrl"], Value::String(SIGN_IN_PATH.to_owned()));
    assert_eq!(body["signedIn"], Value::Bool(false));
}
