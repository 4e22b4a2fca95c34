//! Test helpers for inbound HTTP components.

use std::sync::Arc;

use actix_http::Request;
use actix_session::{SessionMiddleware, storage::CookieSessionStore};
use actix_web::body::MessageBody;
use actix_web::cookie::{Cookie, Key};
use actix_web::dev::{Service, ServiceFactory, ServiceRequest, ServiceResponse};
use actix_web::http::StatusCode;
use actix_web::{App, HttpResponse, test as actix_test, web};

use crate::domain::ports::{
    FixtureIdentityProvider, FixtureLabRecordsRepository, FixtureReportGenerator,
    FixtureStudentAccountCommand, FixtureStudentProfileQuery,
};
use crate::domain::{Error, LabRecordsService, RolePolicy, SessionToken, UsageReportService};
use crate::inbound::http::session::SessionContext;
use crate::inbound::http::state::{HttpState, HttpStatePorts, SessionPolicy};
use crate::test_support::{MutableClock, fixture_now};

/// Build a session middleware configured for tests.
///
/// - Generates a fresh signing/encryption key per invocation.
/// - Sets the cookie name to `session` and disables the `Secure` flag for
///   local HTTP tests.
pub fn test_session_middleware() -> SessionMiddleware<CookieSessionStore> {
    SessionMiddleware::builder(CookieSessionStore::default(), Key::generate())
        .cookie_name("session".to_owned())
        .cookie_secure(false)
        .build()
}

/// Fixture-backed ports; tests swap in mocks for the port under test.
pub fn fixture_ports() -> HttpStatePorts {
    let records = Arc::new(FixtureLabRecordsRepository);
    HttpStatePorts {
        accounts: Arc::new(FixtureStudentAccountCommand),
        profiles: Arc::new(FixtureStudentProfileQuery),
        records: Arc::new(LabRecordsService::new(records.clone())),
        reports: Arc::new(UsageReportService::new(
            records,
            Arc::new(FixtureReportGenerator),
        )),
        identity: Arc::new(FixtureIdentityProvider),
    }
}

/// Session policy pinned to the fixture clock, with `boss@lasalle.mx` as the
/// only administrator.
pub fn fixture_session_policy() -> SessionPolicy {
    let mut policy = SessionPolicy::with_clock(Arc::new(MutableClock::new(fixture_now())));
    policy.roles = RolePolicy::new(["boss@lasalle.mx"]);
    policy
}

/// HTTP state over the given ports and the fixture session policy.
pub fn test_state(ports: HttpStatePorts) -> HttpState {
    HttpState::new(ports, fixture_session_policy())
}

/// Path of the test-only route that signs the caller in.
pub const TEST_SIGN_IN_PATH: &str = "/test/sign-in";

/// Test-only route that stores the token in the request body as the session.
pub async fn sign_in_as(
    session: SessionContext,
    token: web::Json<SessionToken>,
) -> Result<HttpResponse, Error> {
    session.persist_token(&token)?;
    Ok(HttpResponse::NoContent().finish())
}

/// Sign in through [`sign_in_as`] and return the resulting session cookie.
///
/// The app under test must mount `sign_in_as` at [`TEST_SIGN_IN_PATH`].
pub async fn session_cookie<S, B>(app: &S, token: &SessionToken) -> Cookie<'static>
where
    S: Service<Request, Response = ServiceResponse<B>, Error = actix_web::Error>,
    B: MessageBody,
{
    let res = actix_test::call_service(
        app,
        actix_test::TestRequest::post()
            .uri(TEST_SIGN_IN_PATH)
            .set_json(token)
            .to_request(),
    )
    .await;
    assert_eq!(res.status(), StatusCode::NO_CONTENT, "test sign-in failed");
    res.response()
        .cookies()
        .find(|cookie| cookie.name() == "session")
        .expect("session cookie")
        .into_owned()
}

/// App with test state, cookie sessions and the test sign-in route; `configure`
/// mounts the handlers under test.
pub fn test_app<F>(
    ports: HttpStatePorts,
    configure: F,
) -> App<
    impl ServiceFactory<
        ServiceRequest,
        Config = (),
        Response = ServiceResponse,
        Error = actix_web::Error,
        InitError = (),
    >,
>
where
    F: FnOnce(&mut web::ServiceConfig),
{
    App::new()
        .app_data(web::Data::new(test_state(ports)))
        .wrap(test_session_middleware())
        .route(TEST_SIGN_IN_PATH, web::post().to(sign_in_as))
        .configure(configure)
}
