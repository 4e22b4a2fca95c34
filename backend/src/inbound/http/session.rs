//! Session helpers to keep HTTP handlers free of framework-specific logic.
//!
//! Provides a thin wrapper around Actix sessions so handlers only deal with
//! domain-friendly operations: storing the signed-in [`SessionToken`], reading
//! it back and carrying the OAuth `state` nonce across the sign-in redirect.

use actix_session::Session;
use actix_web::{FromRequest, HttpRequest, dev::Payload};
use chrono::{DateTime, Utc};
use futures_util::future::LocalBoxFuture;
use tracing::warn;

use crate::domain::{Error, SessionToken};

pub(crate) const SESSION_TOKEN_KEY: &str = "session_token";
pub(crate) const OAUTH_STATE_KEY: &str = "oauth_state";

/// Read the session token from a raw Actix session.
///
/// Undecodable tokens are treated as absent so a stale cookie format never
/// locks a user out; they simply sign in again.
pub(crate) fn read_token(session: &Session) -> Option<SessionToken> {
    match session.get::<SessionToken>(SESSION_TOKEN_KEY) {
        Ok(token) => token,
        Err(error) => {
            warn!(%error, "discarding undecodable session token");
            None
        }
    }
}

/// Newtype wrapper that exposes higher-level session operations.
#[derive(Clone)]
pub struct SessionContext(Session);

impl SessionContext {
    /// Construct a new wrapper from the underlying Actix session.
    pub fn new(session: Session) -> Self {
        Self(session)
    }

    /// Persist a freshly issued token, rotating the cookie.
    pub fn persist_token(&self, token: &SessionToken) -> Result<(), Error> {
        self.0.renew();
        self.0
            .insert(SESSION_TOKEN_KEY, token)
            .map_err(|error| Error::internal(format!("failed to persist session: {error}")))
    }

    /// Fetch the current token, if present.
    pub fn token(&self) -> Option<SessionToken> {
        read_token(&self.0)
    }

    /// Require an unexpired token or return `401 Unauthorized`.
    pub fn require_token(&self, now: DateTime<Utc>) -> Result<SessionToken, Error> {
        self.token()
            .filter(|token| !token.is_expired(now))
            .ok_or_else(|| Error::unauthorized("login required"))
    }

    /// Remember the `state` nonce sent to the identity provider.
    pub fn store_oauth_state(&self, state: &str) -> Result<(), Error> {
        self.0
            .insert(OAUTH_STATE_KEY, state)
            .map_err(|error| Error::internal(format!("failed to persist session: {error}")))
    }

    /// Take the stored `state` nonce; it is single-use.
    pub fn take_oauth_state(&self) -> Option<String> {
        match self.0.remove_as::<String>(OAUTH_STATE_KEY) {
            Some(Ok(state)) => Some(state),
            Some(Err(raw)) => {
                warn!(length = raw.len(), "discarding malformed oauth state");
                None
            }
            None => None,
        }
    }

    /// Drop every session entry and expire the cookie.
    pub fn purge(&self) {
        self.0.purge();
    }
}

impl FromRequest for SessionContext {
    type Error = actix_web::Error;
    type Future = LocalBoxFuture<'static, Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, payload: &mut Payload) -> Self::Future {
        let fut = Session::from_request(req, payload);
        Box::pin(async move { fut.await.map(SessionContext::new) })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{fixture_now, student_token};
    use actix_web::http::StatusCode;
    use actix_web::{App, HttpResponse, test, web};
    use chrono::TimeDelta;
    use rstest::rstest;

    fn session_test_app() -> App<
        impl actix_web::dev::ServiceFactory<
            actix_web::dev::ServiceRequest,
            Config = (),
            Response = actix_web::dev::ServiceResponse,
            Error = actix_web::Error,
            InitError = (),
        >,
    > {
        App::new()
            .wrap(crate::inbound::http::test_utils::test_session_middleware())
            .route(
                "/set",
                web::get().to(|session: SessionContext| async move {
                    session.persist_token(&student_token("u1"))?;
                    Ok::<_, Error>(HttpResponse::Ok())
                }),
            )
            .route(
                "/get",
                web::get().to(|session: SessionContext| async move {
                    let token = session.require_token(fixture_now())?;
                    Ok::<_, Error>(HttpResponse::Ok().body(token.subject().to_owned()))
                }),
            )
            .route(
                "/expired",
                web::get().to(|session: SessionContext| async move {
                    let later = fixture_now() + TimeDelta::hours(3);
                    let _ = session.require_token(later)?;
                    Ok::<_, Error>(HttpResponse::Ok())
                }),
            )
            .route(
                "/state",
                web::get().to(|session: SessionContext| async move {
                    session.store_oauth_state("nonce-1")?;
                    Ok::<_, Error>(HttpResponse::Ok())
                }),
            )
            .route(
                "/take",
                web::get().to(|session: SessionContext| async move {
                    let first = session.take_oauth_state();
                    let second = session.take_oauth_state();
                    HttpResponse::Ok().body(format!("{first:?}|{second:?}"))
                }),
            )
    }

    async fn session_cookie(
        app: &impl actix_web::dev::Service<
            actix_http::Request,
            Response = actix_web::dev::ServiceResponse,
            Error = actix_web::Error,
        >,
        uri: &str,
    ) -> actix_web::cookie::Cookie<'static> {
        let res = test::call_service(app, test::TestRequest::get().uri(uri).to_request()).await;
        assert_eq!(res.status(), StatusCode::OK);
        res.response()
            .cookies()
            .find(|cookie| cookie.name() == "session")
            .expect("session cookie set")
            .into_owned()
    }

    #[rstest]
    #[actix_web::test]
    async fn round_trips_session_token() {
        let app = test::init_service(session_test_app()).await;
        let cookie = session_cookie(&app, "/set").await;

        let res = test::call_service(
            &app,
            test::TestRequest::get().uri("/get").cookie(cookie).to_request(),
        )
        .await;

        assert_eq!(res.status(), StatusCode::OK);
        assert_eq!(test::read_body(res).await, "u1");
    }

    #[rstest]
    #[actix_web::test]
    async fn missing_token_is_unauthorised() {
        let app = test::init_service(session_test_app()).await;

        let res = test::call_service(&app, test::TestRequest::get().uri("/get").to_request()).await;

        assert_eq!(res.status(), StatusCode::UNAUTHORIZED);
    }

    #[rstest]
    #[actix_web::test]
    async fn expired_token_is_unauthorised() {
        let app = test::init_service(session_test_app()).await;
        let cookie = session_cookie(&app, "/set").await;

        let res = test::call_service(
            &app,
            test::TestRequest::get()
                .uri("/expired")
                .cookie(cookie)
                .to_request(),
        )
        .await;

        assert_eq!(res.status(), StatusCode::UNAUTHORIZED);
    }

    #[rstest]
    #[actix_web::test]
    async fn oauth_state_is_single_use() {
        let app = test::init_service(session_test_app()).await;
        let cookie = session_cookie(&app, "/state").await;

        let res = test::call_service(
            &app,
            test::TestRequest::get().uri("/take").cookie(cookie).to_request(),
        )
        .await;

        assert_eq!(test::read_body(res).await, "Some(\"nonce-1\")|None");
    }
}
