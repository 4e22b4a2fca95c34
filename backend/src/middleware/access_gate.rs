//! Access gate guarding protected path prefixes.
//!
//! Requests for a protected path only proceed when the session holds an
//! unexpired token whose email carries the institutional suffix. Everything
//! else is answered with a `302` to the policy's redirect target before any
//! handler runs.
//!
//! The gate reads the cookie session, so [`actix_session::SessionMiddleware`]
//! must wrap it (register the gate first, then the session middleware).

use std::rc::Rc;
use std::task::{Context, Poll};

use actix_session::SessionExt;
use actix_web::body::EitherBody;
use actix_web::dev::{Service, ServiceRequest, ServiceResponse, Transform};
use actix_web::http::header;
use actix_web::{Error, HttpResponse};
use futures_util::future::{LocalBoxFuture, Ready, ready};
use tracing::debug;

use crate::domain::GateDecision;
use crate::inbound::http::session::read_token;
use crate::inbound::http::state::SessionPolicy;

/// Middleware factory applying the [`SessionPolicy`] access rules.
///
/// # Examples
/// ```no_run
/// use std::sync::Arc;
///
/// use actix_web::App;
/// use mockable::DefaultClock;
/// use portal::inbound::http::state::SessionPolicy;
/// use portal::middleware::AccessGate;
///
/// let policy = SessionPolicy::with_clock(Arc::new(DefaultClock));
/// let _app = App::new().wrap(AccessGate::new(policy));
/// ```
#[derive(Clone)]
pub struct AccessGate {
    policy: Rc<SessionPolicy>,
}

impl AccessGate {
    /// Gate requests with `policy`.
    pub fn new(policy: SessionPolicy) -> Self {
        Self {
            policy: Rc::new(policy),
        }
    }
}

impl<S, B> Transform<S, ServiceRequest> for AccessGate
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<EitherBody<B>>;
    type Error = Error;
    type InitError = ();
    type Transform = AccessGateMiddleware<S>;
    type Future = Ready<Result<Self::Transform, Self::InitError>>;

    fn new_transform(&self, service: S) -> Self::Future {
        ready(Ok(AccessGateMiddleware {
            service,
            policy: Rc::clone(&self.policy),
        }))
    }
}

/// Service wrapper produced by [`AccessGate`].
pub struct AccessGateMiddleware<S> {
    service: S,
    policy: Rc<SessionPolicy>,
}

impl<S, B> Service<ServiceRequest> for AccessGateMiddleware<S>
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<EitherBody<B>>;
    type Error = Error;
    type Future = LocalBoxFuture<'static, Result<Self::Response, Self::Error>>;

    fn poll_ready(&self, cx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
        self.service.poll_ready(cx)
    }

    fn call(&self, req: ServiceRequest) -> Self::Future {
        let token = read_token(&req.get_session());
        let decision = self
            .policy
            .access
            .decide(req.path(), token.as_ref(), self.policy.now());

        match decision {
            GateDecision::Allow => {
                let fut = self.service.call(req);
                Box::pin(async move { fut.await.map(ServiceResponse::map_into_left_body) })
            }
            GateDecision::Redirect(target) => {
                debug!(
                    path = req.path(),
                    signed_in = token.is_some(),
                    "access gate redirect"
                );
                let response = HttpResponse::Found()
                    .insert_header((header::LOCATION, target))
                    .finish();
                let (req, _) = req.into_parts();
                Box::pin(ready(Ok(
                    ServiceResponse::new(req, response).map_into_right_body()
                )))
            }
        }
    }
}
