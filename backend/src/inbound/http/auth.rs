//! Sign-in flow against the identity provider.
//!
//! ```text
//! GET  /                    landing descriptor
//! GET  /api/auth/signin     302 to the provider with a fresh `state`
//! GET  /api/auth/callback   code exchange, domain check, upsert, session
//! POST /api/auth/signout    purge session, 302 to /
//! ```
//!
//! The callback applies the same authorisation rule as the access gate, so a
//! session is only ever persisted for a subject the gate would admit.

use actix_web::http::header;
use actix_web::{HttpResponse, get, post, web};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;

use crate::domain::ports::IdentityProviderError;
use crate::domain::{Error, SessionToken};
use crate::inbound::http::ApiResult;
use crate::inbound::http::session::SessionContext;
use crate::inbound::http::state::HttpState;
use crate::inbound::http::validation::{FieldName, require_field};

/// Where the browser lands after a successful sign-in.
pub const SIGNED_IN_TARGET: &str = "/alumno";
/// Path that starts the sign-in flow.
pub const SIGN_IN_PATH: &str = "/api/auth/signin";

const CODE_FIELD: FieldName = FieldName::new("code");
const STATE_FIELD: FieldName = FieldName::new("state");

/// Public landing descriptor; the access gate redirects here.
#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct LandingResponse {
    /// Service name shown on the landing page.
    pub service: &'static str,
    /// Path that starts the identity provider sign-in.
    pub sign_in_url: &'static str,
    /// Whether the caller already holds a session.
    pub signed_in: bool,
}

/// Query string the identity provider sends back.
#[derive(Debug, Deserialize, IntoParams)]
pub struct CallbackQuery {
    /// Authorization code to exchange.
    pub code: Option<String>,
    /// Nonce issued at sign-in; must match the session.
    pub state: Option<String>,
}

fn redirect(location: &str) -> HttpResponse {
    HttpResponse::Found()
        .insert_header((header::LOCATION, location.to_owned()))
        .finish()
}

fn map_identity_error(error: IdentityProviderError) -> Error {
    warn!(%error, "identity provider call failed");
    match error {
        IdentityProviderError::Rejected { .. } => Error::unauthorized("sign-in was rejected"),
        IdentityProviderError::NotConfigured { message } => {
            Error::internal(format!("identity provider not configured: {message}"))
        }
        other => Error::bad_gateway(format!("identity provider unavailable: {other}")),
    }
}

/// Landing descriptor for unauthenticated browsers.
#[utoipa::path(
    get,
    path = "/",
    responses((status = 200, description = "Landing descriptor", body = LandingResponse)),
    tags = ["auth"],
    security([]),
    operation_id = "landing"
)]
#[get("/")]
pub async fn landing(
    state: web::Data<HttpState>,
    session: SessionContext,
) -> web::Json<LandingResponse> {
    let now = state.session.now();
    let signed_in = state
        .session
        .access
        .is_authorized(session.token().as_ref(), now);
    web::Json(LandingResponse {
        service: "portal",
        sign_in_url: SIGN_IN_PATH,
        signed_in,
    })
}

/// Start the sign-in flow.
#[utoipa::path(
    get,
    path = "/api/auth/signin",
    responses(
        (status = 302, description = "Redirect to the identity provider"),
        (status = 500, description = "Identity provider not configured", body = Error)
    ),
    tags = ["auth"],
    security([]),
    operation_id = "signIn"
)]
#[get("/auth/signin")]
pub async fn sign_in(
    state: web::Data<HttpState>,
    session: SessionContext,
) -> ApiResult<HttpResponse> {
    let nonce = Uuid::new_v4().simple().to_string();
    let url = state
        .identity
        .authorization_url(&nonce)
        .map_err(map_identity_error)?;
    session.store_oauth_state(&nonce)?;
    Ok(redirect(&url))
}

/// Complete the sign-in flow.
#[utoipa::path(
    get,
    path = "/api/auth/callback",
    params(CallbackQuery),
    responses(
        (status = 302, description = "Signed in (to /alumno) or refused (to /)"),
        (status = 400, description = "Missing code or state mismatch", body = Error),
        (status = 401, description = "Provider rejected the code", body = Error),
        (status = 502, description = "Provider unavailable", body = Error)
    ),
    tags = ["auth"],
    security([]),
    operation_id = "signInCallback"
)]
#[get("/auth/callback")]
pub async fn callback(
    state: web::Data<HttpState>,
    session: SessionContext,
    query: web::Query<CallbackQuery>,
) -> ApiResult<HttpResponse> {
    let CallbackQuery { code, state: returned } = query.into_inner();
    let expected = session.take_oauth_state();
    let code = require_field(code, CODE_FIELD)?;
    let returned = require_field(returned, STATE_FIELD)?;
    if expected.as_deref() != Some(returned.as_str()) {
        return Err(Error::invalid_request("sign-in state mismatch"));
    }

    let claims = state
        .identity
        .exchange_code(&code)
        .await
        .map_err(map_identity_error)?;
    let now = state.session.now();
    let role = state
        .session
        .roles
        .role_for(claims.email.as_deref().unwrap_or_default());
    let token = SessionToken::issue(claims, role, now, state.session.ttl);

    if !state.session.access.is_authorized(Some(&token), now) {
        debug!(subject = token.subject(), "sign-in refused by email policy");
        session.purge();
        return Ok(redirect(state.session.access.redirect_target()));
    }

    let principal = token.claims().to_principal().map_err(|err| {
        Error::bad_gateway(format!("identity provider returned incomplete claims: {err}"))
    })?;
    let outcome = state.accounts.upsert_student(&principal).await?;
    session.persist_token(&token)?;
    info!(
        uid = principal.id().as_str(),
        created = outcome.created,
        "student signed in"
    );
    Ok(redirect(SIGNED_IN_TARGET))
}

/// End the session.
#[utoipa::path(
    post,
    path = "/api/auth/signout",
    responses((status = 302, description = "Session cleared; redirect to /")),
    tags = ["auth"],
    security([]),
    operation_id = "signOut"
)]
#[post("/auth/signout")]
pub async fn sign_out(state: web::Data<HttpState>, session: SessionContext) -> HttpResponse {
    session.purge();
    redirect(state.session.access.redirect_target())
}

#[cfg(test)]
#[path = "auth_tests.rs"]
mod tests;
