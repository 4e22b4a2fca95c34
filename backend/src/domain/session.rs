//! Session tokens issued after a successful identity-provider sign-in.
//!
//! A token is derived from the provider's claims at login time and lives only
//! in the encrypted session cookie. Nothing about it is stored server-side.

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use super::{Principal, PrincipalValidationError};

/// Claims asserted by the identity provider for the signed-in subject.
///
/// Claims are untrusted until validated: the email may be absent, in which
/// case the access policy treats the subject as unauthorised.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IdentityClaims {
    /// Stable subject identifier.
    pub subject: String,
    /// Email claim, if the provider released one.
    #[serde(default)]
    pub email: Option<String>,
    /// Display name claim.
    #[serde(default)]
    pub name: Option<String>,
    /// Profile picture URL claim.
    #[serde(default)]
    pub picture: Option<String>,
}

impl IdentityClaims {
    /// Validate the claims into a [`Principal`].
    pub fn to_principal(&self) -> Result<Principal, PrincipalValidationError> {
        Principal::try_new(
            &self.subject,
            self.email.as_deref().unwrap_or_default(),
            self.name.as_deref(),
            self.picture.as_deref(),
        )
    }
}

/// Role granted to a session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum SessionRole {
    /// A student acting on their own records.
    Student,
    /// Lab staff; may act on any student's records.
    Admin,
}

/// Signed session token carried in the session cookie.
///
/// # Examples
/// ```
/// use chrono::{Duration, TimeZone, Utc};
/// use portal::domain::{IdentityClaims, SessionRole, SessionToken};
///
/// let now = Utc.with_ymd_and_hms(2026, 3, 1, 9, 0, 0).single().expect("timestamp");
/// let claims = IdentityClaims {
///     subject: "u1".into(),
///     email: Some("ana@lasalle.mx".into()),
///     name: None,
///     picture: None,
/// };
/// let token = SessionToken::issue(claims, SessionRole::Student, now, Duration::hours(2));
/// assert!(!token.is_expired(now));
/// assert!(token.can_act_for("u1"));
/// assert!(!token.can_act_for("u2"));
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionToken {
    claims: IdentityClaims,
    role: SessionRole,
    issued_at: DateTime<Utc>,
    expires_at: DateTime<Utc>,
}

impl SessionToken {
    /// Issue a token valid for `ttl` starting at `now`.
    ///
    /// An expiry past the representable range saturates at the latest
    /// instant chrono can hold.
    pub fn issue(
        claims: IdentityClaims,
        role: SessionRole,
        now: DateTime<Utc>,
        ttl: Duration,
    ) -> Self {
        Self {
            claims,
            role,
            issued_at: now,
            expires_at: now
                .checked_add_signed(ttl)
                .unwrap_or(DateTime::<Utc>::MAX_UTC),
        }
    }

    /// Subject identifier; equals the owning student's `uid`.
    pub fn subject(&self) -> &str {
        self.claims.subject.as_str()
    }

    /// Email claim, if any.
    pub fn email(&self) -> Option<&str> {
        self.claims.email.as_deref()
    }

    /// Display name claim, if any.
    pub fn name(&self) -> Option<&str> {
        self.claims.name.as_deref()
    }

    /// Raw claims.
    pub fn claims(&self) -> &IdentityClaims {
        &self.claims
    }

    /// Granted role.
    pub fn role(&self) -> SessionRole {
        self.role
    }

    /// Expiry instant.
    pub fn expires_at(&self) -> DateTime<Utc> {
        self.expires_at
    }

    /// True once `now` reaches the expiry instant.
    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        now >= self.expires_at
    }

    /// True for admin sessions.
    pub fn is_admin(&self) -> bool {
        matches!(self.role, SessionRole::Admin)
    }

    /// Whether this session may read or mutate records owned by `uid`.
    pub fn can_act_for(&self, uid: &str) -> bool {
        self.is_admin() || self.subject() == uid
    }
}
