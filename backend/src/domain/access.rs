//! Access policy for protected paths.
//!
//! The policy is a pure decision over `(path, token, now)`. The HTTP gate and
//! the sign-in callback both call [`AccessPolicy::is_authorized`], so there is
//! a single definition of "authorised".

use std::collections::HashSet;

use chrono::{DateTime, Utc};

use super::{SessionRole, SessionToken};

/// Institutional email suffix admitted by default.
pub const DEFAULT_EMAIL_SUFFIX: &str = "@lasalle.mx";

/// Path prefixes guarded by default.
pub const DEFAULT_PROTECTED_PREFIXES: [&str; 3] = ["/alumno", "/admin", "/api"];

/// Prefixes exempt from the guard even when nested in a protected prefix.
pub const DEFAULT_PUBLIC_PREFIXES: [&str; 1] = ["/api/auth"];

/// Where unauthorised requests are sent.
pub const DEFAULT_REDIRECT_TARGET: &str = "/";

/// Validation errors for policy configuration.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum AccessPolicyError {
    /// The email suffix must start with `@` and name a domain.
    #[error("email suffix must look like '@example.org', got '{0}'")]
    InvalidSuffix(String),
    /// Path prefixes must be absolute and must not end with a slash.
    #[error("path prefix must start with '/' and not end with one, got '{0}'")]
    InvalidPrefix(String),
}

/// Outcome of a gate decision.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GateDecision {
    /// Forward the request unchanged.
    Allow,
    /// Send the client to the given location instead.
    Redirect(String),
}

/// Case-sensitive institutional email suffix, e.g. `@lasalle.mx`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EmailSuffix(String);

impl EmailSuffix {
    /// Validate a suffix. It must begin with `@` and contain a domain.
    pub fn new(raw: impl Into<String>) -> Result<Self, AccessPolicyError> {
        let raw = raw.into();
        let valid = raw
            .strip_prefix('@')
            .is_some_and(|domain| !domain.is_empty() && !domain.contains('@'));
        if !valid || raw.trim() != raw {
            return Err(AccessPolicyError::InvalidSuffix(raw));
        }
        Ok(Self(raw))
    }

    /// Borrow the suffix.
    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }

    /// True when `email` ends with this suffix and has a non-empty local part.
    ///
    /// # Examples
    /// ```
    /// use portal::domain::EmailSuffix;
    ///
    /// let suffix = EmailSuffix::new("@lasalle.mx").expect("valid suffix");
    /// assert!(suffix.matches("ana@lasalle.mx"));
    /// assert!(!suffix.matches("ana@notlasalle.mx.evil.com"));
    /// assert!(!suffix.matches("ana@LASALLE.MX"));
    /// ```
    pub fn matches(&self, email: &str) -> bool {
        email
            .strip_suffix(self.as_str())
            .is_some_and(|local| !local.is_empty())
    }
}

impl Default for EmailSuffix {
    fn default() -> Self {
        Self(DEFAULT_EMAIL_SUFFIX.to_owned())
    }
}

/// Segment-aware path prefix set.
#[derive(Debug, Clone, PartialEq, Eq)]
struct PrefixSet(Vec<String>);

impl PrefixSet {
    fn new<I, S>(prefixes: I) -> Result<Self, AccessPolicyError>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        prefixes
            .into_iter()
            .map(|prefix| {
                let prefix = prefix.into();
                if !prefix.starts_with('/') || (prefix.len() > 1 && prefix.ends_with('/')) {
                    Err(AccessPolicyError::InvalidPrefix(prefix))
                } else {
                    Ok(prefix)
                }
            })
            .collect::<Result<Vec<_>, _>>()
            .map(Self)
    }

    fn contains(&self, path: &str) -> bool {
        self.0.iter().any(|prefix| {
            prefix == "/"
                || path
                    .strip_prefix(prefix.as_str())
                    .is_some_and(|rest| rest.is_empty() || rest.starts_with('/'))
        })
    }
}

/// Access policy evaluated by the gate middleware and the sign-in callback.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AccessPolicy {
    suffix: EmailSuffix,
    protected: PrefixSet,
    public: PrefixSet,
    redirect_target: String,
}

impl Default for AccessPolicy {
    fn default() -> Self {
        Self {
            suffix: EmailSuffix::default(),
            protected: PrefixSet(
                DEFAULT_PROTECTED_PREFIXES
                    .iter()
                    .map(|prefix| (*prefix).to_owned())
                    .collect(),
            ),
            public: PrefixSet(
                DEFAULT_PUBLIC_PREFIXES
                    .iter()
                    .map(|prefix| (*prefix).to_owned())
                    .collect(),
            ),
            redirect_target: DEFAULT_REDIRECT_TARGET.to_owned(),
        }
    }
}

impl AccessPolicy {
    /// Build a policy from explicit prefixes.
    pub fn new<P, Q>(suffix: EmailSuffix, protected: P, public: Q) -> Result<Self, AccessPolicyError>
    where
        P: IntoIterator,
        P::Item: Into<String>,
        Q: IntoIterator,
        Q::Item: Into<String>,
    {
        Ok(Self {
            suffix,
            protected: PrefixSet::new(protected)?,
            public: PrefixSet::new(public)?,
            redirect_target: DEFAULT_REDIRECT_TARGET.to_owned(),
        })
    }

    /// The configured email suffix.
    pub fn suffix(&self) -> &EmailSuffix {
        &self.suffix
    }

    /// Where refused requests are sent.
    pub fn redirect_target(&self) -> &str {
        &self.redirect_target
    }

    /// Whether `path` requires an authorised session.
    pub fn is_protected(&self, path: &str) -> bool {
        self.protected.contains(path) && !self.public.contains(path)
    }

    /// The single authorisation rule: a present, unexpired token whose email
    /// claim carries the institutional suffix.
    pub fn is_authorized(&self, token: Option<&SessionToken>, now: DateTime<Utc>) -> bool {
        token.is_some_and(|token| {
            !token.is_expired(now) && token.email().is_some_and(|email| self.suffix.matches(email))
        })
    }

    /// Decide whether a request for `path` proceeds.
    ///
    /// # Examples
    /// ```
    /// use chrono::Utc;
    /// use portal::domain::{AccessPolicy, GateDecision};
    ///
    /// let policy = AccessPolicy::default();
    /// assert_eq!(policy.decide("/", None, Utc::now()), GateDecision::Allow);
    /// assert_eq!(
    ///     policy.decide("/alumno", None, Utc::now()),
    ///     GateDecision::Redirect("/".into())
    /// );
    /// ```
    pub fn decide(
        &self,
        path: &str,
        token: Option<&SessionToken>,
        now: DateTime<Utc>,
    ) -> GateDecision {
        if !self.is_protected(path) || self.is_authorized(token, now) {
            GateDecision::Allow
        } else {
            GateDecision::Redirect(self.redirect_target.clone())
        }
    }
}

/// Maps authenticated emails to session roles.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RolePolicy {
    admin_emails: HashSet<String>,
}

impl RolePolicy {
    /// Build a role policy from the configured admin emails; matching is
    /// exact after trimming.
    pub fn new<I, S>(admin_emails: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        Self {
            admin_emails: admin_emails
                .into_iter()
                .map(|email| email.as_ref().trim().to_owned())
                .filter(|email| !email.is_empty())
                .collect(),
        }
    }

    /// Role for a signed-in email.
    pub fn role_for(&self, email: &str) -> SessionRole {
        if self.admin_emails.contains(email) {
            SessionRole::Admin
        } else {
            SessionRole::Student
        }
    }
}

#[cfg(test)]
mod tests;
