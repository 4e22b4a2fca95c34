//! Authenticated principal asserted by the identity provider.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Validation errors returned by [`Principal::try_new`].
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum PrincipalValidationError {
    /// The identifier was missing or blank.
    #[error("principal id must not be empty")]
    MissingId,
    /// The email claim was missing or blank.
    #[error("principal email must not be empty")]
    MissingEmail,
}

impl PrincipalValidationError {
    /// Name of the offending input field, as sent by clients.
    pub fn field(&self) -> &'static str {
        match self {
            Self::MissingId => "id",
            Self::MissingEmail => "email",
        }
    }
}

/// Opaque identifier for a principal; also the primary key of its student
/// record.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct PrincipalId(String);

impl PrincipalId {
    /// Validate and construct a [`PrincipalId`]; surrounding whitespace is
    /// dropped.
    pub fn new(raw: impl AsRef<str>) -> Result<Self, PrincipalValidationError> {
        let trimmed = raw.as_ref().trim();
        if trimmed.is_empty() {
            return Err(PrincipalValidationError::MissingId);
        }
        Ok(Self(trimmed.to_owned()))
    }

    /// Borrow the identifier.
    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }
}

impl AsRef<str> for PrincipalId {
    fn as_ref(&self) -> &str {
        self.as_str()
    }
}

impl fmt::Display for PrincipalId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl From<PrincipalId> for String {
    fn from(value: PrincipalId) -> Self {
        value.0
    }
}

impl TryFrom<String> for PrincipalId {
    type Error = PrincipalValidationError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

/// Identity asserted by the identity provider; immutable once built.
///
/// # Examples
/// ```
/// use portal::domain::Principal;
///
/// let principal = Principal::try_new("u1", "ana@lasalle.mx", Some("Ana"), None)
///     .expect("valid principal");
/// assert_eq!(principal.id().as_str(), "u1");
/// assert_eq!(principal.name(), "Ana");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Principal {
    id: PrincipalId,
    email: String,
    name: String,
    profile_image_url: Option<String>,
}

impl Principal {
    /// Validate the required claims and construct a principal.
    ///
    /// `id` and `email` are required; a blank `name` is stored as empty and a
    /// blank image is dropped.
    pub fn try_new(
        id: impl AsRef<str>,
        email: impl AsRef<str>,
        name: Option<&str>,
        profile_image_url: Option<&str>,
    ) -> Result<Self, PrincipalValidationError> {
        let id = PrincipalId::new(id)?;
        let email = email.as_ref().trim();
        if email.is_empty() {
            return Err(PrincipalValidationError::MissingEmail);
        }
        Ok(Self {
            id,
            email: email.to_owned(),
            name: name.map(str::trim).unwrap_or_default().to_owned(),
            profile_image_url: profile_image_url
                .map(str::trim)
                .filter(|url| !url.is_empty())
                .map(str::to_owned),
        })
    }

    /// Principal identifier.
    pub fn id(&self) -> &PrincipalId {
        &self.id
    }

    /// Email claim.
    pub fn email(&self) -> &str {
        self.email.as_str()
    }

    /// Display name; empty when the provider did not assert one.
    pub fn name(&self) -> &str {
        self.name.as_str()
    }

    /// Optional profile image URL.
    pub fn profile_image_url(&self) -> Option<&str> {
        self.profile_image_url.as_deref()
    }
}
