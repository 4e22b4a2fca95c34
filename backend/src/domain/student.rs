//! Student record aggregate and group assignment values.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use super::{Principal, PrincipalId};

/// Career assigned to newly created students.
pub const DEFAULT_CAREER: &str = "turismo";

/// Role stored on a student record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum StudentRole {
    /// The only role a student record carries.
    #[default]
    Estudiante,
}

impl StudentRole {
    /// Stored representation.
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Estudiante => "estudiante",
        }
    }

    /// Parse the stored representation.
    pub fn parse(raw: &str) -> Option<Self> {
        (raw == "estudiante").then_some(Self::Estudiante)
    }
}

/// Validation errors for group names.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum GroupNameError {
    /// The group was missing or blank.
    #[error("group must not be empty")]
    Empty,
}

/// Upper-cased, trimmed group label.
///
/// # Examples
/// ```
/// use portal::domain::GroupName;
///
/// let group = GroupName::new(" morning ").expect("valid group");
/// assert_eq!(group.as_str(), "MORNING");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct GroupName(String);

impl GroupName {
    /// Normalise and validate a group label.
    pub fn new(raw: impl AsRef<str>) -> Result<Self, GroupNameError> {
        let trimmed = raw.as_ref().trim();
        if trimmed.is_empty() {
            return Err(GroupNameError::Empty);
        }
        Ok(Self(trimmed.to_uppercase()))
    }

    /// Borrow the normalised label.
    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }
}

impl From<GroupName> for String {
    fn from(value: GroupName) -> Self {
        value.0
    }
}

impl TryFrom<String> for GroupName {
    type Error = GroupNameError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

/// Persisted profile and group document for a principal.
///
/// `uid` always equals the id of the principal that created the record.
/// `grupo` is empty until assigned.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct StudentRecord {
    /// Owning principal id.
    #[schema(value_type = String)]
    pub uid: PrincipalId,
    /// Display name.
    pub nombre: String,
    /// Institutional email.
    pub correo: String,
    /// Stored role.
    pub rol: StudentRole,
    /// Upper-cased group; empty until assigned.
    pub grupo: String,
    /// Career.
    pub carrera: String,
    /// Profile picture URL.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub foto_perfil: Option<String>,
    /// First login instant.
    pub created_at: DateTime<Utc>,
    /// Most recent login instant.
    pub last_login: DateTime<Utc>,
}

impl StudentRecord {
    /// Record created at a principal's first login.
    pub fn first_login(principal: &Principal, now: DateTime<Utc>) -> Self {
        Self {
            uid: principal.id().clone(),
            nombre: principal.name().to_owned(),
            correo: principal.email().to_owned(),
            rol: StudentRole::Estudiante,
            grupo: String::new(),
            carrera: DEFAULT_CAREER.to_owned(),
            foto_perfil: principal.profile_image_url().map(str::to_owned),
            created_at: now,
            last_login: now,
        }
    }
}

/// Result of an upsert at login.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct UpsertOutcome {
    /// True when this call created the record.
    pub created: bool,
}
