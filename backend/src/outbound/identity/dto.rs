//! DTOs for decoding identity provider responses.

use serde::Deserialize;

use crate::domain::IdentityClaims;

#[derive(Debug, Deserialize)]
pub(super) struct TokenResponseDto {
    pub(super) access_token: String,
}

/// OpenID Connect userinfo payload.
///
/// Entra ID omits `email` for accounts without a mailbox; `preferred_username`
/// then carries the UPN, which is the institutional address.
#[derive(Debug, Deserialize)]
pub(super) struct UserInfoDto {
    pub(super) sub: String,
    #[serde(default)]
    pub(super) email: Option<String>,
    #[serde(default)]
    pub(super) preferred_username: Option<String>,
    #[serde(default)]
    pub(super) name: Option<String>,
    #[serde(default)]
    pub(super) picture: Option<String>,
}

impl UserInfoDto {
    pub(super) fn into_claims(self) -> Result<IdentityClaims, String> {
        let subject = self.sub.trim().to_owned();
        if subject.is_empty() {
            return Err("userinfo is missing a subject".to_owned());
        }
        let email = self
            .email
            .or(self.preferred_username)
            .map(|email| email.trim().to_owned())
            .filter(|email| !email.is_empty());
        Ok(IdentityClaims {
            subject,
            email,
            name: self.name.filter(|name| !name.trim().is_empty()),
            picture: self.picture,
        })
    }
}
