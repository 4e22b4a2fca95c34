//! Driven port for the external OpenID identity provider.
//!
//! The portal never sees passwords. It redirects the browser to the
//! provider, then trades the returned authorisation code for the subject's
//! claims.

use async_trait::async_trait;

use crate::domain::IdentityClaims;

use super::define_port_error;

define_port_error! {
    /// Errors raised by identity provider adapters.
    pub enum IdentityProviderError {
        /// The provider could not be reached.
        Transport { message: String } => "identity provider transport failed: {message}",
        /// The provider rejected the code or credentials.
        Rejected { status: u16, message: String } =>
            "identity provider rejected the request with status {status}: {message}",
        /// The provider response could not be decoded.
        Decode { message: String } => "identity provider response was malformed: {message}",
        /// No client credentials are configured.
        NotConfigured { message: String } => "identity provider is not configured: {message}",
    }
}

/// Sign-in redirect and code exchange against the identity provider.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait IdentityProvider: Send + Sync {
    /// URL the browser is sent to for sign-in, carrying `state` verbatim.
    fn authorization_url(&self, state: &str) -> Result<String, IdentityProviderError>;

    /// Exchange an authorisation code for the subject's claims.
    async fn exchange_code(&self, code: &str) -> Result<IdentityClaims, IdentityProviderError>;
}

/// Development provider that trusts the code as the sign-in identity.
///
/// The code itself becomes the email's local part, so `ana` signs in as
/// `ana@lasalle.mx` and `ana@evil.com` signs in as exactly that.
#[derive(Debug, Default, Clone, Copy)]
pub struct FixtureIdentityProvider;

#[async_trait]
impl IdentityProvider for FixtureIdentityProvider {
    fn authorization_url(&self, state: &str) -> Result<String, IdentityProviderError> {
        Ok(format!("/api/auth/callback?code=dev&state={state}"))
    }

    async fn exchange_code(&self, code: &str) -> Result<IdentityClaims, IdentityProviderError> {
        let code = code.trim();
        if code.is_empty() {
            return Err(IdentityProviderError::rejected(400_u16, "empty code"));
        }
        let email = if code.contains('@') {
            code.to_owned()
        } else {
            format!("{code}@lasalle.mx")
        };
        Ok(IdentityClaims {
            subject: format!("dev-{code}"),
            email: Some(email),
            name: Some(code.to_owned()),
            picture: None,
        })
    }
}

#[cfg(test)]
mod tests {
    //! Regression coverage for this module.
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("ana", "ana@lasalle.mx")]
    #[case("ana@evil.com", "ana@evil.com")]
    #[tokio::test]
    async fn fixture_provider_derives_email_from_code(#[case] code: &str, #[case] email: &str) {
        let claims = FixtureIdentityProvider
            .exchange_code(code)
            .await
            .expect("fixture exchange");
        assert_eq!(claims.email.as_deref(), Some(email));
        assert_eq!(claims.subject, format!("dev-{code}"));
    }

    #[rstest]
    #[tokio::test]
    async fn fixture_provider_rejects_blank_codes() {
        let err = FixtureIdentityProvider
            .exchange_code("  ")
            .await
            .expect_err("blank code");
        assert!(matches!(err, IdentityProviderError::Rejected { status: 400, .. }));
    }
}
