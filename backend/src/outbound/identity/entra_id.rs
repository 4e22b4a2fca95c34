//! Reqwest-backed Microsoft Entra ID adapter.
//!
//! Implements the OAuth 2.0 authorization-code flow: the authorize URL is
//! built locally, the code is exchanged at the token endpoint, and the
//! resulting access token is used once against the OpenID userinfo endpoint.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, StatusCode, Url};

use super::dto::{TokenResponseDto, UserInfoDto};
use crate::domain::IdentityClaims;
use crate::domain::ports::{IdentityProvider, IdentityProviderError};
use crate::outbound::http_support::status_message;

const DEFAULT_AUTHORITY: &str = "https://login.microsoftonline.com";
const DEFAULT_USERINFO_URL: &str = "https://graph.microsoft.com/oidc/userinfo";
const SCOPES: &str = "openid profile email User.Read";

/// Client registration and endpoints for one Entra ID tenant.
#[derive(Debug, Clone)]
pub struct EntraIdConfig {
    /// Directory (tenant) id.
    pub tenant_id: String,
    /// Application (client) id.
    pub client_id: String,
    /// Client secret.
    pub client_secret: String,
    /// Callback URL registered with the application.
    pub redirect_url: Url,
    /// Authority host, overridable for tests.
    pub authority: Url,
    /// OpenID userinfo endpoint.
    pub userinfo_url: Url,
}

impl EntraIdConfig {
    /// Configuration against the public Entra ID endpoints.
    ///
    /// # Errors
    ///
    /// Returns an error when the built-in endpoint URLs fail to parse.
    pub fn new(
        tenant_id: impl Into<String>,
        client_id: impl Into<String>,
        client_secret: impl Into<String>,
        redirect_url: Url,
    ) -> Result<Self, url::ParseError> {
        Ok(Self {
            tenant_id: tenant_id.into(),
            client_id: client_id.into(),
            client_secret: client_secret.into(),
            redirect_url,
            authority: Url::parse(DEFAULT_AUTHORITY)?,
            userinfo_url: Url::parse(DEFAULT_USERINFO_URL)?,
        })
    }

    fn endpoint(&self, leaf: &str) -> Result<Url, IdentityProviderError> {
        self.authority
            .join(&format!("{}/oauth2/v2.0/{leaf}", self.tenant_id))
            .map_err(|err| IdentityProviderError::not_configured(err.to_string()))
    }
}

/// Identity provider adapter for Microsoft Entra ID.
pub struct EntraIdProvider {
    client: Client,
    config: EntraIdConfig,
}

impl EntraIdProvider {
    /// Build an adapter using a reqwest client with an explicit request timeout.
    ///
    /// # Errors
    ///
    /// Returns an error when the reqwest client cannot be constructed.
    pub fn new(config: EntraIdConfig, timeout: Duration) -> Result<Self, reqwest::Error> {
        let client = Client::builder().timeout(timeout).build()?;
        Ok(Self { client, config })
    }

    async fn fetch_access_token(&self, code: &str) -> Result<String, IdentityProviderError> {
        let token_url = self.config.endpoint("token")?;
        let response = self
            .client
            .post(token_url)
            .form(&[
                ("client_id", self.config.client_id.as_str()),
                ("client_secret", self.config.client_secret.as_str()),
                ("code", code),
                ("redirect_uri", self.config.redirect_url.as_str()),
                ("grant_type", "authorization_code"),
                ("scope", SCOPES),
            ])
            .send()
            .await
            .map_err(map_transport_error)?;

        let status = response.status();
        let body = response.bytes().await.map_err(map_transport_error)?;
        if !status.is_success() {
            return Err(map_status_error(status, body.as_ref()));
        }
        let token: TokenResponseDto = serde_json::from_slice(body.as_ref()).map_err(|err| {
            IdentityProviderError::decode(format!("invalid token response: {err}"))
        })?;
        Ok(token.access_token)
    }

    async fn fetch_user_info(&self, access_token: &str) -> Result<IdentityClaims, IdentityProviderError> {
        let response = self
            .client
            .get(self.config.userinfo_url.clone())
            .bearer_auth(access_token)
            .header(reqwest::header::ACCEPT, "application/json")
            .send()
            .await
            .map_err(map_transport_error)?;

        let status = response.status();
        let body = response.bytes().await.map_err(map_transport_error)?;
        if !status.is_success() {
            return Err(map_status_error(status, body.as_ref()));
        }
        parse_user_info(body.as_ref())
    }
}

#[async_trait]
impl IdentityProvider for EntraIdProvider {
    fn authorization_url(&self, state: &str) -> Result<String, IdentityProviderError> {
        let mut url = self.config.endpoint("authorize")?;
        url.query_pairs_mut()
            .append_pair("client_id", &self.config.client_id)
            .append_pair("response_type", "code")
            .append_pair("redirect_uri", self.config.redirect_url.as_str())
            .append_pair("response_mode", "query")
            .append_pair("scope", SCOPES)
            .append_pair("state", state);
        Ok(url.into())
    }

    async fn exchange_code(&self, code: &str) -> Result<IdentityClaims, IdentityProviderError> {
        let access_token = self.fetch_access_token(code).await?;
        self.fetch_user_info(&access_token).await
    }
}

fn parse_user_info(body: &[u8]) -> Result<IdentityClaims, IdentityProviderError> {
    let decoded: UserInfoDto = serde_json::from_slice(body).map_err(|err| {
        IdentityProviderError::decode(format!("invalid userinfo payload: {err}"))
    })?;
    decoded.into_claims().map_err(IdentityProviderError::decode)
}

fn map_transport_error(error: reqwest::Error) -> IdentityProviderError {
    IdentityProviderError::transport(error.to_string())
}

fn map_status_error(status: StatusCode, body: &[u8]) -> IdentityProviderError {
    let message = status_message(status, body);
    if status.is_client_error() {
        IdentityProviderError::rejected(status.as_u16(), message)
    } else {
        IdentityProviderError::transport(message)
    }
}

#[cfg(test)]
mod tests {
    //! Regression coverage for non-network Entra ID helpers.
    use super::*;
    use rstest::{fixture, rstest};

    #[fixture]
    fn provider() -> EntraIdProvider {
        let redirect = Url::parse("https://portal.example/api/auth/callback").expect("url");
        let config = EntraIdConfig::new("tenant-1", "client-1", "secret", redirect).expect("config");
        EntraIdProvider::new(config, Duration::from_secs(10)).expect("client")
    }

    #[rstest]
    fn authorization_url_carries_state_and_redirect(provider: EntraIdProvider) {
        let url = Url::parse(&provider.authorization_url("nonce-1").expect("url")).expect("parse");

        assert_eq!(url.host_str(), Some("login.microsoftonline.com"));
        assert_eq!(url.path(), "/tenant-1/oauth2/v2.0/authorize");
        let pairs: Vec<(String, String)> = url.query_pairs().into_owned().collect();
        assert!(pairs.contains(&("state".to_owned(), "nonce-1".to_owned())));
        assert!(pairs.contains(&(
            "redirect_uri".to_owned(),
            "https://portal.example/api/auth/callback".to_owned()
        )));
        assert!(pairs.contains(&("response_type".to_owned(), "code".to_owned())));
    }

    #[rstest]
    fn user_info_falls_back_to_preferred_username() {
        let claims = parse_user_info(
            br#"{"sub":"abc","preferred_username":"ana@lasalle.mx","name":"Ana"}"#,
        )
        .expect("claims");

        assert_eq!(claims.subject, "abc");
        assert_eq!(claims.email.as_deref(), Some("ana@lasalle.mx"));
    }

    #[rstest]
    fn user_info_without_email_keeps_email_absent() {
        let claims = parse_user_info(br#"{"sub":"abc"}"#).expect("claims");
        assert!(claims.email.is_none());
    }

    #[rstest]
    #[case(br#"{"sub":"  "}"#.as_slice())]
    #[case(b"not json".as_slice())]
    fn malformed_user_info_is_a_decode_error(#[case] body: &[u8]) {
        let err = parse_user_info(body).expect_err("decode failure");
        assert!(matches!(err, IdentityProviderError::Decode { .. }));
    }

    #[rstest]
    #[case(StatusCode::BAD_REQUEST, true)]
    #[case(StatusCode::UNAUTHORIZED, true)]
    #[case(StatusCode::SERVICE_UNAVAILABLE, false)]
    fn maps_statuses(#[case] status: StatusCode, #[case] rejected: bool) {
        let err = map_status_error(status, br#"{"error":"invalid_grant"}"#);
        assert_eq!(
            matches!(err, IdentityProviderError::Rejected { .. }),
            rejected
        );
    }
}
