//! Portal settings and the HTTP server configuration object.

use std::net::SocketAddr;
use std::time::Duration;

use actix_web::cookie::{Key, SameSite};
use ortho_config::OrthoConfig;
use serde::Deserialize;
use url::Url;

use portal::domain::{
    AccessPolicy, AccessPolicyError, DEFAULT_EMAIL_SUFFIX, DEFAULT_PROTECTED_PREFIXES,
    DEFAULT_PUBLIC_PREFIXES, EmailSuffix, RolePolicy,
};
use portal::inbound::http::state::{DEFAULT_SESSION_TTL_MINUTES, SessionPolicy};
use portal::outbound::identity::EntraIdConfig;
use portal::outbound::persistence::{DbPool, PoolConfig};
use portal::outbound::report::DEFAULT_REPORT_MODEL;

const DEFAULT_BIND_ADDR: &str = "0.0.0.0:8080";
const DEFAULT_REPORT_TIMEOUT_SECONDS: u64 = 60;
const IDENTITY_TIMEOUT: Duration = Duration::from_secs(10);
/// Longest accepted session lifetime: thirty days.
const MAX_SESSION_TTL_MINUTES: i64 = 30 * 24 * 60;

/// Errors raised while turning [`PortalSettings`] into runtime values.
#[derive(Debug, thiserror::Error)]
pub enum SettingsError {
    #[error("invalid bind address '{value}': {source}")]
    BindAddr {
        value: String,
        #[source]
        source: std::net::AddrParseError,
    },
    #[error(transparent)]
    Access(#[from] AccessPolicyError),
    #[error("identity provider settings incomplete; missing {missing}")]
    IdentityIncomplete { missing: String },
    #[error("invalid identity redirect URL '{value}': {source}")]
    RedirectUrl {
        value: String,
        #[source]
        source: url::ParseError,
    },
    #[error("invalid identity provider endpoint: {0}")]
    IdentityEndpoint(#[source] url::ParseError),
    #[error("session TTL must be between 1 and {max} minutes, got {minutes}")]
    SessionTtl { minutes: i64, max: i64 },
}

/// Portal settings loaded from `PORTAL_*` environment variables, the CLI and
/// configuration files.
#[derive(Debug, Clone, Deserialize, OrthoConfig)]
#[ortho_config(prefix = "PORTAL")]
pub struct PortalSettings {
    /// Socket address to listen on.
    pub bind_addr: Option<String>,
    /// PostgreSQL URL; in-memory adapters are used when absent.
    pub database_url: Option<String>,
    /// Upper bound on pooled database connections.
    pub database_max_connections: Option<u32>,
    /// Seconds to wait for a pooled connection before failing the request.
    pub database_checkout_timeout_seconds: Option<u64>,
    /// Institutional email suffix admitted by the access gate.
    pub allowed_email_suffix: Option<String>,
    /// Administrator emails, given as a comma list in the environment.
    pub admin_emails: Option<Vec<String>>,
    /// Protected path prefixes, given as a comma list in the environment.
    pub protected_prefixes: Option<Vec<String>>,
    /// Signed-in session lifetime in minutes.
    #[ortho_config(default = 120)]
    pub session_ttl_minutes: i64,
    /// Entra ID application (client) id.
    pub identity_client_id: Option<String>,
    /// Entra ID client secret.
    pub identity_client_secret: Option<String>,
    /// Entra ID directory (tenant) id.
    pub identity_tenant_id: Option<String>,
    /// Callback URL registered with Entra ID.
    pub identity_redirect_url: Option<String>,
    /// API key for the report generator; reports are disabled without it.
    pub report_api_key: Option<String>,
    /// Gemini model name.
    pub report_model: Option<String>,
    /// Report request timeout in seconds.
    pub report_timeout_seconds: Option<u64>,
}

impl Default for PortalSettings {
    fn default() -> Self {
        Self {
            bind_addr: None,
            database_url: None,
            database_max_connections: None,
            database_checkout_timeout_seconds: None,
            allowed_email_suffix: None,
            admin_emails: None,
            protected_prefixes: None,
            session_ttl_minutes: DEFAULT_SESSION_TTL_MINUTES,
            identity_client_id: None,
            identity_client_secret: None,
            identity_tenant_id: None,
            identity_redirect_url: None,
            report_api_key: None,
            report_model: None,
            report_timeout_seconds: None,
        }
    }
}

fn clean_list(raw: Option<&[String]>) -> Vec<String> {
    raw.unwrap_or_default()
        .iter()
        .flat_map(|item| item.split(','))
        .map(str::trim)
        .filter(|item| !item.is_empty())
        .map(str::to_owned)
        .collect()
}

fn present(value: Option<&String>) -> Option<&str> {
    value.map(|v| v.trim()).filter(|v| !v.is_empty())
}

impl PortalSettings {
    /// Listen address, defaulting to `0.0.0.0:8080`.
    pub fn bind_addr(&self) -> Result<SocketAddr, SettingsError> {
        let value = present(self.bind_addr.as_ref()).unwrap_or(DEFAULT_BIND_ADDR);
        value.parse().map_err(|source| SettingsError::BindAddr {
            value: value.to_owned(),
            source,
        })
    }

    /// Database URL, if one is configured.
    pub fn database_url(&self) -> Option<&str> {
        present(self.database_url.as_ref())
    }

    /// Pool settings for the configured database, if any.
    pub fn pool_config(&self) -> Option<PoolConfig> {
        let url = self.database_url()?;
        let mut config = PoolConfig::new(url);
        if let Some(max) = self.database_max_connections {
            config = config.with_max_connections(max);
        }
        if let Some(seconds) = self.database_checkout_timeout_seconds.filter(|s| *s > 0) {
            config = config.with_checkout_timeout(Duration::from_secs(seconds));
        }
        Some(config)
    }

    /// Configured administrator emails.
    pub fn admin_emails(&self) -> Vec<String> {
        clean_list(self.admin_emails.as_deref())
    }

    /// Protected prefixes, defaulting to `/alumno`, `/admin` and `/api`.
    pub fn protected_prefixes(&self) -> Vec<String> {
        let configured = clean_list(self.protected_prefixes.as_deref());
        if configured.is_empty() {
            DEFAULT_PROTECTED_PREFIXES
                .iter()
                .map(|prefix| (*prefix).to_owned())
                .collect()
        } else {
            configured
        }
    }

    /// Session lifetime, defaulting to two hours and capped at thirty days.
    pub fn session_ttl(&self) -> Result<chrono::Duration, SettingsError> {
        let minutes = self.session_ttl_minutes;
        if !(1..=MAX_SESSION_TTL_MINUTES).contains(&minutes) {
            return Err(SettingsError::SessionTtl {
                minutes,
                max: MAX_SESSION_TTL_MINUTES,
            });
        }
        Ok(chrono::Duration::minutes(minutes))
    }

    /// Access policy over the configured suffix and prefixes.
    pub fn access_policy(&self) -> Result<AccessPolicy, SettingsError> {
        let suffix = EmailSuffix::new(
            present(self.allowed_email_suffix.as_ref()).unwrap_or(DEFAULT_EMAIL_SUFFIX),
        )?;
        Ok(AccessPolicy::new(
            suffix,
            self.protected_prefixes(),
            DEFAULT_PUBLIC_PREFIXES,
        )?)
    }

    /// Session policy over `clock`, carrying the access and role rules.
    pub fn session_policy(
        &self,
        clock: std::sync::Arc<dyn mockable::Clock>,
    ) -> Result<SessionPolicy, SettingsError> {
        let mut policy = SessionPolicy::with_clock(clock);
        policy.access = self.access_policy()?;
        policy.roles = RolePolicy::new(self.admin_emails());
        policy.ttl = self.session_ttl()?;
        Ok(policy)
    }

    /// Entra ID registration, when every identity setting is present.
    ///
    /// Returns `Ok(None)` when none are set and an error when only some are.
    pub fn identity(&self) -> Result<Option<EntraIdConfig>, SettingsError> {
        let fields = [
            ("PORTAL_IDENTITY_CLIENT_ID", present(self.identity_client_id.as_ref())),
            (
                "PORTAL_IDENTITY_CLIENT_SECRET",
                present(self.identity_client_secret.as_ref()),
            ),
            ("PORTAL_IDENTITY_TENANT_ID", present(self.identity_tenant_id.as_ref())),
            (
                "PORTAL_IDENTITY_REDIRECT_URL",
                present(self.identity_redirect_url.as_ref()),
            ),
        ];
        let missing: Vec<&str> = fields
            .iter()
            .filter(|(_, value)| value.is_none())
            .map(|(name, _)| *name)
            .collect();
        if missing.len() == fields.len() {
            return Ok(None);
        }
        let [
            (_, Some(client_id)),
            (_, Some(client_secret)),
            (_, Some(tenant_id)),
            (_, Some(redirect)),
        ] = fields
        else {
            return Err(SettingsError::IdentityIncomplete {
                missing: missing.join(", "),
            });
        };
        let redirect_url = Url::parse(redirect).map_err(|source| SettingsError::RedirectUrl {
            value: redirect.to_owned(),
            source,
        })?;
        EntraIdConfig::new(tenant_id, client_id, client_secret, redirect_url)
            .map(Some)
            .map_err(SettingsError::IdentityEndpoint)
    }

    /// Report generator settings, when an API key is configured.
    pub fn report(&self) -> Option<ReportSettings> {
        present(self.report_api_key.as_ref()).map(|api_key| ReportSettings {
            api_key: api_key.to_owned(),
            model: present(self.report_model.as_ref())
                .unwrap_or(DEFAULT_REPORT_MODEL)
                .to_owned(),
            timeout: Duration::from_secs(
                self.report_timeout_seconds
                    .filter(|seconds| *seconds > 0)
                    .unwrap_or(DEFAULT_REPORT_TIMEOUT_SECONDS),
            ),
        })
    }
}

/// Report generator credentials and limits.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReportSettings {
    pub api_key: String,
    pub model: String,
    pub timeout: Duration,
}

/// Builder-style configuration for creating the HTTP server.
pub struct ServerConfig {
    pub(crate) key: Key,
    pub(crate) cookie_secure: bool,
    pub(crate) same_site: SameSite,
    pub(crate) bind_addr: SocketAddr,
    pub(crate) session: SessionPolicy,
    pub(crate) db_pool: Option<DbPool>,
    pub(crate) identity: Option<EntraIdConfig>,
    pub(crate) identity_timeout: Duration,
    pub(crate) report: Option<ReportSettings>,
}

impl ServerConfig {
    /// Construct a server configuration with in-memory adapters and fixture
    /// integrations.
    #[must_use]
    pub fn new(
        key: Key,
        cookie_secure: bool,
        same_site: SameSite,
        bind_addr: SocketAddr,
        session: SessionPolicy,
    ) -> Self {
        Self {
            key,
            cookie_secure,
            same_site,
            bind_addr,
            session,
            db_pool: None,
            identity: None,
            identity_timeout: IDENTITY_TIMEOUT,
            report: None,
        }
    }

    /// Attach a database connection pool for the persistence adapters.
    #[must_use]
    pub fn with_db_pool(mut self, pool: DbPool) -> Self {
        self.db_pool = Some(pool);
        self
    }

    /// Sign in against Entra ID instead of the development fixture.
    #[must_use]
    pub fn with_identity(mut self, identity: Option<EntraIdConfig>) -> Self {
        self.identity = identity;
        self
    }

    /// Generate reports with the configured generator.
    #[must_use]
    pub fn with_report(mut self, report: Option<ReportSettings>) -> Self {
        self.report = report;
        self
    }
}
