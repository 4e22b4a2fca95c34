//! Shared HTTP adapter state.
//!
//! HTTP handlers accept this state via `actix_web::web::Data` so they only
//! depend on domain ports (use-cases) and remain testable without I/O.

use std::sync::Arc;

use chrono::{DateTime, Duration, Utc};
use mockable::Clock;

use crate::domain::ports::{
    IdentityProvider, LabRecordsQuery, StudentAccountCommand, StudentProfileQuery,
    UsageReportCommand,
};
use crate::domain::{AccessPolicy, RolePolicy};

/// Default lifetime of a signed-in session.
pub const DEFAULT_SESSION_TTL_MINUTES: i64 = 120;

/// Parameter object bundling all port implementations for HTTP handlers.
#[derive(Clone)]
pub struct HttpStatePorts {
    pub accounts: Arc<dyn StudentAccountCommand>,
    pub profiles: Arc<dyn StudentProfileQuery>,
    pub records: Arc<dyn LabRecordsQuery>,
    pub reports: Arc<dyn UsageReportCommand>,
    pub identity: Arc<dyn IdentityProvider>,
}

/// Sign-in policies shared by the auth handlers and the access gate.
#[derive(Clone)]
pub struct SessionPolicy {
    pub access: AccessPolicy,
    pub roles: RolePolicy,
    pub ttl: Duration,
    pub clock: Arc<dyn Clock>,
}

impl SessionPolicy {
    /// Policy with the default access rules, no admins and the default TTL.
    pub fn with_clock(clock: Arc<dyn Clock>) -> Self {
        Self {
            access: AccessPolicy::default(),
            roles: RolePolicy::default(),
            ttl: Duration::minutes(DEFAULT_SESSION_TTL_MINUTES),
            clock,
        }
    }

    /// Current instant according to the configured clock.
    pub fn now(&self) -> DateTime<Utc> {
        self.clock.utc()
    }
}

/// Dependency bundle for HTTP handlers.
#[derive(Clone)]
pub struct HttpState {
    pub accounts: Arc<dyn StudentAccountCommand>,
    pub profiles: Arc<dyn StudentProfileQuery>,
    pub records: Arc<dyn LabRecordsQuery>,
    pub reports: Arc<dyn UsageReportCommand>,
    pub identity: Arc<dyn IdentityProvider>,
    pub session: SessionPolicy,
}

impl HttpState {
    /// Construct state from a ports bundle and the session policy.
    ///
    /// # Examples
    /// ```no_run
    /// use std::sync::Arc;
    ///
    /// use mockable::DefaultClock;
    /// use portal::domain::ports::{
    ///     FixtureIdentityProvider, FixtureLabRecordsRepository, FixtureReportGenerator,
    ///     FixtureStudentAccountCommand, FixtureStudentProfileQuery,
    /// };
    /// use portal::domain::{LabRecordsService, UsageReportService};
    /// use portal::inbound::http::state::{HttpState, HttpStatePorts, SessionPolicy};
    ///
    /// let records = Arc::new(FixtureLabRecordsRepository);
    /// let ports = HttpStatePorts {
    ///     accounts: Arc::new(FixtureStudentAccountCommand),
    ///     profiles: Arc::new(FixtureStudentProfileQuery),
    ///     records: Arc::new(LabRecordsService::new(records.clone())),
    ///     reports: Arc::new(UsageReportService::new(records, Arc::new(FixtureReportGenerator))),
    ///     identity: Arc::new(FixtureIdentityProvider),
    /// };
    /// let state = HttpState::new(ports, SessionPolicy::with_clock(Arc::new(DefaultClock)));
    /// let _accounts = state.accounts.clone();
    /// ```
    pub fn new(ports: HttpStatePorts, session: SessionPolicy) -> Self {
        let HttpStatePorts {
            accounts,
            profiles,
            records,
            reports,
            identity,
        } = ports;
        Self {
            accounts,
            profiles,
            records,
            reports,
            identity,
            session,
        }
    }
}
