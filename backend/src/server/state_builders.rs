//! Builders for the HTTP state ports.
//!
//! Each port picks its adapter from [`ServerConfig`]: Diesel repositories
//! when a pool is configured, in-memory repositories otherwise, and the
//! external identity and report services only when their settings are
//! present.

use std::sync::Arc;

use actix_web::web;
use mockable::Clock;
use tracing::warn;

use portal::domain::ports::{
    FixtureIdentityProvider, FixtureReportGenerator, IdentityProvider, LabRecordsQuery,
    LabRecordsRepository, ReportGenerator, StudentAccountCommand, StudentProfileQuery,
    StudentRepository, UsageReportCommand,
};
use portal::domain::{LabRecordsService, StudentAccountService, UsageReportService};
use portal::inbound::http::state::{HttpState, HttpStatePorts};
use portal::outbound::cache::InMemoryProfileViewCache;
use portal::outbound::identity::EntraIdProvider;
use portal::outbound::memory::{InMemoryLabRecordsRepository, InMemoryStudentRepository};
use portal::outbound::persistence::{DieselLabRecordsRepository, DieselStudentRepository};
use portal::outbound::report::GeminiReportGenerator;

use super::ServerConfig;
use super::config::ReportSettings;

/// Account command and profile query backed by one student service.
fn student_ports<R>(
    repo: Arc<R>,
    clock: Arc<dyn Clock>,
) -> (Arc<dyn StudentAccountCommand>, Arc<dyn StudentProfileQuery>)
where
    R: StudentRepository + 'static,
{
    let cache = Arc::new(InMemoryProfileViewCache::new(clock.clone()));
    let service = Arc::new(StudentAccountService::new(repo, cache, clock));
    (
        service.clone() as Arc<dyn StudentAccountCommand>,
        service as Arc<dyn StudentProfileQuery>,
    )
}

/// Record readers and the usage report over one lab records repository.
fn record_ports<R, G>(
    repo: Arc<R>,
    generator: Arc<G>,
) -> (Arc<dyn LabRecordsQuery>, Arc<dyn UsageReportCommand>)
where
    R: LabRecordsRepository + 'static,
    G: ReportGenerator + 'static,
{
    (
        Arc::new(LabRecordsService::new(repo.clone())),
        Arc::new(UsageReportService::new(repo, generator)),
    )
}

fn record_ports_with_report<R>(
    repo: Arc<R>,
    report: Option<&ReportSettings>,
) -> std::io::Result<(Arc<dyn LabRecordsQuery>, Arc<dyn UsageReportCommand>)>
where
    R: LabRecordsRepository + 'static,
{
    match report {
        Some(settings) => {
            let generator =
                GeminiReportGenerator::new(&settings.api_key, &settings.model, settings.timeout)
                    .map_err(|err| std::io::Error::other(err.to_string()))?;
            Ok(record_ports(repo, Arc::new(generator)))
        }
        None => {
            warn!("report generator not configured; usage reports disabled");
            Ok(record_ports(repo, Arc::new(FixtureReportGenerator)))
        }
    }
}

fn identity_port(config: &ServerConfig) -> std::io::Result<Arc<dyn IdentityProvider>> {
    match &config.identity {
        Some(entra) => {
            let provider = EntraIdProvider::new(entra.clone(), config.identity_timeout)
                .map_err(|err| std::io::Error::other(format!("identity client: {err}")))?;
            Ok(Arc::new(provider))
        }
        None => {
            warn!("identity provider not configured; using development sign-in");
            Ok(Arc::new(FixtureIdentityProvider))
        }
    }
}

/// Assemble every port the handlers need.
///
/// # Errors
///
/// Returns [`std::io::Error`] when an HTTP client cannot be constructed.
pub(super) fn build_ports(config: &ServerConfig) -> std::io::Result<HttpStatePorts> {
    let clock = config.session.clock.clone();
    let report = config.report.as_ref();
    let ((accounts, profiles), (records, reports)) = match &config.db_pool {
        Some(pool) => (
            student_ports(Arc::new(DieselStudentRepository::new(pool.clone())), clock),
            record_ports_with_report(
                Arc::new(DieselLabRecordsRepository::new(pool.clone())),
                report,
            )?,
        ),
        None => {
            warn!("no database configured; records are kept in memory");
            (
                student_ports(Arc::new(InMemoryStudentRepository::new()), clock),
                record_ports_with_report(Arc::new(InMemoryLabRecordsRepository::new()), report)?,
            )
        }
    };

    Ok(HttpStatePorts {
        accounts,
        profiles,
        records,
        reports,
        identity: identity_port(config)?,
    })
}

/// Build the shared HTTP state.
///
/// # Errors
///
/// See [`build_ports`].
pub(super) fn build_http_state(config: &ServerConfig) -> std::io::Result<web::Data<HttpState>> {
    let ports = build_ports(config)?;
    Ok(web::Data::new(HttpState::new(ports, config.session.clone())))
}
