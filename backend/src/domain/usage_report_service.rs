//! Usage report service implementing [`UsageReportCommand`].
//!
//! Aggregates every lab record into a [`ReportInput`], hands it to the
//! report generator and validates whatever comes back.

use std::sync::Arc;

use async_trait::async_trait;
use tracing::{info, warn};

use crate::domain::ports::{
    LabRecordsRepository, ReportGenerator, ReportGeneratorError, UsageReportCommand,
};
use crate::domain::{Error, ReportInput, SessionToken, UsageReport};

/// Service implementing the administrator usage report.
#[derive(Clone)]
pub struct UsageReportService<R, G> {
    records: Arc<R>,
    generator: Arc<G>,
}

impl<R, G> UsageReportService<R, G> {
    /// Create a new service.
    pub fn new(records: Arc<R>, generator: Arc<G>) -> Self {
        Self { records, generator }
    }
}

fn map_generator_error(error: ReportGeneratorError) -> Error {
    warn!(error = %error, "report generation failed");
    match error {
        ReportGeneratorError::NotConfigured { message } => {
            Error::internal(format!("report generator not configured: {message}"))
        }
        other => Error::bad_gateway(format!("report generator failed: {other}")),
    }
}

#[async_trait]
impl<R, G> UsageReportCommand for UsageReportService<R, G>
where
    R: LabRecordsRepository,
    G: ReportGenerator,
{
    async fn generate(&self, actor: &SessionToken) -> Result<UsageReport, Error> {
        if !actor.is_admin() {
            return Err(Error::forbidden("administrator access required"));
        }

        let snapshot = self.records.snapshot().await.map_err(|err| {
            warn!(error = %err, "failed to aggregate lab records");
            Error::internal(format!("lab records unavailable: {err}"))
        })?;
        let input = ReportInput::new(snapshot.loans, snapshot.debts, snapshot.completed);
        info!(
            prestamos = input.prestamos.len(),
            adeudos = input.adeudos.len(),
            completados = input.completados.len(),
            pagados = input.pagados.len(),
            "requesting usage report"
        );

        let payload = self
            .generator
            .generate(&input)
            .await
            .map_err(map_generator_error)?;
        UsageReport::from_untrusted(&payload).map_err(|err| {
            warn!(error = %err, "report generator returned an invalid report");
            Error::bad_gateway(format!("invalid report payload: {err}"))
        })
    }
}
