//! Driven port for the external usage-report generator.
//!
//! Adapters return the generator's raw JSON. Validation into a
//! [`UsageReport`](crate::domain::UsageReport) happens in the domain so that
//! no adapter can smuggle an unchecked shape through.

use async_trait::async_trait;
use serde_json::Value;

use crate::domain::ReportInput;

use super::define_port_error;

define_port_error! {
    /// Errors raised while calling the report generator.
    pub enum ReportGeneratorError {
        /// The request could not be sent or the connection dropped.
        Transport { message: String } => "report generator transport failed: {message}",
        /// The generator did not answer in time.
        Timeout { message: String } => "report generator timed out: {message}",
        /// The generator answered with a non-success status.
        Upstream { status: u16, message: String } =>
            "report generator returned status {status}: {message}",
        /// The response could not be decoded.
        Decode { message: String } => "report generator response was malformed: {message}",
        /// No generator credentials are configured.
        NotConfigured { message: String } => "report generator is not configured: {message}",
    }
}

/// Produce a statistical usage report from aggregated lab data.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ReportGenerator: Send + Sync {
    /// Ask the generator for a report and return its untrusted JSON payload.
    async fn generate(&self, input: &ReportInput) -> Result<Value, ReportGeneratorError>;
}

/// Generator used when no credentials are configured.
#[derive(Debug, Default, Clone, Copy)]
pub struct FixtureReportGenerator;

#[async_trait]
impl ReportGenerator for FixtureReportGenerator {
    async fn generate(&self, _input: &ReportInput) -> Result<Value, ReportGeneratorError> {
        Err(ReportGeneratorError::not_configured(
            "set PORTAL_REPORT_API_KEY to enable reports",
        ))
    }
}

#[cfg(test)]
mod tests {
    //! Regression coverage for this module.
    use super::*;
    use rstest::rstest;

    #[rstest]
    fn upstream_errors_include_status() {
        let err = ReportGeneratorError::upstream(503_u16, "overloaded");
        assert_eq!(
            err.to_string(),
            "report generator returned status 503: overloaded"
        );
    }

    #[rstest]
    #[tokio::test]
    async fn fixture_generator_reports_missing_configuration() {
        let err = FixtureReportGenerator
            .generate(&ReportInput::default())
            .await
            .expect_err("fixture never generates");
        assert!(matches!(err, ReportGeneratorError::NotConfigured { .. }));
    }
}
