//! Driving port for generating the lab usage report.

use async_trait::async_trait;

use crate::domain::{Error, SessionToken, UsageReport};

/// Domain use-case port for administrator usage reports.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait UsageReportCommand: Send + Sync {
    /// Aggregate every lab record and ask the generator for a report.
    async fn generate(&self, actor: &SessionToken) -> Result<UsageReport, Error>;
}
