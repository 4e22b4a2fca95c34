//! Domain ports and supporting types for the hexagonal boundary.
//!
//! Driving ports (`*Command`, `*Query`) are what inbound adapters call.
//! Driven ports (`*Repository`, caches, external services) are what the
//! domain calls. Each driven port exposes a typed error enum so adapters map
//! their failures into predictable variants.

mod macros;
pub(crate) use macros::define_port_error;

mod identity_provider;
mod lab_records_query;
mod lab_records_repository;
mod profile_view_cache;
mod report_generator;
mod student_account_command;
mod student_profile_query;
mod student_repository;
mod usage_report_command;

#[cfg(test)]
pub use identity_provider::MockIdentityProvider;
pub use identity_provider::{FixtureIdentityProvider, IdentityProvider, IdentityProviderError};
#[cfg(test)]
pub use lab_records_query::MockLabRecordsQuery;
pub use lab_records_query::LabRecordsQuery;
#[cfg(test)]
pub use lab_records_repository::MockLabRecordsRepository;
pub use lab_records_repository::{
    FixtureLabRecordsRepository, LabRecordsRepository, LabRecordsRepositoryError,
    LabRecordsSnapshot,
};
#[cfg(test)]
pub use profile_view_cache::MockProfileViewCache;
pub use profile_view_cache::{FixtureProfileViewCache, ProfileViewCache, ProfileViewCacheError};
#[cfg(test)]
pub use report_generator::MockReportGenerator;
pub use report_generator::{FixtureReportGenerator, ReportGenerator, ReportGeneratorError};
#[cfg(test)]
pub use student_account_command::MockStudentAccountCommand;
pub use student_account_command::{FixtureStudentAccountCommand, StudentAccountCommand};
#[cfg(test)]
pub use student_profile_query::MockStudentProfileQuery;
pub use student_profile_query::{FixtureStudentProfileQuery, StudentProfileQuery};
#[cfg(test)]
pub use student_repository::MockStudentRepository;
pub use student_repository::{StudentRepository, StudentRepositoryError};
#[cfg(test)]
pub use usage_report_command::MockUsageReportCommand;
pub use usage_report_command::UsageReportCommand;
