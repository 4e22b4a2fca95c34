//! Domain primitives, aggregates and services.
//!
//! Purpose: Define strongly typed entities used by the HTTP and persistence
//! layers, and the services that implement the driving ports. Types document
//! their invariants and serialisation contracts in their own Rustdoc.
//!
//! Public surface:
//! - Error (alias to `error::Error`): API error response payload.
//! - ErrorCode (alias to `error::ErrorCode`): stable error identifier.
//! - AccessPolicy (alias to `access::AccessPolicy`): email-suffix gate over
//!   protected path prefixes.
//! - SessionToken (alias to `session::SessionToken`): claims held in the
//!   encrypted session cookie.
//! - StudentRecord (alias to `student::StudentRecord`): persisted profile
//!   and group document.

pub mod access;
pub mod error;
pub mod ports;
pub mod principal;
pub mod records;
pub mod report;
pub mod session;
pub mod student;
pub mod trace_id;

mod lab_records_service;
mod student_account_service;
mod usage_report_service;

pub use self::access::{
    AccessPolicy, AccessPolicyError, DEFAULT_EMAIL_SUFFIX, DEFAULT_PROTECTED_PREFIXES,
    DEFAULT_PUBLIC_PREFIXES, DEFAULT_REDIRECT_TARGET, EmailSuffix, GateDecision, RolePolicy,
};
pub use self::error::{Error, ErrorCode, ErrorValidationError};
pub use self::lab_records_service::LabRecordsService;
pub use self::principal::{Principal, PrincipalId, PrincipalValidationError};
pub use self::records::{
    CompletedLoanRecord, DebtRecord, DebtStatus, FormRecord, LoanRecord, LoanStatus, Material,
    sort_by_return_desc,
};
pub use self::report::{MAX_REPORT_ITEMS, ReportInput, ReportValidationError, UsageReport};
pub use self::session::{IdentityClaims, SessionRole, SessionToken};
pub use self::student::{
    DEFAULT_CAREER, GroupName, GroupNameError, StudentRecord, StudentRole, UpsertOutcome,
};
pub use self::student_account_service::{GROUP_UPDATE_FAILED, StudentAccountService};
pub use self::trace_id::{TRACE_ID_HEADER, TraceId};
pub use self::usage_report_service::UsageReportService;

/// Convenient API result alias.
///
/// # Examples
/// ```
/// use actix_web::HttpResponse;
/// use portal::domain::{ApiResult, Error};
///
/// fn handler() -> ApiResult<HttpResponse> {
///     Err(Error::forbidden("nope"))
/// }
/// ```
pub type ApiResult<T> = Result<T, Error>;
