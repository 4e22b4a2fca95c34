//! Kitchen lab portal library.
//!
//! Hexagonal layout: `domain` holds records, policies and services behind
//! ports; `inbound` exposes them over HTTP; `outbound` adapts ports to
//! PostgreSQL, Entra ID and the report service.

pub mod doc;
pub mod domain;
pub mod inbound;
pub mod middleware;
pub mod outbound;

#[cfg(any(test, feature = "test-support"))]
pub mod test_support;

/// Public OpenAPI surface used by Swagger UI and tooling.
pub use doc::ApiDoc;
pub use domain::TraceId;
pub use middleware::Trace;
