//! Outbound adapters implementing domain ports for external infrastructure.
//!
//! - **persistence**: PostgreSQL-backed repositories using Diesel ORM
//! - **memory**: in-process repositories for database-less runs and tests
//! - **cache**: in-process profile view cache
//! - **identity**: Microsoft Entra ID sign-in
//! - **report**: generative-language usage reports
//!
//! Adapters are thin translators between domain types and infrastructure
//! representations. They contain no business logic.

pub mod cache;
mod http_support;
pub mod identity;
pub mod memory;
pub mod persistence;
pub mod report;
