//! PostgreSQL persistence adapters using Diesel ORM.
//!
//! Repositories translate between Diesel rows and domain records through
//! `diesel-async` connections checked out of a `bb8` pool. Row structs
//! (`models.rs`) and table definitions (`schema.rs`) never leave this module.
//!
//! # Example
//!
//! ```ignore
//! use portal::outbound::persistence::{DbPool, DieselStudentRepository, PoolConfig};
//!
//! let pool = DbPool::new(PoolConfig::new("postgres://localhost/portal")).await?;
//! let repo = DieselStudentRepository::new(pool);
//! ```

mod diesel_helpers;
mod diesel_lab_records_repository;
mod diesel_student_repository;
mod migrations;
mod models;
mod pool;
mod schema;

pub use diesel_lab_records_repository::DieselLabRecordsRepository;
pub use diesel_student_repository::DieselStudentRepository;
pub use migrations::{MigrationError, run_migrations};
pub use pool::{DbPool, PoolConfig, PoolError};
