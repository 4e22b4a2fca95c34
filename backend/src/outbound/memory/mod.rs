//! In-memory adapters for the repository ports.
//!
//! Used when no database URL is configured and by integration tests. State is
//! held behind a `Mutex` and lost on restart.

mod lab_records_repository;
mod student_repository;

pub use lab_records_repository::InMemoryLabRecordsRepository;
pub use student_repository::InMemoryStudentRepository;
