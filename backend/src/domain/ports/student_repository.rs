//! Port for student record persistence.
//!
//! Creation must be an atomic create-if-absent so that two concurrent first
//! logins for one principal can never produce two records or overwrite a
//! freshly created record with stale defaults.

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::domain::{GroupName, StudentRecord};

use super::define_port_error;

define_port_error! {
    /// Persistence errors raised by student repository adapters.
    pub enum StudentRepositoryError {
        /// Repository connection could not be established.
        Connection { message: String } => "student repository connection failed: {message}",
        /// Query or mutation failed during execution.
        Query { message: String } => "student repository query failed: {message}",
    }
}

/// Port for storing and reading student records.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait StudentRepository: Send + Sync {
    /// Fetch a record by uid.
    async fn find(&self, uid: &str) -> Result<Option<StudentRecord>, StudentRepositoryError>;

    /// Insert `record` unless one with the same uid exists.
    ///
    /// Returns `true` when this call inserted the row. The check and the
    /// insert are a single atomic operation.
    async fn insert_if_absent(&self, record: &StudentRecord)
    -> Result<bool, StudentRepositoryError>;

    /// Set `lastLogin` only. Returns `false` when no record matched.
    async fn touch_last_login(
        &self,
        uid: &str,
        at: DateTime<Utc>,
    ) -> Result<bool, StudentRepositoryError>;

    /// Set `grupo` only. Returns `false` when no record matched.
    async fn update_group(
        &self,
        uid: &str,
        group: &GroupName,
    ) -> Result<bool, StudentRepositoryError>;

    /// List every record ordered by name.
    async fn list(&self) -> Result<Vec<StudentRecord>, StudentRepositoryError>;
}
