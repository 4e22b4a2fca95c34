//! Port for caching rendered profile views.
//!
//! The cache is an optimisation only. Callers log its failures and fall back
//! to the repository, so a broken cache never fails a request.

use async_trait::async_trait;

use crate::domain::StudentRecord;

use super::define_port_error;

define_port_error! {
    /// Errors surfaced by the profile cache adapter.
    pub enum ProfileViewCacheError {
        /// Cache backend is unavailable or timing out.
        Backend { message: String } => "profile cache backend failure: {message}",
    }
}

/// Keyed store of student records for the profile page.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ProfileViewCache: Send + Sync {
    /// Read a cached record.
    async fn get(&self, uid: &str) -> Result<Option<StudentRecord>, ProfileViewCacheError>;

    /// Store a record under its uid.
    async fn put(&self, record: &StudentRecord) -> Result<(), ProfileViewCacheError>;

    /// Drop any cached record for `uid`.
    async fn invalidate(&self, uid: &str) -> Result<(), ProfileViewCacheError>;
}

/// Cache that never holds anything.
#[derive(Debug, Default, Clone, Copy)]
pub struct FixtureProfileViewCache;

#[async_trait]
impl ProfileViewCache for FixtureProfileViewCache {
    async fn get(&self, _uid: &str) -> Result<Option<StudentRecord>, ProfileViewCacheError> {
        Ok(None)
    }

    async fn put(&self, _record: &StudentRecord) -> Result<(), ProfileViewCacheError> {
        Ok(())
    }

    async fn invalidate(&self, _uid: &str) -> Result<(), ProfileViewCacheError> {
        Ok(())
    }
}
