//! Driving port for reading student records.

use async_trait::async_trait;

use crate::domain::{Error, SessionToken, StudentRecord};

/// Domain use-case port for profile and roster reads.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait StudentProfileQuery: Send + Sync {
    /// The signed-in student's own record.
    async fn profile(&self, actor: &SessionToken) -> Result<StudentRecord, Error>;

    /// Every student record. Administrators only.
    async fn list_students(&self, actor: &SessionToken) -> Result<Vec<StudentRecord>, Error>;
}

/// Fixture query with no records on file.
#[derive(Debug, Default, Clone, Copy)]
pub struct FixtureStudentProfileQuery;

#[async_trait]
impl StudentProfileQuery for FixtureStudentProfileQuery {
    async fn profile(&self, _actor: &SessionToken) -> Result<StudentRecord, Error> {
        Err(Error::not_found("student record not found"))
    }

    async fn list_students(&self, actor: &SessionToken) -> Result<Vec<StudentRecord>, Error> {
        if actor.is_admin() {
            Ok(Vec::new())
        } else {
            Err(Error::forbidden("administrator access required"))
        }
    }
}
