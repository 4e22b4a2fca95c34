//! Driving port for student account mutations.
//!
//! Covers the login-time upsert and group assignment. Both operations only
//! touch the record owned by the acting principal unless the session is an
//! administrator's.

use async_trait::async_trait;

use crate::domain::{Error, GroupName, Principal, SessionToken, UpsertOutcome};

/// Domain use-case port for creating and updating student records.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait StudentAccountCommand: Send + Sync {
    /// Create the record on first login, otherwise refresh `lastLogin` only.
    async fn upsert_student(&self, principal: &Principal) -> Result<UpsertOutcome, Error>;

    /// Assign a normalised group to `uid`'s record.
    ///
    /// Returns the stored group. Fails with `forbidden` when `actor` may not
    /// act for `uid`, `invalid_request` for a blank group, and `not_found`
    /// when no record exists.
    async fn set_group(
        &self,
        actor: &SessionToken,
        uid: &str,
        group: &str,
    ) -> Result<GroupName, Error>;
}

/// Fixture command that accepts every write without storing anything.
#[derive(Debug, Default, Clone, Copy)]
pub struct FixtureStudentAccountCommand;

#[async_trait]
impl StudentAccountCommand for FixtureStudentAccountCommand {
    async fn upsert_student(&self, _principal: &Principal) -> Result<UpsertOutcome, Error> {
        Ok(UpsertOutcome { created: true })
    }

    async fn set_group(
        &self,
        actor: &SessionToken,
        uid: &str,
        group: &str,
    ) -> Result<GroupName, Error> {
        if !actor.can_act_for(uid) {
            return Err(Error::forbidden("cannot modify another student's record"));
        }
        GroupName::new(group).map_err(|err| Error::invalid_request(err.to_string()))
    }
}
