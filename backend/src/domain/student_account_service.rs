//! Student account service implementing the account driving ports.
//!
//! The service owns the login-time upsert, group assignment and the cached
//! profile view. Profile cache failures are logged and otherwise ignored.

use std::sync::Arc;

use async_trait::async_trait;
use mockable::Clock;
use tracing::{debug, warn};

use crate::domain::ports::{
    ProfileViewCache, StudentAccountCommand, StudentProfileQuery, StudentRepository,
    StudentRepositoryError,
};
use crate::domain::{
    Error, GroupName, Principal, SessionToken, StudentRecord, UpsertOutcome,
};

/// Message returned when a group update cannot be persisted.
pub const GROUP_UPDATE_FAILED: &str = "No se pudo actualizar el grupo";

/// Service implementing [`StudentAccountCommand`] and [`StudentProfileQuery`].
#[derive(Clone)]
pub struct StudentAccountService<R, C> {
    repo: Arc<R>,
    cache: Arc<C>,
    clock: Arc<dyn Clock>,
}

impl<R, C> StudentAccountService<R, C> {
    /// Create a new service over the given repository and cache.
    pub fn new(repo: Arc<R>, cache: Arc<C>, clock: Arc<dyn Clock>) -> Self {
        Self { repo, cache, clock }
    }
}

impl<R, C> StudentAccountService<R, C>
where
    R: StudentRepository,
    C: ProfileViewCache,
{
    fn map_repo_error(error: StudentRepositoryError) -> Error {
        match error {
            StudentRepositoryError::Connection { message } => {
                Error::internal(format!("student repository unavailable: {message}"))
            }
            StudentRepositoryError::Query { message } => {
                Error::internal(format!("student repository error: {message}"))
            }
        }
    }

    async fn invalidate_profile(&self, uid: &str) {
        if let Err(err) = self.cache.invalidate(uid).await {
            warn!(error = %err, uid, "failed to invalidate cached profile");
        }
    }

    async fn cache_profile(&self, record: &StudentRecord) {
        if let Err(err) = self.cache.put(record).await {
            warn!(error = %err, uid = record.uid.as_str(), "failed to cache profile");
        }
    }

    async fn cached_profile(&self, uid: &str) -> Option<StudentRecord> {
        match self.cache.get(uid).await {
            Ok(hit) => hit,
            Err(err) => {
                warn!(error = %err, uid, "profile cache read failed");
                None
            }
        }
    }
}

#[async_trait]
impl<R, C> StudentAccountCommand for StudentAccountService<R, C>
where
    R: StudentRepository,
    C: ProfileViewCache,
{
    async fn upsert_student(&self, principal: &Principal) -> Result<UpsertOutcome, Error> {
        let now = self.clock.utc();
        let uid = principal.id().as_str();
        let record = StudentRecord::first_login(principal, now);

        let created = self
            .repo
            .insert_if_absent(&record)
            .await
            .map_err(Self::map_repo_error)?;
        if created {
            debug!(uid, "created student record");
            return Ok(UpsertOutcome { created: true });
        }

        let touched = self
            .repo
            .touch_last_login(uid, now)
            .await
            .map_err(Self::map_repo_error)?;
        if !touched {
            // The row existed a moment ago; nothing deletes students, so this
            // is a storage inconsistency worth surfacing.
            return Err(Error::internal(format!(
                "student record {uid} vanished during login"
            )));
        }
        self.invalidate_profile(uid).await;
        Ok(UpsertOutcome { created: false })
    }

    async fn set_group(
        &self,
        actor: &SessionToken,
        uid: &str,
        group: &str,
    ) -> Result<GroupName, Error> {
        let uid = uid.trim();
        if uid.is_empty() {
            return Err(Error::invalid_request("userId must not be empty")
                .with_details(serde_json::json!({ "field": "userId" })));
        }
        let group = GroupName::new(group).map_err(|_| {
            Error::invalid_request("newGroup must not be empty")
                .with_details(serde_json::json!({ "field": "newGroup" }))
        })?;
        if !actor.can_act_for(uid) {
            debug!(actor = actor.subject(), uid, "rejected foreign group update");
            return Err(Error::forbidden("cannot modify another student's group"));
        }

        let updated = self.repo.update_group(uid, &group).await.map_err(|err| {
            warn!(error = %err, uid, "group update failed");
            Error::internal(GROUP_UPDATE_FAILED)
        })?;
        if !updated {
            return Err(Error::not_found(format!("student {uid} not found")));
        }

        self.invalidate_profile(uid).await;
        Ok(group)
    }
}

#[async_trait]
impl<R, C> StudentProfileQuery for StudentAccountService<R, C>
where
    R: StudentRepository,
    C: ProfileViewCache,
{
    async fn profile(&self, actor: &SessionToken) -> Result<StudentRecord, Error> {
        let uid = actor.subject();
        if let Some(record) = self.cached_profile(uid).await {
            return Ok(record);
        }

        let record = self
            .repo
            .find(uid)
            .await
            .map_err(Self::map_repo_error)?
            .ok_or_else(|| Error::not_found(format!("student {uid} not found")))?;
        self.cache_profile(&record).await;
        Ok(record)
    }

    async fn list_students(&self, actor: &SessionToken) -> Result<Vec<StudentRecord>, Error> {
        if !actor.is_admin() {
            return Err(Error::forbidden("administrator access required"));
        }
        self.repo.list().await.map_err(Self::map_repo_error)
    }
}

#[cfg(test)]
#[path = "student_account_service_tests.rs"]
mod tests;
