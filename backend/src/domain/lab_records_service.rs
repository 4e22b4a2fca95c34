//! Lab records service implementing [`LabRecordsQuery`].
//!
//! Scoped reads check ownership before touching the repository: a student
//! may only read their own records, administrators may read anyone's.

use std::sync::Arc;

use async_trait::async_trait;
use serde_json::json;
use tracing::{debug, warn};

use crate::domain::ports::{LabRecordsQuery, LabRecordsRepository, LabRecordsRepositoryError};
use crate::domain::{
    CompletedLoanRecord, DebtRecord, Error, FormRecord, LoanRecord, SessionToken,
    sort_by_return_desc,
};

/// Service implementing the lab record readers.
#[derive(Clone)]
pub struct LabRecordsService<R> {
    repo: Arc<R>,
}

impl<R> LabRecordsService<R> {
    /// Create a new service over `repo`.
    pub fn new(repo: Arc<R>) -> Self {
        Self { repo }
    }
}

fn map_repo_error(error: LabRecordsRepositoryError) -> Error {
    warn!(error = %error, "lab records read failed");
    match error {
        LabRecordsRepositoryError::Connection { message } => {
            Error::internal(format!("lab records unavailable: {message}"))
        }
        LabRecordsRepositoryError::Query { message } => {
            Error::internal(format!("lab records error: {message}"))
        }
    }
}

/// Trim and require an identifier, naming the offending field on failure.
fn required<'a>(value: &'a str, field: &str) -> Result<&'a str, Error> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(Error::invalid_request(format!("{field} is required"))
            .with_details(json!({ "field": field })));
    }
    Ok(trimmed)
}

fn authorize<'a>(actor: &SessionToken, uid: &'a str, field: &str) -> Result<&'a str, Error> {
    let uid = required(uid, field)?;
    if actor.can_act_for(uid) {
        Ok(uid)
    } else {
        debug!(actor = actor.subject(), uid, "rejected foreign record read");
        Err(Error::forbidden("cannot read another student's records"))
    }
}

#[async_trait]
impl<R> LabRecordsQuery for LabRecordsService<R>
where
    R: LabRecordsRepository,
{
    async fn debts(&self, actor: &SessionToken, uid: &str) -> Result<Vec<DebtRecord>, Error> {
        let uid = authorize(actor, uid, "uid")?;
        self.repo.list_debts(uid).await.map_err(map_repo_error)
    }

    async fn debt(
        &self,
        actor: &SessionToken,
        uid: &str,
        debt_id: &str,
    ) -> Result<DebtRecord, Error> {
        let uid = authorize(actor, uid, "uid")?;
        let debt_id = required(debt_id, "adeudoId")?;
        self.repo
            .find_debt(uid, debt_id)
            .await
            .map_err(map_repo_error)?
            .ok_or_else(|| Error::not_found(format!("adeudo {debt_id} not found")))
    }

    async fn active_loans(
        &self,
        actor: &SessionToken,
        uid: &str,
    ) -> Result<Vec<LoanRecord>, Error> {
        let uid = authorize(actor, uid, "uid")?;
        self.repo.list_active_loans(uid).await.map_err(map_repo_error)
    }

    async fn loan(
        &self,
        actor: &SessionToken,
        uid: &str,
        loan_id: &str,
    ) -> Result<LoanRecord, Error> {
        let uid = authorize(actor, uid, "uid")?;
        let loan_id = required(loan_id, "prestamoId")?;
        self.repo
            .find_loan(uid, loan_id)
            .await
            .map_err(map_repo_error)?
            .ok_or_else(|| Error::not_found(format!("prestamo {loan_id} not found")))
    }

    async fn completed_loans(
        &self,
        actor: &SessionToken,
        uid: &str,
    ) -> Result<Vec<CompletedLoanRecord>, Error> {
        let uid = authorize(actor, uid, "studentUid")?;
        let mut loans = self
            .repo
            .list_completed_loans(uid)
            .await
            .map_err(map_repo_error)?;
        sort_by_return_desc(&mut loans);
        Ok(loans)
    }

    async fn form(&self, actor: &SessionToken, form_id: &str) -> Result<FormRecord, Error> {
        let form_id = required(form_id, "formId")?;
        let form = self
            .repo
            .find_form(form_id)
            .await
            .map_err(map_repo_error)?
            .ok_or_else(|| Error::not_found(format!("formulario {form_id} not found")))?;
        // Forms are looked up by id alone; hide foreign ones as absent.
        if actor.can_act_for(&form.student_uid) {
            Ok(form)
        } else {
            Err(Error::not_found(format!("formulario {form_id} not found")))
        }
    }
}
