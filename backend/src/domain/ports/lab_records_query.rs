//! Driving port for the student-scoped lab record readers.
//!
//! Every call names the owning student explicitly and the actor must be
//! allowed to act for that student.

use async_trait::async_trait;

use crate::domain::{
    CompletedLoanRecord, DebtRecord, Error, FormRecord, LoanRecord, SessionToken,
};

/// Domain use-case port for reading debts, loans, completions and forms.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait LabRecordsQuery: Send + Sync {
    /// Debts owned by `uid`.
    async fn debts(&self, actor: &SessionToken, uid: &str) -> Result<Vec<DebtRecord>, Error>;

    /// One debt owned by `uid`.
    async fn debt(
        &self,
        actor: &SessionToken,
        uid: &str,
        debt_id: &str,
    ) -> Result<DebtRecord, Error>;

    /// Active loans owned by `uid`.
    async fn active_loans(&self, actor: &SessionToken, uid: &str)
    -> Result<Vec<LoanRecord>, Error>;

    /// One loan owned by `uid`.
    async fn loan(
        &self,
        actor: &SessionToken,
        uid: &str,
        loan_id: &str,
    ) -> Result<LoanRecord, Error>;

    /// Completed loans owned by `uid`, most recent return first.
    async fn completed_loans(
        &self,
        actor: &SessionToken,
        uid: &str,
    ) -> Result<Vec<CompletedLoanRecord>, Error>;

    /// A request form, readable by its owner or an administrator.
    async fn form(&self, actor: &SessionToken, form_id: &str) -> Result<FormRecord, Error>;
}
