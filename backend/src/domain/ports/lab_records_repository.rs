//! Port for reading the lab sub-collections.
//!
//! Debts, loans, completed loans and forms are written by other software;
//! this port is read-only.

use async_trait::async_trait;

use crate::domain::{CompletedLoanRecord, DebtRecord, FormRecord, LoanRecord};

use super::define_port_error;

define_port_error! {
    /// Errors raised by lab record adapters.
    pub enum LabRecordsRepositoryError {
        /// Repository connection could not be established.
        Connection { message: String } => "lab records connection failed: {message}",
        /// Query failed during execution.
        Query { message: String } => "lab records query failed: {message}",
    }
}

/// Every lab record on file, for aggregate reporting.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct LabRecordsSnapshot {
    /// All loans.
    pub loans: Vec<LoanRecord>,
    /// All debts, pending and paid.
    pub debts: Vec<DebtRecord>,
    /// All completed loans.
    pub completed: Vec<CompletedLoanRecord>,
}

/// Read-only access to a student's lab records.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait LabRecordsRepository: Send + Sync {
    /// Debts owned by `uid`.
    async fn list_debts(&self, uid: &str) -> Result<Vec<DebtRecord>, LabRecordsRepositoryError>;

    /// One debt, only if owned by `uid`.
    async fn find_debt(
        &self,
        uid: &str,
        debt_id: &str,
    ) -> Result<Option<DebtRecord>, LabRecordsRepositoryError>;

    /// Active loans owned by `uid`.
    async fn list_active_loans(
        &self,
        uid: &str,
    ) -> Result<Vec<LoanRecord>, LabRecordsRepositoryError>;

    /// One loan, only if owned by `uid`.
    async fn find_loan(
        &self,
        uid: &str,
        loan_id: &str,
    ) -> Result<Option<LoanRecord>, LabRecordsRepositoryError>;

    /// Completed loans owned by `uid`, in storage order.
    async fn list_completed_loans(
        &self,
        uid: &str,
    ) -> Result<Vec<CompletedLoanRecord>, LabRecordsRepositoryError>;

    /// One request form by id.
    async fn find_form(&self, form_id: &str)
    -> Result<Option<FormRecord>, LabRecordsRepositoryError>;

    /// Everything on file.
    async fn snapshot(&self) -> Result<LabRecordsSnapshot, LabRecordsRepositoryError>;
}

/// Fixture repository with no records.
#[derive(Debug, Default, Clone, Copy)]
pub struct FixtureLabRecordsRepository;

#[async_trait]
impl LabRecordsRepository for FixtureLabRecordsRepository {
    async fn list_debts(&self, _uid: &str) -> Result<Vec<DebtRecord>, LabRecordsRepositoryError> {
        Ok(Vec::new())
    }

    async fn find_debt(
        &self,
        _uid: &str,
        _debt_id: &str,
    ) -> Result<Option<DebtRecord>, LabRecordsRepositoryError> {
        Ok(None)
    }

    async fn list_active_loans(
        &self,
        _uid: &str,
    ) -> Result<Vec<LoanRecord>, LabRecordsRepositoryError> {
        Ok(Vec::new())
    }

    async fn find_loan(
        &self,
        _uid: &str,
        _loan_id: &str,
    ) -> Result<Option<LoanRecord>, LabRecordsRepositoryError> {
        Ok(None)
    }

    async fn list_completed_loans(
        &self,
        _uid: &str,
    ) -> Result<Vec<CompletedLoanRecord>, LabRecordsRepositoryError> {
        Ok(Vec::new())
    }

    async fn find_form(
        &self,
        _form_id: &str,
    ) -> Result<Option<FormRecord>, LabRecordsRepositoryError> {
        Ok(None)
    }

    async fn snapshot(&self) -> Result<LabRecordsSnapshot, LabRecordsRepositoryError> {
        Ok(LabRecordsSnapshot::default())
    }
}
