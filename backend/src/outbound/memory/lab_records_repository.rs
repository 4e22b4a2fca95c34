//! `LabRecordsRepository` over in-memory vectors.
//!
//! Records are seeded through the builder methods; the port itself is
//! read-only.

use std::sync::{Mutex, MutexGuard};

use async_trait::async_trait;

use crate::domain::ports::{LabRecordsRepository, LabRecordsRepositoryError, LabRecordsSnapshot};
use crate::domain::{CompletedLoanRecord, DebtRecord, FormRecord, LoanRecord, LoanStatus};

#[derive(Debug, Default)]
struct Store {
    snapshot: LabRecordsSnapshot,
    forms: Vec<FormRecord>,
}

/// Lab records held in process memory.
#[derive(Debug, Default)]
pub struct InMemoryLabRecordsRepository {
    store: Mutex<Store>,
}

impl InMemoryLabRecordsRepository {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed a debt.
    pub fn with_debt(self, debt: DebtRecord) -> Self {
        self.seed(|store| store.snapshot.debts.push(debt))
    }

    /// Seed a loan.
    pub fn with_loan(self, loan: LoanRecord) -> Self {
        self.seed(|store| store.snapshot.loans.push(loan))
    }

    /// Seed a completed loan.
    pub fn with_completed(self, completed: CompletedLoanRecord) -> Self {
        self.seed(|store| store.snapshot.completed.push(completed))
    }

    /// Seed a request form.
    pub fn with_form(self, form: FormRecord) -> Self {
        self.seed(|store| store.forms.push(form))
    }

    fn seed(self, apply: impl FnOnce(&mut Store)) -> Self {
        let mut store = match self.store.into_inner() {
            Ok(store) => store,
            Err(poisoned) => poisoned.into_inner(),
        };
        apply(&mut store);
        Self {
            store: Mutex::new(store),
        }
    }

    fn lock(&self) -> Result<MutexGuard<'_, Store>, LabRecordsRepositoryError> {
        self.store
            .lock()
            .map_err(|_| LabRecordsRepositoryError::connection("lab records lock poisoned"))
    }
}

#[async_trait]
impl LabRecordsRepository for InMemoryLabRecordsRepository {
    async fn list_debts(&self, uid: &str) -> Result<Vec<DebtRecord>, LabRecordsRepositoryError> {
        Ok(self
            .lock()?
            .snapshot
            .debts
            .iter()
            .filter(|debt| debt.student_uid == uid)
            .cloned()
            .collect())
    }

    async fn find_debt(
        &self,
        uid: &str,
        debt_id: &str,
    ) -> Result<Option<DebtRecord>, LabRecordsRepositoryError> {
        Ok(self
            .lock()?
            .snapshot
            .debts
            .iter()
            .find(|debt| debt.id == debt_id && debt.student_uid == uid)
            .cloned())
    }

    async fn list_active_loans(
        &self,
        uid: &str,
    ) -> Result<Vec<LoanRecord>, LabRecordsRepositoryError> {
        Ok(self
            .lock()?
            .snapshot
            .loans
            .iter()
            .filter(|loan| loan.student_uid == uid && loan.estado == LoanStatus::Activo)
            .cloned()
            .collect())
    }

    async fn find_loan(
        &self,
        uid: &str,
        loan_id: &str,
    ) -> Result<Option<LoanRecord>, LabRecordsRepositoryError> {
        Ok(self
            .lock()?
            .snapshot
            .loans
            .iter()
            .find(|loan| loan.id == loan_id && loan.student_uid == uid)
            .cloned())
    }

    async fn list_completed_loans(
        &self,
        uid: &str,
    ) -> Result<Vec<CompletedLoanRecord>, LabRecordsRepositoryError> {
        Ok(self
            .lock()?
            .snapshot
            .completed
            .iter()
            .filter(|completed| completed.student_uid == uid)
            .cloned()
            .collect())
    }

    async fn find_form(
        &self,
        form_id: &str,
    ) -> Result<Option<FormRecord>, LabRecordsRepositoryError> {
        Ok(self
            .lock()?
            .forms
            .iter()
            .find(|form| form.id == form_id)
            .cloned())
    }

    async fn snapshot(&self) -> Result<LabRecordsSnapshot, LabRecordsRepositoryError> {
        Ok(self.lock()?.snapshot.clone())
    }
}

#[cfg(test)]
mod tests {
    //! Regression coverage for this module.
    use super::*;
    use crate::domain::DebtStatus;
    use crate::test_support::{debt, form, loan};
    use rstest::rstest;

    #[rstest]
    #[tokio::test]
    async fn forms_are_found_by_id() {
        let repo = InMemoryLabRecordsRepository::new().with_form(form("f1", "u1"));

        let found = repo.find_form("f1").await.expect("find");
        assert_eq!(found.map(|record| record.student_uid), Some("u1".to_owned()));
        assert!(repo.find_form("f9").await.expect("find").is_none());
    }

    #[rstest]
    #[tokio::test]
    async fn debts_are_filtered_by_owner() {
        let repo = InMemoryLabRecordsRepository::new()
            .with_debt(debt("d1", "u1", DebtStatus::Pendiente))
            .with_debt(debt("d2", "u2", DebtStatus::Pendiente));

        let debts = repo.list_debts("u1").await.expect("list");
        assert_eq!(debts.len(), 1);
        assert!(repo.find_debt("u1", "d2").await.expect("find").is_none());
    }

    #[rstest]
    #[tokio::test]
    async fn completed_loans_are_not_active() {
        let mut returned = loan("p2", "u1");
        returned.estado = LoanStatus::Completado;
        let repo = InMemoryLabRecordsRepository::new()
            .with_loan(loan("p1", "u1"))
            .with_loan(returned);

        let active = repo.list_active_loans("u1").await.expect("list");
        let ids: Vec<_> = active.iter().map(|loan| loan.id.as_str()).collect();
        assert_eq!(ids, ["p1"]);
    }
}
