//! `StudentRepository` over a `HashMap` keyed by uid.

use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard};

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::domain::ports::{StudentRepository, StudentRepositoryError};
use crate::domain::{GroupName, StudentRecord};

/// Student records held in process memory.
#[derive(Debug, Default)]
pub struct InMemoryStudentRepository {
    records: Mutex<HashMap<String, StudentRecord>>,
}

impl InMemoryStudentRepository {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> Result<MutexGuard<'_, HashMap<String, StudentRecord>>, StudentRepositoryError> {
        self.records
            .lock()
            .map_err(|_| StudentRepositoryError::connection("student store lock poisoned"))
    }
}

#[async_trait]
impl StudentRepository for InMemoryStudentRepository {
    async fn find(&self, uid: &str) -> Result<Option<StudentRecord>, StudentRepositoryError> {
        Ok(self.lock()?.get(uid).cloned())
    }

    async fn insert_if_absent(
        &self,
        record: &StudentRecord,
    ) -> Result<bool, StudentRepositoryError> {
        let mut records = self.lock()?;
        if records.contains_key(record.uid.as_str()) {
            return Ok(false);
        }
        records.insert(record.uid.as_str().to_owned(), record.clone());
        Ok(true)
    }

    async fn touch_last_login(
        &self,
        uid: &str,
        at: DateTime<Utc>,
    ) -> Result<bool, StudentRepositoryError> {
        Ok(self
            .lock()?
            .get_mut(uid)
            .map(|record| record.last_login = at)
            .is_some())
    }

    async fn update_group(
        &self,
        uid: &str,
        group: &GroupName,
    ) -> Result<bool, StudentRepositoryError> {
        Ok(self
            .lock()?
            .get_mut(uid)
            .map(|record| record.grupo = group.as_str().to_owned())
            .is_some())
    }

    async fn list(&self) -> Result<Vec<StudentRecord>, StudentRepositoryError> {
        let mut records: Vec<_> = self.lock()?.values().cloned().collect();
        records.sort_by(|a, b| (&a.nombre, a.uid.as_str()).cmp(&(&b.nombre, b.uid.as_str())));
        Ok(records)
    }
}

#[cfg(test)]
mod tests {
    //! Regression coverage for this module.
    use std::sync::Arc;

    use super::*;
    use crate::domain::Principal;
    use crate::test_support::{fixture_day, fixture_now};
    use rstest::rstest;

    fn record(uid: &str) -> StudentRecord {
        let principal = Principal::try_new(uid, &format!("{uid}@lasalle.mx"), Some(uid), None)
            .expect("valid principal");
        StudentRecord::first_login(&principal, fixture_now())
    }

    #[rstest]
    #[tokio::test]
    async fn insert_is_create_if_absent() {
        let repo = InMemoryStudentRepository::new();
        let mut first = record("u1");
        assert!(repo.insert_if_absent(&first).await.expect("insert"));

        first.carrera = "gastronomia".to_owned();
        assert!(!repo.insert_if_absent(&first).await.expect("second insert"));

        let stored = repo.find("u1").await.expect("find").expect("record");
        assert_eq!(stored.carrera, "turismo");
    }

    #[rstest]
    #[tokio::test]
    async fn touch_only_changes_last_login() {
        let repo = InMemoryStudentRepository::new();
        repo.insert_if_absent(&record("u1")).await.expect("insert");

        assert!(repo.touch_last_login("u1", fixture_day(1)).await.expect("touch"));
        assert!(!repo.touch_last_login("u9", fixture_day(1)).await.expect("touch"));

        let stored = repo.find("u1").await.expect("find").expect("record");
        assert_eq!(stored.last_login, fixture_day(1));
        assert_eq!(stored.created_at, fixture_now());
    }

    #[rstest]
    #[tokio::test]
    async fn list_orders_by_name() {
        let repo = InMemoryStudentRepository::new();
        for uid in ["zoe", "ana", "luis"] {
            repo.insert_if_absent(&record(uid)).await.expect("insert");
        }
        let names: Vec<_> = repo
            .list()
            .await
            .expect("list")
            .into_iter()
            .map(|record| record.nombre)
            .collect();
        assert_eq!(names, ["ana", "luis", "zoe"]);
    }

    #[rstest]
    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn concurrent_first_logins_store_one_record() {
        let repo = Arc::new(InMemoryStudentRepository::new());
        let handles: Vec<_> = (0..8)
            .map(|_| {
                let repo = Arc::clone(&repo);
                tokio::spawn(async move { repo.insert_if_absent(&record("u1")).await })
            })
            .collect();

        let mut created = 0;
        for handle in handles {
            if handle.await.expect("task").expect("insert") {
                created += 1;
            }
        }

        assert_eq!(created, 1);
        assert_eq!(repo.list().await.expect("list").len(), 1);
    }
}
