//! PostgreSQL-backed `StudentRepository` implementation using Diesel ORM.
//!
//! First-login creation is a single `INSERT ... ON CONFLICT (uid) DO NOTHING`
//! so concurrent logins for one principal cannot create two rows.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use diesel::prelude::*;
use diesel_async::RunQueryDsl;
use tracing::warn;

use crate::domain::ports::{StudentRepository, StudentRepositoryError};
use crate::domain::{GroupName, PrincipalId, StudentRecord, StudentRole};

use super::diesel_helpers::{map_diesel_error, map_pool_error};
use super::models::{NewStudentRow, StudentRow};
use super::pool::DbPool;
use super::schema::students;

/// Diesel-backed implementation of the `StudentRepository` port.
#[derive(Clone)]
pub struct DieselStudentRepository {
    pool: DbPool,
}

impl DieselStudentRepository {
    /// Create a new repository with the given connection pool.
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

fn row_to_record(row: StudentRow) -> Result<StudentRecord, StudentRepositoryError> {
    let uid = PrincipalId::new(&row.uid)
        .map_err(|err| StudentRepositoryError::query(format!("stored uid is invalid: {err}")))?;
    let rol = StudentRole::parse(&row.rol).unwrap_or_else(|| {
        warn!(value = %row.rol, uid = %row.uid, "unrecognised rol value, defaulting to estudiante");
        StudentRole::Estudiante
    });
    Ok(StudentRecord {
        uid,
        nombre: row.nombre,
        correo: row.correo,
        rol,
        grupo: row.grupo,
        carrera: row.carrera,
        foto_perfil: row.foto_perfil,
        created_at: row.created_at,
        last_login: row.last_login,
    })
}

#[async_trait]
impl StudentRepository for DieselStudentRepository {
    async fn find(&self, uid: &str) -> Result<Option<StudentRecord>, StudentRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let row = students::table
            .filter(students::uid.eq(uid))
            .select(StudentRow::as_select())
            .first(&mut conn)
            .await
            .optional()
            .map_err(map_diesel_error)?;
        row.map(row_to_record).transpose()
    }

    async fn insert_if_absent(
        &self,
        record: &StudentRecord,
    ) -> Result<bool, StudentRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let new_row = NewStudentRow {
            uid: record.uid.as_str(),
            nombre: &record.nombre,
            correo: &record.correo,
            rol: record.rol.as_str(),
            grupo: &record.grupo,
            carrera: &record.carrera,
            foto_perfil: record.foto_perfil.as_deref(),
            created_at: record.created_at,
            last_login: record.last_login,
        };
        let inserted = diesel::insert_into(students::table)
            .values(&new_row)
            .on_conflict(students::uid)
            .do_nothing()
            .execute(&mut conn)
            .await
            .map_err(map_diesel_error)?;
        Ok(inserted == 1)
    }

    async fn touch_last_login(
        &self,
        uid: &str,
        at: DateTime<Utc>,
    ) -> Result<bool, StudentRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let updated = diesel::update(students::table.filter(students::uid.eq(uid)))
            .set(students::last_login.eq(at))
            .execute(&mut conn)
            .await
            .map_err(map_diesel_error)?;
        Ok(updated > 0)
    }

    async fn update_group(
        &self,
        uid: &str,
        group: &GroupName,
    ) -> Result<bool, StudentRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let updated = diesel::update(students::table.filter(students::uid.eq(uid)))
            .set(students::grupo.eq(group.as_str()))
            .execute(&mut conn)
            .await
            .map_err(map_diesel_error)?;
        Ok(updated > 0)
    }

    async fn list(&self) -> Result<Vec<StudentRecord>, StudentRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let rows: Vec<StudentRow> = students::table
            .order((students::nombre.asc(), students::uid.asc()))
            .select(StudentRow::as_select())
            .load(&mut conn)
            .await
            .map_err(map_diesel_error)?;
        rows.into_iter().map(row_to_record).collect()
    }
}

#[cfg(test)]
mod tests {
    //! Row mapping coverage; query behaviour needs a live database.
    use super::*;
    use crate::test_support::fixture_now;
    use rstest::rstest;

    fn row(uid: &str, rol: &str) -> StudentRow {
        StudentRow {
            uid: uid.to_owned(),
            nombre: "Ana".to_owned(),
            correo: "ana@lasalle.mx".to_owned(),
            rol: rol.to_owned(),
            grupo: "3A".to_owned(),
            carrera: "turismo".to_owned(),
            foto_perfil: None,
            created_at: fixture_now(),
            last_login: fixture_now(),
        }
    }

    #[rstest]
    #[case("estudiante")]
    #[case("profesor")]
    fn rows_map_to_student_records(#[case] rol: &str) {
        let record = row_to_record(row("u1", rol)).expect("valid row");
        assert_eq!(record.uid.as_str(), "u1");
        assert_eq!(record.rol, StudentRole::Estudiante);
        assert_eq!(record.grupo, "3A");
    }

    #[rstest]
    fn blank_uids_are_rejected() {
        let err = row_to_record(row("  ", "estudiante")).expect_err("blank uid");
        assert!(matches!(err, StudentRepositoryError::Query { .. }));
    }
}
