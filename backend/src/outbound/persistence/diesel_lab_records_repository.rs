//! PostgreSQL-backed `LabRecordsRepository` implementation using Diesel ORM.
//!
//! `materiales` columns hold JSON arrays; rows whose JSON or status does not
//! decode are reported as query errors rather than silently dropped.

use async_trait::async_trait;
use diesel::prelude::*;
use diesel_async::RunQueryDsl;
use serde_json::Value;

use crate::domain::ports::{LabRecordsRepository, LabRecordsRepositoryError, LabRecordsSnapshot};
use crate::domain::{
    CompletedLoanRecord, DebtRecord, DebtStatus, FormRecord, LoanRecord, LoanStatus, Material,
};

use super::diesel_helpers::{map_diesel_error, map_pool_error};
use super::models::{CompletedLoanRow, DebtRow, FormRow, LoanRow};
use super::pool::DbPool;
use super::schema::{adeudos, completados, formularios, prestamos};

/// Diesel-backed implementation of the `LabRecordsRepository` port.
#[derive(Clone)]
pub struct DieselLabRecordsRepository {
    pool: DbPool,
}

impl DieselLabRecordsRepository {
    /// Create a new repository with the given connection pool.
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

fn decode_materials(id: &str, value: Value) -> Result<Vec<Material>, LabRecordsRepositoryError> {
    serde_json::from_value(value).map_err(|err| {
        LabRecordsRepositoryError::query(format!("record {id} has malformed materiales: {err}"))
    })
}

fn debt_from_row(row: DebtRow) -> Result<DebtRecord, LabRecordsRepositoryError> {
    let estado = DebtStatus::parse(&row.estado).ok_or_else(|| {
        LabRecordsRepositoryError::query(format!("adeudo {} has unknown estado", row.id))
    })?;
    let materiales = decode_materials(&row.id, row.materiales)?;
    Ok(DebtRecord {
        id: row.id,
        student_uid: row.student_uid,
        prestamo_id: row.prestamo_id,
        concepto: row.concepto,
        monto: row.monto,
        estado,
        fecha_inicio: row.fecha_inicio,
        fecha_pago: row.fecha_pago,
        materiales,
    })
}

fn loan_from_row(row: LoanRow) -> Result<LoanRecord, LabRecordsRepositoryError> {
    let estado = LoanStatus::parse(&row.estado).ok_or_else(|| {
        LabRecordsRepositoryError::query(format!("prestamo {} has unknown estado", row.id))
    })?;
    let materiales = decode_materials(&row.id, row.materiales)?;
    Ok(LoanRecord {
        id: row.id,
        student_uid: row.student_uid,
        materiales,
        estado,
        fecha_inicio: row.fecha_inicio,
        fecha_devolucion: row.fecha_devolucion,
    })
}

fn completed_from_row(row: CompletedLoanRow) -> Result<CompletedLoanRecord, LabRecordsRepositoryError> {
    let materiales = decode_materials(&row.id, row.materiales)?;
    Ok(CompletedLoanRecord {
        id: row.id,
        student_uid: row.student_uid,
        prestamo_id: row.prestamo_id,
        materiales,
        fecha_inicio: row.fecha_inicio,
        fecha_devolucion: row.fecha_devolucion,
    })
}

fn form_from_row(row: FormRow) -> Result<FormRecord, LabRecordsRepositoryError> {
    let materiales = decode_materials(&row.id, row.materiales)?;
    Ok(FormRecord {
        id: row.id,
        student_uid: row.student_uid,
        materia: row.materia,
        profesor: row.profesor,
        grupo: row.grupo,
        practica: row.practica,
        materiales,
        fecha_solicitud: row.fecha_solicitud,
    })
}

#[async_trait]
impl LabRecordsRepository for DieselLabRecordsRepository {
    async fn list_debts(&self, uid: &str) -> Result<Vec<DebtRecord>, LabRecordsRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let rows: Vec<DebtRow> = adeudos::table
            .filter(adeudos::student_uid.eq(uid))
            .order(adeudos::fecha_inicio.desc())
            .select(DebtRow::as_select())
            .load(&mut conn)
            .await
            .map_err(map_diesel_error)?;
        rows.into_iter().map(debt_from_row).collect()
    }

    async fn find_debt(
        &self,
        uid: &str,
        debt_id: &str,
    ) -> Result<Option<DebtRecord>, LabRecordsRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let row = adeudos::table
            .filter(adeudos::id.eq(debt_id))
            .filter(adeudos::student_uid.eq(uid))
            .select(DebtRow::as_select())
            .first(&mut conn)
            .await
            .optional()
            .map_err(map_diesel_error)?;
        row.map(debt_from_row).transpose()
    }

    async fn list_active_loans(
        &self,
        uid: &str,
    ) -> Result<Vec<LoanRecord>, LabRecordsRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let rows: Vec<LoanRow> = prestamos::table
            .filter(prestamos::student_uid.eq(uid))
            .filter(prestamos::estado.eq(LoanStatus::Activo.as_str()))
            .order(prestamos::fecha_inicio.desc())
            .select(LoanRow::as_select())
            .load(&mut conn)
            .await
            .map_err(map_diesel_error)?;
        rows.into_iter().map(loan_from_row).collect()
    }

    async fn find_loan(
        &self,
        uid: &str,
        loan_id: &str,
    ) -> Result<Option<LoanRecord>, LabRecordsRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let row = prestamos::table
            .filter(prestamos::id.eq(loan_id))
            .filter(prestamos::student_uid.eq(uid))
            .select(LoanRow::as_select())
            .first(&mut conn)
            .await
            .optional()
            .map_err(map_diesel_error)?;
        row.map(loan_from_row).transpose()
    }

    async fn list_completed_loans(
        &self,
        uid: &str,
    ) -> Result<Vec<CompletedLoanRecord>, LabRecordsRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let rows: Vec<CompletedLoanRow> = completados::table
            .filter(completados::student_uid.eq(uid))
            .order(completados::fecha_devolucion.desc())
            .select(CompletedLoanRow::as_select())
            .load(&mut conn)
            .await
            .map_err(map_diesel_error)?;
        rows.into_iter().map(completed_from_row).collect()
    }

    async fn find_form(
        &self,
        form_id: &str,
    ) -> Result<Option<FormRecord>, LabRecordsRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let row = formularios::table
            .filter(formularios::id.eq(form_id))
            .select(FormRow::as_select())
            .first(&mut conn)
            .await
            .optional()
            .map_err(map_diesel_error)?;
        row.map(form_from_row).transpose()
    }

    async fn snapshot(&self) -> Result<LabRecordsSnapshot, LabRecordsRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let loans: Vec<LoanRow> = prestamos::table
            .select(LoanRow::as_select())
            .load(&mut conn)
            .await
            .map_err(map_diesel_error)?;
        let debts: Vec<DebtRow> = adeudos::table
            .select(DebtRow::as_select())
            .load(&mut conn)
            .await
            .map_err(map_diesel_error)?;
        let completed: Vec<CompletedLoanRow> = completados::table
            .select(CompletedLoanRow::as_select())
            .load(&mut conn)
            .await
            .map_err(map_diesel_error)?;

        Ok(LabRecordsSnapshot {
            loans: loans.into_iter().map(loan_from_row).collect::<Result<_, _>>()?,
            debts: debts.into_iter().map(debt_from_row).collect::<Result<_, _>>()?,
            completed: completed
                .into_iter()
                .map(completed_from_row)
                .collect::<Result<_, _>>()?,
        })
    }
}

#[cfg(test)]
mod tests {
    //! Row decoding coverage; query behaviour needs a live database.
    use super::*;
    use crate::test_support::fixture_now;
    use rstest::rstest;
    use serde_json::json;

    fn debt_row(estado: &str, materiales: Value) -> DebtRow {
        DebtRow {
            id: "d1".to_owned(),
            student_uid: "u1".to_owned(),
            prestamo_id: Some("p1".to_owned()),
            concepto: "Plato roto".to_owned(),
            monto: 80.0,
            estado: estado.to_owned(),
            fecha_inicio: fixture_now(),
            fecha_pago: None,
            materiales,
        }
    }

    #[rstest]
    fn decodes_debt_rows() {
        let debt = debt_from_row(debt_row(
            "pendiente",
            json!([{ "nombre": "Plato", "cantidad": 2 }]),
        ))
        .expect("valid row");

        assert_eq!(debt.estado, DebtStatus::Pendiente);
        assert_eq!(debt.materiales.len(), 1);
        assert_eq!(debt.materiales[0].cantidad, 2);
    }

    #[rstest]
    #[case("vencido", json!([]))]
    #[case("pagado", json!({ "nombre": "Plato" }))]
    #[case("pagado", json!([{ "nombre": "Plato", "cantidad": -1 }]))]
    fn rejects_undecodable_debt_rows(#[case] estado: &str, #[case] materiales: Value) {
        let err = debt_from_row(debt_row(estado, materiales)).expect_err("invalid row");
        assert!(matches!(err, LabRecordsRepositoryError::Query { .. }));
    }
}
