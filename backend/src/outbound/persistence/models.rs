//! Internal Diesel row structs for database operations.
//!
//! These types are implementation details of the persistence layer and must
//! never be exposed to the domain.

use chrono::{DateTime, Utc};
use diesel::prelude::*;
use serde_json::Value;

use super::schema::{adeudos, completados, formularios, prestamos, students};

/// Row struct for reading from the students table.
#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = students)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub(crate) struct StudentRow {
    pub uid: String,
    pub nombre: String,
    pub correo: String,
    pub rol: String,
    pub grupo: String,
    pub carrera: String,
    pub foto_perfil: Option<String>,
    pub created_at: DateTime<Utc>,
    pub last_login: DateTime<Utc>,
}

/// Insertable struct for first-login student records.
#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = students)]
pub(crate) struct NewStudentRow<'a> {
    pub uid: &'a str,
    pub nombre: &'a str,
    pub correo: &'a str,
    pub rol: &'a str,
    pub grupo: &'a str,
    pub carrera: &'a str,
    pub foto_perfil: Option<&'a str>,
    pub created_at: DateTime<Utc>,
    pub last_login: DateTime<Utc>,
}

#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = adeudos)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub(crate) struct DebtRow {
    pub id: String,
    pub student_uid: String,
    pub prestamo_id: Option<String>,
    pub concepto: String,
    pub monto: f64,
    pub estado: String,
    pub fecha_inicio: DateTime<Utc>,
    pub fecha_pago: Option<DateTime<Utc>>,
    pub materiales: Value,
}

#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = prestamos)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub(crate) struct LoanRow {
    pub id: String,
    pub student_uid: String,
    pub materiales: Value,
    pub estado: String,
    pub fecha_inicio: DateTime<Utc>,
    pub fecha_devolucion: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = completados)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub(crate) struct CompletedLoanRow {
    pub id: String,
    pub student_uid: String,
    pub prestamo_id: Option<String>,
    pub materiales: Value,
    pub fecha_inicio: DateTime<Utc>,
    pub fecha_devolucion: DateTime<Utc>,
}

#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = formularios)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub(crate) struct FormRow {
    pub id: String,
    pub student_uid: String,
    pub materia: String,
    pub profesor: String,
    pub grupo: String,
    pub practica: String,
    pub materiales: Value,
    pub fecha_solicitud: DateTime<Utc>,
}
