//! Lab sub-collection records: debts, loans, completed loans and request
//! forms.
//!
//! These records are written by other lab software; this service only reads
//! them. Timestamps serialise as RFC 3339 strings so payloads decode the same
//! over any transport.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// A borrowed item and its quantity.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Material {
    /// Item name.
    pub nombre: String,
    /// Units borrowed.
    pub cantidad: u32,
}

/// Lifecycle state of a debt.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum DebtStatus {
    /// Outstanding.
    Pendiente,
    /// Settled.
    Pagado,
}

impl DebtStatus {
    /// Stored representation.
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Pendiente => "pendiente",
            Self::Pagado => "pagado",
        }
    }

    /// Parse the stored representation.
    pub fn parse(raw: &str) -> Option<Self> {
        match raw {
            "pendiente" => Some(Self::Pendiente),
            "pagado" => Some(Self::Pagado),
            _ => None,
        }
    }
}

/// Lifecycle state of a loan.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum LoanStatus {
    /// Items are out.
    Activo,
    /// Items were returned.
    Completado,
}

impl LoanStatus {
    /// Stored representation.
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Activo => "activo",
            Self::Completado => "completado",
        }
    }

    /// Parse the stored representation.
    pub fn parse(raw: &str) -> Option<Self> {
        match raw {
            "activo" => Some(Self::Activo),
            "completado" => Some(Self::Completado),
            _ => None,
        }
    }
}

/// Debt (`adeudo`) owed by a student, typically for damaged or missing items.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct DebtRecord {
    /// Document id.
    pub id: String,
    /// Owning student.
    pub student_uid: String,
    /// Loan that originated the debt, if any.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub prestamo_id: Option<String>,
    /// What the debt is for.
    pub concepto: String,
    /// Amount owed, in pesos.
    pub monto: f64,
    /// Lifecycle state.
    pub estado: DebtStatus,
    /// When the debt was raised.
    pub fecha_inicio: DateTime<Utc>,
    /// When the debt was paid.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fecha_pago: Option<DateTime<Utc>>,
    /// Items involved.
    pub materiales: Vec<Material>,
}

/// Loan (`prestamo`) of lab materials.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct LoanRecord {
    /// Document id.
    pub id: String,
    /// Borrowing student.
    pub student_uid: String,
    /// Items borrowed.
    pub materiales: Vec<Material>,
    /// Lifecycle state.
    pub estado: LoanStatus,
    /// When the items went out.
    pub fecha_inicio: DateTime<Utc>,
    /// When the items came back.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fecha_devolucion: Option<DateTime<Utc>>,
}

/// Completed loan (`completado`), kept as a return receipt.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CompletedLoanRecord {
    /// Document id.
    pub id: String,
    /// Borrowing student.
    pub student_uid: String,
    /// Originating loan, if known.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub prestamo_id: Option<String>,
    /// Items returned.
    pub materiales: Vec<Material>,
    /// When the items went out.
    pub fecha_inicio: DateTime<Utc>,
    /// When the items came back.
    pub fecha_devolucion: DateTime<Utc>,
}

/// Lab request form (`formulario`) filed before a practical session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct FormRecord {
    /// Document id.
    pub id: String,
    /// Requesting student.
    pub student_uid: String,
    /// Course.
    pub materia: String,
    /// Lecturer.
    pub profesor: String,
    /// Group the practical is for.
    pub grupo: String,
    /// Practical name.
    pub practica: String,
    /// Items requested.
    pub materiales: Vec<Material>,
    /// When the form was filed.
    pub fecha_solicitud: DateTime<Utc>,
}

/// Sort completed loans by return date, most recent first.
///
/// Ties keep their relative order.
pub fn sort_by_return_desc(loans: &mut [CompletedLoanRecord]) {
    loans.sort_by(|a, b| b.fecha_devolucion.cmp(&a.fecha_devolucion));
}

#[cfg(test)]
mod tests {
    //! Regression coverage for record ordering and wire shape.
    use super::*;
    use chrono::TimeZone;
    use rstest::rstest;

    fn completed(id: &str, day: u32) -> CompletedLoanRecord {
        let at = Utc
            .with_ymd_and_hms(2026, 2, day, 12, 0, 0)
            .single()
            .expect("valid timestamp");
        CompletedLoanRecord {
            id: id.to_owned(),
            student_uid: "u1".to_owned(),
            prestamo_id: None,
            materiales: vec![],
            fecha_inicio: at,
            fecha_devolucion: at,
        }
    }

    #[rstest]
    fn sorts_most_recent_return_first() {
        let mut loans = vec![completed("a", 3), completed("b", 20), completed("c", 11)];
        sort_by_return_desc(&mut loans);
        let ids: Vec<_> = loans.iter().map(|loan| loan.id.as_str()).collect();
        assert_eq!(ids, ["b", "c", "a"]);
    }

    #[rstest]
    fn dates_serialise_as_iso_strings() {
        let value = serde_json::to_value(completed("a", 3)).expect("record serialises");
        assert_eq!(value["fechaDevolucion"], "2026-02-03T12:00:00Z");
        assert_eq!(value["studentUid"], "u1");
        assert!(value.get("prestamoId").is_none());
    }

    #[rstest]
    #[case("pendiente", Some(DebtStatus::Pendiente))]
    #[case("pagado", Some(DebtStatus::Pagado))]
    #[case("PAGADO", None)]
    fn parses_debt_status(#[case] raw: &str, #[case] expected: Option<DebtStatus>) {
        assert_eq!(DebtStatus::parse(raw), expected);
    }

    #[rstest]
    #[case(LoanStatus::Activo)]
    #[case(LoanStatus::Completado)]
    fn loan_status_round_trips_through_storage(#[case] status: LoanStatus) {
        assert_eq!(LoanStatus::parse(status.as_str()), Some(status));
    }
}
