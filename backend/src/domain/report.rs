//! Usage report input aggregate and the validated report schema.
//!
//! Report generation is delegated to an external generative service. Its
//! output is untrusted. [`UsageReport::from_untrusted`] requires `resumen`
//! and keeps only the string entries of each list.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::Value;
use utoipa::ToSchema;

use super::{CompletedLoanRecord, DebtRecord, DebtStatus, LoanRecord};

/// Upper bound on findings and recommendations kept from a report.
pub const MAX_REPORT_ITEMS: usize = 20;

/// Aggregated lab activity sent to the report generator.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReportInput {
    /// Every loan on record.
    pub prestamos: Vec<LoanRecord>,
    /// Outstanding debts.
    pub adeudos: Vec<DebtRecord>,
    /// Completed loans.
    pub completados: Vec<CompletedLoanRecord>,
    /// Paid debts.
    pub pagados: Vec<DebtRecord>,
}

impl ReportInput {
    /// Build the aggregate, splitting debts by status.
    pub fn new(
        prestamos: Vec<LoanRecord>,
        debts: Vec<DebtRecord>,
        completados: Vec<CompletedLoanRecord>,
    ) -> Self {
        let (pagados, adeudos): (Vec<_>, Vec<_>) = debts
            .into_iter()
            .partition(|debt| debt.estado == DebtStatus::Pagado);
        Self {
            prestamos,
            adeudos,
            completados,
            pagados,
        }
    }
}

/// Reasons an upstream report payload is rejected.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ReportValidationError {
    /// The payload was not a JSON object.
    #[error("report payload must be a JSON object")]
    NotAnObject,
    /// `resumen` was absent, not a string, or blank.
    #[error("report payload is missing a summary")]
    MissingSummary,
}

/// Validated statistical usage report.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UsageReport {
    /// Executive summary.
    pub resumen: String,
    /// Notable findings.
    pub hallazgos: Vec<String>,
    /// Suggested actions.
    pub recomendaciones: Vec<String>,
    /// Named numeric indicators.
    pub indicadores: BTreeMap<String, f64>,
}

impl UsageReport {
    /// Parse an untrusted payload.
    ///
    /// `resumen` is required. List entries that are not non-blank strings are
    /// dropped, lists are capped at [`MAX_REPORT_ITEMS`], and indicators keep
    /// only finite numeric values.
    ///
    /// # Examples
    /// ```
    /// use portal::domain::UsageReport;
    /// use serde_json::json;
    ///
    /// let report = UsageReport::from_untrusted(&json!({
    ///     "resumen": "Uso estable",
    ///     "hallazgos": ["Más préstamos en lunes", 7],
    /// }))
    /// .expect("valid report");
    /// assert_eq!(report.hallazgos, vec!["Más préstamos en lunes".to_owned()]);
    /// assert!(report.recomendaciones.is_empty());
    /// ```
    pub fn from_untrusted(payload: &Value) -> Result<Self, ReportValidationError> {
        let object = payload
            .as_object()
            .ok_or(ReportValidationError::NotAnObject)?;
        let resumen = object
            .get("resumen")
            .and_then(Value::as_str)
            .map(str::trim)
            .filter(|summary| !summary.is_empty())
            .ok_or(ReportValidationError::MissingSummary)?
            .to_owned();

        Ok(Self {
            resumen,
            hallazgos: string_list(object.get("hallazgos")),
            recomendaciones: string_list(object.get("recomendaciones")),
            indicadores: numeric_map(object.get("indicadores")),
        })
    }
}

fn string_list(value: Option<&Value>) -> Vec<String> {
    value
        .and_then(Value::as_array)
        .map(|items| {
            items
                .iter()
                .filter_map(Value::as_str)
                .map(str::trim)
                .filter(|item| !item.is_empty())
                .take(MAX_REPORT_ITEMS)
                .map(str::to_owned)
                .collect()
        })
        .unwrap_or_default()
}

fn numeric_map(value: Option<&Value>) -> BTreeMap<String, f64> {
    value
        .and_then(Value::as_object)
        .map(|entries| {
            entries
                .iter()
                .filter_map(|(name, value)| {
                    value
                        .as_f64()
                        .filter(|number| number.is_finite())
                        .map(|number| (name.clone(), number))
                })
                .collect()
        })
        .unwrap_or_default()
}
