//! Loan (prestamo) readers and the loan QR code.
//!
//! ```text
//! GET /api/prestamos?uid=<id>
//! GET /api/prestamos/{prestamo_id}/qr?uid=<id>
//! GET /api/completados?studentUid=<id>
//! ```
//!
//! The QR payload is `prestamo:{prestamo_id}:{uid}`; lab staff scan it at
//! the counter to pull up the loan.

use actix_web::{HttpResponse, get, web};
use qrcode::QrCode;
use qrcode::render::svg;
use serde::{Deserialize, Serialize};
use tracing::debug;
use utoipa::{IntoParams, ToSchema};

use crate::domain::{CompletedLoanRecord, Error, LoanRecord};
use crate::inbound::http::ApiResult;
use crate::inbound::http::cache_control::no_store;
use crate::inbound::http::debts::OwnerQuery;
use crate::inbound::http::session::SessionContext;
use crate::inbound::http::state::HttpState;
use crate::inbound::http::validation::{FieldName, require_field};

const STUDENT_UID_FIELD: FieldName = FieldName::new("studentUid");
const QR_MIN_DIMENSION: u32 = 200;
const SVG_CONTENT_TYPE: &str = "image/svg+xml";

/// Active loan listing.
#[derive(Debug, Serialize, ToSchema)]
pub struct LoansResponse {
    /// Always `true`; failures use the error envelope.
    pub success: bool,
    /// Active loans owned by the requested student.
    pub prestamos: Vec<LoanRecord>,
}

/// `?studentUid=` query for the completed-loan reader.
#[derive(Debug, Deserialize, IntoParams)]
#[serde(rename_all = "camelCase")]
#[into_params(rename_all = "camelCase")]
pub struct CompletedQuery {
    /// Owning student id.
    pub student_uid: Option<String>,
}

/// Text encoded in a loan's QR code.
pub fn qr_payload(loan_id: &str, uid: &str) -> String {
    format!("prestamo:{loan_id}:{uid}")
}

/// Render `payload` as an SVG QR code.
pub fn render_qr_svg(payload: &str) -> Result<String, Error> {
    let code = QrCode::new(payload.as_bytes())
        .map_err(|err| Error::internal(format!("failed to encode QR code: {err}")))?;
    Ok(code
        .render::<svg::Color<'_>>()
        .min_dimensions(QR_MIN_DIMENSION, QR_MIN_DIMENSION)
        .build())
}

/// Active loans owned by `uid`.
#[utoipa::path(
    get,
    path = "/api/prestamos",
    params(OwnerQuery),
    responses(
        (status = 200, description = "Active loans", body = LoansResponse),
        (status = 400, description = "uid missing", body = Error),
        (status = 403, description = "Records of another student", body = Error),
        (status = 500, description = "Store failure", body = Error)
    ),
    tags = ["records"],
    operation_id = "listLoans"
)]
#[get("/prestamos")]
pub async fn list_loans(
    state: web::Data<HttpState>,
    session: SessionContext,
    query: web::Query<OwnerQuery>,
) -> ApiResult<web::Json<LoansResponse>> {
    let actor = session.require_token(state.session.now())?;
    let uid = query.into_inner().require_uid()?;
    let prestamos = state.records.active_loans(&actor, &uid).await?;
    Ok(web::Json(LoansResponse {
        success: true,
        prestamos,
    }))
}

/// QR code identifying one loan owned by `uid`.
#[utoipa::path(
    get,
    path = "/api/prestamos/{prestamo_id}/qr",
    params(
        ("prestamo_id" = String, Path, description = "Loan identifier"),
        OwnerQuery
    ),
    responses(
        (status = 200, description = "SVG QR code", content_type = "image/svg+xml", body = String),
        (status = 400, description = "uid missing", body = Error),
        (status = 403, description = "Loan of another student", body = Error),
        (status = 404, description = "No such loan for uid", body = Error)
    ),
    tags = ["records"],
    operation_id = "loanQr"
)]
#[get("/prestamos/{prestamo_id}/qr")]
pub async fn loan_qr(
    state: web::Data<HttpState>,
    session: SessionContext,
    path: web::Path<String>,
    query: web::Query<OwnerQuery>,
) -> ApiResult<HttpResponse> {
    let actor = session.require_token(state.session.now())?;
    let uid = query.into_inner().require_uid()?;
    let loan = state.records.loan(&actor, &uid, &path.into_inner()).await?;
    let svg = render_qr_svg(&qr_payload(&loan.id, &uid))?;
    debug!(loan = %loan.id, "rendered loan QR code");
    Ok(HttpResponse::Ok()
        .content_type(SVG_CONTENT_TYPE)
        .insert_header(no_store())
        .body(svg))
}

/// Completed loans owned by `studentUid`, most recent return first.
#[utoipa::path(
    get,
    path = "/api/completados",
    params(CompletedQuery),
    responses(
        (status = 200, description = "Completed loans", body = [CompletedLoanRecord]),
        (status = 400, description = "studentUid missing", body = Error),
        (status = 403, description = "Records of another student", body = Error),
        (status = 500, description = "Store failure", body = Error)
    ),
    tags = ["records"],
    operation_id = "listCompleted"
)]
#[get("/completados")]
pub async fn list_completed(
    state: web::Data<HttpState>,
    session: SessionContext,
    query: web::Query<CompletedQuery>,
) -> ApiResult<web::Json<Vec<CompletedLoanRecord>>> {
    let actor = session.require_token(state.session.now())?;
    let uid = require_field(query.into_inner().student_uid, STUDENT_UID_FIELD)?;
    let completed = state.records.completed_loans(&actor, &uid).await?;
    Ok(web::Json(completed))
}

#[cfg(test)]
#[path = "loans_tests.rs"]
mod tests;
