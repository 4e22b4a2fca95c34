//! Debt (adeudo) readers.
//!
//! ```text
//! GET /api/adeudos?uid=<id>
//! GET /api/adeudos/{adeudo_id}?uid=<id>
//! ```

use actix_web::{get, web};
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};

use crate::domain::{DebtRecord, Error};
use crate::inbound::http::ApiResult;
use crate::inbound::http::session::SessionContext;
use crate::inbound::http::state::HttpState;
use crate::inbound::http::validation::{FieldName, require_field};

pub(crate) const UID_FIELD: FieldName = FieldName::new("uid");

/// `?uid=` query shared by the student-scoped readers.
#[derive(Debug, Deserialize, IntoParams)]
pub struct OwnerQuery {
    /// Owning student id.
    pub uid: Option<String>,
}

impl OwnerQuery {
    pub(crate) fn require_uid(self) -> Result<String, Error> {
        require_field(self.uid, UID_FIELD)
    }
}

/// Debt listing.
#[derive(Debug, Serialize, ToSchema)]
pub struct DebtsResponse {
    /// Always `true`; failures use the error envelope.
    pub success: bool,
    /// Debts owned by the requested student.
    pub adeudos: Vec<DebtRecord>,
}

/// Single debt.
#[derive(Debug, Serialize, ToSchema)]
pub struct DebtResponse {
    /// Always `true`; failures use the error envelope.
    pub success: bool,
    /// The requested debt.
    pub adeudo: DebtRecord,
}

/// Debts owned by `uid`.
#[utoipa::path(
    get,
    path = "/api/adeudos",
    params(OwnerQuery),
    responses(
        (status = 200, description = "Debts", body = DebtsResponse),
        (status = 400, description = "uid missing", body = Error),
        (status = 403, description = "Records of another student", body = Error),
        (status = 500, description = "Store failure", body = Error)
    ),
    tags = ["records"],
    operation_id = "listDebts"
)]
#[get("/adeudos")]
pub async fn list_debts(
    state: web::Data<HttpState>,
    session: SessionContext,
    query: web::Query<OwnerQuery>,
) -> ApiResult<web::Json<DebtsResponse>> {
    let actor = session.require_token(state.session.now())?;
    let uid = query.into_inner().require_uid()?;
    let adeudos = state.records.debts(&actor, &uid).await?;
    Ok(web::Json(DebtsResponse {
        success: true,
        adeudos,
    }))
}

/// One debt owned by `uid`.
#[utoipa::path(
    get,
    path = "/api/adeudos/{adeudo_id}",
    params(
        ("adeudo_id" = String, Path, description = "Debt identifier"),
        OwnerQuery
    ),
    responses(
        (status = 200, description = "Debt", body = DebtResponse),
        (status = 400, description = "uid missing", body = Error),
        (status = 403, description = "Records of another student", body = Error),
        (status = 404, description = "No such debt for uid", body = Error),
        (status = 500, description = "Store failure", body = Error)
    ),
    tags = ["records"],
    operation_id = "getDebt"
)]
#[get("/adeudos/{adeudo_id}")]
pub async fn get_debt(
    state: web::Data<HttpState>,
    session: SessionContext,
    path: web::Path<String>,
    query: web::Query<OwnerQuery>,
) -> ApiResult<web::Json<DebtResponse>> {
    let actor = session.require_token(state.session.now())?;
    let uid = query.into_inner().require_uid()?;
    let adeudo = state.records.debt(&actor, &uid, &path.into_inner()).await?;
    Ok(web::Json(DebtResponse {
        success: true,
        adeudo,
    }))
}
