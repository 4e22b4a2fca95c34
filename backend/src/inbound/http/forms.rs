//! Request form reader.
//!
//! ```text
//! GET /api/formularios/{form_id}
//! ```

use actix_web::{get, web};
use serde::Serialize;
use utoipa::ToSchema;

use crate::domain::{Error, FormRecord};
use crate::inbound::http::ApiResult;
use crate::inbound::http::session::SessionContext;
use crate::inbound::http::state::HttpState;

/// Single request form.
#[derive(Debug, Serialize, ToSchema)]
pub struct FormResponse {
    /// Always `true`; failures use the error envelope.
    pub success: bool,
    /// The requested form.
    pub formulario: FormRecord,
}

/// A request form, visible to its owner and to administrators.
///
/// Forms owned by someone else answer 404 so ids cannot be probed.
#[utoipa::path(
    get,
    path = "/api/formularios/{form_id}",
    params(("form_id" = String, Path, description = "Form identifier")),
    responses(
        (status = 200, description = "Form", body = FormResponse),
        (status = 404, description = "No such form", body = Error),
        (status = 500, description = "Store failure", body = Error)
    ),
    tags = ["records"],
    operation_id = "getForm"
)]
#[get("/formularios/{form_id}")]
pub async fn get_form(
    state: web::Data<HttpState>,
    session: SessionContext,
    path: web::Path<String>,
) -> ApiResult<web::Json<FormResponse>> {
    let actor = session.require_token(state.session.now())?;
    let formulario = state.records.form(&actor, &path.into_inner()).await?;
    Ok(web::Json(FormResponse {
        success: true,
        formulario,
    }))
}
