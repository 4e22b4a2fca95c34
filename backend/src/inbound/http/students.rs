//! Student record HTTP handlers.
//!
//! ```text
//! POST /api/upsert
//! POST /api/estudiantes/grupo
//! GET  /alumno/perfil
//! GET  /admin/estudiantes
//! ```

use actix_web::{HttpResponse, get, post, web};
use serde::{Deserialize, Serialize};
use tracing::debug;
use utoipa::ToSchema;

use crate::domain::{Error, ErrorCode, GROUP_UPDATE_FAILED, Principal, StudentRecord};
use crate::inbound::http::ApiResult;
use crate::inbound::http::cache_control::private_revalidate;
use crate::inbound::http::error::status_for;
use crate::inbound::http::session::SessionContext;
use crate::inbound::http::state::HttpState;
use crate::inbound::http::validation::{FieldName, missing_field_error};

/// Principal claims submitted for an explicit upsert.
#[derive(Debug, Default, Deserialize, Serialize, ToSchema)]
pub struct UpsertRequest {
    /// Identity provider subject id.
    pub id: Option<String>,
    /// Institutional email address.
    pub email: Option<String>,
    /// Display name.
    pub name: Option<String>,
    /// Profile picture URL.
    pub image: Option<String>,
}

/// Upsert acknowledgement.
#[derive(Debug, Serialize, ToSchema)]
pub struct UpsertResponse {
    /// Whether the upsert completed.
    pub ok: bool,
    /// `true` when this call created the record.
    pub created: bool,
}

/// Group assignment payload.
#[derive(Debug, Default, Deserialize, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct GroupRequest {
    /// Student whose group changes.
    #[serde(default)]
    pub user_id: String,
    /// Group name; trimmed and upper-cased before storage.
    #[serde(default)]
    pub new_group: String,
}

/// Group assignment outcome; failures carry a human-readable `error`.
#[derive(Debug, Serialize, ToSchema)]
pub struct GroupResponse {
    /// Whether the group was stored.
    pub success: bool,
    /// Stored group name on success.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub grupo: Option<String>,
    /// Failure reason; store failures carry a generic text.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl GroupResponse {
    fn failure(error: &Error) -> HttpResponse {
        let message = if error.code() == ErrorCode::InternalError {
            GROUP_UPDATE_FAILED.to_owned()
        } else {
            error.message().to_owned()
        };
        HttpResponse::build(status_for(error.code())).json(Self {
            success: false,
            grupo: None,
            error: Some(message),
        })
    }
}

/// Student listing for administrators.
#[derive(Debug, Serialize, ToSchema)]
pub struct StudentsResponse {
    /// Always `true`; failures use the error envelope.
    pub success: bool,
    /// Every student on file.
    pub estudiantes: Vec<StudentRecord>,
}

fn parse_principal(payload: UpsertRequest) -> Result<Principal, Error> {
    Principal::try_new(
        payload.id.unwrap_or_default(),
        payload.email.unwrap_or_default(),
        payload.name.as_deref(),
        payload.image.as_deref(),
    )
    .map_err(|err| missing_field_error(FieldName::new(err.field())))
}

/// Create the caller's student record on first login, or touch it.
#[utoipa::path(
    post,
    path = "/api/upsert",
    request_body = UpsertRequest,
    responses(
        (status = 200, description = "Record created or touched", body = UpsertResponse),
        (status = 400, description = "id or email missing", body = Error),
        (status = 403, description = "Upsert for another principal", body = Error),
        (status = 500, description = "Store failure", body = Error)
    ),
    tags = ["students"],
    operation_id = "upsertStudent"
)]
#[post("/upsert")]
pub async fn upsert_student(
    state: web::Data<HttpState>,
    session: SessionContext,
    payload: web::Json<UpsertRequest>,
) -> ApiResult<web::Json<UpsertResponse>> {
    let actor = session.require_token(state.session.now())?;
    let principal = parse_principal(payload.into_inner())?;
    if !actor.can_act_for(principal.id().as_str()) {
        debug!(actor = actor.subject(), "rejected upsert for another principal");
        return Err(Error::forbidden("cannot upsert another principal"));
    }
    let outcome = state.accounts.upsert_student(&principal).await?;
    Ok(web::Json(UpsertResponse {
        ok: true,
        created: outcome.created,
    }))
}

/// Assign a student's group (`updateStudentGroup`).
#[utoipa::path(
    post,
    path = "/api/estudiantes/grupo",
    request_body = GroupRequest,
    responses(
        (status = 200, description = "Group stored", body = GroupResponse),
        (status = 400, description = "userId or newGroup blank", body = GroupResponse),
        (status = 403, description = "Not the student nor an admin", body = GroupResponse),
        (status = 404, description = "Unknown student", body = GroupResponse),
        (status = 500, description = "Store failure", body = GroupResponse)
    ),
    tags = ["students"],
    operation_id = "updateStudentGroup"
)]
#[post("/estudiantes/grupo")]
pub async fn update_group(
    state: web::Data<HttpState>,
    session: SessionContext,
    payload: web::Json<GroupRequest>,
) -> HttpResponse {
    let actor = match session.require_token(state.session.now()) {
        Ok(actor) => actor,
        Err(error) => return GroupResponse::failure(&error),
    };
    let GroupRequest { user_id, new_group } = payload.into_inner();
    match state.accounts.set_group(&actor, &user_id, &new_group).await {
        Ok(group) => HttpResponse::Ok().json(GroupResponse {
            success: true,
            grupo: Some(group.into()),
            error: None,
        }),
        Err(error) => GroupResponse::failure(&error),
    }
}

/// The caller's own student record.
#[utoipa::path(
    get,
    path = "/alumno/perfil",
    responses(
        (
            status = 200,
            description = "Student record",
            headers(("Cache-Control" = String, description = "Cache control header")),
            body = StudentRecord
        ),
        (status = 401, description = "Login required", body = Error),
        (status = 404, description = "No record yet", body = Error)
    ),
    tags = ["students"],
    operation_id = "getProfile"
)]
#[get("/perfil")]
pub async fn profile(
    state: web::Data<HttpState>,
    session: SessionContext,
) -> ApiResult<HttpResponse> {
    let actor = session.require_token(state.session.now())?;
    let record = state.profiles.profile(&actor).await?;
    Ok(HttpResponse::Ok()
        .insert_header(private_revalidate())
        .json(record))
}

/// Every student record; administrators only.
#[utoipa::path(
    get,
    path = "/admin/estudiantes",
    responses(
        (status = 200, description = "All students", body = StudentsResponse),
        (status = 403, description = "Administrator access required", body = Error)
    ),
    tags = ["students"],
    operation_id = "listStudents"
)]
#[get("/estudiantes")]
pub async fn list_students(
    state: web::Data<HttpState>,
    session: SessionContext,
) -> ApiResult<HttpResponse> {
    let actor = session.require_token(state.session.now())?;
    let estudiantes = state.profiles.list_students(&actor).await?;
    Ok(HttpResponse::Ok()
        .insert_header(private_revalidate())
        .json(StudentsResponse {
            success: true,
            estudiantes,
        }))
}

#[cfg(test)]
#[path = "students_tests.rs"]
mod tests;
