//! OpenAPI documentation configuration.
//!
//! [`ApiDoc`] registers every HTTP endpoint of the portal together with the
//! record and envelope schemas they answer with, plus the session cookie
//! security scheme. Swagger UI serves it in debug builds and
//! `cargo run --bin openapi-dump` exports it for external tooling.

use utoipa::openapi::security::{ApiKey, ApiKeyValue, SecurityScheme};
use utoipa::{Modify, OpenApi};

use crate::domain::{
    CompletedLoanRecord, DebtRecord, DebtStatus, Error, ErrorCode, FormRecord, LoanRecord,
    LoanStatus, Material, SessionRole, StudentRecord, StudentRole, UpsertOutcome, UsageReport,
};
use crate::inbound::http::auth::LandingResponse;
use crate::inbound::http::debts::{DebtResponse, DebtsResponse};
use crate::inbound::http::forms::FormResponse;
use crate::inbound::http::loans::LoansResponse;
use crate::inbound::http::reports::ReportResponse;
use crate::inbound::http::students::{
    GroupRequest, GroupResponse, StudentsResponse, UpsertRequest, UpsertResponse,
};

/// Enrich the generated document with the session cookie security scheme.
struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        let components = openapi
            .components
            .get_or_insert_with(utoipa::openapi::Components::default);

        components.add_security_scheme(
            "SessionCookie",
            SecurityScheme::ApiKey(ApiKey::Cookie(ApiKeyValue::with_description(
                "session",
                "Encrypted session cookie issued by GET /api/auth/callback.",
            ))),
        );
    }
}

/// OpenAPI document for the portal API.
#[derive(OpenApi)]
#[openapi(
    modifiers(&SecurityAddon),
    info(
        title = "Kitchen lab portal API",
        description = "Student records, loans, debts and usage reports behind institutional sign-in."
    ),
    servers(
        (url = "/", description = "Relative to the deployment base URL")
    ),
    security(("SessionCookie" = [])),
    paths(
        crate::inbound::http::auth::landing,
        crate::inbound::http::auth::sign_in,
        crate::inbound::http::auth::callback,
        crate::inbound::http::auth::sign_out,
        crate::inbound::http::students::upsert_student,
        crate::inbound::http::students::update_group,
        crate::inbound::http::students::profile,
        crate::inbound::http::students::list_students,
        crate::inbound::http::debts::list_debts,
        crate::inbound::http::debts::get_debt,
        crate::inbound::http::loans::list_loans,
        crate::inbound::http::loans::loan_qr,
        crate::inbound::http::loans::list_completed,
        crate::inbound::http::forms::get_form,
        crate::inbound::http::reports::generate_report,
        crate::inbound::http::health::ready,
        crate::inbound::http::health::live,
    ),
    components(schemas(
        Error,
        ErrorCode,
        SessionRole,
        StudentRecord,
        StudentRole,
        UpsertOutcome,
        Material,
        DebtRecord,
        DebtStatus,
        LoanRecord,
        LoanStatus,
        CompletedLoanRecord,
        FormRecord,
        UsageReport,
        LandingResponse,
        UpsertRequest,
        UpsertResponse,
        GroupRequest,
        GroupResponse,
        StudentsResponse,
        DebtsResponse,
        DebtResponse,
        LoansResponse,
        FormResponse,
        ReportResponse,
    )),
    tags(
        (name = "auth", description = "Institutional sign-in and sign-out"),
        (name = "students", description = "Student profiles and groups"),
        (name = "records", description = "Debts, loans, completed loans and forms"),
        (name = "reports", description = "Usage reports for administrators"),
        (name = "health", description = "Endpoints for health checks")
    )
)]
pub struct ApiDoc;

#[cfg(test)]
mod tests {
    //! Tests verifying the registered paths and schema fields.

    use rstest::rstest;
    use utoipa::openapi::RefOr;
    use utoipa::openapi::schema::Schema;

    use super::*;

    fn assert_object_schema_has_field(schema: &RefOr<Schema>, field: &str) {
        match schema {
            RefOr::T(Schema::Object(obj)) => {
                assert!(
                    obj.properties.contains_key(field),
                    "schema should have field '{field}'"
                );
            }
            _ => panic!("expected Object schema"),
        }
    }

    #[rstest]
    #[case("/api/adeudos")]
    #[case("/api/prestamos/{prestamo_id}/qr")]
    #[case("/api/completados")]
    #[case("/api/upsert")]
    #[case("/admin/reportes")]
    #[case("/api/auth/callback")]
    fn document_lists_portal_paths(#[case] path: &str) {
        let doc = ApiDoc::openapi();

        assert!(doc.paths.paths.contains_key(path), "missing {path}");
    }

    #[rstest]
    #[case("DebtRecord", "fechaInicio")]
    #[case("LoanRecord", "studentUid")]
    #[case("Error", "code")]
    fn record_schemas_expose_wire_fields(#[case] name: &str, #[case] field: &str) {
        let doc = ApiDoc::openapi();
        let schemas = &doc.components.as_ref().expect("components").schemas;
        let schema = schemas.get(name).expect("schema registered");

        assert_object_schema_has_field(schema, field);
    }

    #[rstest]
    #[case("LandingResponse")]
    #[case("UpsertRequest")]
    #[case("UpsertResponse")]
    #[case("GroupRequest")]
    #[case("GroupResponse")]
    fn request_and_response_fields_are_described(#[case] name: &str) {
        let doc = ApiDoc::openapi();
        let schemas = &doc.components.as_ref().expect("components").schemas;
        let RefOr::T(Schema::Object(obj)) = schemas.get(name).expect("schema registered") else {
            panic!("expected Object schema for {name}");
        };

        assert!(!obj.properties.is_empty(), "{name} has no fields");
        for (field, property) in &obj.properties {
            let description = match property {
                RefOr::T(Schema::Object(inner)) => inner.description.as_deref(),
                other => panic!("{name}.{field} should be inline, got {other:?}"),
            };
            assert!(
                description.is_some_and(|text| !text.trim().is_empty()),
                "{name}.{field} should carry a description"
            );
        }
    }

    #[rstest]
    fn session_cookie_scheme_is_registered() {
        let doc = ApiDoc::openapi();
        let components = doc.components.expect("components");

        assert!(components.security_schemes.contains_key("SessionCookie"));
    }
}
