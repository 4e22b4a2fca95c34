//! Administrator usage report.
//!
//! ```text
//! POST /admin/reportes
//! ```

use actix_web::{post, web};
use serde::Serialize;
use tracing::info;
use utoipa::ToSchema;

use crate::domain::{Error, UsageReport};
use crate::inbound::http::ApiResult;
use crate::inbound::http::session::SessionContext;
use crate::inbound::http::state::HttpState;

/// Generated report.
#[derive(Debug, Serialize, ToSchema)]
pub struct ReportResponse {
    /// Always `true`; failures use the error envelope.
    pub success: bool,
    /// Validated generator output.
    pub reporte: UsageReport,
}

/// Aggregate every lab record and generate a usage report.
#[utoipa::path(
    post,
    path = "/admin/reportes",
    responses(
        (status = 200, description = "Report", body = ReportResponse),
        (status = 403, description = "Administrator access required", body = Error),
        (status = 500, description = "Generator not configured", body = Error),
        (status = 502, description = "Generator failed or answered nonsense", body = Error)
    ),
    tags = ["reports"],
    operation_id = "generateReport"
)]
#[post("/reportes")]
pub async fn generate_report(
    state: web::Data<HttpState>,
    session: SessionContext,
) -> ApiResult<web::Json<ReportResponse>> {
    let actor = session.require_token(state.session.now())?;
    let reporte = state.reports.generate(&actor).await?;
    info!(admin = actor.subject(), "usage report generated");
    Ok(web::Json(ReportResponse {
        success: true,
        reporte,
    }))
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeMap;
    use std::sync::Arc;

    use actix_web::http::StatusCode;
    use actix_web::{App, test as actix_test, web};
    use rstest::rstest;
    use serde_json::Value;

    use super::*;
    use crate::domain::ports::MockUsageReportCommand;
    use crate::inbound::http::state::HttpStatePorts;
    use crate::inbound::http::test_utils::{fixture_ports, session_cookie, test_app};
    use crate::test_support::{admin_token, student_token};

    fn reports_app(
        ports: HttpStatePorts,
    ) -> App<
        impl actix_web::dev::ServiceFactory<
            actix_web::dev::ServiceRequest,
            Config = (),
            Response = actix_web::dev::ServiceResponse,
            Error = actix_web::Error,
            InitError = (),
        >,
    > {
        test_app(ports, |cfg| {
            cfg.service(web::scope("/admin").service(generate_report));
        })
    }

    async fn post_report(ports: HttpStatePorts, admin: bool) -> actix_web::dev::ServiceResponse {
        let app = actix_test::init_service(reports_app(ports)).await;
        let token = if admin {
            admin_token("boss")
        } else {
            student_token("ana")
        };
        let cookie = session_cookie(&app, &token).await;
        actix_test::call_service(
            &app,
            actix_test::TestRequest::post()
                .uri("/admin/reportes")
                .cookie(cookie)
                .to_request(),
        )
        .await
    }

    #[rstest]
    #[actix_web::test]
    async fn admin_receives_report() {
        let mut reports = MockUsageReportCommand::new();
        reports.expect_generate().return_once(|_| {
            Ok(UsageReport {
                resumen: "Uso estable".to_owned(),
                hallazgos: vec!["Lunes con más préstamos".to_owned()],
                recomendaciones: Vec::new(),
                indicadores: BTreeMap::from([("prestamosActivos".to_owned(), 3.0)]),
            })
        });
        let ports = HttpStatePorts {
            reports: Arc::new(reports),
            ..fixture_ports()
        };

        let res = post_report(ports, true).await;

        assert_eq!(res.status(), StatusCode::OK);
        let body: Value = actix_test::read_body_json(res).await;
        assert_eq!(body["success"], Value::Bool(true));
        assert_eq!(body["reporte"]["resumen"], Value::String("Uso estable".to_owned()));
    }

    #[rstest]
    #[actix_web::test]
    async fn students_are_forbidden_by_the_default_service() {
        let res = post_report(fixture_ports(), false).await;

        assert_eq!(res.status(), StatusCode::FORBIDDEN);
    }

    #[rstest]
    #[case(Error::bad_gateway("report generator failed"), StatusCode::BAD_GATEWAY)]
    #[case(Error::internal("report generator not configured"), StatusCode::INTERNAL_SERVER_ERROR)]
    #[actix_web::test]
    async fn generator_failures_map_to_statuses(
        #[case] failure: Error,
        #[case] expected: StatusCode,
    ) {
        let mut reports = MockUsageReportCommand::new();
        reports.expect_generate().return_once(move |_| Err(failure));
        let ports = HttpStatePorts {
            reports: Arc::new(reports),
            ..fixture_ports()
        };

        let res = post_report(ports, true).await;

        assert_eq!(res.status(), expected);
    }
}
