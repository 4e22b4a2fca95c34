//! Server construction and middleware wiring.

mod config;
mod state_builders;

pub use config::{PortalSettings, ServerConfig};

use state_builders::build_http_state;

use actix_session::{
    SessionMiddleware,
    config::{CookieContentSecurity, PersistentSession},
    storage::CookieSessionStore,
};
use actix_web::cookie::{Key, SameSite};
use actix_web::dev::{Server, ServiceFactory, ServiceRequest, ServiceResponse};
use actix_web::{App, HttpServer, web};

#[cfg(debug_assertions)]
use portal::doc::ApiDoc;
use portal::inbound::http::auth::{callback, landing, sign_in, sign_out};
use portal::inbound::http::debts::{get_debt, list_debts};
use portal::inbound::http::forms::get_form;
use portal::inbound::http::health::{HealthState, live, ready};
use portal::inbound::http::loans::{list_completed, list_loans, loan_qr};
use portal::inbound::http::reports::generate_report;
use portal::inbound::http::state::{HttpState, SessionPolicy};
use portal::inbound::http::students::{list_students, profile, update_group, upsert_student};
use portal::middleware::{AccessGate, Trace};
#[cfg(debug_assertions)]
use utoipa::OpenApi;
#[cfg(debug_assertions)]
use utoipa_swagger_ui::SwaggerUi;

#[derive(Clone)]
struct AppDependencies {
    health_state: web::Data<HealthState>,
    http_state: web::Data<HttpState>,
    session: SessionPolicy,
    key: Key,
    cookie_secure: bool,
    same_site: SameSite,
}

fn build_app(
    deps: AppDependencies,
) -> App<
    impl ServiceFactory<
        ServiceRequest,
        Config = (),
        Response = ServiceResponse<impl actix_web::body::MessageBody>,
        Error = actix_web::Error,
        InitError = (),
    >,
> {
    let AppDependencies {
        health_state,
        http_state,
        session,
        key,
        cookie_secure,
        same_site,
    } = deps;

    let ttl_seconds = session.ttl.num_seconds();
    let cookies = SessionMiddleware::builder(CookieSessionStore::default(), key)
        .cookie_name("session".into())
        .cookie_path("/".into())
        .cookie_secure(cookie_secure)
        .cookie_http_only(true)
        .cookie_content_security(CookieContentSecurity::Private)
        .cookie_same_site(same_site)
        .session_lifecycle(
            PersistentSession::default()
                .session_ttl(actix_web::cookie::time::Duration::seconds(ttl_seconds)),
        )
        .build();

    let api = web::scope("/api")
        .service(sign_in)
        .service(callback)
        .service(sign_out)
        .service(upsert_student)
        .service(update_group)
        .service(list_debts)
        .service(get_debt)
        .service(list_loans)
        .service(loan_qr)
        .service(list_completed)
        .service(get_form);

    let app = App::new()
        .app_data(health_state)
        .app_data(http_state)
        .wrap(AccessGate::new(session))
        .wrap(cookies)
        .wrap(Trace)
        .service(landing)
        .service(api)
        .service(web::scope("/alumno").service(profile))
        .service(
            web::scope("/admin")
                .service(list_students)
                .service(generate_report),
        )
        .service(ready)
        .service(live);

    #[cfg(debug_assertions)]
    let app = app.service(SwaggerUi::new("/docs").url("/api-docs/openapi.json", ApiDoc::openapi()));
    #[cfg(not(debug_assertions))]
    let app = app;

    app
}

/// Construct an Actix HTTP server using the provided health state and configuration.
///
/// # Errors
/// Propagates [`std::io::Error`] when an outbound client cannot be built or
/// binding the socket fails.
pub fn create_server(
    health_state: web::Data<HealthState>,
    config: ServerConfig,
) -> std::io::Result<Server> {
    let server_health_state = health_state.clone();
    let http_state = build_http_state(&config)?;
    let ServerConfig {
        key,
        cookie_secure,
        same_site,
        bind_addr,
        session,
        ..
    } = config;

    let server = HttpServer::new(move || {
        build_app(AppDependencies {
            health_state: server_health_state.clone(),
            http_state: http_state.clone(),
            session: session.clone(),
            key: key.clone(),
            cookie_secure,
            same_site,
        })
    })
    .bind(bind_addr)?
    .run();

    health_state.mark_ready();
    Ok(server)
}
