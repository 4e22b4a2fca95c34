//! Portal entry-point: loads settings, prepares storage and starts the HTTP server.

mod server;

use std::sync::Arc;

use actix_web::web;
use color_eyre::eyre::{Context, eyre};
use mockable::{DefaultClock, DefaultEnv};
use ortho_config::OrthoConfig;
use tracing::{info, warn};
use tracing_subscriber::{EnvFilter, fmt};

use portal::inbound::http::health::HealthState;
use portal::inbound::http::session_config::{BuildMode, session_settings_from_env};
use portal::outbound::persistence::{DbPool, run_migrations};
use server::{PortalSettings, ServerConfig, create_server};

/// Application bootstrap.
#[actix_web::main]
async fn main() -> color_eyre::Result<()> {
    color_eyre::install()?;
    if let Err(e) = fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .json()
        .try_init()
    {
        warn!(error = %e, "tracing init failed");
    }

    let settings = PortalSettings::load_from_iter(std::env::args_os())
        .wrap_err("load portal settings")?;
    let mode = BuildMode::from_debug_assertions();
    let session_settings =
        session_settings_from_env(&DefaultEnv::new(), mode).wrap_err("session settings")?;
    info!(
        fingerprint = %session_settings.fingerprint(),
        "session signing key loaded"
    );

    let session = settings.session_policy(Arc::new(DefaultClock))?;
    let identity = settings.identity()?;
    if identity.is_none() && mode == BuildMode::Release {
        return Err(eyre!(
            "identity provider settings are required in release builds"
        ));
    }

    let mut config = ServerConfig::new(
        session_settings.key,
        session_settings.cookie_secure,
        session_settings.same_site,
        settings.bind_addr()?,
        session,
    )
    .with_identity(identity)
    .with_report(settings.report());

    if let (Some(url), Some(pool_config)) = (settings.database_url(), settings.pool_config()) {
        let applied = run_migrations(url).await?;
        info!(applied, "database migrations applied");
        config = config.with_db_pool(DbPool::new(pool_config).await?);
    }

    let health_state = web::Data::new(HealthState::new());
    let server = create_server(health_state, config)?;
    server.await?;
    Ok(())
}
