//! Service entry-point: loads configuration, prepares the catalog, and serves
//! the tenant API.

mod server;

use std::ffi::OsString;
use std::sync::Arc;

use actix_web::web;
use mockable::DefaultEnv;
use ortho_config::OrthoConfig;
use tracing::{error, info, warn};
use tracing_subscriber::{EnvFilter, fmt};

use pgtenant::config::AppSettings;
use pgtenant::domain::TenantService;
use pgtenant::inbound::http::health::HealthState;
use pgtenant::inbound::http::session_config::{BuildMode, session_settings_from_env};
use pgtenant::inbound::http::state::{HttpState, HttpStatePorts};
use pgtenant::outbound::persistence::{
    DbPool, DieselApplicationUserRepository, DieselCatalogRepository, PoolConfig, run_migrations,
};
use pgtenant::outbound::postgres_admin::PostgresProvisioningEngine;
use server::{ServerConfig, create_server};

fn io_error(context: &str, error: impl std::fmt::Display) -> std::io::Error {
    std::io::Error::other(format!("{context}: {error}"))
}

/// Application bootstrap.
#[actix_web::main]
async fn main() -> std::io::Result<()> {
    if let Err(e) = fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .json()
        .try_init()
    {
        warn!(error = %e, "tracing init failed");
    }

    let args: Vec<OsString> = std::env::args_os().collect();
    let settings =
        AppSettings::load_from_iter(args).map_err(|e| io_error("invalid configuration", e))?;
    let session = session_settings_from_env(&DefaultEnv::new(), BuildMode::from_debug_assertions())
        .map_err(|e| io_error("invalid session configuration", e))?;
    let bind_addr = settings
        .bind_addr()
        .map_err(|e| io_error("invalid configuration", e))?;
    let trusted_header = settings
        .trusted_header()
        .map_err(|e| io_error("invalid configuration", e))?;
    let engine_config = settings
        .engine_config()
        .map_err(|e| io_error("invalid configuration", e))?;
    let database_url = settings
        .database_url()
        .map_err(|e| io_error("invalid configuration", e))?
        .to_owned();

    let migrations_url = database_url.clone();
    let applied = tokio::task::spawn_blocking(move || run_migrations(&migrations_url))
        .await
        .map_err(|e| io_error("migration task failed", e))?
        .map_err(|e| io_error("catalog migrations failed", e))?;
    info!(applied, "catalog migrations complete");

    let pool = DbPool::new(PoolConfig::new(database_url))
        .await
        .map_err(|e| io_error("catalog pool unavailable", e))?;
    let engine = PostgresProvisioningEngine::new(engine_config)
        .map_err(|e| io_error("invalid provisioning settings", e))?;

    let tenants = Arc::new(TenantService::new(
        Arc::new(DieselCatalogRepository::new(pool.clone())),
        Arc::new(engine),
    ));
    let mut http_state = HttpState::new(HttpStatePorts {
        tenants: tenants.clone(),
        tenants_query: tenants,
        app_users: Arc::new(DieselApplicationUserRepository::new(pool)),
    });
    match trusted_header {
        Some(header) => {
            info!(header = %header, "trusting identity header from proxy");
            http_state = http_state.with_trusted_header(header);
        }
        None => warn!("no trusted identity header configured; only existing sessions can authenticate"),
    }

    let config = ServerConfig::new(session, bind_addr);
    #[cfg(feature = "metrics")]
    let config = config.with_metrics(server::build_metrics());

    let health_state = web::Data::new(HealthState::new());
    let server = create_server(health_state.clone(), http_state, config)?;
    let handle = server.handle();
    let shutdown_health = health_state.clone();
    actix_web::rt::spawn(async move {
        if let Err(e) = tokio::signal::ctrl_c().await {
            error!(error = %e, "failed to listen for shutdown signal");
            return;
        }
        info!("shutdown requested; draining");
        shutdown_health.mark_unhealthy();
        handle.stop(true).await;
    });

    info!(%bind_addr, "listening");
    health_state.mark_ready();
    server.await
}
