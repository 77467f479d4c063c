//! Ride service entry point: loads settings, prepares storage and serves
//! the REST API with health checks and OpenAPI docs.

mod server;

use std::io;

use actix_web::web;
use ortho_config::OrthoConfig as _;
use tracing::{info, warn};
use tracing_subscriber::{EnvFilter, fmt};

use ride_service::config::ServiceSettings;
use ride_service::inbound::http::auth::JwtVerifier;
use ride_service::inbound::http::health::HealthState;
use ride_service::outbound::persistence::{DbPool, run_pending_migrations};
use server::{ServerConfig, create_server};

fn init_tracing() {
    if let Err(e) = fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .json()
        .try_init()
    {
        warn!(error = %e, "tracing init failed");
    }
}

async fn build_server_config(settings: &ServiceSettings) -> io::Result<ServerConfig> {
    let bind_addr = settings.bind_addr().map_err(io::Error::other)?;
    let jwt_settings = settings.jwt_settings().map_err(io::Error::other)?;
    let verifier = JwtVerifier::new(&jwt_settings).map_err(io::Error::other)?;
    let join_max_attempts = settings.join_max_attempts().map_err(io::Error::other)?;

    let config = ServerConfig::new(bind_addr, verifier).with_join_max_attempts(join_max_attempts);
    let Some(pool_config) = settings.pool_config().map_err(io::Error::other)? else {
        return Ok(config);
    };

    if settings.run_migrations() {
        let applied = run_pending_migrations(pool_config.database_url())
            .await
            .map_err(io::Error::other)?;
        info!(applied, "database migrations applied");
    }
    let pool = DbPool::new(pool_config).await.map_err(io::Error::other)?;
    Ok(config.with_db_pool(pool))
}

/// Application bootstrap.
#[actix_web::main]
async fn main() -> io::Result<()> {
    init_tracing();

    let settings = ServiceSettings::load()
        .map_err(|e| io::Error::other(format!("failed to load settings: {e}")))?;
    let config = build_server_config(&settings).await?;
    info!(bind_addr = %config.bind_addr, "starting ride service");

    let health_state = web::Data::new(HealthState::new());
    let server = create_server(health_state, config)?;
    server.await
}
