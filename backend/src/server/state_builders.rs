//! Builders wiring the ride services onto a repository adapter.

use std::sync::Arc;

use actix_web::web;
use mockable::DefaultClock;
use tracing::{info, warn};

use ride_service::domain::ports::RideRepository;
use ride_service::domain::{RideCommandService, RideQueryService};
use ride_service::inbound::http::state::HttpState;
use ride_service::outbound::memory::InMemoryRideRepository;
use ride_service::outbound::persistence::DieselRideRepository;

use super::ServerConfig;

fn services_over<R>(repository: Arc<R>, max_attempts: u32) -> HttpState
where
    R: RideRepository + 'static,
{
    let command = RideCommandService::new(repository.clone(), Arc::new(DefaultClock))
        .with_max_attempts(max_attempts);
    let query = RideQueryService::new(repository);
    HttpState::new(Arc::new(command), Arc::new(query))
}

/// Build handler state over PostgreSQL when a pool is configured, otherwise
/// over a process-local in-memory store.
pub(super) fn build_http_state(config: &ServerConfig) -> web::Data<HttpState> {
    let state = match &config.db_pool {
        Some(pool) => {
            info!(max_attempts = config.join_max_attempts, "serving rides from PostgreSQL");
            services_over(
                Arc::new(DieselRideRepository::new(pool.clone())),
                config.join_max_attempts,
            )
        }
        None => {
            warn!("no database configured; rides are kept in memory and lost on restart");
            services_over(Arc::new(InMemoryRideRepository::new()), config.join_max_attempts)
        }
    };
    web::Data::new(state)
}
