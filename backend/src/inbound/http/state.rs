//! Shared HTTP adapter state.
//!
//! HTTP handlers accept this state via `actix_web::web::Data` so they only
//! depend on domain ports (use cases) and remain testable without I/O.

use std::sync::Arc;

use crate::domain::ports::{RideCommand, RideQuery};

/// Dependency bundle for ride handlers.
#[derive(Clone)]
pub struct HttpState {
    pub rides: Arc<dyn RideCommand>,
    pub rides_query: Arc<dyn RideQuery>,
}

impl HttpState {
    /// Bundle the command and query ports.
    ///
    /// # Examples
    /// ```
    /// use std::sync::Arc;
    ///
    /// use mockable::DefaultClock;
    /// use ride_service::domain::{RideCommandService, RideQueryService};
    /// use ride_service::inbound::http::state::HttpState;
    /// use ride_service::outbound::memory::InMemoryRideRepository;
    ///
    /// let repository = Arc::new(InMemoryRideRepository::new());
    /// let clock = Arc::new(DefaultClock);
    /// let state = HttpState::new(
    ///     Arc::new(RideCommandService::new(repository.clone(), clock)),
    ///     Arc::new(RideQueryService::new(repository)),
    /// );
    /// let _rides = state.rides.clone();
    /// ```
    pub fn new(rides: Arc<dyn RideCommand>, rides_query: Arc<dyn RideQuery>) -> Self {
        Self { rides, rides_query }
    }
}
