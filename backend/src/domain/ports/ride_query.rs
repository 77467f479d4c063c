//! Driving port for ride reads.

use async_trait::async_trait;

use crate::domain::{Ride, RideError, RideId, RidePassenger, RideStatus};

/// Optional listing filters; absent fields match everything.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ListRidesRequest {
    pub origin: Option<String>,
    pub destination: Option<String>,
    pub status: Option<RideStatus>,
}

/// Read-only projections over ride state.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait RideQuery: Send + Sync {
    /// List rides matching every populated filter.
    async fn list_rides(&self, request: ListRidesRequest) -> Result<Vec<Ride>, RideError>;

    /// Fetch a single ride.
    async fn get_ride(&self, ride_id: RideId) -> Result<Ride, RideError>;

    /// List the passenger records of a ride.
    async fn list_passengers(&self, ride_id: RideId) -> Result<Vec<RidePassenger>, RideError>;
}
