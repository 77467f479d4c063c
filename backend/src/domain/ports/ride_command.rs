//! Driving port for ride mutations.

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::domain::{Ride, RideError, RideId, UserId};

/// Publish a ride on behalf of a driver.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CreateRideRequest {
    pub driver_id: UserId,
    pub origin: String,
    pub destination: String,
    pub departure_time: DateTime<Utc>,
    pub seats_total: u32,
}

/// Seat a passenger on a ride.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JoinRideRequest {
    pub ride_id: RideId,
    pub passenger_id: UserId,
}

/// Close a ride.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CompleteRideRequest {
    pub ride_id: RideId,
}

/// Use cases that change ride state.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait RideCommand: Send + Sync {
    /// Publish a new OPEN ride with every seat free.
    async fn create_ride(&self, request: CreateRideRequest) -> Result<Ride, RideError>;

    /// Take one seat on an OPEN ride for a passenger who does not hold one.
    async fn join_ride(&self, request: JoinRideRequest) -> Result<Ride, RideError>;

    /// Move a non-terminal ride to COMPLETED.
    async fn complete_ride(&self, request: CompleteRideRequest) -> Result<Ride, RideError>;
}
