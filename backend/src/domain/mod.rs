//! Domain primitives, aggregates and services.
//!
//! Purpose: Define the ride-sharing model (rides, passenger records and the
//! identities acting on them) together with the services that enforce seat
//! allocation. Nothing here depends on HTTP, SQL or token formats; adapters
//! reach the domain through the traits in [`ports`].
//!
//! Public surface:
//! - Error (alias to `error::Error`) — API error response payload.
//! - ErrorCode (alias to `error::ErrorCode`) — stable error identifier.
//! - Ride / RidePassenger — aggregates with validated invariants.
//! - RideError — failure taxonomy of the ride use cases.
//! - RideCommandService / RideQueryService — driving port implementations.

pub mod error;
pub mod passenger;
pub mod ports;
pub mod ride;
pub mod ride_error;
pub mod ride_locks;
pub mod ride_service;
pub mod trace_id;
pub mod user;

pub use self::error::{Error, ErrorCode, ErrorValidationError};
pub use self::passenger::{
    NewRidePassenger, ParsePassengerStatusError, PassengerStatus, RidePassenger,
    RidePassengerDraft, RidePassengerId, RidePassengerValidationError,
};
pub use self::ride::{
    NewRide, NewRideDraft, ParseRideStatusError, Ride, RideDraft, RideId, RideStatus,
    RideTransitionError, RideValidationError,
};
pub use self::ride_error::RideError;
pub use self::ride_locks::RideLocks;
pub use self::ride_service::{DEFAULT_MAX_ATTEMPTS, RideCommandService, RideQueryService};
pub use self::trace_id::{TRACE_ID_HEADER, TraceId};
pub use self::user::{CallerIdentity, Role, UserId, UserValidationError};

