//! Domain ports for the hexagonal boundary.
//!
//! Driven ports (`*Repository`) are implemented by outbound adapters; driving
//! ports (`*Command`, `*Query`) are implemented by domain services and called
//! by inbound adapters.

mod macros;
pub(crate) use macros::define_port_error;

mod ride_command;
mod ride_query;
mod ride_repository;

#[cfg(test)]
pub use ride_command::MockRideCommand;
pub use ride_command::{CompleteRideRequest, CreateRideRequest, JoinRideRequest, RideCommand};
#[cfg(test)]
pub use ride_query::MockRideQuery;
pub use ride_query::{ListRidesRequest, RideQuery};
#[cfg(test)]
pub use ride_repository::MockRideRepository;
pub use ride_repository::{RideFilter, RideRepository, RideRepositoryError};
