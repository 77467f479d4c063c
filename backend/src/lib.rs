//! Shared-ride booking service.
//!
//! Drivers publish rides with a fixed number of seats, students take seats
//! until a ride is full, and drivers complete rides once the trip happened.
//! The crate is laid out hexagonally: [`domain`] holds the aggregates, use
//! cases and ports; [`inbound`] adapts HTTP onto the driving ports; and
//! [`outbound`] implements the ride repository over PostgreSQL or memory.

pub mod config;
pub mod doc;
pub mod domain;
pub mod inbound;
pub mod middleware;
pub mod outbound;

/// Public OpenAPI surface used by Swagger UI and tooling.
pub use doc::ApiDoc;
pub use middleware::Trace;
