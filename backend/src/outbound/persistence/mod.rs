//! PostgreSQL persistence adapters using Diesel ORM.
//!
//! Concrete implementations of the ride repository port backed by PostgreSQL
//! via `diesel-async` and `bb8` connection pooling.
//!
//! - **Thin adapters**: repositories translate between Diesel rows and
//!   domain aggregates. Seat rules live in the domain.
//! - **Internal models**: row structs (`models.rs`) and table definitions
//!   (`schema.rs`) never leave this module.
//! - **Strongly typed errors**: Diesel and pool failures become
//!   [`RideRepositoryError`](crate::domain::ports::RideRepositoryError)
//!   variants.
//!
//! # Example
//!
//! ```ignore
//! use ride_service::outbound::persistence::{DbPool, DieselRideRepository, PoolConfig};
//!
//! let pool = DbPool::new(PoolConfig::new("postgres://localhost/rides")).await?;
//! let repo = DieselRideRepository::new(pool);
//! ```

mod diesel_error_mapping;
mod diesel_ride_repository;
mod migrations;
mod models;
mod pool;
mod schema;

pub use diesel_ride_repository::DieselRideRepository;
pub use migrations::{MIGRATIONS, MigrationError, run_pending_migrations};
pub use pool::{DbPool, PoolConfig, PoolError};
