//! In-process adapters used when no database is configured.
//!
//! State lives for the lifetime of the process only. The server falls back to
//! these adapters when `RIDES_DATABASE_URL` is unset, and tests use them to
//! exercise the services without PostgreSQL.

mod in_memory_ride_repository;

pub use in_memory_ride_repository::InMemoryRideRepository;
