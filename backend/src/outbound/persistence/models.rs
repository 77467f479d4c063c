//! Internal Diesel row structs for database operations.
//!
//! These types never leave the persistence layer. Conversion into domain
//! aggregates happens in the repository so validation errors can be mapped
//! onto repository errors.

use chrono::{DateTime, Utc};
use diesel::prelude::*;

use super::schema::{ride_passengers, rides};

/// Row struct for reading from the rides table.
#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = rides)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub(crate) struct RideRow {
    pub id: i64,
    pub driver_id: String,
    pub origin: String,
    pub destination: String,
    pub departure_time: DateTime<Utc>,
    pub seats_total: i32,
    pub seats_available: i32,
    pub status: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub revision: i32,
}

/// Insertable struct for publishing a ride.
#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = rides)]
pub(crate) struct NewRideRow<'a> {
    pub driver_id: &'a str,
    pub origin: &'a str,
    pub destination: &'a str,
    pub departure_time: DateTime<Utc>,
    pub seats_total: i32,
    pub seats_available: i32,
    pub status: &'a str,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub revision: i32,
}

/// Changeset covering the columns a ride transition may touch.
#[derive(Debug, Clone, AsChangeset)]
#[diesel(table_name = rides)]
pub(crate) struct RideUpdate<'a> {
    pub seats_available: i32,
    pub status: &'a str,
    pub updated_at: DateTime<Utc>,
    pub revision: i32,
}

// ---------------------------------------------------------------------------
// Passenger models
// ---------------------------------------------------------------------------

/// Row struct for reading from the ride_passengers table.
#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = ride_passengers)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub(crate) struct RidePassengerRow {
    pub id: i64,
    pub ride_id: i64,
    pub passenger_id: String,
    pub status: String,
    pub joined_at: DateTime<Utc>,
    pub left_at: Option<DateTime<Utc>>,
}

/// Insertable struct for seating a passenger.
#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = ride_passengers)]
pub(crate) struct NewRidePassengerRow<'a> {
    pub ride_id: i64,
    pub passenger_id: &'a str,
    pub status: &'a str,
    pub joined_at: DateTime<Utc>,
}
