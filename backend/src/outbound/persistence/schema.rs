//! Diesel table definitions for the PostgreSQL schema.
//!
//! These must match `backend/migrations` exactly. Regenerate with
//! `diesel print-schema` after changing a migration.

diesel::table! {
    /// Rides published by drivers.
    ///
    /// CHECK constraints mirror the aggregate invariants: positive
    /// `seats_total`, `seats_available` within range, FULL rides with no
    /// free seats.
    rides (id) {
        /// Primary key assigned by `BIGSERIAL`.
        id -> Int8,
        /// Opaque identifier of the publishing driver.
        driver_id -> Varchar,
        origin -> Varchar,
        destination -> Varchar,
        departure_time -> Timestamptz,
        seats_total -> Int4,
        seats_available -> Int4,
        /// One of `OPEN`, `FULL`, `COMPLETED`, `CANCELLED`.
        status -> Varchar,
        created_at -> Timestamptz,
        updated_at -> Timestamptz,
        /// Optimistic concurrency counter, starting at 1.
        revision -> Int4,
    }
}

diesel::table! {
    /// Seat claims. A partial unique index allows at most one `JOINED`
    /// record per `(ride_id, passenger_id)`.
    ride_passengers (id) {
        id -> Int8,
        ride_id -> Int8,
        passenger_id -> Varchar,
        /// One of `JOINED`, `CANCELLED`.
        status -> Varchar,
        joined_at -> Timestamptz,
        left_at -> Nullable<Timestamptz>,
    }
}

diesel::joinable!(ride_passengers -> rides (ride_id));
diesel::allow_tables_to_appear_in_same_query!(rides, ride_passengers);
