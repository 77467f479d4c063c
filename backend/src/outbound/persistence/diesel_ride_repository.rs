//! PostgreSQL-backed `RideRepository` implementation using Diesel ORM.
//!
//! Ride updates are guarded by the revision the caller read:
//! `UPDATE rides ... WHERE id = $1 AND revision = $2`. A zero-row update is
//! followed by a lookup so callers can tell a stale revision from a missing
//! ride. Joins update the ride and insert the passenger record in one
//! transaction; the partial unique index on `ride_passengers` rejects a second
//! JOINED record even when two processes race.

use async_trait::async_trait;
use diesel::prelude::*;
use diesel_async::scoped_futures::ScopedFutureExt as _;
use diesel_async::{AsyncConnection as _, AsyncPgConnection, RunQueryDsl};

use crate::domain::ports::{RideFilter, RideRepository, RideRepositoryError};
use crate::domain::{
    NewRide, NewRidePassenger, PassengerStatus, Ride, RideDraft, RideId, RidePassenger,
    RidePassengerDraft, RidePassengerId, RideStatus, UserId,
};

use super::diesel_error_mapping::{
    map_diesel_error, map_passenger_insert_error, map_pool_error, missed_update,
};
use super::models::{NewRidePassengerRow, NewRideRow, RidePassengerRow, RideRow, RideUpdate};
use super::pool::DbPool;
use super::schema::{ride_passengers, rides};

/// Diesel-backed implementation of the ride repository port.
#[derive(Clone)]
pub struct DieselRideRepository {
    pool: DbPool,
}

impl DieselRideRepository {
    /// Create a new repository with the given connection pool.
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

/// Result of a revision-guarded ride update.
enum GuardedUpdate<T> {
    Applied(T),
    /// No row matched; carries the stored revision when the ride exists.
    Missed { current: Option<i32> },
}

fn to_db_count(value: u32, field: &str) -> Result<i32, RideRepositoryError> {
    i32::try_from(value)
        .map_err(|_| RideRepositoryError::query(format!("{field} exceeds i32 range: {value}")))
}

fn from_db_count(value: i32, field: &str) -> Result<u32, RideRepositoryError> {
    u32::try_from(value)
        .map_err(|_| RideRepositoryError::query(format!("negative {field} in database: {value}")))
}

/// Convert a database row into a validated domain ride.
fn row_to_ride(row: RideRow) -> Result<Ride, RideRepositoryError> {
    let RideRow {
        id,
        driver_id,
        origin,
        destination,
        departure_time,
        seats_total,
        seats_available,
        status,
        created_at,
        updated_at,
        revision,
    } = row;

    let driver_id = UserId::new(driver_id).map_err(|err| {
        RideRepositoryError::query(format!("invalid driver_id in database: {err}"))
    })?;
    let status = status
        .parse::<RideStatus>()
        .map_err(|err| RideRepositoryError::query(err.to_string()))?;

    Ride::new(RideDraft {
        id: RideId::new(id),
        driver_id,
        origin,
        destination,
        departure_time,
        seats_total: from_db_count(seats_total, "seats_total")?,
        seats_available: from_db_count(seats_available, "seats_available")?,
        status,
        created_at,
        updated_at,
        revision: from_db_count(revision, "revision")?,
    })
    .map_err(|err| RideRepositoryError::query(err.to_string()))
}

/// Convert a database row into a validated passenger record.
fn row_to_passenger(row: RidePassengerRow) -> Result<RidePassenger, RideRepositoryError> {
    let passenger_id = UserId::new(row.passenger_id).map_err(|err| {
        RideRepositoryError::query(format!("invalid passenger_id in database: {err}"))
    })?;
    let status = row
        .status
        .parse::<PassengerStatus>()
        .map_err(|err| RideRepositoryError::query(err.to_string()))?;

    RidePassenger::new(RidePassengerDraft {
        id: RidePassengerId::new(row.id),
        ride_id: RideId::new(row.ride_id),
        passenger_id,
        status,
        joined_at: row.joined_at,
        left_at: row.left_at,
    })
    .map_err(|err| RideRepositoryError::query(err.to_string()))
}

fn collect_rides(rows: Vec<RideRow>) -> Result<Vec<Ride>, RideRepositoryError> {
    rows.into_iter().map(row_to_ride).collect()
}

fn ride_update(ride: &Ride) -> Result<RideUpdate<'static>, RideRepositoryError> {
    Ok(RideUpdate {
        seats_available: to_db_count(ride.seats_available(), "seats_available")?,
        status: ride.status().as_str(),
        updated_at: ride.updated_at(),
        revision: to_db_count(ride.revision(), "revision")?,
    })
}

fn new_passenger_row(passenger: &NewRidePassenger) -> NewRidePassengerRow<'_> {
    NewRidePassengerRow {
        ride_id: passenger.ride_id().as_i64(),
        passenger_id: passenger.passenger_id().as_str(),
        status: passenger.status().as_str(),
        joined_at: passenger.joined_at(),
    }
}

/// Apply `changes` only if the stored revision still equals `expected`.
async fn guarded_update(
    conn: &mut AsyncPgConnection,
    ride_id: i64,
    expected: i32,
    changes: &RideUpdate<'_>,
) -> QueryResult<GuardedUpdate<RideRow>> {
    let updated = diesel::update(
        rides::table.filter(rides::id.eq(ride_id).and(rides::revision.eq(expected))),
    )
    .set(changes)
    .returning(RideRow::as_returning())
    .get_result::<RideRow>(conn)
    .await
    .optional()?;

    if let Some(row) = updated {
        return Ok(GuardedUpdate::Applied(row));
    }

    let current = rides::table
        .find(ride_id)
        .select(rides::revision)
        .first::<i32>(conn)
        .await
        .optional()?;
    Ok(GuardedUpdate::Missed { current })
}

fn resolve_missed(
    ride_id: RideId,
    expected_revision: u32,
    current: Option<i32>,
) -> RideRepositoryError {
    match current.map(|revision| from_db_count(revision, "revision")).transpose() {
        Ok(current) => missed_update(ride_id, expected_revision, current),
        Err(err) => err,
    }
}

#[async_trait]
impl RideRepository for DieselRideRepository {
    async fn create_ride(&self, ride: &NewRide) -> Result<Ride, RideRepositoryError> {
        let new_row = NewRideRow {
            driver_id: ride.driver_id().as_str(),
            origin: ride.origin(),
            destination: ride.destination(),
            departure_time: ride.departure_time(),
            seats_total: to_db_count(ride.seats_total(), "seats_total")?,
            seats_available: to_db_count(ride.seats_available(), "seats_available")?,
            status: ride.status().as_str(),
            created_at: ride.created_at(),
            updated_at: ride.updated_at(),
            revision: to_db_count(ride.revision(), "revision")?,
        };

        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let row = diesel::insert_into(rides::table)
            .values(&new_row)
            .returning(RideRow::as_returning())
            .get_result::<RideRow>(&mut conn)
            .await
            .map_err(map_diesel_error)?;

        row_to_ride(row)
    }

    async fn get_ride_by_id(&self, ride_id: RideId) -> Result<Option<Ride>, RideRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        let row = rides::table
            .find(ride_id.as_i64())
            .select(RideRow::as_select())
            .first::<RideRow>(&mut conn)
            .await
            .optional()
            .map_err(map_diesel_error)?;

        row.map(row_to_ride).transpose()
    }

    async fn save_ride(
        &self,
        ride: &Ride,
        expected_revision: u32,
    ) -> Result<Ride, RideRepositoryError> {
        let changes = ride_update(ride)?;
        let expected = to_db_count(expected_revision, "revision")?;

        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let outcome = guarded_update(&mut conn, ride.id().as_i64(), expected, &changes)
            .await
            .map_err(map_diesel_error)?;

        match outcome {
            GuardedUpdate::Applied(row) => row_to_ride(row),
            GuardedUpdate::Missed { current } => {
                Err(resolve_missed(ride.id(), expected_revision, current))
            }
        }
    }

    async fn list_rides(&self, filter: &RideFilter) -> Result<Vec<Ride>, RideRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let mut query = rides::table
            .select(RideRow::as_select())
            .order(rides::id.asc())
            .into_boxed();

        if let Some(origin) = filter.origin.as_deref() {
            query = query.filter(rides::origin.eq(origin));
        }
        if let Some(destination) = filter.destination.as_deref() {
            query = query.filter(rides::destination.eq(destination));
        }
        if let Some(status) = filter.status {
            query = query.filter(rides::status.eq(status.as_str()));
        }
        if let Some(from) = filter.departure_from {
            query = query.filter(rides::departure_time.ge(from));
        }

        let rows = query
            .load::<RideRow>(&mut conn)
            .await
            .map_err(map_diesel_error)?;

        collect_rides(rows)
    }

    async fn add_passenger(
        &self,
        passenger: &NewRidePassenger,
    ) -> Result<RidePassenger, RideRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        let row = diesel::insert_into(ride_passengers::table)
            .values(&new_passenger_row(passenger))
            .returning(RidePassengerRow::as_returning())
            .get_result::<RidePassengerRow>(&mut conn)
            .await
            .map_err(|err| map_passenger_insert_error(err, passenger))?;

        row_to_passenger(row)
    }

    async fn get_passenger(
        &self,
        ride_id: RideId,
        passenger_id: &UserId,
    ) -> Result<Option<RidePassenger>, RideRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        let rows: Vec<RidePassengerRow> = ride_passengers::table
            .filter(
                ride_passengers::ride_id
                    .eq(ride_id.as_i64())
                    .and(ride_passengers::passenger_id.eq(passenger_id.as_str())),
            )
            .order(ride_passengers::id.desc())
            .select(RidePassengerRow::as_select())
            .load(&mut conn)
            .await
            .map_err(map_diesel_error)?;

        let active = rows
            .iter()
            .position(|row| row.status == PassengerStatus::Joined.as_str());
        let chosen = match active {
            Some(index) => rows.into_iter().nth(index),
            None => rows.into_iter().next(),
        };
        chosen.map(row_to_passenger).transpose()
    }

    async fn list_passengers(
        &self,
        ride_id: RideId,
    ) -> Result<Vec<RidePassenger>, RideRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        let rows: Vec<RidePassengerRow> = ride_passengers::table
            .filter(ride_passengers::ride_id.eq(ride_id.as_i64()))
            .order(ride_passengers::id.asc())
            .select(RidePassengerRow::as_select())
            .load(&mut conn)
            .await
            .map_err(map_diesel_error)?;

        rows.into_iter().map(row_to_passenger).collect()
    }

    async fn save_join(
        &self,
        ride: &Ride,
        expected_revision: u32,
        passenger: &NewRidePassenger,
    ) -> Result<(Ride, RidePassenger), RideRepositoryError> {
        let changes = ride_update(ride)?;
        let expected = to_db_count(expected_revision, "revision")?;
        let ride_id = ride.id().as_i64();
        let new_row = new_passenger_row(passenger);

        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let outcome = conn
            .transaction::<_, diesel::result::Error, _>(|conn| {
                async move {
                    match guarded_update(conn, ride_id, expected, &changes).await? {
                        GuardedUpdate::Applied(ride_row) => {
                            let passenger_row = diesel::insert_into(ride_passengers::table)
                                .values(&new_row)
                                .returning(RidePassengerRow::as_returning())
                                .get_result::<RidePassengerRow>(conn)
                                .await?;
                            Ok(GuardedUpdate::Applied((ride_row, passenger_row)))
                        }
                        GuardedUpdate::Missed { current } => Ok(GuardedUpdate::Missed { current }),
                    }
                }
                .scope_boxed()
            })
            .await
            .map_err(|err| map_passenger_insert_error(err, passenger))?;

        match outcome {
            GuardedUpdate::Applied((ride_row, passenger_row)) => {
                Ok((row_to_ride(ride_row)?, row_to_passenger(passenger_row)?))
            }
            GuardedUpdate::Missed { current } => {
                Err(resolve_missed(ride.id(), expected_revision, current))
            }
        }
    }
}
