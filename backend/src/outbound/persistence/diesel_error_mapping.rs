//! Translation of pool and Diesel failures into [`RideRepositoryError`].

use diesel::result::{DatabaseErrorKind, Error as DieselError};
use tracing::debug;

use crate::domain::ports::RideRepositoryError;
use crate::domain::{NewRidePassenger, RideId};

use super::pool::PoolError;

/// Pool failures mean the database is unreachable.
pub(crate) fn map_pool_error(error: PoolError) -> RideRepositoryError {
    let message = match error {
        PoolError::Checkout { message } | PoolError::Build { message } => message,
    };
    RideRepositoryError::connection(message)
}

fn log_diesel_error(error: &DieselError) {
    match error {
        DieselError::DatabaseError(kind, info) => {
            debug!(?kind, message = info.message(), "diesel operation failed");
        }
        _ => debug!(
            error_type = %std::any::type_name_of_val(error),
            "diesel operation failed"
        ),
    }
}

/// Map Diesel errors raised by reads and ride updates.
pub(crate) fn map_diesel_error(error: DieselError) -> RideRepositoryError {
    log_diesel_error(&error);

    match error {
        DieselError::NotFound => RideRepositoryError::query("record not found"),
        DieselError::QueryBuilderError(_) => RideRepositoryError::query("database query error"),
        DieselError::DatabaseError(DatabaseErrorKind::ClosedConnection, _) => {
            RideRepositoryError::connection("database connection error")
        }
        _ => RideRepositoryError::query("database error"),
    }
}

/// Map Diesel errors raised while inserting a passenger record.
///
/// The partial unique index turns a second JOINED record into a unique
/// violation, and the foreign key turns an unknown ride into a foreign key
/// violation.
pub(crate) fn map_passenger_insert_error(
    error: DieselError,
    passenger: &NewRidePassenger,
) -> RideRepositoryError {
    match error {
        DieselError::DatabaseError(DatabaseErrorKind::UniqueViolation, _) => {
            RideRepositoryError::duplicate_passenger(
                passenger.ride_id(),
                passenger.passenger_id().to_string(),
            )
        }
        DieselError::DatabaseError(DatabaseErrorKind::ForeignKeyViolation, _) => {
            RideRepositoryError::not_found(passenger.ride_id())
        }
        other => map_diesel_error(other),
    }
}

/// Explain why a revision-guarded update matched no row.
pub(crate) fn missed_update(
    ride_id: RideId,
    expected_revision: u32,
    current_revision: Option<u32>,
) -> RideRepositoryError {
    match current_revision {
        Some(actual) => RideRepositoryError::revision_mismatch(expected_revision, actual),
        None => RideRepositoryError::not_found(ride_id),
    }
}
