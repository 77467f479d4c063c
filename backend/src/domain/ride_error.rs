//! Failure taxonomy of the ride use cases.

use serde_json::json;

use super::ports::RideRepositoryError;
use super::{Error, RideId, RideTransitionError, RideValidationError, UserId};

/// Typed failures reported by the ride driving ports.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RideError {
    /// The referenced ride does not exist.
    #[error("ride {ride_id} not found")]
    RideNotFound { ride_id: RideId },
    /// The ride is not OPEN or has no seat left.
    #[error("ride {ride_id} cannot be joined: {reason}")]
    RideNotJoinable {
        ride_id: RideId,
        reason: RideTransitionError,
    },
    /// The passenger already holds a seat on the ride.
    #[error("passenger {passenger_id} already joined ride {ride_id}")]
    DuplicateJoin { ride_id: RideId, passenger_id: UserId },
    /// Concurrent writers kept winning until the retry budget ran out.
    #[error("ride {ride_id} is being modified concurrently; gave up after {attempts} attempts")]
    ConcurrencyConflict { ride_id: RideId, attempts: u32 },
    /// The ride already reached a terminal state.
    #[error("ride {ride_id} cannot be completed: {reason}")]
    RideNotCompletable {
        ride_id: RideId,
        reason: RideTransitionError,
    },
    /// The command describes a ride that cannot exist.
    #[error("invalid ride: {0}")]
    InvalidRide(#[from] RideValidationError),
    /// Opaque infrastructure failure.
    #[error(transparent)]
    Repository(#[from] RideRepositoryError),
}

impl RideError {
    /// Stable snake_case discriminator exposed in error details.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::RideNotFound { .. } => "ride_not_found",
            Self::RideNotJoinable { .. } => "ride_not_joinable",
            Self::DuplicateJoin { .. } => "duplicate_join",
            Self::ConcurrencyConflict { .. } => "concurrency_conflict",
            Self::RideNotCompletable { .. } => "ride_not_completable",
            Self::InvalidRide(_) => "invalid_ride",
            Self::Repository(_) => "repository_failure",
        }
    }
}

impl From<RideError> for Error {
    fn from(value: RideError) -> Self {
        let kind = value.kind();
        let message = value.to_string();
        match value {
            RideError::RideNotFound { ride_id } => {
                Error::not_found(message).with_details(json!({ "code": kind, "rideId": ride_id }))
            }
            RideError::RideNotJoinable { ride_id, .. } | RideError::DuplicateJoin { ride_id, .. } => {
                Error::invalid_request(message)
                    .with_details(json!({ "code": kind, "rideId": ride_id }))
            }
            RideError::ConcurrencyConflict { ride_id, .. }
            | RideError::RideNotCompletable { ride_id, .. } => {
                Error::conflict(message).with_details(json!({ "code": kind, "rideId": ride_id }))
            }
            RideError::InvalidRide(_) => {
                Error::invalid_request(message).with_details(json!({ "code": kind }))
            }
            RideError::Repository(RideRepositoryError::Connection { message: cause }) => {
                Error::service_unavailable(format!("ride repository unavailable: {cause}"))
            }
            RideError::Repository(error) => {
                Error::internal(format!("ride repository error: {error}"))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    //! Regression coverage for this module.
    use rstest::rstest;
    use serde_json::Value;

    use super::*;
    use crate::domain::{ErrorCode, RideStatus};

    fn ride_id() -> RideId {
        RideId::new(42)
    }

    #[rstest]
    #[case(RideError::RideNotFound { ride_id: ride_id() }, ErrorCode::NotFound)]
    #[case(
        RideError::RideNotJoinable {
            ride_id: ride_id(),
            reason: RideTransitionError::NoSeatsAvailable,
        },
        ErrorCode::InvalidRequest
    )]
    #[case(
        RideError::DuplicateJoin {
            ride_id: ride_id(),
            passenger_id: UserId::new("student-1").expect("valid id"),
        },
        ErrorCode::InvalidRequest
    )]
    #[case(
        RideError::ConcurrencyConflict { ride_id: ride_id(), attempts: 5 },
        ErrorCode::Conflict
    )]
    #[case(
        RideError::RideNotCompletable {
            ride_id: ride_id(),
            reason: RideTransitionError::AlreadyTerminal { status: RideStatus::Completed },
        },
        ErrorCode::Conflict
    )]
    #[case(RideError::InvalidRide(RideValidationError::NoSeats), ErrorCode::InvalidRequest)]
    #[case(
        RideError::Repository(RideRepositoryError::connection("refused")),
        ErrorCode::ServiceUnavailable
    )]
    #[case(
        RideError::Repository(RideRepositoryError::query("syntax")),
        ErrorCode::InternalError
    )]
    fn maps_to_error_codes(#[case] error: RideError, #[case] expected: ErrorCode) {
        assert_eq!(Error::from(error).code(), expected);
    }

    #[rstest]
    fn details_carry_kind_and_ride_id() {
        let error = Error::from(RideError::RideNotJoinable {
            ride_id: ride_id(),
            reason: RideTransitionError::NotOpen {
                status: RideStatus::Full,
            },
        });

        let details = error.details().expect("details present");
        assert_eq!(
            details.get("code").and_then(Value::as_str),
            Some("ride_not_joinable")
        );
        assert_eq!(details.get("rideId").and_then(Value::as_i64), Some(42));
        assert_eq!(error.message(), "ride 42 cannot be joined: ride is FULL, not OPEN");
    }
}
