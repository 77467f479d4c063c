//! Passenger seat records.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::{RideId, UserId};

/// Repository-assigned passenger record identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RidePassengerId(i64);

impl RidePassengerId {
    /// Wrap a raw identifier.
    pub const fn new(raw: i64) -> Self {
        Self(raw)
    }

    /// Raw identifier value.
    pub const fn as_i64(self) -> i64 {
        self.0
    }
}

impl fmt::Display for RidePassengerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Whether the passenger still holds the seat.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum PassengerStatus {
    Joined,
    Cancelled,
}

impl PassengerStatus {
    /// Stable wire and storage representation.
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Joined => "JOINED",
            Self::Cancelled => "CANCELLED",
        }
    }
}

impl fmt::Display for PassengerStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Returned when a string is not a known passenger status.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown passenger status: {value}")]
pub struct ParsePassengerStatusError {
    /// Rejected input.
    pub value: String,
}

impl FromStr for PassengerStatus {
    type Err = ParsePassengerStatusError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "JOINED" => Ok(Self::Joined),
            "CANCELLED" => Ok(Self::Cancelled),
            other => Err(ParsePassengerStatusError {
                value: other.to_owned(),
            }),
        }
    }
}

/// Invariant violations detected while rebuilding a passenger record.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RidePassengerValidationError {
    #[error("a JOINED passenger cannot have left_at set")]
    JoinedWithLeftAt,
    #[error("left_at precedes joined_at")]
    LeftBeforeJoined,
}

/// A seat claim that has not been stored yet.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewRidePassenger {
    ride_id: RideId,
    passenger_id: UserId,
    joined_at: DateTime<Utc>,
}

impl NewRidePassenger {
    /// Seat `passenger_id` on `ride_id` as of `now`.
    pub fn joined(ride_id: RideId, passenger_id: UserId, now: DateTime<Utc>) -> Self {
        Self {
            ride_id,
            passenger_id,
            joined_at: now,
        }
    }

    pub fn ride_id(&self) -> RideId {
        self.ride_id
    }

    pub fn passenger_id(&self) -> &UserId {
        &self.passenger_id
    }

    /// New records are always JOINED.
    pub fn status(&self) -> PassengerStatus {
        PassengerStatus::Joined
    }

    pub fn joined_at(&self) -> DateTime<Utc> {
        self.joined_at
    }

    /// Attach the repository-assigned identifier.
    pub fn into_passenger(self, id: RidePassengerId) -> RidePassenger {
        RidePassenger {
            id,
            ride_id: self.ride_id,
            passenger_id: self.passenger_id,
            status: PassengerStatus::Joined,
            joined_at: self.joined_at,
            left_at: None,
        }
    }
}

/// Raw passenger state as read back from storage.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RidePassengerDraft {
    pub id: RidePassengerId,
    pub ride_id: RideId,
    pub passenger_id: UserId,
    pub status: PassengerStatus,
    pub joined_at: DateTime<Utc>,
    pub left_at: Option<DateTime<Utc>>,
}

/// A stored passenger record. At most one JOINED record exists per
/// (ride, passenger) pair.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RidePassenger {
    id: RidePassengerId,
    ride_id: RideId,
    passenger_id: UserId,
    status: PassengerStatus,
    joined_at: DateTime<Utc>,
    left_at: Option<DateTime<Utc>>,
}

impl RidePassenger {
    /// Rebuild a passenger record from stored state.
    pub fn new(draft: RidePassengerDraft) -> Result<Self, RidePassengerValidationError> {
        let RidePassengerDraft {
            id,
            ride_id,
            passenger_id,
            status,
            joined_at,
            left_at,
        } = draft;

        match (status, left_at) {
            (PassengerStatus::Joined, Some(_)) => {
                return Err(RidePassengerValidationError::JoinedWithLeftAt);
            }
            (_, Some(left)) if left < joined_at => {
                return Err(RidePassengerValidationError::LeftBeforeJoined);
            }
            _ => {}
        }

        Ok(Self {
            id,
            ride_id,
            passenger_id,
            status,
            joined_at,
            left_at,
        })
    }

    pub fn id(&self) -> RidePassengerId {
        self.id
    }

    pub fn ride_id(&self) -> RideId {
        self.ride_id
    }

    pub fn passenger_id(&self) -> &UserId {
        &self.passenger_id
    }

    pub fn status(&self) -> PassengerStatus {
        self.status
    }

    pub fn joined_at(&self) -> DateTime<Utc> {
        self.joined_at
    }

    pub fn left_at(&self) -> Option<DateTime<Utc>> {
        self.left_at
    }

    /// Whether this record currently holds a seat.
    pub fn is_active(&self) -> bool {
        self.status == PassengerStatus::Joined
    }
}
