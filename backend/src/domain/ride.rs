//! Ride aggregate and its lifecycle rules.
//!
//! A ride is published OPEN with every seat free, loses one seat per join,
//! flips to FULL when the last seat goes, and ends COMPLETED. CANCELLED is
//! reserved for a driver-cancellation flow that does not exist yet.
//!
//! ```text
//! OPEN ──join (last seat)──▶ FULL
//!   │                         │
//!   └────────complete─────────┴──▶ COMPLETED
//! ```

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::UserId;

/// Repository-assigned ride identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RideId(i64);

impl RideId {
    /// Wrap a raw identifier.
    pub const fn new(raw: i64) -> Self {
        Self(raw)
    }

    /// Raw identifier value.
    pub const fn as_i64(self) -> i64 {
        self.0
    }
}

impl fmt::Display for RideId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<RideId> for i64 {
    fn from(value: RideId) -> Self {
        value.0
    }
}

/// Lifecycle state of a ride.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum RideStatus {
    /// Accepting passengers.
    Open,
    /// Every seat is taken.
    Full,
    /// The trip happened; terminal.
    Completed,
    /// Withdrawn by the driver; terminal.
    Cancelled,
}

impl RideStatus {
    /// Stable wire and storage representation.
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Open => "OPEN",
            Self::Full => "FULL",
            Self::Completed => "COMPLETED",
            Self::Cancelled => "CANCELLED",
        }
    }

    /// Terminal states accept no further transitions.
    pub const fn is_terminal(self) -> bool {
        matches!(self, Self::Completed | Self::Cancelled)
    }
}

impl fmt::Display for RideStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Returned when a string is not a known ride status.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown ride status: {value}")]
pub struct ParseRideStatusError {
    /// Rejected input.
    pub value: String,
}

impl FromStr for RideStatus {
    type Err = ParseRideStatusError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "OPEN" => Ok(Self::Open),
            "FULL" => Ok(Self::Full),
            "COMPLETED" => Ok(Self::Completed),
            "CANCELLED" => Ok(Self::Cancelled),
            other => Err(ParseRideStatusError {
                value: other.to_owned(),
            }),
        }
    }
}

/// Invariant violations detected while building a ride.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RideValidationError {
    #[error("origin must not be blank")]
    BlankOrigin,
    #[error("destination must not be blank")]
    BlankDestination,
    #[error("seats total must be positive")]
    NoSeats,
    #[error("seats available ({available}) exceeds seats total ({total})")]
    SeatsAvailableExceedTotal { available: u32, total: u32 },
    #[error("a FULL ride cannot have {available} seats available")]
    FullWithSeatsAvailable { available: u32 },
    #[error("updated_at precedes created_at")]
    UpdatedBeforeCreated,
    #[error("revision must start at 1")]
    ZeroRevision,
}

/// Reasons a state transition is refused.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum RideTransitionError {
    /// Only OPEN rides accept passengers.
    #[error("ride is {status}, not OPEN")]
    NotOpen { status: RideStatus },
    /// The seat counter is exhausted.
    #[error("no seats available")]
    NoSeatsAvailable,
    /// The ride already reached a terminal state.
    #[error("ride is already {status}")]
    AlreadyTerminal { status: RideStatus },
}

/// Input for publishing a ride.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewRideDraft {
    pub driver_id: UserId,
    pub origin: String,
    pub destination: String,
    pub departure_time: DateTime<Utc>,
    pub seats_total: u32,
}

/// A validated ride that has not been stored yet.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewRide {
    driver_id: UserId,
    origin: String,
    destination: String,
    departure_time: DateTime<Utc>,
    seats_total: u32,
    created_at: DateTime<Utc>,
}

impl NewRide {
    /// Validate a draft and stamp it with the publication time.
    ///
    /// # Examples
    /// ```
    /// use chrono::{TimeZone, Utc};
    /// use ride_service::domain::{NewRide, NewRideDraft, RideStatus, UserId};
    ///
    /// let now = Utc.with_ymd_and_hms(2026, 3, 1, 8, 0, 0).unwrap();
    /// let ride = NewRide::publish(
    ///     NewRideDraft {
    ///         driver_id: UserId::new("driver-1").unwrap(),
    ///         origin: "Campus".into(),
    ///         destination: "Station".into(),
    ///         departure_time: now,
    ///         seats_total: 3,
    ///     },
    ///     now,
    /// )
    /// .unwrap();
    /// assert_eq!(ride.seats_available(), 3);
    /// assert_eq!(ride.status(), RideStatus::Open);
    /// ```
    pub fn publish(draft: NewRideDraft, now: DateTime<Utc>) -> Result<Self, RideValidationError> {
        let NewRideDraft {
            driver_id,
            origin,
            destination,
            departure_time,
            seats_total,
        } = draft;
        validate_route(&origin, &destination)?;
        if seats_total == 0 {
            return Err(RideValidationError::NoSeats);
        }
        Ok(Self {
            driver_id,
            origin,
            destination,
            departure_time,
            seats_total,
            created_at: now,
        })
    }

    pub fn driver_id(&self) -> &UserId {
        &self.driver_id
    }

    pub fn origin(&self) -> &str {
        &self.origin
    }

    pub fn destination(&self) -> &str {
        &self.destination
    }

    pub fn departure_time(&self) -> DateTime<Utc> {
        self.departure_time
    }

    pub fn seats_total(&self) -> u32 {
        self.seats_total
    }

    /// Every seat is free at publication.
    pub fn seats_available(&self) -> u32 {
        self.seats_total
    }

    /// Rides are always published OPEN.
    pub fn status(&self) -> RideStatus {
        RideStatus::Open
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    /// Equal to `created_at` at publication.
    pub fn updated_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    /// First revision of every ride.
    pub fn revision(&self) -> u32 {
        INITIAL_REVISION
    }

    /// Attach the repository-assigned identifier.
    pub fn into_ride(self, id: RideId) -> Ride {
        Ride {
            id,
            seats_available: self.seats_total,
            status: RideStatus::Open,
            updated_at: self.created_at,
            revision: INITIAL_REVISION,
            driver_id: self.driver_id,
            origin: self.origin,
            destination: self.destination,
            departure_time: self.departure_time,
            seats_total: self.seats_total,
            created_at: self.created_at,
        }
    }
}

const INITIAL_REVISION: u32 = 1;

fn validate_route(origin: &str, destination: &str) -> Result<(), RideValidationError> {
    if origin.trim().is_empty() {
        return Err(RideValidationError::BlankOrigin);
    }
    if destination.trim().is_empty() {
        return Err(RideValidationError::BlankDestination);
    }
    Ok(())
}

/// Raw ride state as read back from storage.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RideDraft {
    pub id: RideId,
    pub driver_id: UserId,
    pub origin: String,
    pub destination: String,
    pub departure_time: DateTime<Utc>,
    pub seats_total: u32,
    pub seats_available: u32,
    pub status: RideStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub revision: u32,
}

/// A stored ride.
///
/// ## Invariants
/// - `0 < seats_total` and `seats_available <= seats_total`.
/// - `status == FULL` implies `seats_available == 0`.
/// - `updated_at >= created_at`.
/// - `revision >= 1`, incremented by every transition.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Ride {
    id: RideId,
    driver_id: UserId,
    origin: String,
    destination: String,
    departure_time: DateTime<Utc>,
    seats_total: u32,
    seats_available: u32,
    status: RideStatus,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
    revision: u32,
}

impl Ride {
    /// Rebuild a ride from stored state, enforcing the aggregate invariants.
    pub fn new(draft: RideDraft) -> Result<Self, RideValidationError> {
        let RideDraft {
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
        } = draft;

        validate_route(&origin, &destination)?;
        if seats_total == 0 {
            return Err(RideValidationError::NoSeats);
        }
        if seats_available > seats_total {
            return Err(RideValidationError::SeatsAvailableExceedTotal {
                available: seats_available,
                total: seats_total,
            });
        }
        if status == RideStatus::Full && seats_available != 0 {
            return Err(RideValidationError::FullWithSeatsAvailable {
                available: seats_available,
            });
        }
        if updated_at < created_at {
            return Err(RideValidationError::UpdatedBeforeCreated);
        }
        if revision == 0 {
            return Err(RideValidationError::ZeroRevision);
        }

        Ok(Self {
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
        })
    }

    pub fn id(&self) -> RideId {
        self.id
    }

    pub fn driver_id(&self) -> &UserId {
        &self.driver_id
    }

    pub fn origin(&self) -> &str {
        &self.origin
    }

    pub fn destination(&self) -> &str {
        &self.destination
    }

    pub fn departure_time(&self) -> DateTime<Utc> {
        self.departure_time
    }

    pub fn seats_total(&self) -> u32 {
        self.seats_total
    }

    pub fn seats_available(&self) -> u32 {
        self.seats_available
    }

    pub fn status(&self) -> RideStatus {
        self.status
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    pub fn updated_at(&self) -> DateTime<Utc> {
        self.updated_at
    }

    /// Optimistic concurrency token.
    pub fn revision(&self) -> u32 {
        self.revision
    }

    /// Check whether a passenger could take a seat right now.
    ///
    /// The status check runs first: a ride that is not OPEN is refused even
    /// when its counter still shows free seats.
    pub fn ensure_joinable(&self) -> Result<(), RideTransitionError> {
        if self.status != RideStatus::Open {
            return Err(RideTransitionError::NotOpen {
                status: self.status,
            });
        }
        if self.seats_available == 0 {
            return Err(RideTransitionError::NoSeatsAvailable);
        }
        Ok(())
    }

    /// Take one seat, flipping the ride to FULL when it was the last one.
    ///
    /// # Examples
    /// ```
    /// use chrono::{TimeZone, Utc};
    /// use ride_service::domain::{NewRide, NewRideDraft, RideId, RideStatus, UserId};
    ///
    /// let now = Utc.with_ymd_and_hms(2026, 3, 1, 8, 0, 0).unwrap();
    /// let mut ride = NewRide::publish(
    ///     NewRideDraft {
    ///         driver_id: UserId::new("driver-1").unwrap(),
    ///         origin: "Campus".into(),
    ///         destination: "Station".into(),
    ///         departure_time: now,
    ///         seats_total: 1,
    ///     },
    ///     now,
    /// )
    /// .unwrap()
    /// .into_ride(RideId::new(1));
    ///
    /// ride.reserve_seat(now).unwrap();
    /// assert_eq!(ride.status(), RideStatus::Full);
    /// assert!(ride.reserve_seat(now).is_err());
    /// ```
    pub fn reserve_seat(&mut self, now: DateTime<Utc>) -> Result<(), RideTransitionError> {
        self.ensure_joinable()?;
        self.seats_available -= 1;
        if self.seats_available == 0 {
            self.status = RideStatus::Full;
        }
        self.touch(now);
        Ok(())
    }

    /// Mark the ride COMPLETED. Seat counters are left untouched.
    pub fn complete(&mut self, now: DateTime<Utc>) -> Result<(), RideTransitionError> {
        if self.status.is_terminal() {
            return Err(RideTransitionError::AlreadyTerminal {
                status: self.status,
            });
        }
        self.status = RideStatus::Completed;
        self.touch(now);
        Ok(())
    }

    fn touch(&mut self, now: DateTime<Utc>) {
        self.updated_at = now.max(self.created_at);
        self.revision += 1;
    }
}
