//! Port for ride and passenger persistence.
//!
//! Writes that mutate an existing ride carry the revision the caller read.
//! Adapters apply them only when the stored revision still matches, which is
//! what lets the join use case detect lost updates across processes.

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::domain::{NewRide, NewRidePassenger, Ride, RideId, RidePassenger, RideStatus, UserId};

use super::define_port_error;

define_port_error! {
    /// Errors raised by ride repository adapters.
    pub enum RideRepositoryError {
        /// Repository connection could not be established.
        Connection { message: String } =>
            "ride repository connection failed: {message}",
        /// Query or mutation failed during execution.
        Query { message: String } =>
            "ride repository query failed: {message}",
        /// The ride targeted by a write does not exist.
        NotFound { ride_id: i64 } =>
            "ride {ride_id} not found",
        /// The stored revision moved on since the ride was read.
        RevisionMismatch { expected: u32, actual: u32 } =>
            "ride revision mismatch: expected {expected}, found {actual}",
        /// The passenger already holds a JOINED record on the ride.
        DuplicatePassenger { ride_id: i64, passenger_id: String } =>
            "passenger {passenger_id} already joined ride {ride_id}",
    }
}

/// Conjunctive filter for ride listings. `None` fields match everything.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RideFilter {
    /// Exact origin match.
    pub origin: Option<String>,
    /// Exact destination match.
    pub destination: Option<String>,
    /// Exact status match.
    pub status: Option<RideStatus>,
    /// Inclusive lower bound on departure time.
    pub departure_from: Option<DateTime<Utc>>,
}

impl RideFilter {
    /// Whether `ride` satisfies every populated criterion.
    ///
    /// # Examples
    /// ```
    /// use ride_service::domain::ports::RideFilter;
    /// use ride_service::domain::RideStatus;
    ///
    /// let filter = RideFilter {
    ///     status: Some(RideStatus::Open),
    ///     ..RideFilter::default()
    /// };
    /// assert!(filter.status.is_some());
    /// ```
    pub fn matches(&self, ride: &Ride) -> bool {
        self.origin
            .as_deref()
            .is_none_or(|origin| ride.origin() == origin)
            && self
                .destination
                .as_deref()
                .is_none_or(|destination| ride.destination() == destination)
            && self.status.is_none_or(|status| ride.status() == status)
            && self
                .departure_from
                .is_none_or(|from| ride.departure_time() >= from)
    }
}

/// Port for storing rides and their passenger records.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait RideRepository: Send + Sync {
    /// Store a new ride and return it with its assigned identifier.
    async fn create_ride(&self, ride: &NewRide) -> Result<Ride, RideRepositoryError>;

    /// Find a ride by identifier.
    async fn get_ride_by_id(&self, ride_id: RideId) -> Result<Option<Ride>, RideRepositoryError>;

    /// Overwrite the mutable state of a ride read at `expected_revision`.
    ///
    /// Fails with [`RideRepositoryError::NotFound`] for unknown rides and
    /// [`RideRepositoryError::RevisionMismatch`] when the stored revision
    /// differs from `expected_revision`.
    async fn save_ride(
        &self,
        ride: &Ride,
        expected_revision: u32,
    ) -> Result<Ride, RideRepositoryError>;

    /// List rides matching `filter`, ordered by ascending identifier.
    async fn list_rides(&self, filter: &RideFilter) -> Result<Vec<Ride>, RideRepositoryError>;

    /// Store a passenger record on its own.
    ///
    /// Fails with [`RideRepositoryError::DuplicatePassenger`] when the
    /// passenger already holds a JOINED record on the ride.
    async fn add_passenger(
        &self,
        passenger: &NewRidePassenger,
    ) -> Result<RidePassenger, RideRepositoryError>;

    /// Find the passenger's record on a ride: the JOINED one if present,
    /// otherwise the most recent.
    async fn get_passenger(
        &self,
        ride_id: RideId,
        passenger_id: &UserId,
    ) -> Result<Option<RidePassenger>, RideRepositoryError>;

    /// List every passenger record of a ride, ordered by identifier.
    async fn list_passengers(
        &self,
        ride_id: RideId,
    ) -> Result<Vec<RidePassenger>, RideRepositoryError>;

    /// Atomically store a passenger record together with the ride update that
    /// accounts for it. Either both writes become visible or neither does.
    ///
    /// Fails like [`RideRepository::save_ride`] and
    /// [`RideRepository::add_passenger`].
    async fn save_join(
        &self,
        ride: &Ride,
        expected_revision: u32,
        passenger: &NewRidePassenger,
    ) -> Result<(Ride, RidePassenger), RideRepositoryError>;
}

#[cfg(test)]
mod tests {
    //! Regression coverage for this module.
    use chrono::{Duration, TimeZone};
    use rstest::{fixture, rstest};

    use super::*;
    use crate::domain::{RideDraft, UserId};

    #[fixture]
    fn ride() -> Ride {
        let created_at = Utc
            .with_ymd_and_hms(2026, 4, 2, 7, 30, 0)
            .single()
            .expect("valid timestamp");
        Ride::new(RideDraft {
            id: RideId::new(1),
            driver_id: UserId::new("driver-1").expect("valid id"),
            origin: "Campus".to_owned(),
            destination: "Airport".to_owned(),
            departure_time: created_at + Duration::hours(1),
            seats_total: 2,
            seats_available: 2,
            status: RideStatus::Open,
            created_at,
            updated_at: created_at,
            revision: 1,
        })
        .expect("valid ride")
    }

    #[rstest]
    fn empty_filter_matches_everything(ride: Ride) {
        assert!(RideFilter::default().matches(&ride));
    }

    #[rstest]
    #[case(Some("Campus"), None, None, true)]
    #[case(Some("Library"), None, None, false)]
    #[case(None, Some("Airport"), Some(RideStatus::Open), true)]
    #[case(Some("Campus"), Some("Airport"), Some(RideStatus::Full), false)]
    #[case(Some("campus"), None, None, false)]
    fn filter_fields_combine_with_and(
        ride: Ride,
        #[case] origin: Option<&str>,
        #[case] destination: Option<&str>,
        #[case] status: Option<RideStatus>,
        #[case] expected: bool,
    ) {
        let filter = RideFilter {
            origin: origin.map(str::to_owned),
            destination: destination.map(str::to_owned),
            status,
            departure_from: None,
        };
        assert_eq!(filter.matches(&ride), expected);
    }

    #[rstest]
    fn departure_bound_is_inclusive(ride: Ride) {
        let at = RideFilter {
            departure_from: Some(ride.departure_time()),
            ..RideFilter::default()
        };
        let after = RideFilter {
            departure_from: Some(ride.departure_time() + Duration::seconds(1)),
            ..RideFilter::default()
        };
        assert!(at.matches(&ride));
        assert!(!after.matches(&ride));
    }

    #[rstest]
    fn constructors_format_messages() {
        assert_eq!(
            RideRepositoryError::revision_mismatch(2_u32, 3_u32).to_string(),
            "ride revision mismatch: expected 2, found 3"
        );
        assert_eq!(
            RideRepositoryError::duplicate_passenger(RideId::new(4), "student-1").to_string(),
            "passenger student-1 already joined ride 4"
        );
    }
}
