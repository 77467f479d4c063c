//! Ride domain services.
//!
//! [`RideCommandService`] runs the publish, join and complete use cases;
//! [`RideQueryService`] serves read-only projections. Both talk to storage
//! only through [`RideRepository`].
//!
//! Join and complete run their read-check-write cycle under the ride's
//! in-process lock and retry it when the repository reports that another
//! writer bumped the revision in between.

use std::future::Future;
use std::sync::Arc;

use async_trait::async_trait;
use mockable::Clock;
use tracing::{debug, info, warn};

use crate::domain::ports::{
    CompleteRideRequest, CreateRideRequest, JoinRideRequest, ListRidesRequest, RideCommand,
    RideFilter, RideQuery, RideRepository, RideRepositoryError,
};
use crate::domain::{
    NewRide, NewRideDraft, NewRidePassenger, Ride, RideError, RideId, RideLocks, RidePassenger,
};

/// Attempts made before a contended write gives up.
pub const DEFAULT_MAX_ATTEMPTS: u32 = 5;

/// Outcome of one optimistic read-check-write cycle.
enum Attempt<T> {
    Done(T),
    Stale { expected: u32, actual: u32 },
}

fn map_write_error<T>(ride_id: RideId, error: RideRepositoryError) -> Result<Attempt<T>, RideError> {
    match error {
        RideRepositoryError::RevisionMismatch { expected, actual } => {
            Ok(Attempt::Stale { expected, actual })
        }
        RideRepositoryError::NotFound { .. } => Err(RideError::RideNotFound { ride_id }),
        other => Err(RideError::Repository(other)),
    }
}

async fn load_ride<R>(repo: &R, ride_id: RideId) -> Result<Ride, RideError>
where
    R: RideRepository + ?Sized,
{
    repo.get_ride_by_id(ride_id)
        .await?
        .ok_or(RideError::RideNotFound { ride_id })
}

/// Ride service implementing the command driving port.
#[derive(Clone)]
pub struct RideCommandService<R> {
    ride_repo: Arc<R>,
    clock: Arc<dyn Clock>,
    locks: Arc<RideLocks>,
    max_attempts: u32,
}

impl<R> RideCommandService<R> {
    /// Create a command service with its own lock registry.
    ///
    /// # Examples
    /// ```
    /// use std::sync::Arc;
    /// use mockable::DefaultClock;
    /// use ride_service::domain::RideCommandService;
    /// use ride_service::outbound::memory::InMemoryRideRepository;
    ///
    /// let service = RideCommandService::new(
    ///     Arc::new(InMemoryRideRepository::new()),
    ///     Arc::new(DefaultClock),
    /// )
    /// .with_max_attempts(3);
    /// # let _ = service;
    /// ```
    pub fn new(ride_repo: Arc<R>, clock: Arc<dyn Clock>) -> Self {
        Self {
            ride_repo,
            clock,
            locks: Arc::new(RideLocks::new()),
            max_attempts: DEFAULT_MAX_ATTEMPTS,
        }
    }

    /// Override the optimistic retry budget. Values below one are raised to one.
    #[must_use]
    pub fn with_max_attempts(mut self, max_attempts: u32) -> Self {
        self.max_attempts = max_attempts.max(1);
        self
    }
}

impl<R> RideCommandService<R>
where
    R: RideRepository,
{
    async fn with_retries<F, Fut>(&self, ride_id: RideId, mut attempt: F) -> Result<Ride, RideError>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<Attempt<Ride>, RideError>>,
    {
        let _guard = self.locks.acquire(ride_id).await;
        for round in 1..=self.max_attempts {
            match attempt().await? {
                Attempt::Done(ride) => return Ok(ride),
                Attempt::Stale { expected, actual } => {
                    debug!(
                        ride_id = %ride_id,
                        round,
                        expected,
                        actual,
                        "ride revision moved during write; retrying"
                    );
                }
            }
        }
        warn!(
            ride_id = %ride_id,
            attempts = self.max_attempts,
            "giving up on contended ride"
        );
        Err(RideError::ConcurrencyConflict {
            ride_id,
            attempts: self.max_attempts,
        })
    }

    async fn try_join(&self, request: &JoinRideRequest) -> Result<Attempt<Ride>, RideError> {
        let ride_id = request.ride_id;
        let mut ride = load_ride(self.ride_repo.as_ref(), ride_id).await?;
        ride.ensure_joinable()
            .map_err(|reason| RideError::RideNotJoinable { ride_id, reason })?;

        let existing = self
            .ride_repo
            .get_passenger(ride_id, &request.passenger_id)
            .await?;
        if existing.is_some_and(|passenger| passenger.is_active()) {
            return Err(RideError::DuplicateJoin {
                ride_id,
                passenger_id: request.passenger_id.clone(),
            });
        }

        let now = self.clock.utc();
        let expected_revision = ride.revision();
        ride.reserve_seat(now)
            .map_err(|reason| RideError::RideNotJoinable { ride_id, reason })?;
        let passenger = NewRidePassenger::joined(ride_id, request.passenger_id.clone(), now);

        match self
            .ride_repo
            .save_join(&ride, expected_revision, &passenger)
            .await
        {
            Ok((saved, _)) => Ok(Attempt::Done(saved)),
            Err(RideRepositoryError::DuplicatePassenger { .. }) => Err(RideError::DuplicateJoin {
                ride_id,
                passenger_id: request.passenger_id.clone(),
            }),
            Err(error) => map_write_error(ride_id, error),
        }
    }

    async fn try_complete(&self, ride_id: RideId) -> Result<Attempt<Ride>, RideError> {
        let mut ride = load_ride(self.ride_repo.as_ref(), ride_id).await?;
        let expected_revision = ride.revision();
        ride.complete(self.clock.utc())
            .map_err(|reason| RideError::RideNotCompletable { ride_id, reason })?;

        match self.ride_repo.save_ride(&ride, expected_revision).await {
            Ok(saved) => Ok(Attempt::Done(saved)),
            Err(error) => map_write_error(ride_id, error),
        }
    }
}

#[async_trait]
impl<R> RideCommand for RideCommandService<R>
where
    R: RideRepository,
{
    async fn create_ride(&self, request: CreateRideRequest) -> Result<Ride, RideError> {
        let CreateRideRequest {
            driver_id,
            origin,
            destination,
            departure_time,
            seats_total,
        } = request;
        let new_ride = NewRide::publish(
            NewRideDraft {
                driver_id,
                origin,
                destination,
                departure_time,
                seats_total,
            },
            self.clock.utc(),
        )?;

        let ride = self.ride_repo.create_ride(&new_ride).await?;
        info!(
            ride_id = %ride.id(),
            driver_id = %ride.driver_id(),
            seats_total = ride.seats_total(),
            "ride published"
        );
        Ok(ride)
    }

    async fn join_ride(&self, request: JoinRideRequest) -> Result<Ride, RideError> {
        let ride = self
            .with_retries(request.ride_id, || self.try_join(&request))
            .await?;
        info!(
            ride_id = %ride.id(),
            passenger_id = %request.passenger_id,
            seats_available = ride.seats_available(),
            status = %ride.status(),
            "passenger joined ride"
        );
        Ok(ride)
    }

    async fn complete_ride(&self, request: CompleteRideRequest) -> Result<Ride, RideError> {
        let ride_id = request.ride_id;
        let ride = self
            .with_retries(ride_id, || self.try_complete(ride_id))
            .await?;
        info!(ride_id = %ride_id, "ride completed");
        Ok(ride)
    }
}

/// Ride service implementing the query driving port.
#[derive(Clone)]
pub struct RideQueryService<R> {
    ride_repo: Arc<R>,
}

impl<R> RideQueryService<R> {
    /// Create a query service over the ride repository.
    pub fn new(ride_repo: Arc<R>) -> Self {
        Self { ride_repo }
    }
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|raw| !raw.is_empty())
}

#[async_trait]
impl<R> RideQuery for RideQueryService<R>
where
    R: RideRepository,
{
    async fn list_rides(&self, request: ListRidesRequest) -> Result<Vec<Ride>, RideError> {
        // Empty strings are treated as "no filter", not as an exact match.
        let filter = RideFilter {
            origin: non_empty(request.origin),
            destination: non_empty(request.destination),
            status: request.status,
            departure_from: None,
        };
        Ok(self.ride_repo.list_rides(&filter).await?)
    }

    async fn get_ride(&self, ride_id: RideId) -> Result<Ride, RideError> {
        load_ride(self.ride_repo.as_ref(), ride_id).await
    }

    async fn list_passengers(&self, ride_id: RideId) -> Result<Vec<RidePassenger>, RideError> {
        load_ride(self.ride_repo.as_ref(), ride_id).await?;
        Ok(self.ride_repo.list_passengers(ride_id).await?)
    }
}

#[cfg(test)]
#[path = "ride_service_tests.rs"]
mod tests;
