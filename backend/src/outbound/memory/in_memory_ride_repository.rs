//! Mutex-guarded ride store.

use std::collections::BTreeMap;
use std::sync::{Mutex, MutexGuard};

use async_trait::async_trait;

use crate::domain::ports::{RideFilter, RideRepository, RideRepositoryError};
use crate::domain::{
    NewRide, NewRidePassenger, Ride, RideId, RidePassenger, RidePassengerId, UserId,
};

#[derive(Debug, Default)]
struct StoreState {
    last_ride_id: i64,
    last_passenger_id: i64,
    rides: BTreeMap<RideId, Ride>,
    passengers: BTreeMap<RideId, Vec<RidePassenger>>,
}

impl StoreState {
    /// Records of one ride in insertion order, which is also id order.
    fn records(&self, ride_id: RideId) -> &[RidePassenger] {
        self.passengers
            .get(&ride_id)
            .map(Vec::as_slice)
            .unwrap_or_default()
    }

    fn check_revision(&self, ride: &Ride, expected: u32) -> Result<(), RideRepositoryError> {
        let stored = self
            .rides
            .get(&ride.id())
            .ok_or_else(|| RideRepositoryError::not_found(ride.id()))?;
        if stored.revision() != expected {
            return Err(RideRepositoryError::revision_mismatch(
                expected,
                stored.revision(),
            ));
        }
        Ok(())
    }

    fn check_not_seated(&self, passenger: &NewRidePassenger) -> Result<(), RideRepositoryError> {
        let seated = self
            .records(passenger.ride_id())
            .iter()
            .any(|existing| {
                existing.passenger_id() == passenger.passenger_id() && existing.is_active()
            });
        if seated {
            return Err(RideRepositoryError::duplicate_passenger(
                passenger.ride_id(),
                passenger.passenger_id().to_string(),
            ));
        }
        Ok(())
    }

    fn insert_passenger(&mut self, passenger: &NewRidePassenger) -> RidePassenger {
        self.last_passenger_id += 1;
        let stored = passenger
            .clone()
            .into_passenger(RidePassengerId::new(self.last_passenger_id));
        self.passengers
            .entry(stored.ride_id())
            .or_default()
            .push(stored.clone());
        stored
    }
}

/// [`RideRepository`] backed by process memory.
///
/// Every operation holds a single lock for its whole duration, so
/// [`RideRepository::save_join`] is atomic with respect to all other calls.
/// Identifiers are assigned sequentially from 1.
#[derive(Debug, Default)]
pub struct InMemoryRideRepository {
    state: Mutex<StoreState>,
}

impl InMemoryRideRepository {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> Result<MutexGuard<'_, StoreState>, RideRepositoryError> {
        self.state
            .lock()
            .map_err(|_| RideRepositoryError::connection("in-memory ride store lock poisoned"))
    }
}

#[async_trait]
impl RideRepository for InMemoryRideRepository {
    async fn create_ride(&self, ride: &NewRide) -> Result<Ride, RideRepositoryError> {
        let mut state = self.lock()?;
        state.last_ride_id += 1;
        let stored = ride.clone().into_ride(RideId::new(state.last_ride_id));
        state.rides.insert(stored.id(), stored.clone());
        Ok(stored)
    }

    async fn get_ride_by_id(&self, ride_id: RideId) -> Result<Option<Ride>, RideRepositoryError> {
        Ok(self.lock()?.rides.get(&ride_id).cloned())
    }

    async fn save_ride(
        &self,
        ride: &Ride,
        expected_revision: u32,
    ) -> Result<Ride, RideRepositoryError> {
        let mut state = self.lock()?;
        state.check_revision(ride, expected_revision)?;
        state.rides.insert(ride.id(), ride.clone());
        Ok(ride.clone())
    }

    async fn list_rides(&self, filter: &RideFilter) -> Result<Vec<Ride>, RideRepositoryError> {
        Ok(self
            .lock()?
            .rides
            .values()
            .filter(|ride| filter.matches(ride))
            .cloned()
            .collect())
    }

    async fn add_passenger(
        &self,
        passenger: &NewRidePassenger,
    ) -> Result<RidePassenger, RideRepositoryError> {
        let mut state = self.lock()?;
        if !state.rides.contains_key(&passenger.ride_id()) {
            return Err(RideRepositoryError::not_found(passenger.ride_id()));
        }
        state.check_not_seated(passenger)?;
        Ok(state.insert_passenger(passenger))
    }

    async fn get_passenger(
        &self,
        ride_id: RideId,
        passenger_id: &UserId,
    ) -> Result<Option<RidePassenger>, RideRepositoryError> {
        let state = self.lock()?;
        let records = state
            .records(ride_id)
            .iter()
            .filter(|record| record.passenger_id() == passenger_id);
        let mut latest = None;
        for record in records {
            if record.is_active() {
                return Ok(Some(record.clone()));
            }
            latest = Some(record);
        }
        Ok(latest.cloned())
    }

    async fn list_passengers(
        &self,
        ride_id: RideId,
    ) -> Result<Vec<RidePassenger>, RideRepositoryError> {
        Ok(self.lock()?.records(ride_id).to_vec())
    }

    async fn save_join(
        &self,
        ride: &Ride,
        expected_revision: u32,
        passenger: &NewRidePassenger,
    ) -> Result<(Ride, RidePassenger), RideRepositoryError> {
        let mut state = self.lock()?;
        state.check_revision(ride, expected_revision)?;
        state.check_not_seated(passenger)?;
        state.rides.insert(ride.id(), ride.clone());
        let stored = state.insert_passenger(passenger);
        Ok((ride.clone(), stored))
    }
}
