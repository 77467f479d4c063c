//! Concurrent seat allocation against the in-memory ride store.
//!
//! Runs on the multi-threaded runtime so joins genuinely race.

use std::sync::Arc;

use futures::future::join_all;
use mockable::DefaultClock;
use ride_service::domain::ports::{
    CreateRideRequest, JoinRideRequest, RideCommand, RideQuery,
};
use ride_service::domain::{
    Ride, RideCommandService, RideError, RideId, RideQueryService, RideStatus, UserId,
};
use ride_service::outbound::memory::InMemoryRideRepository;
use rstest::rstest;

fn user(id: &str) -> UserId {
    UserId::new(id).expect("valid user id")
}

async fn publish(command: &dyn RideCommand, seats_total: u32) -> Ride {
    command
        .create_ride(CreateRideRequest {
            driver_id: user("driver-1"),
            origin: "Main Campus".to_owned(),
            destination: "Central Station".to_owned(),
            departure_time: chrono::Utc::now() + chrono::Duration::hours(2),
            seats_total,
        })
        .await
        .expect("ride published")
}

async fn race(
    commands: &[Arc<dyn RideCommand>],
    ride_id: RideId,
    students: usize,
) -> Vec<Result<Ride, RideError>> {
    let joins = (0..students).map(|index| {
        let command = Arc::clone(&commands[index % commands.len()]);
        tokio::spawn(async move {
            command
                .join_ride(JoinRideRequest {
                    ride_id,
                    passenger_id: user(&format!("student-{index}")),
                })
                .await
        })
    });
    join_all(joins)
        .await
        .into_iter()
        .map(|joined| joined.expect("join task completes"))
        .collect()
}

fn assert_losers_were_refused(results: &[Result<Ride, RideError>]) {
    for result in results.iter().filter(|result| result.is_err()) {
        assert!(
            matches!(
                result,
                Err(RideError::RideNotJoinable { .. } | RideError::ConcurrencyConflict { .. })
            ),
            "unexpected failure: {result:?}"
        );
    }
}

#[rstest]
#[case(3, 12)]
#[case(1, 8)]
#[case(5, 5)]
#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn one_service_never_oversells(#[case] seats: u32, #[case] students: usize) {
    let repository = Arc::new(InMemoryRideRepository::new());
    let command: Arc<dyn RideCommand> =
        Arc::new(RideCommandService::new(repository.clone(), Arc::new(DefaultClock)));
    let query = RideQueryService::new(repository);
    let ride = publish(command.as_ref(), seats).await;

    let results = race(&[command], ride.id(), students).await;

    let winners = results.iter().filter(|result| result.is_ok()).count();
    assert_eq!(winners, students.min(seats as usize));
    assert_losers_were_refused(&results);

    let stored = query.get_ride(ride.id()).await.expect("ride readable");
    assert_eq!(stored.seats_available(), seats - winners as u32);
    if stored.seats_available() == 0 {
        assert_eq!(stored.status(), RideStatus::Full);
    }
    let passengers = query.list_passengers(ride.id()).await.expect("passengers");
    assert_eq!(passengers.len(), winners);
}

/// Separate services keep separate lock registries, so only the revision
/// check stands between them and an oversold ride.
#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn independent_services_rely_on_revision_checks() {
    let repository = Arc::new(InMemoryRideRepository::new());
    let commands: Vec<Arc<dyn RideCommand>> = (0..3)
        .map(|_| {
            Arc::new(
                RideCommandService::new(repository.clone(), Arc::new(DefaultClock))
                    .with_max_attempts(10),
            ) as Arc<dyn RideCommand>
        })
        .collect();
    let query = RideQueryService::new(repository);
    let ride = publish(commands[0].as_ref(), 2).await;

    let results = race(&commands, ride.id(), 9).await;

    let winners = results.iter().filter(|result| result.is_ok()).count();
    assert!(winners <= 2, "oversold: {winners} winners");
    assert_losers_were_refused(&results);

    let stored = query.get_ride(ride.id()).await.expect("ride readable");
    assert_eq!(stored.seats_available(), 2 - winners as u32);
    let passengers = query.list_passengers(ride.id()).await.expect("passengers");
    assert_eq!(passengers.len(), winners);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn repeated_joins_by_one_student_take_one_seat() {
    let repository = Arc::new(InMemoryRideRepository::new());
    let command: Arc<dyn RideCommand> =
        Arc::new(RideCommandService::new(repository.clone(), Arc::new(DefaultClock)));
    let ride = publish(command.as_ref(), 3).await;

    let joins = (0..6).map(|_| {
        let command = Arc::clone(&command);
        let ride_id = ride.id();
        tokio::spawn(async move {
            command
                .join_ride(JoinRideRequest {
                    ride_id,
                    passenger_id: user("student-1"),
                })
                .await
        })
    });
    let results: Vec<_> = join_all(joins)
        .await
        .into_iter()
        .map(|joined| joined.expect("join task completes"))
        .collect();

    assert_eq!(results.iter().filter(|result| result.is_ok()).count(), 1);
    assert!(
        results
            .iter()
            .filter_map(|result| result.as_ref().err())
            .all(|error| matches!(error, RideError::DuplicateJoin { .. }))
    );
    let stored = RideQueryService::new(repository)
        .get_ride(ride.id())
        .await
        .expect("ride readable");
    assert_eq!(stored.seats_available(), 2);
}
