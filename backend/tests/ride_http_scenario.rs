//! End-to-end ride lifecycle over HTTP.
//!
//! A driver publishes a two-seat ride, two students fill it, a third is
//! turned away, and the driver completes the trip.

mod support;

use actix_web::http::StatusCode;
use actix_web::http::header::AUTHORIZATION;
use actix_web::test as actix_test;
use rstest::rstest;
use serde_json::{Value, json};
use uuid::Uuid;

use ride_service::domain::TRACE_ID_HEADER;
use support::{bearer, ride_app};

const DRIVER: &[&str] = &["DRIVER"];
const STUDENT: &[&str] = &["STUDENT"];

async fn body_of(response: actix_web::dev::ServiceResponse) -> Value {
    let bytes = actix_test::read_body(response).await;
    if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).expect("JSON body")
    }
}

fn new_ride(seats: u32) -> Value {
    json!({
        "origin": "Main Campus",
        "destination": "Central Station",
        "departureTime": "2030-09-01T07:45:00Z",
        "seatsTotal": seats,
    })
}

#[actix_web::test]
async fn ride_fills_up_and_completes() {
    let app = actix_test::init_service(ride_app()).await;

    let created = actix_test::call_service(
        &app,
        actix_test::TestRequest::post()
            .uri("/api/v1/rides")
            .insert_header((AUTHORIZATION, bearer("driver-1", DRIVER)))
            .set_json(new_ride(2))
            .to_request(),
    )
    .await;
    assert_eq!(created.status(), StatusCode::CREATED);
    let ride = body_of(created).await;
    assert_eq!(ride["status"], "OPEN");
    assert_eq!(ride["seatsAvailable"], 2);
    assert_eq!(ride["driverId"], "driver-1");
    let ride_id = ride["id"].as_i64().expect("numeric ride id");

    for (student, seats_left, status) in [("student-a", 1, "OPEN"), ("student-b", 0, "FULL")] {
        let joined = actix_test::call_service(
            &app,
            actix_test::TestRequest::post()
                .uri(&format!("/api/v1/rides/{ride_id}/join"))
                .insert_header((AUTHORIZATION, bearer(student, STUDENT)))
                .to_request(),
        )
        .await;
        assert_eq!(joined.status(), StatusCode::OK, "{student} should get a seat");
        let ride = body_of(joined).await;
        assert_eq!(ride["seatsAvailable"], seats_left);
        assert_eq!(ride["status"], status);
    }

    let refused = actix_test::call_service(
        &app,
        actix_test::TestRequest::post()
            .uri(&format!("/api/v1/rides/{ride_id}/join"))
            .insert_header((AUTHORIZATION, bearer("student-c", STUDENT)))
            .to_request(),
    )
    .await;
    assert_eq!(refused.status(), StatusCode::BAD_REQUEST);
    let error = body_of(refused).await;
    assert_eq!(error["code"], "invalid_request");
    assert_eq!(error["details"]["code"], "ride_not_joinable");
    assert_eq!(error["details"]["rideId"], ride_id);

    let passengers = actix_test::call_service(
        &app,
        actix_test::TestRequest::get()
            .uri(&format!("/api/v1/rides/{ride_id}/passengers"))
            .insert_header((AUTHORIZATION, bearer("driver-1", DRIVER)))
            .to_request(),
    )
    .await;
    assert_eq!(passengers.status(), StatusCode::OK);
    let listed = body_of(passengers).await;
    let seated: Vec<&str> = listed["passengers"]
        .as_array()
        .expect("passenger array")
        .iter()
        .filter_map(|passenger| passenger["passengerId"].as_str())
        .collect();
    assert_eq!(seated, ["student-a", "student-b"]);

    let completed = actix_test::call_service(
        &app,
        actix_test::TestRequest::post()
            .uri(&format!("/api/v1/rides/{ride_id}/complete"))
            .insert_header((AUTHORIZATION, bearer("driver-1", DRIVER)))
            .to_request(),
    )
    .await;
    assert_eq!(completed.status(), StatusCode::NO_CONTENT);

    let fetched = actix_test::call_service(
        &app,
        actix_test::TestRequest::get()
            .uri(&format!("/api/v1/rides/{ride_id}"))
            .insert_header((AUTHORIZATION, bearer("student-c", STUDENT)))
            .to_request(),
    )
    .await;
    assert_eq!(fetched.status(), StatusCode::OK);
    let ride = body_of(fetched).await;
    assert_eq!(ride["status"], "COMPLETED");
    assert_eq!(ride["seatsAvailable"], 0);

    let completed_again = actix_test::call_service(
        &app,
        actix_test::TestRequest::post()
            .uri(&format!("/api/v1/rides/{ride_id}/complete"))
            .insert_header((AUTHORIZATION, bearer("driver-1", DRIVER)))
            .to_request(),
    )
    .await;
    assert_eq!(completed_again.status(), StatusCode::CONFLICT);
}

#[rstest]
#[case::no_token(None, StatusCode::UNAUTHORIZED)]
#[case::student_cannot_publish(Some(STUDENT), StatusCode::FORBIDDEN)]
#[case::driver_publishes(Some(DRIVER), StatusCode::CREATED)]
#[actix_web::test]
async fn publishing_requires_driver_role(
    #[case] roles: Option<&[&str]>,
    #[case] expected: StatusCode,
) {
    let app = actix_test::init_service(ride_app()).await;
    let mut request = actix_test::TestRequest::post()
        .uri("/api/v1/rides")
        .set_json(new_ride(3));
    if let Some(roles) = roles {
        request = request.insert_header((AUTHORIZATION, bearer("caller-1", roles)));
    }

    let response = actix_test::call_service(&app, request.to_request()).await;

    assert_eq!(response.status(), expected);
}

#[actix_web::test]
async fn responses_carry_a_trace_id() {
    let app = actix_test::init_service(ride_app()).await;

    let response = actix_test::call_service(
        &app,
        actix_test::TestRequest::get()
            .uri("/api/v1/rides/999")
            .insert_header((AUTHORIZATION, bearer("student-a", STUDENT)))
            .to_request(),
    )
    .await;

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    let header = response
        .headers()
        .get(TRACE_ID_HEADER)
        .and_then(|value| value.to_str().ok())
        .map(str::to_owned)
        .expect("trace-id header");
    assert!(Uuid::parse_str(&header).is_ok());
    let error = body_of(response).await;
    assert_eq!(error["code"], "not_found");
    assert_eq!(error["traceId"], header.as_str());
}

#[actix_web::test]
async fn listing_filters_by_status() {
    let app = actix_test::init_service(ride_app()).await;
    for _ in 0..2 {
        let created = actix_test::call_service(
            &app,
            actix_test::TestRequest::post()
                .uri("/api/v1/rides")
                .insert_header((AUTHORIZATION, bearer("driver-1", DRIVER)))
                .set_json(new_ride(1))
                .to_request(),
        )
        .await;
        assert_eq!(created.status(), StatusCode::CREATED);
    }
    let joined = actix_test::call_service(
        &app,
        actix_test::TestRequest::post()
            .uri("/api/v1/rides/1/join")
            .insert_header((AUTHORIZATION, bearer("student-a", STUDENT)))
            .to_request(),
    )
    .await;
    assert_eq!(joined.status(), StatusCode::OK);

    let listed = actix_test::call_service(
        &app,
        actix_test::TestRequest::get()
            .uri("/api/v1/rides?status=OPEN")
            .insert_header((AUTHORIZATION, bearer("student-b", STUDENT)))
            .to_request(),
    )
    .await;

    assert_eq!(listed.status(), StatusCode::OK);
    let body = body_of(listed).await;
    let ids: Vec<i64> = body["rides"]
        .as_array()
        .expect("ride array")
        .iter()
        .filter_map(|ride| ride["id"].as_i64())
        .collect();
    assert_eq!(ids, [2]);
}
