//! Ride HTTP handlers.
//!
//! ```text
//! POST /api/v1/rides
//! GET  /api/v1/rides?origin=&destination=&status=
//! GET  /api/v1/rides/{rideId}
//! POST /api/v1/rides/{rideId}/join
//! POST /api/v1/rides/{rideId}/complete
//! GET  /api/v1/rides/{rideId}/passengers
//! ```
//!
//! Role checks happen here; the use cases behind [`HttpState`] never see
//! roles.

use actix_web::{HttpResponse, get, post, web};
use serde::{Deserialize, Serialize};
use tracing::info;
use utoipa::{IntoParams, ToSchema};

use crate::domain::ports::{
    CompleteRideRequest, CreateRideRequest, JoinRideRequest, ListRidesRequest,
};
use crate::domain::{Error, Ride, RideId, RidePassenger, Role};
use crate::inbound::http::ApiResult;
use crate::inbound::http::auth::Authenticated;
use crate::inbound::http::schemas::ErrorSchema;
use crate::inbound::http::state::HttpState;
use crate::inbound::http::validation::{
    FieldName, parse_optional_status, parse_rfc3339_timestamp,
    require_positive_count, require_text,
};

/// Request payload for publishing a ride.
///
/// Fields are optional at the serde level so missing values produce
/// field-level validation errors instead of a generic parse failure.
#[derive(Debug, Default, Deserialize, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateRideRequestBody {
    #[schema(example = "Main Campus")]
    pub origin: Option<String>,
    #[schema(example = "Central Station")]
    pub destination: Option<String>,
    #[schema(format = "date-time", example = "2026-05-04T17:30:00Z")]
    pub departure_time: Option<String>,
    #[schema(minimum = 1, example = 3)]
    pub seats_total: Option<i64>,
}

/// Ride representation returned by every ride endpoint.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct RideBody {
    pub id: i64,
    pub driver_id: String,
    pub origin: String,
    pub destination: String,
    #[schema(format = "date-time")]
    pub departure_time: String,
    pub seats_total: u32,
    pub seats_available: u32,
    #[schema(example = "OPEN")]
    pub status: String,
    #[schema(format = "date-time")]
    pub created_at: String,
    #[schema(format = "date-time")]
    pub updated_at: String,
}

impl From<&Ride> for RideBody {
    fn from(ride: &Ride) -> Self {
        Self {
            id: ride.id().as_i64(),
            driver_id: ride.driver_id().to_string(),
            origin: ride.origin().to_owned(),
            destination: ride.destination().to_owned(),
            departure_time: ride.departure_time().to_rfc3339(),
            seats_total: ride.seats_total(),
            seats_available: ride.seats_available(),
            status: ride.status().as_str().to_owned(),
            created_at: ride.created_at().to_rfc3339(),
            updated_at: ride.updated_at().to_rfc3339(),
        }
    }
}

/// Listing envelope.
#[derive(Debug, Clone, Deserialize, Serialize, ToSchema)]
pub struct ListRidesBody {
    pub rides: Vec<RideBody>,
}

/// Passenger record representation.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct PassengerBody {
    pub id: i64,
    pub ride_id: i64,
    pub passenger_id: String,
    #[schema(example = "JOINED")]
    pub status: String,
    #[schema(format = "date-time")]
    pub joined_at: String,
    #[schema(format = "date-time")]
    pub left_at: Option<String>,
}

impl From<&RidePassenger> for PassengerBody {
    fn from(passenger: &RidePassenger) -> Self {
        Self {
            id: passenger.id().as_i64(),
            ride_id: passenger.ride_id().as_i64(),
            passenger_id: passenger.passenger_id().to_string(),
            status: passenger.status().as_str().to_owned(),
            joined_at: passenger.joined_at().to_rfc3339(),
            left_at: passenger.left_at().map(|at| at.to_rfc3339()),
        }
    }
}

/// Passenger listing envelope.
#[derive(Debug, Clone, Deserialize, Serialize, ToSchema)]
pub struct ListPassengersBody {
    pub passengers: Vec<PassengerBody>,
}

/// Listing filters; blank values are ignored.
#[derive(Debug, Default, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct ListRidesQuery {
    /// Exact origin match.
    pub origin: Option<String>,
    /// Exact destination match.
    pub destination: Option<String>,
    /// One of OPEN, FULL, COMPLETED, CANCELLED.
    #[serde(alias = "status_filter")]
    pub status: Option<String>,
}

fn parse_create_ride(
    body: CreateRideRequestBody,
    caller: &Authenticated,
) -> Result<CreateRideRequest, Error> {
    Ok(CreateRideRequest {
        driver_id: caller.identity().user_id().clone(),
        origin: require_text(body.origin, FieldName::new("origin"))?,
        destination: require_text(body.destination, FieldName::new("destination"))?,
        departure_time: parse_rfc3339_timestamp(
            body.departure_time,
            FieldName::new("departureTime"),
        )?,
        seats_total: require_positive_count(body.seats_total, FieldName::new("seatsTotal"))?,
    })
}

fn parse_list_query(query: ListRidesQuery) -> Result<ListRidesRequest, Error> {
    Ok(ListRidesRequest {
        origin: query.origin,
        destination: query.destination,
        status: parse_optional_status(query.status, FieldName::new("status"))?,
    })
}

/// Publish a ride. Drivers only.
#[utoipa::path(
    post,
    path = "/api/v1/rides",
    request_body = CreateRideRequestBody,
    responses(
        (status = 201, description = "Ride published", body = RideBody),
        (status = 400, description = "Invalid request", body = ErrorSchema),
        (status = 401, description = "Unauthorized", body = ErrorSchema),
        (status = 403, description = "Caller is not a driver", body = ErrorSchema),
        (status = 503, description = "Service unavailable", body = ErrorSchema)
    ),
    tags = ["rides"],
    operation_id = "createRide",
    security(("BearerAuth" = []))
)]
#[post("/rides")]
pub async fn create_ride(
    state: web::Data<HttpState>,
    caller: Authenticated,
    payload: web::Json<CreateRideRequestBody>,
) -> ApiResult<HttpResponse> {
    caller.require_role(&Role::Driver)?;
    let request = parse_create_ride(payload.into_inner(), &caller)?;

    let ride = state.rides.create_ride(request).await?;

    Ok(HttpResponse::Created().json(RideBody::from(&ride)))
}

/// List rides matching every supplied filter.
#[utoipa::path(
    get,
    path = "/api/v1/rides",
    params(ListRidesQuery),
    responses(
        (status = 200, description = "Matching rides", body = ListRidesBody),
        (status = 400, description = "Invalid filter", body = ErrorSchema),
        (status = 401, description = "Unauthorized", body = ErrorSchema),
        (status = 503, description = "Service unavailable", body = ErrorSchema)
    ),
    tags = ["rides"],
    operation_id = "listRides",
    security(("BearerAuth" = []))
)]
#[get("/rides")]
pub async fn list_rides(
    state: web::Data<HttpState>,
    _caller: Authenticated,
    query: web::Query<ListRidesQuery>,
) -> ApiResult<web::Json<ListRidesBody>> {
    let request = parse_list_query(query.into_inner())?;

    let rides = state.rides_query.list_rides(request).await?;

    Ok(web::Json(ListRidesBody {
        rides: rides.iter().map(RideBody::from).collect(),
    }))
}

/// Fetch one ride.
#[utoipa::path(
    get,
    path = "/api/v1/rides/{rideId}",
    params(("rideId" = i64, Path, description = "Ride identifier")),
    responses(
        (status = 200, description = "Ride", body = RideBody),
        (status = 401, description = "Unauthorized", body = ErrorSchema),
        (status = 404, description = "Ride not found", body = ErrorSchema),
        (status = 503, description = "Service unavailable", body = ErrorSchema)
    ),
    tags = ["rides"],
    operation_id = "getRide",
    security(("BearerAuth" = []))
)]
#[get("/rides/{ride_id}")]
pub async fn get_ride(
    state: web::Data<HttpState>,
    _caller: Authenticated,
    path: web::Path<i64>,
) -> ApiResult<web::Json<RideBody>> {
    let ride_id = RideId::new(path.into_inner());

    let ride = state.rides_query.get_ride(ride_id).await?;

    Ok(web::Json(RideBody::from(&ride)))
}

/// Take a seat on a ride. Students only.
#[utoipa::path(
    post,
    path = "/api/v1/rides/{rideId}/join",
    params(("rideId" = i64, Path, description = "Ride identifier")),
    responses(
        (status = 200, description = "Seat taken; updated ride", body = RideBody),
        (status = 400, description = "Ride not joinable or already joined", body = ErrorSchema),
        (status = 401, description = "Unauthorized", body = ErrorSchema),
        (status = 403, description = "Caller is not a student", body = ErrorSchema),
        (status = 404, description = "Ride not found", body = ErrorSchema),
        (status = 409, description = "Too much contention; retry later", body = ErrorSchema),
        (status = 503, description = "Service unavailable", body = ErrorSchema)
    ),
    tags = ["rides"],
    operation_id = "joinRide",
    security(("BearerAuth" = []))
)]
#[post("/rides/{ride_id}/join")]
pub async fn join_ride(
    state: web::Data<HttpState>,
    caller: Authenticated,
    path: web::Path<i64>,
) -> ApiResult<web::Json<RideBody>> {
    let identity = caller.require_role(&Role::Student)?;
    let ride_id = RideId::new(path.into_inner());

    let ride = state
        .rides
        .join_ride(JoinRideRequest {
            ride_id,
            passenger_id: identity.user_id().clone(),
        })
        .await?;

    info!(ride_id = %ride_id, passenger_id = %identity.user_id(), "seat taken over HTTP");
    Ok(web::Json(RideBody::from(&ride)))
}

/// Close a ride. Drivers only.
#[utoipa::path(
    post,
    path = "/api/v1/rides/{rideId}/complete",
    params(("rideId" = i64, Path, description = "Ride identifier")),
    responses(
        (status = 204, description = "Ride completed"),
        (status = 401, description = "Unauthorized", body = ErrorSchema),
        (status = 403, description = "Caller is not a driver", body = ErrorSchema),
        (status = 404, description = "Ride not found", body = ErrorSchema),
        (status = 409, description = "Ride already terminal", body = ErrorSchema),
        (status = 503, description = "Service unavailable", body = ErrorSchema)
    ),
    tags = ["rides"],
    operation_id = "completeRide",
    security(("BearerAuth" = []))
)]
#[post("/rides/{ride_id}/complete")]
pub async fn complete_ride(
    state: web::Data<HttpState>,
    caller: Authenticated,
    path: web::Path<i64>,
) -> ApiResult<HttpResponse> {
    caller.require_role(&Role::Driver)?;
    let ride_id = RideId::new(path.into_inner());

    state
        .rides
        .complete_ride(CompleteRideRequest { ride_id })
        .await?;

    Ok(HttpResponse::NoContent().finish())
}

/// List the passenger records of a ride.
#[utoipa::path(
    get,
    path = "/api/v1/rides/{rideId}/passengers",
    params(("rideId" = i64, Path, description = "Ride identifier")),
    responses(
        (status = 200, description = "Passenger records", body = ListPassengersBody),
        (status = 401, description = "Unauthorized", body = ErrorSchema),
        (status = 404, description = "Ride not found", body = ErrorSchema),
        (status = 503, description = "Service unavailable", body = ErrorSchema)
    ),
    tags = ["rides"],
    operation_id = "listRidePassengers",
    security(("BearerAuth" = []))
)]
#[get("/rides/{ride_id}/passengers")]
pub async fn list_passengers(
    state: web::Data<HttpState>,
    _caller: Authenticated,
    path: web::Path<i64>,
) -> ApiResult<web::Json<ListPassengersBody>> {
    let ride_id = RideId::new(path.into_inner());

    let passengers = state.rides_query.list_passengers(ride_id).await?;

    Ok(web::Json(ListPassengersBody {
        passengers: passengers.iter().map(PassengerBody::from).collect(),
    }))
}

/// Register every ride handler on a service config, typically the
/// `/api/v1` scope.
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.service(create_ride)
        .service(list_rides)
        .service(get_ride)
        .service(join_ride)
        .service(complete_ride)
        .service(list_passengers);
}

#[cfg(test)]
#[path = "rides_tests.rs"]
mod tests;
