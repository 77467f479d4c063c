//! OpenAPI schema definitions for domain types.
//!
//! Domain types stay framework agnostic by not deriving `ToSchema`; the
//! wrappers here mirror their wire shape and are registered with utoipa
//! under the domain type's name.

use utoipa::ToSchema;

/// OpenAPI schema for [`crate::domain::ErrorCode`].
///
/// Stable machine-readable error codes returned in API error responses.
#[derive(ToSchema)]
#[schema(as = crate::domain::ErrorCode)]
pub enum ErrorCodeSchema {
    /// The request is malformed or fails validation.
    #[schema(rename = "invalid_request")]
    InvalidRequest,
    /// Authentication failed or is missing.
    #[schema(rename = "unauthorized")]
    Unauthorized,
    /// Authenticated but not permitted to perform this action.
    #[schema(rename = "forbidden")]
    Forbidden,
    /// The requested resource does not exist.
    #[schema(rename = "not_found")]
    NotFound,
    /// The request clashed with the current state of the ride.
    #[schema(rename = "conflict")]
    Conflict,
    /// The ride store could not be reached.
    #[schema(rename = "service_unavailable")]
    ServiceUnavailable,
    /// An unexpected error occurred on the server.
    #[schema(rename = "internal_error")]
    InternalError,
}

/// OpenAPI schema for [`crate::domain::Error`].
///
/// API error response payload with machine-readable code and human-readable
/// message.
#[derive(ToSchema)]
#[schema(as = crate::domain::Error, rename_all = "camelCase")]
#[expect(
    dead_code,
    reason = "Used only for OpenAPI schema generation via utoipa"
)]
pub struct ErrorSchema {
    /// Stable machine-readable error code.
    #[schema(example = "invalid_request")]
    code: ErrorCodeSchema,
    /// Human-readable message returned to clients.
    #[schema(example = "ride 42 cannot be joined: no seats available")]
    message: String,
    /// Correlation identifier echoed in the `trace-id` response header.
    #[schema(example = "8a1d3b1e-5c2f-4f0a-9d7e-2b6c4e8f1a30")]
    trace_id: Option<String>,
    /// Supplementary details, e.g. `{"code": "ride_not_joinable", "rideId": 42}`.
    details: Option<serde_json::Value>,
}
