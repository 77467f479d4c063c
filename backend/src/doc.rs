//! OpenAPI documentation configuration.
//!
//! [`ApiDoc`] registers the ride and health endpoints, the error schema
//! wrappers from [`crate::inbound::http::schemas`], and the bearer token
//! security scheme. The document backs Swagger UI in debug builds and is
//! exported with `cargo run --bin openapi-dump`.

use crate::inbound::http::rides::{
    CreateRideRequestBody, ListPassengersBody, ListRidesBody, PassengerBody, RideBody,
};
use crate::inbound::http::schemas::{ErrorCodeSchema, ErrorSchema};
use utoipa::openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme};
use utoipa::{Modify, OpenApi};

/// Enrich the generated document with the bearer JWT security scheme.
struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        let components = openapi
            .components
            .get_or_insert_with(utoipa::openapi::Components::default);

        components.add_security_scheme(
            "BearerAuth",
            SecurityScheme::Http(
                HttpBuilder::new()
                    .scheme(HttpAuthScheme::Bearer)
                    .bearer_format("JWT")
                    .description(Some(
                        "Access token from the identity provider; `roles` carries DRIVER or STUDENT.",
                    ))
                    .build(),
            ),
        );
    }
}

/// OpenAPI document for the REST API.
#[derive(OpenApi)]
#[openapi(
    modifiers(&SecurityAddon),
    info(
        title = "Ride service API",
        description = "Publish shared rides, take seats and close trips.",
        license(
            name = "Apache-2.0",
            url = "https://www.apache.org/licenses/LICENSE-2.0.html"
        )
    ),
    servers(
        (url = "/", description = "Relative to the deployment base URL")
    ),
    security(("BearerAuth" = [])),
    paths(
        crate::inbound::http::rides::create_ride,
        crate::inbound::http::rides::list_rides,
        crate::inbound::http::rides::get_ride,
        crate::inbound::http::rides::join_ride,
        crate::inbound::http::rides::complete_ride,
        crate::inbound::http::rides::list_passengers,
        crate::inbound::http::health::ready,
        crate::inbound::http::health::live,
    ),
    components(schemas(
        CreateRideRequestBody,
        RideBody,
        ListRidesBody,
        PassengerBody,
        ListPassengersBody,
        ErrorSchema,
        ErrorCodeSchema
    )),
    tags(
        (name = "rides", description = "Ride publication and seat allocation"),
        (name = "health", description = "Endpoints for health checks")
    )
)]
pub struct ApiDoc;

#[cfg(test)]
mod tests {
    use rstest::rstest;
    use utoipa::OpenApi;
    use utoipa::openapi::RefOr;
    use utoipa::openapi::schema::Schema;
    use utoipa::openapi::security::SecurityScheme;

    use super::*;

    fn object_fields(schema: &RefOr<Schema>) -> Vec<&str> {
        match schema {
            RefOr::T(Schema::Object(obj)) => obj.properties.keys().map(String::as_str).collect(),
            _ => Vec::new(),
        }
    }

    #[rstest]
    fn ride_body_uses_camel_case_fields() {
        let doc = ApiDoc::openapi();
        let schemas = &doc.components.as_ref().expect("components").schemas;
        let fields = object_fields(schemas.get("RideBody").expect("RideBody schema"));

        for field in ["id", "driverId", "seatsTotal", "seatsAvailable", "departureTime"] {
            assert!(fields.contains(&field), "RideBody should expose {field}");
        }
    }

    #[rstest]
    #[case("/api/v1/rides")]
    #[case("/api/v1/rides/{rideId}")]
    #[case("/api/v1/rides/{rideId}/join")]
    #[case("/api/v1/rides/{rideId}/complete")]
    #[case("/api/v1/rides/{rideId}/passengers")]
    #[case("/health/ready")]
    #[case("/health/live")]
    fn paths_are_documented(#[case] path: &str) {
        assert!(ApiDoc::openapi().paths.paths.contains_key(path));
    }

    #[rstest]
    fn bearer_scheme_is_registered() {
        let doc = ApiDoc::openapi();
        let scheme = doc
            .components
            .as_ref()
            .and_then(|components| components.security_schemes.get("BearerAuth"))
            .expect("bearer scheme");
        assert!(matches!(scheme, SecurityScheme::Http(_)));
    }
}
