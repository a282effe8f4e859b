//! OpenAPI documentation for the booking REST API.
//!
//! [`ApiDoc`] collects every handler under `inbound::http` together with the
//! domain schemas they exchange. Swagger UI serves it in debug builds.

use utoipa::openapi::security::{ApiKey, ApiKeyValue, SecurityScheme};
use utoipa::{Modify, OpenApi};

use crate::domain::ports::{
    AuditIndexesResponse, CheckAvailabilityResponse, CommitReservationResponse,
    GetBookingResponse, ListBookingsResponse, RelocateReservationResponse,
    RemoveEntityReservationsResponse,
};
use crate::domain::{
    Caller, ConflictReport, EntityKind, Error, ErrorCode, IndexAuditReport, IndexEntry,
    ReservationDraft, ReservationRecord,
};
use crate::inbound::http::auth::{LoginRequest, LoginResponse};

/// Adds the session cookie security scheme.
struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        let components = openapi
            .components
            .get_or_insert_with(utoipa::openapi::Components::default);

        components.add_security_scheme(
            "SessionCookie",
            SecurityScheme::ApiKey(ApiKey::Cookie(ApiKeyValue::with_description(
                "session",
                "Session cookie issued by POST /api/v1/login; absent means customer.",
            ))),
        );
    }
}

/// OpenAPI document for the booking API.
#[derive(OpenApi)]
#[openapi(
    modifiers(&SecurityAddon),
    info(
        title = "Hall and singer booking API",
        description = "Date availability, reservations and index audits for wedding halls and singers."
    ),
    servers(
        (url = "/", description = "Relative to the deployment base URL")
    ),
    paths(
        crate::inbound::http::auth::login,
        crate::inbound::http::auth::logout,
        crate::inbound::http::bookings::check_availability,
        crate::inbound::http::bookings::commit_reservation,
        crate::inbound::http::bookings::get_booking,
        crate::inbound::http::bookings::relocate_reservation,
        crate::inbound::http::bookings::cancel_reservation,
        crate::inbound::http::bookings::remove_entity_reservations,
        crate::inbound::http::bookings::list_bookings,
        crate::inbound::http::bookings::audit_indexes,
        crate::inbound::http::health::ready,
        crate::inbound::http::health::live,
    ),
    components(schemas(
        Error,
        ErrorCode,
        Caller,
        EntityKind,
        ConflictReport,
        ReservationDraft,
        ReservationRecord,
        IndexEntry,
        IndexAuditReport,
        LoginRequest,
        LoginResponse,
        CheckAvailabilityResponse,
        CommitReservationResponse,
        GetBookingResponse,
        RelocateReservationResponse,
        RemoveEntityReservationsResponse,
        ListBookingsResponse,
        AuditIndexesResponse,
    )),
    tags(
        (name = "auth", description = "Administrator sessions"),
        (name = "bookings", description = "Availability checks and reservations"),
        (name = "health", description = "Endpoints for health checks")
    )
)]
pub struct ApiDoc;

#[cfg(test)]
mod tests {
    use rstest::rstest;
    use utoipa::openapi::RefOr;
    use utoipa::openapi::schema::Schema;

    use super::*;

    fn assert_object_schema_has_field(schema: &RefOr<Schema>, field: &str) {
        match schema {
            RefOr::T(Schema::Object(obj)) => {
                assert!(
                    obj.properties.contains_key(field),
                    "schema should have field '{field}'"
                );
            }
            _ => panic!("expected Object schema"),
        }
    }

    #[rstest]
    #[case::error("Error", "code")]
    #[case::draft("ReservationDraft", "customerPhone")]
    #[case::audit("IndexAuditReport", "entityIndexOnly")]
    fn schemas_expose_camel_case_fields(#[case] name: &str, #[case] field: &str) {
        let doc = ApiDoc::openapi();
        let schemas = &doc.components.as_ref().expect("components").schemas;
        let schema = schemas.get(name).expect("schema registered");

        assert_object_schema_has_field(schema, field);
    }

    #[rstest]
    #[case("/api/v1/{kind}/{entity}/availability")]
    #[case("/api/v1/{kind}/{entity}/bookings/{date}")]
    #[case("/api/v1/{kind}/bookings/audit")]
    fn booking_paths_are_documented(#[case] path: &str) {
        let doc = ApiDoc::openapi();
        assert!(doc.paths.paths.contains_key(path), "missing {path}");
    }
}
