//! Booking HTTP handlers.
//!
//! ```text
//! GET    /api/v1/{kind}/{entity}/availability?date=15-06-2025
//! POST   /api/v1/{kind}/{entity}/bookings
//! GET    /api/v1/{kind}/{entity}/bookings/{date}
//! PUT    /api/v1/{kind}/{entity}/bookings/{date}
//! DELETE /api/v1/{kind}/{entity}/bookings/{date}
//! DELETE /api/v1/{kind}/{entity}/bookings
//! GET    /api/v1/{kind}/bookings?entity=&date=
//! GET    /api/v1/{kind}/bookings/audit
//! ```
//!
//! `{kind}` is `halls` or `singers`. The kind and entity in the path win
//! over any `entityType` or `entityName` in a request body.

use actix_web::{HttpResponse, delete, get, post, put, web};
use serde::Deserialize;
use serde_json::json;
use utoipa::IntoParams;

use crate::domain::ports::{
    AuditIndexesRequest, AuditIndexesResponse, CancelReservationRequest,
    CheckAvailabilityRequest, CheckAvailabilityResponse, CommitReservationRequest,
    CommitReservationResponse, GetBookingRequest, GetBookingResponse, ListBookingsRequest,
    ListBookingsResponse, RelocateReservationRequest, RelocateReservationResponse,
    RemoveEntityReservationsRequest, RemoveEntityReservationsResponse,
};
use crate::domain::{
    CanonicalDate, EntityKind, EntityName, Error, ReservationDraft, ReservationKey, normalize,
};
use crate::inbound::http::ApiResult;
use crate::inbound::http::session::SessionContext;
use crate::inbound::http::state::HttpState;

/// `/{kind}` path segment.
#[derive(Debug, Deserialize, IntoParams)]
#[into_params(parameter_in = Path)]
pub struct KindPath {
    /// `halls` or `singers`.
    pub kind: String,
}

/// `/{kind}/{entity}` path segments.
#[derive(Debug, Deserialize, IntoParams)]
#[into_params(parameter_in = Path)]
pub struct EntityPath {
    /// `halls` or `singers`.
    pub kind: String,
    /// Hall or singer name.
    pub entity: String,
}

/// `/{kind}/{entity}/bookings/{date}` path segments.
#[derive(Debug, Deserialize, IntoParams)]
#[into_params(parameter_in = Path)]
pub struct BookingPath {
    /// `halls` or `singers`.
    pub kind: String,
    /// Hall or singer name.
    pub entity: String,
    /// `YYYY-MM-DD` or `DD-MM-YYYY`.
    pub date: String,
}

/// Query string for availability checks.
#[derive(Debug, Deserialize, IntoParams)]
pub struct AvailabilityQuery {
    /// `YYYY-MM-DD` or `DD-MM-YYYY`.
    #[serde(default)]
    pub date: String,
}

/// Query string for booking listings.
#[derive(Debug, Default, Deserialize, IntoParams)]
pub struct ListQuery {
    /// Only bookings of this hall or singer.
    pub entity: Option<String>,
    /// Date or date fragment, in either accepted order.
    pub date: Option<String>,
}

fn parse_kind(raw: &str) -> Result<EntityKind, Error> {
    raw.parse::<EntityKind>().map_err(|err| {
        Error::invalid_request(err.to_string())
            .with_details(json!({ "field": "kind", "value": raw, "code": "unknown_entity_kind" }))
    })
}

fn parse_entity(raw: &str) -> Result<EntityName, Error> {
    EntityName::new(raw).map_err(|err| {
        Error::invalid_request(err.to_string())
            .with_details(json!({ "field": "entityName", "code": "invalid_entity_name" }))
    })
}

fn parse_date(raw: &str) -> Result<CanonicalDate, Error> {
    normalize(raw).into_canonical().ok_or_else(|| {
        Error::invalid_request(format!("'{raw}' is not a valid booking date"))
            .with_details(json!({ "field": "date", "value": raw, "code": "invalid_date" }))
    })
}

fn parse_key(path: &BookingPath) -> Result<ReservationKey, Error> {
    Ok(ReservationKey::new(
        parse_kind(&path.kind)?,
        parse_entity(&path.entity)?,
        parse_date(&path.date)?,
    ))
}

fn non_blank(value: Option<String>) -> Option<String> {
    value.filter(|value| !value.trim().is_empty())
}

/// Check whether a date is free for a hall or singer.
#[utoipa::path(
    get,
    path = "/api/v1/{kind}/{entity}/availability",
    params(EntityPath, AvailabilityQuery),
    responses(
        (status = 200, description = "Availability report", body = CheckAvailabilityResponse),
        (status = 400, description = "Invalid request", body = Error),
        (status = 503, description = "Store unavailable", body = Error)
    ),
    tags = ["bookings"],
    operation_id = "checkAvailability",
    security([])
)]
#[get("/{kind}/{entity}/availability")]
pub async fn check_availability(
    state: web::Data<HttpState>,
    path: web::Path<EntityPath>,
    query: web::Query<AvailabilityQuery>,
) -> ApiResult<web::Json<CheckAvailabilityResponse>> {
    let date = query.into_inner().date;
    if date.trim().is_empty() {
        return Err(Error::invalid_request("date is required")
            .with_details(json!({ "field": "date", "code": "missing_date" })));
    }
    let response = state
        .bookings_query
        .check_availability(CheckAvailabilityRequest {
            kind: parse_kind(&path.kind)?,
            entity: parse_entity(&path.entity)?,
            date,
        })
        .await?;
    Ok(web::Json(response))
}

/// Book a free date.
#[utoipa::path(
    post,
    path = "/api/v1/{kind}/{entity}/bookings",
    params(EntityPath),
    request_body = ReservationDraft,
    responses(
        (status = 201, description = "Booking committed", body = CommitReservationResponse),
        (status = 400, description = "Missing or invalid fields", body = Error),
        (status = 409, description = "Date already booked", body = Error),
        (status = 503, description = "Store unavailable", body = Error)
    ),
    tags = ["bookings"],
    operation_id = "commitReservation",
    security([])
)]
#[post("/{kind}/{entity}/bookings")]
pub async fn commit_reservation(
    state: web::Data<HttpState>,
    session: SessionContext,
    path: web::Path<EntityPath>,
    payload: web::Json<ReservationDraft>,
) -> ApiResult<HttpResponse> {
    let mut draft = payload.into_inner();
    draft.entity_type = parse_kind(&path.kind)?;
    draft.entity_name = path.entity.clone();
    let response = state
        .bookings
        .commit_reservation(CommitReservationRequest {
            caller: session.caller(),
            draft,
        })
        .await?;
    Ok(HttpResponse::Created().json(response))
}

/// Fetch one booking.
#[utoipa::path(
    get,
    path = "/api/v1/{kind}/{entity}/bookings/{date}",
    params(BookingPath),
    responses(
        (status = 200, description = "Booking", body = GetBookingResponse),
        (status = 403, description = "Administrators only", body = Error),
        (status = 404, description = "No booking on that date", body = Error)
    ),
    tags = ["bookings"],
    operation_id = "getBooking",
    security(("SessionCookie" = []))
)]
#[get("/{kind}/{entity}/bookings/{date}")]
pub async fn get_booking(
    state: web::Data<HttpState>,
    session: SessionContext,
    path: web::Path<BookingPath>,
) -> ApiResult<web::Json<GetBookingResponse>> {
    let response = state
        .bookings_query
        .get_booking(GetBookingRequest {
            caller: session.caller(),
            key: parse_key(&path)?,
        })
        .await?;
    Ok(web::Json(response))
}

/// Edit a booking in place or move it to another free date or entity.
///
/// Blank `entityName` or `date` in the body keep the current values.
#[utoipa::path(
    put,
    path = "/api/v1/{kind}/{entity}/bookings/{date}",
    params(BookingPath),
    request_body = ReservationDraft,
    responses(
        (status = 200, description = "Booking updated", body = RelocateReservationResponse),
        (status = 400, description = "Missing or invalid fields", body = Error),
        (status = 403, description = "Administrators only", body = Error),
        (status = 404, description = "No booking on that date", body = Error),
        (status = 409, description = "Destination already booked", body = Error)
    ),
    tags = ["bookings"],
    operation_id = "relocateReservation",
    security(("SessionCookie" = []))
)]
#[put("/{kind}/{entity}/bookings/{date}")]
pub async fn relocate_reservation(
    state: web::Data<HttpState>,
    session: SessionContext,
    path: web::Path<BookingPath>,
    payload: web::Json<ReservationDraft>,
) -> ApiResult<web::Json<RelocateReservationResponse>> {
    let from = parse_key(&path)?;
    let mut draft = payload.into_inner();
    draft.entity_type = from.kind();
    if draft.entity_name.trim().is_empty() {
        draft.entity_name = from.entity().to_string();
    }
    if draft.date.trim().is_empty() {
        draft.date = from.date().to_string();
    }
    let response = state
        .bookings
        .relocate_reservation(RelocateReservationRequest {
            caller: session.caller(),
            from,
            draft,
        })
        .await?;
    Ok(web::Json(response))
}

/// Cancel a booking.
#[utoipa::path(
    delete,
    path = "/api/v1/{kind}/{entity}/bookings/{date}",
    params(BookingPath),
    responses(
        (status = 204, description = "Booking cancelled"),
        (status = 403, description = "Administrators only", body = Error),
        (status = 404, description = "No booking on that date", body = Error)
    ),
    tags = ["bookings"],
    operation_id = "cancelReservation",
    security(("SessionCookie" = []))
)]
#[delete("/{kind}/{entity}/bookings/{date}")]
pub async fn cancel_reservation(
    state: web::Data<HttpState>,
    session: SessionContext,
    path: web::Path<BookingPath>,
) -> ApiResult<HttpResponse> {
    state
        .bookings
        .cancel_reservation(CancelReservationRequest {
            caller: session.caller(),
            key: parse_key(&path)?,
        })
        .await?;
    Ok(HttpResponse::NoContent().finish())
}

/// Remove every booking of a hall or singer being deleted.
#[utoipa::path(
    delete,
    path = "/api/v1/{kind}/{entity}/bookings",
    params(EntityPath),
    responses(
        (status = 200, description = "Bookings removed", body = RemoveEntityReservationsResponse),
        (status = 403, description = "Administrators only", body = Error)
    ),
    tags = ["bookings"],
    operation_id = "removeEntityReservations",
    security(("SessionCookie" = []))
)]
#[delete("/{kind}/{entity}/bookings")]
pub async fn remove_entity_reservations(
    state: web::Data<HttpState>,
    session: SessionContext,
    path: web::Path<EntityPath>,
) -> ApiResult<web::Json<RemoveEntityReservationsResponse>> {
    let response = state
        .bookings
        .remove_entity_reservations(RemoveEntityReservationsRequest {
            caller: session.caller(),
            kind: parse_kind(&path.kind)?,
            entity: parse_entity(&path.entity)?,
        })
        .await?;
    Ok(web::Json(response))
}

/// List bookings of one kind, optionally filtered by entity and date.
#[utoipa::path(
    get,
    path = "/api/v1/{kind}/bookings",
    params(KindPath, ListQuery),
    responses(
        (status = 200, description = "Bookings sorted by date then entity", body = ListBookingsResponse),
        (status = 403, description = "Administrators only", body = Error)
    ),
    tags = ["bookings"],
    operation_id = "listBookings",
    security(("SessionCookie" = []))
)]
#[get("/{kind}/bookings")]
pub async fn list_bookings(
    state: web::Data<HttpState>,
    session: SessionContext,
    path: web::Path<KindPath>,
    query: web::Query<ListQuery>,
) -> ApiResult<web::Json<ListBookingsResponse>> {
    let ListQuery { entity, date } = query.into_inner();
    let entity = non_blank(entity)
        .map(|raw| parse_entity(&raw))
        .transpose()?;
    let response = state
        .bookings_query
        .list_bookings(ListBookingsRequest {
            caller: session.caller(),
            kind: parse_kind(&path.kind)?,
            entity,
            date_fragment: non_blank(date),
        })
        .await?;
    Ok(web::Json(response))
}

/// Compare both storage indexes and report divergence.
#[utoipa::path(
    get,
    path = "/api/v1/{kind}/bookings/audit",
    params(KindPath),
    responses(
        (status = 200, description = "Index audit", body = AuditIndexesResponse),
        (status = 403, description = "Administrators only", body = Error)
    ),
    tags = ["bookings"],
    operation_id = "auditIndexes",
    security(("SessionCookie" = []))
)]
#[get("/{kind}/bookings/audit")]
pub async fn audit_indexes(
    state: web::Data<HttpState>,
    session: SessionContext,
    path: web::Path<KindPath>,
) -> ApiResult<web::Json<AuditIndexesResponse>> {
    let response = state
        .bookings_query
        .audit_indexes(AuditIndexesRequest {
            caller: session.caller(),
            kind: parse_kind(&path.kind)?,
        })
        .await?;
    Ok(web::Json(response))
}

/// Register every booking route on `cfg`.
///
/// Fixed segments are registered before their parameterised neighbours.
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.service(audit_indexes)
        .service(list_bookings)
        .service(check_availability)
        .service(commit_reservation)
        .service(remove_entity_reservations)
        .service(get_booking)
        .service(relocate_reservation)
        .service(cancel_reservation);
}

#[cfg(test)]
#[path = "bookings_tests.rs"]
mod tests;
