//! Driving port for booking reads.
//!
//! Availability checks are open to every caller. Listing, lookup and index
//! audits are administrator operations.

use async_trait::async_trait;
use serde::Serialize;
use utoipa::ToSchema;

use crate::domain::{
    Caller, ConflictReport, EntityKind, EntityName, Error, IndexAuditReport, ReservationKey,
    ReservationRecord,
};

/// Request to check whether an entity's date is free.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CheckAvailabilityRequest {
    pub kind: EntityKind,
    pub entity: EntityName,
    /// Date as typed; normalised by the service.
    pub date: String,
}

/// Conflict report for the requested date.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CheckAvailabilityResponse {
    #[serde(flatten)]
    pub report: ConflictReport,
    /// User-facing conflict message, present only when booked.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

/// Request to list bookings from the composite index.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListBookingsRequest {
    pub caller: Caller,
    pub kind: EntityKind,
    /// Restrict to one entity.
    pub entity: Option<EntityName>,
    /// Substring filter over the booking date, matched in both date forms.
    pub date_fragment: Option<String>,
}

/// Bookings sorted by date then entity.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ListBookingsResponse {
    pub bookings: Vec<ReservationRecord>,
}

/// Request to fetch one booking.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GetBookingRequest {
    pub caller: Caller,
    pub key: ReservationKey,
}

/// Single booking.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct GetBookingResponse {
    pub booking: ReservationRecord,
}

/// Request to compare both indexes of one entity kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AuditIndexesRequest {
    pub caller: Caller,
    pub kind: EntityKind,
}

/// Index divergence report.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct AuditIndexesResponse {
    #[serde(flatten)]
    pub report: IndexAuditReport,
}

/// Driving port for booking read operations.
///
/// # Examples
///
/// ```rust,no_run
/// # async fn example() -> Result<(), booking::domain::Error> {
/// use booking::domain::ports::{BookingQuery, CheckAvailabilityRequest, FixtureBookingQuery};
/// use booking::domain::{EntityKind, EntityName};
///
/// let response = FixtureBookingQuery
///     .check_availability(CheckAvailabilityRequest {
///         kind: EntityKind::Hall,
///         entity: EntityName::new("Rose Hall").expect("valid name"),
///         date: "15-06-2025".to_owned(),
///     })
///     .await?;
/// assert!(!response.report.is_booked());
/// # Ok(())
/// # }
/// ```
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait BookingQuery: Send + Sync {
    /// Decide whether the date is booked and list same-month bookings if so.
    async fn check_availability(
        &self,
        request: CheckAvailabilityRequest,
    ) -> Result<CheckAvailabilityResponse, Error>;

    /// List bookings of one kind, optionally filtered.
    async fn list_bookings(
        &self,
        request: ListBookingsRequest,
    ) -> Result<ListBookingsResponse, Error>;

    /// Fetch a single booking.
    async fn get_booking(&self, request: GetBookingRequest) -> Result<GetBookingResponse, Error>;

    /// Report divergence between the two storage indexes.
    async fn audit_indexes(
        &self,
        request: AuditIndexesRequest,
    ) -> Result<AuditIndexesResponse, Error>;
}

/// Fixture query implementation backed by an empty store.
#[derive(Debug, Default, Clone, Copy)]
pub struct FixtureBookingQuery;

#[async_trait]
impl BookingQuery for FixtureBookingQuery {
    async fn check_availability(
        &self,
        _request: CheckAvailabilityRequest,
    ) -> Result<CheckAvailabilityResponse, Error> {
        Ok(CheckAvailabilityResponse {
            report: ConflictReport::free(),
            message: None,
        })
    }

    async fn list_bookings(
        &self,
        request: ListBookingsRequest,
    ) -> Result<ListBookingsResponse, Error> {
        request.caller.require_admin("list bookings")?;
        Ok(ListBookingsResponse {
            bookings: Vec::new(),
        })
    }

    async fn get_booking(&self, request: GetBookingRequest) -> Result<GetBookingResponse, Error> {
        request.caller.require_admin("view bookings")?;
        Err(Error::not_found(format!(
            "no booking for {} on {}",
            request.key.entity(),
            request.key.date()
        )))
    }

    async fn audit_indexes(
        &self,
        request: AuditIndexesRequest,
    ) -> Result<AuditIndexesResponse, Error> {
        request.caller.require_admin("audit booking indexes")?;
        Ok(AuditIndexesResponse {
            report: IndexAuditReport::new(request.kind, 0, Vec::new(), Vec::new(), Vec::new()),
        })
    }
}
