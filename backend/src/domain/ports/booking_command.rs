//! Driving port for booking mutations.
//!
//! Every mutation validates input before touching the store and re-checks
//! the destination date for conflicts before writing.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::Serialize;
use utoipa::ToSchema;

use crate::domain::{
    Caller, EntityKind, EntityName, Error, ReservationDetails, ReservationDraft, ReservationKey,
    ReservationRecord,
};

/// Request to book a free date.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommitReservationRequest {
    pub caller: Caller,
    pub draft: ReservationDraft,
}

/// The committed reservation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CommitReservationResponse {
    pub booking: ReservationRecord,
}

/// Request to edit a reservation, possibly moving it to a new date or entity.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RelocateReservationRequest {
    pub caller: Caller,
    /// Current key of the reservation.
    pub from: ReservationKey,
    /// Replacement booking fields, including the destination date and entity.
    pub draft: ReservationDraft,
}

/// The edited reservation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct RelocateReservationResponse {
    pub booking: ReservationRecord,
    /// False for an in-place edit at the unchanged key.
    pub relocated: bool,
}

/// Request to cancel a reservation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CancelReservationRequest {
    pub caller: Caller,
    pub key: ReservationKey,
}

/// Request to remove every reservation of a hall or singer being deleted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RemoveEntityReservationsRequest {
    pub caller: Caller,
    pub kind: EntityKind,
    pub entity: EntityName,
}

/// Number of reservations removed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct RemoveEntityReservationsResponse {
    pub removed: usize,
}

/// Driving port for booking mutations.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait BookingCommand: Send + Sync {
    /// Validate, check for conflicts, then write to both indexes.
    async fn commit_reservation(
        &self,
        request: CommitReservationRequest,
    ) -> Result<CommitReservationResponse, Error>;

    /// Edit a reservation in place or move it to a free destination key.
    async fn relocate_reservation(
        &self,
        request: RelocateReservationRequest,
    ) -> Result<RelocateReservationResponse, Error>;

    /// Remove a reservation from both indexes.
    async fn cancel_reservation(&self, request: CancelReservationRequest) -> Result<(), Error>;

    /// Remove every reservation of one entity.
    async fn remove_entity_reservations(
        &self,
        request: RemoveEntityReservationsRequest,
    ) -> Result<RemoveEntityReservationsResponse, Error>;
}

/// Fixture command implementation that validates but stores nothing.
///
/// Committed records are stamped with [`FixtureBookingCommand::CREATED_AT`].
#[derive(Debug, Default, Clone, Copy)]
pub struct FixtureBookingCommand;

impl FixtureBookingCommand {
    /// Timestamp stamped on fixture records (2025-01-01T00:00:00Z).
    pub const CREATED_AT: i64 = 1_735_689_600;

    fn stamp() -> Result<DateTime<Utc>, Error> {
        DateTime::from_timestamp(Self::CREATED_AT, 0)
            .ok_or_else(|| Error::internal("fixture timestamp out of range"))
    }
}

fn validate(draft: ReservationDraft) -> Result<ReservationDetails, Error> {
    ReservationDetails::try_from(draft).map_err(|err| Error::invalid_request(err.to_string()))
}

#[async_trait]
impl BookingCommand for FixtureBookingCommand {
    async fn commit_reservation(
        &self,
        request: CommitReservationRequest,
    ) -> Result<CommitReservationResponse, Error> {
        let details = validate(request.draft)?;
        Ok(CommitReservationResponse {
            booking: ReservationRecord::new(details, Self::stamp()?),
        })
    }

    async fn relocate_reservation(
        &self,
        request: RelocateReservationRequest,
    ) -> Result<RelocateReservationResponse, Error> {
        request.caller.require_admin("edit bookings")?;
        let details = validate(request.draft)?;
        let relocated = details.key() != &request.from;
        let stamp = Self::stamp()?;
        let original = ReservationRecord::new(details.clone(), stamp);
        Ok(RelocateReservationResponse {
            booking: original.edited(details, stamp),
            relocated,
        })
    }

    async fn cancel_reservation(&self, request: CancelReservationRequest) -> Result<(), Error> {
        request.caller.require_admin("cancel bookings")
    }

    async fn remove_entity_reservations(
        &self,
        request: RemoveEntityReservationsRequest,
    ) -> Result<RemoveEntityReservationsResponse, Error> {
        request.caller.require_admin("remove entity bookings")?;
        Ok(RemoveEntityReservationsResponse { removed: 0 })
    }
}
