//! Booking domain services.
//!
//! [`BookingCommandService`] runs the check-then-write protocol for new,
//! edited and cancelled reservations. [`BookingQueryService`] answers
//! availability checks and administrator reads. Neither touches storage
//! paths; the [`ReservationRepository`] owns the dual-index fan-out.

use std::sync::Arc;

use async_trait::async_trait;
use mockable::Clock;
use serde_json::json;
use tracing::{debug, info, warn};

use crate::domain::ports::{
    AuditIndexesRequest, AuditIndexesResponse, BookingCommand, BookingNotifier,
    BookingNotifierError, BookingQuery, CancelReservationRequest, CheckAvailabilityRequest,
    CheckAvailabilityResponse, CommitReservationRequest, CommitReservationResponse,
    GetBookingRequest, GetBookingResponse, ListBookingsRequest, ListBookingsResponse,
    RelocateReservationRequest, RelocateReservationResponse, RemoveEntityReservationsRequest,
    RemoveEntityReservationsResponse, ReservationRepository, ReservationRepositoryError,
};
use crate::domain::{
    ConflictChecker, ConflictReport, Error, NormalizedDate, ReservationDetails, ReservationDraft,
    ReservationKey, ReservationRecord, ReservationValidationError, normalize,
};

/// Message returned for every store transport failure.
pub const TRANSPORT_FAILURE_MESSAGE: &str = "an error occurred, please try again";

fn map_repository_error(error: ReservationRepositoryError) -> Error {
    match error {
        ReservationRepositoryError::Connection { message } => {
            warn!(%message, "reservation store unavailable");
            Error::service_unavailable(TRANSPORT_FAILURE_MESSAGE)
        }
        ReservationRepositoryError::Query { message }
        | ReservationRepositoryError::Decode { message } => {
            Error::internal(format!("reservation repository error: {message}"))
        }
        ReservationRepositoryError::PartialWrite { message } => {
            Error::internal(format!("reservation indexes diverged: {message}"))
        }
    }
}

fn map_validation_error(error: ReservationValidationError) -> Error {
    let details = match &error {
        ReservationValidationError::MissingFields { fields } => json!({ "missingFields": fields }),
        ReservationValidationError::EntityName(_) => json!({ "field": "entityName" }),
        ReservationValidationError::Date { .. } => json!({ "field": "date" }),
        ReservationValidationError::NotApplicable { field, .. } => json!({ "field": field }),
    };
    Error::invalid_request(error.to_string()).with_details(details)
}

fn validate(draft: ReservationDraft) -> Result<ReservationDetails, Error> {
    ReservationDetails::try_from(draft).map_err(map_validation_error)
}

fn log_notification_failure(result: Result<(), BookingNotifierError>, key: &ReservationKey) {
    if let Err(err) = result {
        warn!(
            entity_kind = %key.kind(),
            entity = %key.entity(),
            date = %key.date(),
            error = %err,
            "booking notification failed; reservation kept"
        );
    }
}

async fn check_destination<R>(
    checker: &ConflictChecker<R>,
    key: &ReservationKey,
) -> Result<(), Error>
where
    R: ReservationRepository + ?Sized,
{
    let report = checker
        .check(key.kind(), key.entity(), key.date())
        .await
        .map_err(map_repository_error)?;
    match report.into_error() {
        Some(conflict) => {
            info!(
                entity_kind = %key.kind(),
                entity = %key.entity(),
                date = %key.date(),
                "booking rejected: date already reserved"
            );
            Err(conflict)
        }
        None => Ok(()),
    }
}

/// Booking service implementing the command driving port.
pub struct BookingCommandService<R, N> {
    repo: Arc<R>,
    notifier: Arc<N>,
    clock: Arc<dyn Clock>,
    checker: ConflictChecker<R>,
}

impl<R, N> Clone for BookingCommandService<R, N> {
    fn clone(&self) -> Self {
        Self {
            repo: Arc::clone(&self.repo),
            notifier: Arc::clone(&self.notifier),
            clock: Arc::clone(&self.clock),
            checker: self.checker.clone(),
        }
    }
}

impl<R, N> BookingCommandService<R, N>
where
    R: ReservationRepository,
{
    /// Create a command service over `repo`, stamping times from `clock`.
    pub fn new(repo: Arc<R>, notifier: Arc<N>, clock: Arc<dyn Clock>) -> Self {
        let checker = ConflictChecker::new(Arc::clone(&repo));
        Self {
            repo,
            notifier,
            clock,
            checker,
        }
    }
}

#[async_trait]
impl<R, N> BookingCommand for BookingCommandService<R, N>
where
    R: ReservationRepository,
    N: BookingNotifier,
{
    async fn commit_reservation(
        &self,
        request: CommitReservationRequest,
    ) -> Result<CommitReservationResponse, Error> {
        let details = validate(request.draft)?;
        check_destination(&self.checker, details.key()).await?;

        let record = ReservationRecord::new(details, self.clock.utc());
        self.repo
            .save(&record)
            .await
            .map_err(map_repository_error)?;
        let key = record.key();
        info!(
            entity_kind = %key.kind(),
            entity = %key.entity(),
            date = %key.date(),
            caller = ?request.caller,
            "reservation committed"
        );

        log_notification_failure(self.notifier.reservation_committed(&record).await, key);
        Ok(CommitReservationResponse { booking: record })
    }

    async fn relocate_reservation(
        &self,
        request: RelocateReservationRequest,
    ) -> Result<RelocateReservationResponse, Error> {
        request.caller.require_admin("edit bookings")?;
        let details = validate(request.draft)?;
        let from = request.from;
        if details.key().kind() != from.kind() {
            return Err(Error::invalid_request(format!(
                "a {} booking cannot be moved to a {}",
                from.kind(),
                details.key().kind()
            )));
        }

        let existing = self
            .repo
            .find(&from)
            .await
            .map_err(map_repository_error)?
            .ok_or_else(|| {
                Error::not_found(format!("no booking for {} on {}", from.entity(), from.date()))
            })?;

        let record = existing.edited(details, self.clock.utc());
        let relocated = record.key() != &from;
        if relocated {
            check_destination(&self.checker, record.key()).await?;
            self.repo
                .relocate(&from, &record)
                .await
                .map_err(map_repository_error)?;
        } else {
            self.repo
                .save(&record)
                .await
                .map_err(map_repository_error)?;
        }
        info!(
            entity_kind = %from.kind(),
            from_entity = %from.entity(),
            from_date = %from.date(),
            entity = %record.key().entity(),
            date = %record.key().date(),
            relocated,
            "reservation updated"
        );

        log_notification_failure(
            self.notifier.reservation_relocated(&from, &record).await,
            record.key(),
        );
        Ok(RelocateReservationResponse {
            booking: record,
            relocated,
        })
    }

    async fn cancel_reservation(&self, request: CancelReservationRequest) -> Result<(), Error> {
        request.caller.require_admin("cancel bookings")?;
        let key = request.key;
        let exists = self
            .repo
            .exists(&key)
            .await
            .map_err(map_repository_error)?;
        if !exists {
            return Err(Error::not_found(format!(
                "no booking for {} on {}",
                key.entity(),
                key.date()
            )));
        }

        self.repo
            .delete(&key)
            .await
            .map_err(map_repository_error)?;
        info!(
            entity_kind = %key.kind(),
            entity = %key.entity(),
            date = %key.date(),
            "reservation cancelled"
        );

        log_notification_failure(self.notifier.reservation_cancelled(&key).await, &key);
        Ok(())
    }

    async fn remove_entity_reservations(
        &self,
        request: RemoveEntityReservationsRequest,
    ) -> Result<RemoveEntityReservationsResponse, Error> {
        request.caller.require_admin("remove entity bookings")?;
        let removed = self
            .repo
            .delete_entity(request.kind, &request.entity)
            .await
            .map_err(map_repository_error)?;
        info!(
            entity_kind = %request.kind,
            entity = %request.entity,
            removed,
            "entity reservations removed"
        );
        Ok(RemoveEntityReservationsResponse { removed })
    }
}

/// Booking service implementing the query driving port.
pub struct BookingQueryService<R> {
    repo: Arc<R>,
    checker: ConflictChecker<R>,
}

impl<R> Clone for BookingQueryService<R> {
    fn clone(&self) -> Self {
        Self {
            repo: Arc::clone(&self.repo),
            checker: self.checker.clone(),
        }
    }
}

impl<R> BookingQueryService<R>
where
    R: ReservationRepository,
{
    /// Create a query service over `repo`.
    pub fn new(repo: Arc<R>) -> Self {
        let checker = ConflictChecker::new(Arc::clone(&repo));
        Self { repo, checker }
    }
}

/// Whether `record`'s date contains `fragment` in either date form.
///
/// The fragment is normalised first, so a complete date in either shape
/// matches exactly and a partial one falls back to a lower-cased substring.
fn date_matches(record: &ReservationRecord, fragment: &str) -> bool {
    let fragment = fragment.trim();
    if fragment.is_empty() {
        return true;
    }
    let date = record.key().date();
    let normalized = normalize(fragment);
    date.as_str().contains(normalized.as_str())
        || date.display_form().contains(&fragment.to_lowercase())
}

#[async_trait]
impl<R> BookingQuery for BookingQueryService<R>
where
    R: ReservationRepository,
{
    async fn check_availability(
        &self,
        request: CheckAvailabilityRequest,
    ) -> Result<CheckAvailabilityResponse, Error> {
        let report = match normalize(&request.date) {
            NormalizedDate::Canonical(date) => self
                .checker
                .check(request.kind, &request.entity, &date)
                .await
                .map_err(map_repository_error)?,
            // Never written as a key, so it cannot be booked.
            NormalizedDate::Passthrough(raw) => {
                debug!(date = %raw, "unrecognised date reported as free");
                ConflictReport::free()
            }
        };
        let message = report.message();
        Ok(CheckAvailabilityResponse { report, message })
    }

    async fn list_bookings(
        &self,
        request: ListBookingsRequest,
    ) -> Result<ListBookingsResponse, Error> {
        request.caller.require_admin("list bookings")?;
        let mut bookings: Vec<ReservationRecord> = self
            .repo
            .list_all(request.kind)
            .await
            .map_err(map_repository_error)?
            .into_iter()
            .filter(|record| {
                request
                    .entity
                    .as_ref()
                    .is_none_or(|entity| record.key().entity() == entity)
            })
            .filter(|record| {
                request
                    .date_fragment
                    .as_deref()
                    .is_none_or(|fragment| date_matches(record, fragment))
            })
            .collect();
        bookings.sort_by(|left, right| {
            (left.key().date(), left.key().entity()).cmp(&(right.key().date(), right.key().entity()))
        });
        Ok(ListBookingsResponse { bookings })
    }

    async fn get_booking(&self, request: GetBookingRequest) -> Result<GetBookingResponse, Error> {
        request.caller.require_admin("view bookings")?;
        let key = request.key;
        let booking = self
            .repo
            .find(&key)
            .await
            .map_err(map_repository_error)?
            .ok_or_else(|| {
                Error::not_found(format!("no booking for {} on {}", key.entity(), key.date()))
            })?;
        Ok(GetBookingResponse { booking })
    }

    async fn audit_indexes(
        &self,
        request: AuditIndexesRequest,
    ) -> Result<AuditIndexesResponse, Error> {
        request.caller.require_admin("audit booking indexes")?;
        let report = self
            .repo
            .audit(request.kind)
            .await
            .map_err(map_repository_error)?;
        if !report.is_consistent() {
            warn!(
                entity_kind = %request.kind,
                entity_index_only = report.entity_index_only.len(),
                composite_index_only = report.composite_index_only.len(),
                mismatched = report.mismatched.len(),
                "booking indexes diverged"
            );
        }
        Ok(AuditIndexesResponse { report })
    }
}

#[cfg(test)]
#[path = "booking_service_tests.rs"]
mod tests;
