//! Conflict detection for a proposed (entity, date) pair.
//!
//! The check is read-then-decide with no lock. Two writers that both observe
//! a free date can both commit; the storage layer keeps the last write.

use std::sync::Arc;

use serde::Serialize;
use serde_json::json;
use tracing::debug;
use utoipa::ToSchema;

use crate::domain::ports::{ReservationRepository, ReservationRepositoryError};
use crate::domain::{CanonicalDate, EntityKind, EntityName, Error, ReservationKey};

const CONFLICT_HEADER: &str = "The selected date is already booked. Booked dates in the same month:";

/// Outcome of a conflict check.
///
/// ## Invariants
/// - `same_month_dates` is empty whenever `is_booked` is false.
/// - `same_month_dates` is sorted ascending without duplicates.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ConflictReport {
    is_booked: bool,
    #[schema(value_type = Vec<String>, example = json!(["2025-06-02", "2025-06-15"]))]
    same_month_dates: Vec<CanonicalDate>,
}

impl ConflictReport {
    /// Report for a free date.
    pub fn free() -> Self {
        Self::default()
    }

    /// Report for a booked date with its same-month siblings.
    pub fn booked(mut same_month_dates: Vec<CanonicalDate>) -> Self {
        same_month_dates.sort();
        same_month_dates.dedup();
        Self {
            is_booked: true,
            same_month_dates,
        }
    }

    /// Whether the candidate date is already taken.
    pub fn is_booked(&self) -> bool {
        self.is_booked
    }

    /// Booked dates sharing the candidate's month, sorted; empty when free.
    pub fn same_month_dates(&self) -> &[CanonicalDate] {
        &self.same_month_dates
    }

    /// Multi-line user message: a header then one `- {date}` line per
    /// booked date. `None` when the date is free.
    pub fn message(&self) -> Option<String> {
        if !self.is_booked {
            return None;
        }
        let mut message = CONFLICT_HEADER.to_owned();
        for date in &self.same_month_dates {
            message.push_str("\n- ");
            message.push_str(date.as_str());
        }
        Some(message)
    }

    /// Convert a booked report into a `Conflict` error carrying the dates.
    pub fn into_error(self) -> Option<Error> {
        let message = self.message()?;
        let dates: Vec<&str> = self.same_month_dates.iter().map(CanonicalDate::as_str).collect();
        Some(Error::conflict(message).with_details(json!({ "sameMonthDates": dates })))
    }
}

/// Decides whether an entity's date is already reserved.
pub struct ConflictChecker<R: ?Sized> {
    repo: Arc<R>,
}

impl<R: ?Sized> Clone for ConflictChecker<R> {
    fn clone(&self) -> Self {
        Self {
            repo: Arc::clone(&self.repo),
        }
    }
}

impl<R> ConflictChecker<R>
where
    R: ReservationRepository + ?Sized,
{
    /// Create a checker reading through `repo`.
    pub fn new(repo: Arc<R>) -> Self {
        Self { repo }
    }

    /// Check `date` for `entity`.
    ///
    /// Only the entity-scoped node for the date decides `is_booked`; a legacy
    /// day-first key counts as the same node. The sibling collection is read
    /// only when the date is taken, so a free date never lists same-month
    /// bookings.
    pub async fn check(
        &self,
        kind: EntityKind,
        entity: &EntityName,
        date: &CanonicalDate,
    ) -> Result<ConflictReport, ReservationRepositoryError> {
        let key = ReservationKey::new(kind, entity.clone(), date.clone());
        if !self.repo.exists(&key).await? {
            debug!(entity_kind = %kind, entity = %entity, date = %date, "date is free");
            return Ok(ConflictReport::free());
        }

        let mut same_month = self.repo.list_same_month(kind, entity, date).await?;
        // The exact node exists even if the listing raced with a delete.
        if !same_month.contains(date) {
            same_month.push(date.clone());
        }
        debug!(
            entity_kind = %kind,
            entity = %entity,
            date = %date,
            same_month = same_month.len(),
            "date is already booked"
        );
        Ok(ConflictReport::booked(same_month))
    }
}
