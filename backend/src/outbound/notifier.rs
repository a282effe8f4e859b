//! Notifier adapter that records booking lifecycle events as tracing events.
//!
//! Deployments without a mail or messaging integration still get an audit
//! trail: each event carries the customer and owner contacts a delivering
//! notifier would address.

use async_trait::async_trait;
use tracing::info;

use crate::domain::ports::{BookingNotifier, BookingNotifierError};
use crate::domain::{ReservationKey, ReservationRecord};

/// [`BookingNotifier`] emitting one structured `info!` event per change.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingBookingNotifier;

impl TracingBookingNotifier {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl BookingNotifier for TracingBookingNotifier {
    async fn reservation_committed(
        &self,
        record: &ReservationRecord,
    ) -> Result<(), BookingNotifierError> {
        let details = record.details();
        let key = record.key();
        info!(
            target: "booking::notifications",
            entity_kind = %key.kind(),
            entity = %key.entity(),
            date = %key.date(),
            customer_email = details.customer_email(),
            owner_email = details.owner_email(),
            "reservation confirmed"
        );
        Ok(())
    }

    async fn reservation_relocated(
        &self,
        from: &ReservationKey,
        record: &ReservationRecord,
    ) -> Result<(), BookingNotifierError> {
        let details = record.details();
        let key = record.key();
        info!(
            target: "booking::notifications",
            entity_kind = %key.kind(),
            entity = %key.entity(),
            date = %key.date(),
            previous_entity = %from.entity(),
            previous_date = %from.date(),
            customer_email = details.customer_email(),
            owner_email = details.owner_email(),
            "reservation updated"
        );
        Ok(())
    }

    async fn reservation_cancelled(
        &self,
        key: &ReservationKey,
    ) -> Result<(), BookingNotifierError> {
        info!(
            target: "booking::notifications",
            entity_kind = %key.kind(),
            entity = %key.entity(),
            date = %key.date(),
            "reservation cancelled"
        );
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use chrono::{TimeZone, Utc};
    use rstest::rstest;

    use super::*;
    use crate::domain::{CanonicalDate, EntityKind, EntityName, ReservationDetails, ReservationDraft};

    fn record() -> ReservationRecord {
        let details = ReservationDetails::try_from(ReservationDraft {
            entity_type: EntityKind::Singer,
            entity_name: "Omar".to_owned(),
            date: "2025-06-15".to_owned(),
            customer_name: "Layla Haddad".to_owned(),
            customer_phone: "0790000000".to_owned(),
            customer_email: "layla@example.com".to_owned(),
            owner_email: "omar@example.com".to_owned(),
            event_kind: "henna".to_owned(),
            guest_count: None,
            price: Some(900),
            notes: None,
        })
        .expect("valid draft");
        let created_at = Utc
            .with_ymd_and_hms(2025, 5, 1, 9, 30, 0)
            .single()
            .expect("valid timestamp");
        ReservationRecord::new(details, created_at)
    }

    #[rstest]
    #[tokio::test]
    async fn every_event_is_delivered() {
        let notifier = TracingBookingNotifier::new();
        let record = record();
        let from = ReservationKey::new(
            EntityKind::Singer,
            EntityName::new("Omar").expect("valid name"),
            CanonicalDate::parse("2025-06-01").expect("valid date"),
        );

        notifier
            .reservation_committed(&record)
            .await
            .expect("commit event");
        notifier
            .reservation_relocated(&from, &record)
            .await
            .expect("relocation event");
        notifier
            .reservation_cancelled(record.key())
            .await
            .expect("cancellation event");
    }
}
