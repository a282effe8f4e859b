//! Port for post-commit booking notifications.
//!
//! Notifications run only after the reservation is durable. A failed
//! notification is logged by the caller and never undoes the reservation.

use async_trait::async_trait;

use crate::domain::{ReservationKey, ReservationRecord};

use super::define_port_error;

define_port_error! {
    /// Errors raised by notifier adapters.
    pub enum BookingNotifierError {
        /// The notification could not be delivered.
        Delivery { message: String } =>
            "booking notification delivery failed: {message}",
    }
}

/// Port announcing reservation lifecycle events to customers and owners.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait BookingNotifier: Send + Sync {
    /// A new reservation was committed to both indexes.
    async fn reservation_committed(
        &self,
        record: &ReservationRecord,
    ) -> Result<(), BookingNotifierError>;

    /// An existing reservation was edited in place or moved from `from`.
    async fn reservation_relocated(
        &self,
        from: &ReservationKey,
        record: &ReservationRecord,
    ) -> Result<(), BookingNotifierError>;

    /// A reservation was cancelled.
    async fn reservation_cancelled(&self, key: &ReservationKey)
    -> Result<(), BookingNotifierError>;
}

/// No-op notifier.
#[derive(Debug, Default, Clone, Copy)]
pub struct FixtureBookingNotifier;

#[async_trait]
impl BookingNotifier for FixtureBookingNotifier {
    async fn reservation_committed(
        &self,
        _record: &ReservationRecord,
    ) -> Result<(), BookingNotifierError> {
        Ok(())
    }

    async fn reservation_relocated(
        &self,
        _from: &ReservationKey,
        _record: &ReservationRecord,
    ) -> Result<(), BookingNotifierError> {
        Ok(())
    }

    async fn reservation_cancelled(
        &self,
        _key: &ReservationKey,
    ) -> Result<(), BookingNotifierError> {
        Ok(())
    }
}
