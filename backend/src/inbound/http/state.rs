//! Shared HTTP adapter state.
//!
//! Handlers receive this through `actix_web::web::Data` and only ever see
//! the driving ports, so they stay testable with fixtures or mocks.

use std::sync::Arc;

use crate::domain::ports::{
    BookingCommand, BookingQuery, FixtureBookingCommand, FixtureBookingQuery, FixtureLoginService,
    LoginService,
};

/// Dependency bundle for HTTP handlers.
#[derive(Clone)]
pub struct HttpState {
    pub login: Arc<dyn LoginService>,
    pub bookings: Arc<dyn BookingCommand>,
    pub bookings_query: Arc<dyn BookingQuery>,
}

impl HttpState {
    /// Construct state from the three driving ports.
    ///
    /// # Examples
    /// ```
    /// use std::sync::Arc;
    ///
    /// use booking::domain::ports::{FixtureBookingCommand, FixtureBookingQuery, FixtureLoginService};
    /// use booking::inbound::http::state::HttpState;
    ///
    /// let state = HttpState::new(
    ///     Arc::new(FixtureLoginService),
    ///     Arc::new(FixtureBookingCommand),
    ///     Arc::new(FixtureBookingQuery),
    /// );
    /// let _query = state.bookings_query.clone();
    /// ```
    pub fn new(
        login: Arc<dyn LoginService>,
        bookings: Arc<dyn BookingCommand>,
        bookings_query: Arc<dyn BookingQuery>,
    ) -> Self {
        Self {
            login,
            bookings,
            bookings_query,
        }
    }

    /// State wired entirely to fixture ports.
    pub fn fixtures() -> Self {
        Self::new(
            Arc::new(FixtureLoginService),
            Arc::new(FixtureBookingCommand),
            Arc::new(FixtureBookingQuery),
        )
    }
}
