//! Booking domain: dates, entities, reservations and the services that
//! guard the one-booking-per-entity-per-date rule.
//!
//! Public surface:
//! - `normalize`, `CanonicalDate`, `NormalizedDate`: date keys.
//! - `ReservationDraft` / `ReservationDetails` / `ReservationRecord`: the
//!   reservation aggregate from form input to stored document.
//! - `ConflictChecker`, `BookingCommandService`, `BookingQueryService`:
//!   the check-then-write protocol behind the driving ports.
//! - `Error` / `ErrorCode`: transport-agnostic failure envelope.

pub mod auth;
pub mod booking_date;
pub mod booking_service;
pub mod caller;
pub mod conflict;
pub mod entity;
pub mod error;
pub mod index_audit;
pub mod ports;
pub mod reservation;
pub mod trace_id;

pub use self::auth::{LoginCredentials, LoginValidationError};
pub use self::booking_date::{
    BookingDateError, CanonicalDate, NormalizedDate, YearMonth, normalize,
};
pub use self::booking_service::{
    BookingCommandService, BookingQueryService, TRANSPORT_FAILURE_MESSAGE,
};
pub use self::caller::Caller;
pub use self::conflict::{ConflictChecker, ConflictReport};
pub use self::entity::{EntityKind, EntityName, EntityNameValidationError, UnknownEntityKind};
pub use self::error::{Error, ErrorCode, ErrorValidationError};
pub use self::index_audit::{IndexAuditReport, IndexEntry};
pub use self::reservation::{
    ReservationDetails, ReservationDraft, ReservationKey, ReservationRecord,
    ReservationValidationError,
};
pub use self::trace_id::{TRACE_ID_HEADER, TraceId};

/// Convenient API result alias.
///
/// # Examples
/// ```
/// use actix_web::HttpResponse;
/// use booking::domain::{ApiResult, Error};
///
/// fn handler() -> ApiResult<HttpResponse> {
///     Err(Error::forbidden("only administrators may cancel bookings"))
/// }
/// ```
pub type ApiResult<T> = Result<T, Error>;
