//! Domain ports and supporting types for the hexagonal boundary.

mod macros;
pub(crate) use macros::define_port_error;

mod booking_command;
mod booking_notifier;
mod booking_query;
mod document_store;
mod login_service;
mod reservation_repository;

#[cfg(test)]
pub use booking_command::MockBookingCommand;
pub use booking_command::{
    BookingCommand, CancelReservationRequest, CommitReservationRequest,
    CommitReservationResponse, FixtureBookingCommand, RelocateReservationRequest,
    RelocateReservationResponse, RemoveEntityReservationsRequest,
    RemoveEntityReservationsResponse,
};
#[cfg(test)]
pub use booking_notifier::MockBookingNotifier;
pub use booking_notifier::{BookingNotifier, BookingNotifierError, FixtureBookingNotifier};
#[cfg(test)]
pub use booking_query::MockBookingQuery;
pub use booking_query::{
    AuditIndexesRequest, AuditIndexesResponse, BookingQuery, CheckAvailabilityRequest,
    CheckAvailabilityResponse, FixtureBookingQuery, GetBookingRequest, GetBookingResponse,
    ListBookingsRequest, ListBookingsResponse,
};
#[cfg(test)]
pub use document_store::MockDocumentStore;
pub use document_store::{
    DocumentStore, DocumentStoreError, StoragePath, StoragePathError, WriteBatch,
};
#[cfg(test)]
pub use login_service::MockLoginService;
pub use login_service::{FixtureLoginService, LoginService};
#[cfg(test)]
pub use reservation_repository::MockReservationRepository;
pub use reservation_repository::{
    FixtureReservationRepository, ReservationRepository, ReservationRepositoryError,
};
