//! Reservation persistence over a hierarchical document store.
//!
//! Each reservation is stored twice: under `{Kind}Names/{entity}/{date}` for
//! per-entity lookups and under `{Kind}Bookings/{date}_{entity}` for flat
//! listings. [`DocumentReservationRepository`] keeps the two copies in step.
//!
//! # Example
//!
//! ```
//! use std::sync::Arc;
//!
//! use booking::outbound::document_store::InMemoryDocumentStore;
//! use booking::outbound::persistence::{DocumentReservationRepository, WriteStrategy};
//!
//! let store = Arc::new(InMemoryDocumentStore::new().without_atomic_updates());
//! let repo = DocumentReservationRepository::new(store);
//! assert_eq!(repo.strategy(), WriteStrategy::Sequential);
//! ```

mod document_reservation_repository;

pub use document_reservation_repository::{DocumentReservationRepository, WriteStrategy};
