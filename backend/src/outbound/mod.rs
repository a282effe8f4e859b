//! Outbound adapters implementing domain ports for external infrastructure.
//!
//! - **document_store**: realtime-database REST client and an in-memory tree
//! - **persistence**: the dual-index reservation repository over a document store
//! - **notifier**: booking lifecycle events written to the tracing pipeline
//! - **login**: administrator credentials supplied by configuration
//!
//! Adapters translate between domain types and storage representations. The
//! one-booking-per-date rule lives in the domain services, not here.

pub mod document_store;
pub mod login;
pub mod notifier;
pub mod persistence;
