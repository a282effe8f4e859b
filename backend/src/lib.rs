//! Booking core for wedding halls and singers.
//!
//! `domain` holds date normalisation, conflict detection and the dual-index
//! reservation writers behind port traits. `outbound` adapts those ports to a
//! realtime document store; `inbound::http` exposes them over REST.

pub mod doc;
pub mod domain;
pub mod inbound;
pub mod middleware;
pub mod outbound;

/// Public OpenAPI surface used by Swagger UI and tooling.
pub use doc::ApiDoc;
pub use middleware::Trace;
