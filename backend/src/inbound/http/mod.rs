//! HTTP inbound adapter exposing the booking REST endpoints.

pub mod auth;
pub mod bookings;
pub mod error;
pub mod health;
pub mod session;
pub mod state;
#[cfg(test)]
pub mod test_utils;

pub use error::ApiResult;
