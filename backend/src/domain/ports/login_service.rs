//! Driving port for administrator login.
//!
//! Inbound adapters call it to turn credentials into a [`Caller`] role
//! without knowing where the accepted credentials come from.

use async_trait::async_trait;

use crate::domain::{Caller, Error, LoginCredentials};

/// Domain use-case port for authentication.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait LoginService: Send + Sync {
    /// Validate credentials and return the role they grant.
    async fn authenticate(&self, credentials: &LoginCredentials) -> Result<Caller, Error>;
}

/// Rejects every login; used when no administrator is configured.
#[derive(Debug, Default, Clone, Copy)]
pub struct FixtureLoginService;

#[async_trait]
impl LoginService for FixtureLoginService {
    async fn authenticate(&self, _credentials: &LoginCredentials) -> Result<Caller, Error> {
        Err(Error::unauthorized("invalid credentials"))
    }
}
