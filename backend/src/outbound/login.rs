//! `LoginService` adapter checking against configured administrator
//! credentials.

use async_trait::async_trait;
use zeroize::Zeroizing;

use crate::domain::ports::LoginService;
use crate::domain::{Caller, Error, LoginCredentials};

/// Grants [`Caller::Admin`] to the single configured administrator.
#[derive(Clone)]
pub struct ConfiguredLoginService {
    username: String,
    password: Zeroizing<String>,
}

impl ConfiguredLoginService {
    /// Accept exactly `username` with `password` as the administrator.
    pub fn new(username: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            username: username.into().trim().to_owned(),
            password: Zeroizing::new(password.into()),
        }
    }
}

impl std::fmt::Debug for ConfiguredLoginService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ConfiguredLoginService")
            .field("username", &self.username)
            .field("password", &"<redacted>")
            .finish()
    }
}

#[async_trait]
impl LoginService for ConfiguredLoginService {
    async fn authenticate(&self, credentials: &LoginCredentials) -> Result<Caller, Error> {
        if credentials.matches(&self.username, &self.password) {
            Ok(Caller::Admin)
        } else {
            Err(Error::unauthorized("invalid credentials"))
        }
    }
}
