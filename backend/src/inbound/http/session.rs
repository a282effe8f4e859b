//! Session helpers so handlers deal in [`Caller`] roles, not cookies.

use actix_session::Session;
use actix_web::{FromRequest, HttpRequest, dev::Payload};
use futures_util::future::LocalBoxFuture;
use tracing::warn;

use crate::domain::{Caller, Error};

pub(crate) const CALLER_KEY: &str = "caller";

/// Newtype wrapper exposing role-level session operations.
#[derive(Clone)]
pub struct SessionContext(Session);

impl SessionContext {
    pub fn new(session: Session) -> Self {
        Self(session)
    }

    /// Store the authenticated role, rotating the session identifier.
    pub fn persist_caller(&self, caller: Caller) -> Result<(), Error> {
        self.0.renew();
        self.0
            .insert(CALLER_KEY, caller)
            .map_err(|error| Error::internal(format!("failed to persist session: {error}")))
    }

    /// Role held by the session; anonymous sessions are customers.
    pub fn caller(&self) -> Caller {
        match self.0.get::<Caller>(CALLER_KEY) {
            Ok(Some(caller)) => caller,
            Ok(None) => Caller::Customer,
            Err(error) => {
                warn!(%error, "unreadable caller role in session cookie");
                Caller::Customer
            }
        }
    }

    /// Forget the session entirely.
    pub fn clear(&self) {
        self.0.purge();
    }
}

impl FromRequest for SessionContext {
    type Error = actix_web::Error;
    type Future = LocalBoxFuture<'static, Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, payload: &mut Payload) -> Self::Future {
        let fut = Session::from_request(req, payload);
        Box::pin(async move { fut.await.map(SessionContext::new) })
    }
}
