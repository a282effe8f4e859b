//! Caller identity passed into every driving port request.

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::domain::Error;

/// Role of whoever invoked a booking operation.
///
/// Adapters resolve this at the system boundary; the booking core only
/// checks it.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum Caller {
    /// Platform administrator; may edit, cancel, list and audit bookings.
    Admin,
    /// Anonymous or self-service customer; may check and book dates.
    #[default]
    Customer,
}

impl Caller {
    /// Whether the caller holds the administrator role.
    pub fn is_admin(self) -> bool {
        matches!(self, Self::Admin)
    }

    /// Reject non-admin callers with [`crate::domain::ErrorCode::Forbidden`].
    ///
    /// # Examples
    /// ```
    /// use booking::domain::{Caller, ErrorCode};
    ///
    /// assert!(Caller::Admin.require_admin("cancel bookings").is_ok());
    /// let err = Caller::Customer
    ///     .require_admin("cancel bookings")
    ///     .expect_err("customers are rejected");
    /// assert_eq!(err.code(), ErrorCode::Forbidden);
    /// ```
    pub fn require_admin(self, action: &str) -> Result<(), Error> {
        if self.is_admin() {
            Ok(())
        } else {
            Err(Error::forbidden(format!("only administrators may {action}")))
        }
    }
}
