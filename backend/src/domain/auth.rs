//! Administrator login credentials.
//!
//! The HTTP adapter parses the login payload into [`LoginCredentials`]
//! before any login service sees it.

use zeroize::Zeroizing;

/// Errors raised when a login payload is unusable.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum LoginValidationError {
    /// Username was missing or blank once trimmed.
    #[error("username must not be empty")]
    EmptyUsername,
    /// Password was blank.
    #[error("password must not be empty")]
    EmptyPassword,
}

/// Validated login credentials.
///
/// ## Invariants
/// - `username` is trimmed and non-empty.
/// - `password` is non-empty; surrounding whitespace is kept.
///
/// # Examples
/// ```
/// use booking::domain::LoginCredentials;
///
/// let creds = LoginCredentials::try_from_parts(" admin ", "s3cret").expect("valid input");
/// assert_eq!(creds.username(), "admin");
/// assert!(creds.matches("admin", "s3cret"));
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoginCredentials {
    username: String,
    password: Zeroizing<String>,
}

impl LoginCredentials {
    /// Construct credentials from raw username/password inputs.
    pub fn try_from_parts(username: &str, password: &str) -> Result<Self, LoginValidationError> {
        let username = username.trim();
        if username.is_empty() {
            return Err(LoginValidationError::EmptyUsername);
        }
        if password.is_empty() {
            return Err(LoginValidationError::EmptyPassword);
        }
        Ok(Self {
            username: username.to_owned(),
            password: Zeroizing::new(password.to_owned()),
        })
    }

    pub fn username(&self) -> &str {
        self.username.as_str()
    }

    pub fn password(&self) -> &str {
        self.password.as_str()
    }

    /// Compare against expected values without short-circuiting on the
    /// first differing password byte.
    pub fn matches(&self, username: &str, password: &str) -> bool {
        let expected = password.as_bytes();
        let supplied = self.password.as_bytes();
        let mut diff = expected.len() ^ supplied.len();
        for (index, byte) in expected.iter().enumerate() {
            let other = supplied.get(index).copied().unwrap_or_default();
            diff |= usize::from(byte ^ other);
        }
        self.username == username && diff == 0
    }
}
