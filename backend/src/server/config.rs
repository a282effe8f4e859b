//! Application settings loaded via OrthoConfig and the server configuration
//! derived from them.

use std::net::SocketAddr;
use std::path::{Path, PathBuf};
use std::time::Duration;

use actix_web::cookie::{Key, SameSite};
use ortho_config::OrthoConfig;
use serde::Deserialize;
use tracing::warn;
use zeroize::Zeroize;

const DEFAULT_BIND_ADDR: &str = "0.0.0.0:8080";
const DEFAULT_SESSION_KEY_FILE: &str = "/var/run/secrets/session_key";
const DEFAULT_STORE_TIMEOUT_SECS: u64 = 10;
const SESSION_KEY_MIN_LEN: usize = 64;

/// Settings read from CLI flags, `BOOKING_*` environment variables and the
/// configuration file.
#[derive(Debug, Clone, Deserialize, OrthoConfig)]
#[ortho_config(prefix = "BOOKING")]
pub struct AppSettings {
    /// Socket address to listen on.
    pub bind_addr: Option<String>,
    /// Document store root URL. An in-memory store is used when absent.
    pub store_url: Option<String>,
    /// Token sent as the `auth` query parameter on store requests.
    pub store_auth_token: Option<String>,
    /// Per-request store timeout in seconds.
    pub store_timeout_secs: Option<u64>,
    /// Allow multi-path atomic updates; `false` selects sequential writes.
    #[ortho_config(default = true)]
    pub store_atomic_updates: bool,
    /// Administrator login name.
    pub admin_username: Option<String>,
    /// Administrator password.
    pub admin_password: Option<String>,
    /// File holding the session signing key material.
    pub session_key_file: Option<PathBuf>,
    /// Generate a throwaway session key when the key file is missing.
    #[ortho_config(default = false)]
    pub session_allow_ephemeral: bool,
    /// Mark the session cookie `Secure`.
    #[ortho_config(default = true)]
    pub cookie_secure: bool,
}

impl AppSettings {
    /// Parse the bind address, falling back to `0.0.0.0:8080`.
    ///
    /// # Errors
    ///
    /// Returns [`std::io::ErrorKind::InvalidInput`] for unparsable addresses.
    pub fn bind_addr(&self) -> std::io::Result<SocketAddr> {
        let raw = self.bind_addr.as_deref().unwrap_or(DEFAULT_BIND_ADDR);
        raw.parse().map_err(|err| {
            std::io::Error::new(
                std::io::ErrorKind::InvalidInput,
                format!("invalid bind address {raw}: {err}"),
            )
        })
    }

    /// Per-request store timeout, ten seconds unless configured.
    pub fn store_timeout(&self) -> Duration {
        Duration::from_secs(
            self.store_timeout_secs
                .unwrap_or(DEFAULT_STORE_TIMEOUT_SECS),
        )
    }

    /// Whether the store may apply both index writes as one multi-path update.
    pub fn store_atomic_updates(&self) -> bool {
        self.store_atomic_updates
    }

    /// Whether the session cookie carries the `Secure` attribute.
    pub fn cookie_secure(&self) -> bool {
        self.cookie_secure
    }

    /// Session key file, `/var/run/secrets/session_key` unless configured.
    pub fn session_key_file(&self) -> &Path {
        self.session_key_file
            .as_deref()
            .unwrap_or_else(|| Path::new(DEFAULT_SESSION_KEY_FILE))
    }

    /// Administrator credentials, when both halves are configured.
    pub fn admin_credentials(&self) -> Option<(&str, &str)> {
        match (&self.admin_username, &self.admin_password) {
            (Some(user), Some(pass)) if !user.trim().is_empty() && !pass.is_empty() => {
                Some((user.as_str(), pass.as_str()))
            }
            _ => None,
        }
    }

    /// Read the session key, or generate one in debug builds or when
    /// `session_allow_ephemeral` is set.
    ///
    /// # Errors
    ///
    /// Fails when the key file holds fewer than 64 bytes, or when it is
    /// unreadable and ephemeral keys are not permitted.
    pub fn session_key(&self) -> std::io::Result<Key> {
        let path = self.session_key_file();
        match std::fs::read(path) {
            Ok(mut bytes) => {
                let length = bytes.len();
                if length < SESSION_KEY_MIN_LEN {
                    bytes.zeroize();
                    return Err(std::io::Error::new(
                        std::io::ErrorKind::InvalidData,
                        format!(
                            "session key at {} is {length} bytes; at least {SESSION_KEY_MIN_LEN} required",
                            path.display()
                        ),
                    ));
                }
                let key = Key::derive_from(&bytes);
                bytes.zeroize();
                Ok(key)
            }
            Err(err) if cfg!(debug_assertions) || self.session_allow_ephemeral => {
                warn!(path = %path.display(), error = %err, "using temporary session key (dev only)");
                Ok(Key::generate())
            }
            Err(err) => Err(std::io::Error::other(format!(
                "failed to read session key at {}: {err}",
                path.display()
            ))),
        }
    }
}

/// Everything `create_server` needs, resolved from [`AppSettings`].
pub struct ServerConfig {
    pub(crate) key: Key,
    pub(crate) cookie_secure: bool,
    pub(crate) same_site: SameSite,
    pub(crate) bind_addr: SocketAddr,
    pub(crate) settings: AppSettings,
}

impl ServerConfig {
    /// Resolve the listener address and session key from `settings`.
    ///
    /// # Errors
    ///
    /// Propagates bind address and session key failures.
    pub fn from_settings(settings: AppSettings) -> std::io::Result<Self> {
        Ok(Self {
            key: settings.session_key()?,
            cookie_secure: settings.cookie_secure(),
            same_site: SameSite::Lax,
            bind_addr: settings.bind_addr()?,
            settings,
        })
    }

    #[must_use]
    pub fn bind_addr(&self) -> SocketAddr {
        self.bind_addr
    }
}
