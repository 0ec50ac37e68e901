//! Validated server configuration derived from [`AppSettings`].

use std::net::{SocketAddr, ToSocketAddrs};
use std::path::PathBuf;
use std::time::Duration;

use actix_web::cookie::Key;
use tracing::warn;
use zeroize::Zeroize;

use super::settings::AppSettings;

/// Minimum session secret length accepted by [`Key::derive_from`].
pub const SECRET_MIN_LEN: usize = 32;

/// Build mode for settings validation.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum BuildMode {
    /// Debug builds may run with an ephemeral session key.
    Debug,
    /// Release builds require an explicit secret.
    Release,
}

impl BuildMode {
    /// Determine the build mode from `cfg!(debug_assertions)`.
    #[must_use]
    pub fn from_debug_assertions() -> Self {
        if cfg!(debug_assertions) {
            Self::Debug
        } else {
            Self::Release
        }
    }
}

/// Errors raised while validating settings.
#[derive(thiserror::Error, Debug)]
pub enum SettingsError {
    #[error("failed to load settings: {0}")]
    Load(String),
    #[error("missing required setting: {name}")]
    Missing { name: &'static str },
    #[error("invalid listen address '{addr}': {reason}")]
    InvalidAddr { addr: String, reason: String },
    #[error("session secret too short: need >= {min_len} bytes, got {length}")]
    SecretTooShort { length: usize, min_len: usize },
    #[error("tls-cert and tls-key must be supplied together")]
    PartialTls,
}

/// Certificate and key locations for an HTTPS listener.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TlsPaths {
    pub cert: PathBuf,
    pub key: PathBuf,
}

/// Connection timeouts applied to every listener.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Timeouts {
    /// How long an idle keep-alive connection stays open.
    pub idle: Duration,
    /// Deadline for receiving a complete request head.
    pub read: Duration,
    /// Grace period for flushing a response before dropping the connection.
    pub write: Duration,
}

impl Default for Timeouts {
    fn default() -> Self {
        Self {
            idle: Duration::from_secs(60),
            read: Duration::from_secs(5),
            write: Duration::from_secs(10),
        }
    }
}

/// Everything the server needs to start.
pub struct ServerConfig {
    pub(crate) bind_addr: SocketAddr,
    pub(crate) database_url: String,
    pub(crate) key: Key,
    pub(crate) cookie_secure: bool,
    pub(crate) tls: Option<TlsPaths>,
    pub(crate) timeouts: Timeouts,
}

impl ServerConfig {
    /// Validate `settings` for the given build mode.
    pub fn from_settings(settings: &AppSettings, mode: BuildMode) -> Result<Self, SettingsError> {
        let bind_addr = parse_bind_addr(settings.addr())?;
        let database_url = settings
            .dsn
            .clone()
            .filter(|dsn| !dsn.trim().is_empty())
            .ok_or(SettingsError::Missing { name: "dsn" })?;
        let key = session_key(settings.secret.as_deref(), mode)?;
        let tls = match (&settings.tls_cert, &settings.tls_key) {
            (Some(cert), Some(key)) => Some(TlsPaths {
                cert: cert.clone(),
                key: key.clone(),
            }),
            (None, None) => None,
            _ => return Err(SettingsError::PartialTls),
        };

        Ok(Self {
            bind_addr,
            database_url,
            key,
            cookie_secure: settings.cookie_secure(),
            tls,
            timeouts: Timeouts::default(),
        })
    }

    #[must_use]
    pub fn bind_addr(&self) -> SocketAddr {
        self.bind_addr
    }

    pub fn database_url(&self) -> &str {
        &self.database_url
    }

    pub fn tls(&self) -> Option<&TlsPaths> {
        self.tls.as_ref()
    }

    #[must_use]
    pub fn timeouts(&self) -> Timeouts {
        self.timeouts
    }
}

/// Resolve `addr`, treating a leading `:` as "all interfaces".
pub fn parse_bind_addr(addr: &str) -> Result<SocketAddr, SettingsError> {
    let candidate = match addr.strip_prefix(':') {
        Some(port) => format!("0.0.0.0:{port}"),
        None => addr.to_owned(),
    };
    let invalid = |reason: String| SettingsError::InvalidAddr {
        addr: addr.to_owned(),
        reason,
    };
    candidate
        .to_socket_addrs()
        .map_err(|err| invalid(err.to_string()))?
        .next()
        .ok_or_else(|| invalid("no addresses resolved".to_owned()))
}

fn session_key(secret: Option<&str>, mode: BuildMode) -> Result<Key, SettingsError> {
    match secret {
        Some(secret) => {
            let mut bytes = secret.as_bytes().to_vec();
            if bytes.len() < SECRET_MIN_LEN {
                let length = bytes.len();
                bytes.zeroize();
                return Err(SettingsError::SecretTooShort {
                    length,
                    min_len: SECRET_MIN_LEN,
                });
            }
            let key = Key::derive_from(&bytes);
            bytes.zeroize();
            Ok(key)
        }
        None if mode == BuildMode::Debug => {
            warn!("no session secret configured; using an ephemeral key (dev only)");
            Ok(Key::generate())
        }
        None => Err(SettingsError::Missing { name: "secret" }),
    }
}
