//! Application settings loaded via OrthoConfig.
//!
//! Values are layered from CLI flags (`--addr`, `--dsn`, ...), environment
//! variables prefixed with `SNIPPETBOX_` and an optional configuration file.

use std::path::PathBuf;

use ortho_config::OrthoConfig;
use serde::Deserialize;

/// Default listen address: every interface, port 4000.
pub const DEFAULT_ADDR: &str = ":4000";

/// Raw settings as supplied by the operator.
#[derive(Debug, Clone, Deserialize, OrthoConfig)]
#[ortho_config(prefix = "SNIPPETBOX")]
pub struct AppSettings {
    /// HTTP listen address. A leading `:` binds all interfaces.
    pub addr: Option<String>,
    /// PostgreSQL connection URL.
    pub dsn: Option<String>,
    /// Session key material, at least 32 bytes.
    pub secret: Option<String>,
    /// Mark the session cookie `Secure`. Defaults to on.
    pub cookie_secure: Option<bool>,
    /// PEM certificate chain for HTTPS.
    pub tls_cert: Option<PathBuf>,
    /// PEM private key for HTTPS.
    pub tls_key: Option<PathBuf>,
}

impl AppSettings {
    /// Configured listen address, falling back to [`DEFAULT_ADDR`].
    pub fn addr(&self) -> &str {
        self.addr.as_deref().unwrap_or(DEFAULT_ADDR)
    }

    /// Whether the session cookie carries `Secure`; on unless disabled.
    pub fn cookie_secure(&self) -> bool {
        self.cookie_secure.unwrap_or(true)
    }
}
