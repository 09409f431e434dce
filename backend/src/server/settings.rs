//! Process settings loaded via OrthoConfig.
//!
//! Every key can come from the command line (`--port 9000`), the environment
//! (`USERDIR_PORT=9000`) or a configuration file. Unset keys fall back to the
//! defaults exposed by the accessors below.

use std::net::{IpAddr, Ipv4Addr, SocketAddr};
use std::time::Duration;

use ortho_config::OrthoConfig;
use serde::Deserialize;
use user_directory::inbound::http::state::{
    DEFAULT_MAX_PAGE_SIZE, DEFAULT_MAX_UPLOAD_BYTES, HttpLimits,
};

const DEFAULT_PORT: u16 = 8080;
const DEFAULT_JWT_LEEWAY_SECONDS: u64 = 30;
const DEFAULT_MEDIA_TIMEOUT_SECONDS: u64 = 30;
const DEFAULT_DATABASE_MAX_CONNECTIONS: u32 = 10;

/// Errors raised when settings cannot describe a runnable service.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SettingsError {
    #[error("USERDIR_JWT_SECRET must be set")]
    MissingJwtSecret,
    #[error("invalid bind host {host:?}")]
    InvalidHost { host: String },
    #[error("invalid media upload URL {url:?}: {message}")]
    InvalidMediaUrl { url: String, message: String },
}

/// Configuration for the user directory service.
#[derive(Debug, Clone, Deserialize, OrthoConfig)]
#[ortho_config(prefix = "USERDIR")]
pub struct AppSettings {
    /// Bind host, default `0.0.0.0`.
    pub host: Option<String>,
    /// Bind port, default 8080.
    pub port: Option<u16>,
    /// PostgreSQL URL. Without it the in-memory store is used.
    pub database_url: Option<String>,
    /// Pool size, default 10.
    pub database_max_connections: Option<u32>,
    /// Apply embedded migrations before serving.
    #[ortho_config(default = true)]
    pub run_migrations: bool,
    /// HS256 secret for access tokens.
    pub jwt_secret: Option<String>,
    /// Accepted clock skew on `exp`, default 30 seconds.
    pub jwt_leeway_seconds: Option<u64>,
    /// Upload endpoint. Without it uploads resolve to fixture URLs.
    pub media_upload_url: Option<String>,
    pub media_upload_preset: Option<String>,
    pub media_api_key: Option<String>,
    /// Upload timeout, default 30 seconds.
    pub media_timeout_seconds: Option<u64>,
    /// Photo size limit in bytes, default 5 MiB.
    pub max_upload_bytes: Option<usize>,
    /// Page size clamp, default 100.
    pub max_page_size: Option<u32>,
}

impl AppSettings {
    /// Socket address to bind.
    ///
    /// # Errors
    ///
    /// Returns [`SettingsError::InvalidHost`] when `host` is not an IP address.
    pub fn bind_addr(&self) -> Result<SocketAddr, SettingsError> {
        let ip = match self.host.as_deref() {
            None => IpAddr::V4(Ipv4Addr::UNSPECIFIED),
            Some(host) => host.parse().map_err(|_| SettingsError::InvalidHost {
                host: host.to_owned(),
            })?,
        };
        Ok(SocketAddr::new(ip, self.port.unwrap_or(DEFAULT_PORT)))
    }

    /// The token secret, which has no default.
    ///
    /// # Errors
    ///
    /// Returns [`SettingsError::MissingJwtSecret`] when unset or blank.
    pub fn jwt_secret(&self) -> Result<&str, SettingsError> {
        self.jwt_secret
            .as_deref()
            .filter(|secret| !secret.trim().is_empty())
            .ok_or(SettingsError::MissingJwtSecret)
    }

    pub fn jwt_leeway_seconds(&self) -> u64 {
        self.jwt_leeway_seconds
            .unwrap_or(DEFAULT_JWT_LEEWAY_SECONDS)
    }

    pub fn database_max_connections(&self) -> u32 {
        self.database_max_connections
            .unwrap_or(DEFAULT_DATABASE_MAX_CONNECTIONS)
    }

    pub fn media_timeout(&self) -> Duration {
        Duration::from_secs(
            self.media_timeout_seconds
                .unwrap_or(DEFAULT_MEDIA_TIMEOUT_SECONDS),
        )
    }

    /// Parsed upload endpoint, if configured.
    ///
    /// # Errors
    ///
    /// Returns [`SettingsError::InvalidMediaUrl`] when the URL does not parse.
    pub fn media_upload_url(&self) -> Result<Option<url::Url>, SettingsError> {
        self.media_upload_url
            .as_deref()
            .filter(|raw| !raw.trim().is_empty())
            .map(|raw| {
                url::Url::parse(raw).map_err(|err| SettingsError::InvalidMediaUrl {
                    url: raw.to_owned(),
                    message: err.to_string(),
                })
            })
            .transpose()
    }

    pub fn http_limits(&self) -> HttpLimits {
        HttpLimits {
            max_page_size: self
                .max_page_size
                .filter(|size| *size > 0)
                .unwrap_or(DEFAULT_MAX_PAGE_SIZE),
            max_upload_bytes: self
                .max_upload_bytes
                .filter(|bytes| *bytes > 0)
                .unwrap_or(DEFAULT_MAX_UPLOAD_BYTES),
        }
    }
}
