//! Shared HTTP adapter state.
//!
//! HTTP handlers accept this state via `actix_web::web::Data` so they only
//! depend on domain ports (use-cases) and remain testable without I/O.

use std::sync::Arc;

use crate::domain::ports::{AccessTokenVerifier, MediaStore, UsersCommand, UsersQuery};

/// Default upper bound on `pgSize`.
pub const DEFAULT_MAX_PAGE_SIZE: u32 = 100;
/// Default upper bound on an uploaded photo, in bytes.
pub const DEFAULT_MAX_UPLOAD_BYTES: usize = 5 * 1024 * 1024;

/// Request limits enforced by the HTTP parsers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HttpLimits {
    pub max_page_size: u32,
    pub max_upload_bytes: usize,
}

impl Default for HttpLimits {
    fn default() -> Self {
        Self {
            max_page_size: DEFAULT_MAX_PAGE_SIZE,
            max_upload_bytes: DEFAULT_MAX_UPLOAD_BYTES,
        }
    }
}

/// Parameter object bundling all port implementations for HTTP handlers.
#[derive(Clone)]
pub struct HttpStatePorts {
    pub users_query: Arc<dyn UsersQuery>,
    pub users_command: Arc<dyn UsersCommand>,
    pub media: Arc<dyn MediaStore>,
    pub tokens: Arc<dyn AccessTokenVerifier>,
}

/// Dependency bundle for HTTP handlers.
#[derive(Clone)]
pub struct HttpState {
    pub users_query: Arc<dyn UsersQuery>,
    pub users_command: Arc<dyn UsersCommand>,
    pub media: Arc<dyn MediaStore>,
    pub tokens: Arc<dyn AccessTokenVerifier>,
    pub limits: HttpLimits,
}

impl From<HttpStatePorts> for HttpState {
    fn from(ports: HttpStatePorts) -> Self {
        Self::new(ports, HttpLimits::default())
    }
}

impl HttpState {
    /// Construct state from a ports bundle and request limits.
    ///
    /// # Examples
    /// ```no_run
    /// use std::sync::Arc;
    ///
    /// use mockable::DefaultClock;
    /// use user_directory::domain::UserDirectory;
    /// use user_directory::domain::ports::FixtureMediaStore;
    /// use user_directory::inbound::http::state::{HttpLimits, HttpState, HttpStatePorts};
    /// use user_directory::outbound::jwt::JwtAccessTokenVerifier;
    /// use user_directory::outbound::memory::InMemoryUserRecordStore;
    ///
    /// let clock = Arc::new(DefaultClock);
    /// let store = Arc::new(InMemoryUserRecordStore::new(clock.clone()));
    /// let directory = Arc::new(UserDirectory::new(store, clock));
    /// let ports = HttpStatePorts {
    ///     users_query: directory.clone(),
    ///     users_command: directory,
    ///     media: Arc::new(FixtureMediaStore),
    ///     tokens: Arc::new(JwtAccessTokenVerifier::new("secret", 30)),
    /// };
    /// let state = HttpState::new(ports, HttpLimits::default());
    /// assert_eq!(state.limits.max_page_size, 100);
    /// ```
    pub fn new(ports: HttpStatePorts, limits: HttpLimits) -> Self {
        let HttpStatePorts {
            users_query,
            users_command,
            media,
            tokens,
        } = ports;
        Self {
            users_query,
            users_command,
            media,
            tokens,
            limits,
        }
    }
}
