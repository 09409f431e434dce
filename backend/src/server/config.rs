//! HTTP server configuration object and helpers.

use std::net::SocketAddr;
use std::sync::Arc;

use mockable::{Clock, DefaultClock};
use user_directory::domain::ports::{AccessTokenVerifier, FixtureMediaStore, MediaStore};
use user_directory::inbound::http::state::HttpLimits;
use user_directory::outbound::persistence::DbPool;

/// Builder-style configuration for creating the HTTP server.
///
/// Without a database pool the directory runs on the in-memory store; without
/// a media store uploads resolve to fixture URLs.
pub struct ServerConfig {
    pub(crate) bind_addr: SocketAddr,
    pub(crate) tokens: Arc<dyn AccessTokenVerifier>,
    pub(crate) limits: HttpLimits,
    pub(crate) db_pool: Option<DbPool>,
    pub(crate) media: Arc<dyn MediaStore>,
    pub(crate) clock: Arc<dyn Clock>,
}

impl ServerConfig {
    #[must_use]
    pub fn new(bind_addr: SocketAddr, tokens: Arc<dyn AccessTokenVerifier>) -> Self {
        Self {
            bind_addr,
            tokens,
            limits: HttpLimits::default(),
            db_pool: None,
            media: Arc::new(FixtureMediaStore),
            clock: Arc::new(DefaultClock),
        }
    }

    /// Attach a database pool; the directory then uses the Diesel store.
    #[must_use]
    pub fn with_db_pool(mut self, pool: DbPool) -> Self {
        self.db_pool = Some(pool);
        self
    }

    #[must_use]
    pub fn with_media_store(mut self, media: Arc<dyn MediaStore>) -> Self {
        self.media = media;
        self
    }

    #[must_use]
    pub fn with_limits(mut self, limits: HttpLimits) -> Self {
        self.limits = limits;
        self
    }

    /// Return the socket address the server will bind to.
    #[must_use]
    pub fn bind_addr(&self) -> SocketAddr {
        self.bind_addr
    }
}
