//! `bb8` pool of async Diesel connections.
//!
//! The store checks out one connection per operation. Failures to build the
//! pool or to obtain a connection in time are both reported to the directory
//! as [`UserStoreError::Connection`], which the HTTP layer answers with 503.

use std::time::Duration;

use diesel_async::AsyncPgConnection;
use diesel_async::pooled_connection::AsyncDieselConnectionManager;
use diesel_async::pooled_connection::bb8::{Pool, PooledConnection};
use tracing::{info, warn};

use crate::domain::ports::{UserStoreError, define_port_error};

define_port_error! {
    /// Pool construction and checkout failures.
    pub enum PoolError {
        /// The initial connections could not be opened.
        Build { message: String } => "connection pool could not be built: {message}",
        /// No connection became free before the checkout timeout.
        Checkout { message: String } => "no pooled connection available: {message}",
    }
}

impl From<PoolError> for UserStoreError {
    fn from(err: PoolError) -> Self {
        Self::connection(err.to_string())
    }
}

/// Connection checked out of a [`DbPool`].
pub type PooledPgConnection<'a> = PooledConnection<'a, AsyncPgConnection>;

/// Sizing and checkout timeout for a [`DbPool`].
///
/// # Example
///
/// ```
/// use std::time::Duration;
/// use user_directory::outbound::persistence::PoolConfig;
///
/// let config = PoolConfig::new("postgres://localhost/users")
///     .with_max_size(20)
///     .with_connection_timeout(Duration::from_secs(5));
/// assert_eq!(config.max_size(), 20);
/// assert_eq!(config.min_idle(), Some(2));
/// ```
#[derive(Debug, Clone)]
pub struct PoolConfig {
    database_url: String,
    max_size: u32,
    min_idle: Option<u32>,
    connection_timeout: Duration,
}

const DEFAULT_MAX_SIZE: u32 = 10;
const DEFAULT_MIN_IDLE: u32 = 2;
const DEFAULT_CHECKOUT_TIMEOUT: Duration = Duration::from_secs(30);

impl PoolConfig {
    /// Defaults: ten connections, two kept idle, 30 second checkout timeout.
    pub fn new(database_url: impl Into<String>) -> Self {
        Self {
            database_url: database_url.into(),
            max_size: DEFAULT_MAX_SIZE,
            min_idle: Some(DEFAULT_MIN_IDLE),
            connection_timeout: DEFAULT_CHECKOUT_TIMEOUT,
        }
    }

    /// Upper bound on open connections, at least one.
    pub fn with_max_size(self, max_size: u32) -> Self {
        let max_size = max_size.max(1);
        Self {
            max_size,
            min_idle: self.min_idle.map(|idle| idle.min(max_size)),
            ..self
        }
    }

    /// Connections kept open while idle, capped to the maximum size.
    pub fn with_min_idle(self, min_idle: Option<u32>) -> Self {
        Self {
            min_idle: min_idle.map(|idle| idle.min(self.max_size)),
            ..self
        }
    }

    pub fn with_connection_timeout(self, connection_timeout: Duration) -> Self {
        Self {
            connection_timeout,
            ..self
        }
    }

    pub fn max_size(&self) -> u32 {
        self.max_size
    }

    pub fn min_idle(&self) -> Option<u32> {
        self.min_idle
    }
}

/// Cloneable handle shared by every store operation.
#[derive(Clone)]
pub struct DbPool {
    inner: Pool<AsyncPgConnection>,
}

impl DbPool {
    /// Open the pool, establishing `min_idle` connections up front.
    ///
    /// # Errors
    ///
    /// [`PoolError::Build`] when the URL is unusable or the server refuses.
    pub async fn new(config: PoolConfig) -> Result<Self, PoolError> {
        let PoolConfig {
            database_url,
            max_size,
            min_idle,
            connection_timeout,
        } = config;
        let manager = AsyncDieselConnectionManager::<AsyncPgConnection>::new(database_url);
        let inner = Pool::builder()
            .max_size(max_size)
            .min_idle(min_idle)
            .connection_timeout(connection_timeout)
            .build(manager)
            .await
            .map_err(|err| PoolError::build(err.to_string()))?;
        info!(max_size, "database pool ready");
        Ok(Self { inner })
    }

    /// Borrow a connection for one operation.
    ///
    /// # Errors
    ///
    /// [`PoolError::Checkout`] once the checkout timeout elapses.
    pub async fn get(&self) -> Result<PooledPgConnection<'_>, PoolError> {
        self.inner.get().await.map_err(|err| {
            warn!(error = %err, "database connection checkout failed");
            PoolError::checkout(err.to_string())
        })
    }
}
