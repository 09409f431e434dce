//! PostgreSQL persistence for user records using Diesel ORM.
//!
//! The adapter is async end to end through `diesel-async` with a `bb8`
//! pool. Row structs and the table definition stay private to this module;
//! only the store, the pool and the migration runner are exported.
//!
//! # Example
//!
//! ```no_run
//! use user_directory::outbound::persistence::{
//!     DbPool, DieselUserRecordStore, PoolConfig, run_pending_migrations,
//! };
//!
//! # async fn wire() -> Result<(), Box<dyn std::error::Error>> {
//! let url = "postgres://localhost/users";
//! run_pending_migrations(url).await?;
//! let pool = DbPool::new(PoolConfig::new(url)).await?;
//! let _store = DieselUserRecordStore::new(pool);
//! # Ok(())
//! # }
//! ```

mod diesel_user_record_store;
mod migrations;
mod models;
mod pool;
mod schema;

pub use diesel_user_record_store::DieselUserRecordStore;
pub use migrations::{MIGRATIONS, MigrationError, run_pending_migrations};
pub use pool::{DbPool, PoolConfig, PoolError, PooledPgConnection};
