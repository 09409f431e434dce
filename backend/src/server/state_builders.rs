//! Builders wiring the user directory to its store and the HTTP state.

use std::sync::Arc;

use actix_web::web;
use tracing::{info, warn};

use user_directory::domain::UserDirectory;
use user_directory::domain::ports::{UserRecordStore, UsersCommand, UsersQuery};
use user_directory::inbound::http::state::{HttpState, HttpStatePorts};
use user_directory::outbound::memory::InMemoryUserRecordStore;
use user_directory::outbound::persistence::DieselUserRecordStore;

use super::ServerConfig;

/// One directory instance serves both driving ports.
fn directory_ports<S>(directory: UserDirectory<S>) -> (Arc<dyn UsersQuery>, Arc<dyn UsersCommand>)
where
    S: UserRecordStore + 'static,
{
    let directory = Arc::new(directory);
    (directory.clone(), directory)
}

/// Build the HTTP state, choosing the store from the configuration.
pub(crate) fn build_http_state(config: &ServerConfig) -> web::Data<HttpState> {
    let (users_query, users_command) = match &config.db_pool {
        Some(pool) => {
            info!("user directory backed by PostgreSQL");
            directory_ports(UserDirectory::new(
                Arc::new(DieselUserRecordStore::new(pool.clone())),
                config.clock.clone(),
            ))
        }
        None => {
            warn!("no database configured; user directory is in-memory and not persisted");
            directory_ports(UserDirectory::new(
                Arc::new(InMemoryUserRecordStore::new(config.clock.clone())),
                config.clock.clone(),
            ))
        }
    };

    web::Data::new(HttpState::new(
        HttpStatePorts {
            users_query,
            users_command,
            media: config.media.clone(),
            tokens: config.tokens.clone(),
        },
        config.limits,
    ))
}
