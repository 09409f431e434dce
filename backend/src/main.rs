#![cfg_attr(not(any(test, doctest)), deny(clippy::unwrap_used))]
#![cfg_attr(not(any(test, doctest)), forbid(clippy::expect_used))]
//! User directory entry-point: loads settings, wires adapters and serves the
//! REST API.

mod server;

use std::ffi::OsString;
use std::sync::Arc;

use actix_web::web;
use color_eyre::eyre::{Result, WrapErr};
use ortho_config::OrthoConfig;
use tracing::{info, warn};
use tracing_subscriber::{EnvFilter, fmt};

use server::{AppSettings, ServerConfig, create_server};
use user_directory::domain::ports::MediaStore;
use user_directory::inbound::http::health::HealthState;
use user_directory::outbound::jwt::JwtAccessTokenVerifier;
use user_directory::outbound::media::{HttpMediaStore, MediaUploadSettings};
use user_directory::outbound::persistence::{DbPool, PoolConfig, run_pending_migrations};

fn init_tracing() {
    if let Err(e) = fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .json()
        .try_init()
    {
        warn!(error = %e, "tracing init failed");
    }
}

async fn attach_database(config: ServerConfig, settings: &AppSettings) -> Result<ServerConfig> {
    let Some(database_url) = settings.database_url.as_deref() else {
        return Ok(config);
    };
    if settings.run_migrations {
        run_pending_migrations(database_url)
            .await
            .wrap_err("failed to apply database migrations")?;
    }
    let pool = DbPool::new(
        PoolConfig::new(database_url).with_max_size(settings.database_max_connections()),
    )
    .await
    .wrap_err("failed to build database pool")?;
    Ok(config.with_db_pool(pool))
}

fn attach_media(config: ServerConfig, settings: &AppSettings) -> Result<ServerConfig> {
    let Some(endpoint) = settings.media_upload_url()? else {
        info!("no media upload endpoint configured; photo uploads use fixture URLs");
        return Ok(config);
    };
    let media: Arc<dyn MediaStore> = Arc::new(
        HttpMediaStore::new(
            endpoint,
            settings.media_timeout(),
            MediaUploadSettings {
                upload_preset: settings.media_upload_preset.clone(),
                api_key: settings.media_api_key.clone(),
            },
        )
        .wrap_err("failed to build media upload client")?,
    );
    Ok(config.with_media_store(media))
}

/// Layer CLI arguments over `USERDIR_*` environment variables.
fn load_settings<I, T>(args: I) -> Result<AppSettings>
where
    I: IntoIterator<Item = T>,
    T: Into<OsString> + Clone,
{
    AppSettings::load_from_iter(args).wrap_err("failed to load settings")
}

/// Application bootstrap.
#[actix_web::main]
async fn main() -> Result<()> {
    color_eyre::install()?;
    init_tracing();

    let settings = load_settings(std::env::args_os())?;
    let tokens = Arc::new(JwtAccessTokenVerifier::new(
        settings.jwt_secret()?,
        settings.jwt_leeway_seconds(),
    ));

    let config = ServerConfig::new(settings.bind_addr()?, tokens)
        .with_limits(settings.http_limits());
    let config = attach_database(config, &settings).await?;
    let config = attach_media(config, &settings)?;

    let bind_addr = config.bind_addr();
    let health_state = web::Data::new(HealthState::new());
    let server = create_server(health_state, config)?;
    info!(%bind_addr, "user directory listening");
    server.await?;
    Ok(())
}
