//! Server harness and shared world for the user directory suites.
//!
//! The harness owns a single-threaded Tokio runtime plus a `LocalSet` because
//! Actix uses `spawn_local` internally. The directory runs on the in-memory
//! store and a real HS256 verifier so requests exercise the whole stack.
//! `WorldFixture` stops the server even if a scenario panics.

use std::cell::RefCell;
use std::net::TcpListener;
use std::rc::Rc;
use std::sync::Arc;

use actix_web::dev::ServerHandle;
use actix_web::{App, HttpServer, web};
use chrono::Utc;
use jsonwebtoken::{Algorithm, EncodingKey, Header, encode};
use mockable::DefaultClock;
use serde_json::{Value, json};
use tokio::runtime::Runtime;
use tokio::task::LocalSet;
use user_directory::Trace;
use user_directory::domain::ports::{FixtureMediaStore, UsersCommand};
use user_directory::domain::{Role, UserDirectory};
use user_directory::inbound::http::state::{HttpLimits, HttpState, HttpStatePorts};
use user_directory::inbound::http::users;
use user_directory::outbound::jwt::JwtAccessTokenVerifier;
use user_directory::outbound::memory::InMemoryUserRecordStore;

pub(crate) const TOKEN_SECRET: &str = "lifecycle-test-secret";

pub(crate) struct DirectoryWorld {
    pub(crate) runtime: Runtime,
    pub(crate) local: LocalSet,
    pub(crate) base_url: String,
    pub(crate) server: ServerHandle,
    pub(crate) users: Arc<dyn UsersCommand>,
    pub(crate) last_status: Option<u16>,
    pub(crate) last_body: Option<Value>,
    pub(crate) last_trace_id: Option<String>,
    pub(crate) sent_trace_id: Option<String>,
}

pub(crate) type SharedWorld = Rc<RefCell<DirectoryWorld>>;

pub(crate) struct WorldFixture {
    world: SharedWorld,
}

impl WorldFixture {
    pub(crate) fn world(&self) -> SharedWorld {
        self.world.clone()
    }
}

impl Drop for WorldFixture {
    fn drop(&mut self) {
        shutdown(self.world.clone());
    }
}

pub(crate) fn shutdown(world: SharedWorld) {
    // `LocalSet` must be driven on the thread that owns it, so the world stays
    // borrowed while calling `block_on`. The future must not touch the world.
    let ctx = world.borrow();
    let server = ctx.server.clone();
    ctx.local.block_on(&ctx.runtime, async move {
        server.stop(true).await;
    });
}

pub(crate) fn with_world_async<R, F>(world: &SharedWorld, operation: impl FnOnce(String) -> F) -> R
where
    F: std::future::Future<Output = R>,
{
    let ctx = world.borrow();
    let base_url = ctx.base_url.clone();
    ctx.local.block_on(&ctx.runtime, operation(base_url))
}

/// Sign an access token for `role` valid for the next hour.
pub(crate) fn bearer_token(role: Role) -> String {
    let claims = json!({
        "sub": format!("{}-caller", role.as_str().to_lowercase()),
        "role": role.as_str(),
        "exp": Utc::now().timestamp() + 3600,
    });
    encode(
        &Header::new(Algorithm::HS256),
        &claims,
        &EncodingKey::from_secret(TOKEN_SECRET.as_bytes()),
    )
    .expect("token encodes")
}

async fn spawn_directory_server(http_state: HttpState) -> Result<(String, ServerHandle), String> {
    let listener = TcpListener::bind("127.0.0.1:0").map_err(|err| err.to_string())?;
    let addr = listener.local_addr().map_err(|err| err.to_string())?;

    let http_data = web::Data::new(http_state);

    let server = HttpServer::new(move || {
        App::new()
            .app_data(http_data.clone())
            .wrap(Trace)
            .configure(users::configure)
    })
    .disable_signals()
    .workers(1)
    .listen(listener)
    .map_err(|err| err.to_string())?
    .run();

    let handle = server.handle();
    actix_web::rt::spawn(server);

    Ok((format!("http://{addr}"), handle))
}

fn build_runtime() -> (Runtime, LocalSet) {
    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .expect("tokio runtime");
    let local = LocalSet::new();

    (runtime, local)
}

pub(crate) fn world() -> WorldFixture {
    let (runtime, local) = build_runtime();

    let clock = Arc::new(DefaultClock);
    let store = Arc::new(InMemoryUserRecordStore::new(clock.clone()));
    let directory = Arc::new(UserDirectory::new(store, clock));
    let http_state = HttpState::new(
        HttpStatePorts {
            users_query: directory.clone(),
            users_command: directory.clone(),
            media: Arc::new(FixtureMediaStore),
            tokens: Arc::new(JwtAccessTokenVerifier::new(TOKEN_SECRET, 0)),
        },
        HttpLimits::default(),
    );

    let (base_url, server) = local
        .block_on(&runtime, async { spawn_directory_server(http_state).await })
        .expect("server should start");

    let world = Rc::new(RefCell::new(DirectoryWorld {
        runtime,
        local,
        base_url,
        server,
        users: directory,
        last_status: None,
        last_body: None,
        last_trace_id: None,
        sent_trace_id: None,
    }));

    WorldFixture { world }
}
