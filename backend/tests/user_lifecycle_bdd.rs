//! Behaviour tests for the user lifecycle across the HTTP surface.
//!
//! A real server runs against the in-memory store so soft delete, restore
//! and hard delete are observed through listings and lookups exactly as a
//! client sees them.
//
// rstest-bdd generates guard variables with double underscores, which trips
// the non_snake_case lint under -D warnings.
#![allow(non_snake_case)]

#[path = "support/harness.rs"]
mod harness;

use actix_web::http::{Method, header};
use awc::Client;
use harness::{SharedWorld, WorldFixture, bearer_token, with_world_async};
use rstest::fixture;
use rstest_bdd_macros::{given, scenario, then, when};
use serde_json::Value;
use user_directory::domain::{Email, NewUser, Role, TRACE_ID_HEADER, UserName};

const SUPPLIED_TRACE_ID: &str = "5d8f4a4e-3c1b-4f2a-9e57-2a4f0c7b9d11";

#[fixture]
fn world() -> WorldFixture {
    harness::world()
}

struct RequestSpec<'a> {
    method: Method,
    path: &'a str,
    role: Option<Role>,
    trace_id: Option<&'a str>,
}

impl<'a> RequestSpec<'a> {
    fn as_role(method: Method, path: &'a str, role: Role) -> Self {
        Self {
            method,
            path,
            role: Some(role),
            trace_id: None,
        }
    }
}

fn perform_request(world: &SharedWorld, spec: RequestSpec<'_>) {
    let RequestSpec {
        method,
        path,
        role,
        trace_id,
    } = spec;
    let token = role.map(bearer_token);
    let (status, header_trace_id, body) = with_world_async(world, |base_url| async move {
        let mut request = Client::default().request(method, format!("{base_url}{path}"));
        if let Some(token) = token {
            request = request.insert_header((header::AUTHORIZATION, format!("Bearer {token}")));
        }
        if let Some(trace_id) = trace_id {
            request = request.insert_header((TRACE_ID_HEADER, trace_id));
        }
        let mut response = request.send().await.expect("directory request");
        let status = response.status().as_u16();
        let trace_id = response
            .headers()
            .get(TRACE_ID_HEADER)
            .and_then(|value| value.to_str().ok())
            .map(|value| value.to_owned());
        let body = response.body().await.expect("response body");
        let json: Value = serde_json::from_slice(&body).expect("json body");
        (status, trace_id, json)
    });

    let mut ctx = world.borrow_mut();
    ctx.last_status = Some(status);
    ctx.last_trace_id = header_trace_id;
    ctx.last_body = Some(body);
    ctx.sent_trace_id = trace_id.map(str::to_owned);
}

fn last_body(world: &SharedWorld) -> Value {
    world.borrow().last_body.clone().expect("response body")
}

#[given("a registered member named alice")]
fn a_registered_member_named_alice(world: &WorldFixture) {
    let world = world.world();
    let users = world.borrow().users.clone();
    let alice = NewUser::new(
        UserName::new("alice").expect("valid name"),
        Email::new("alice@example.com").expect("valid email"),
        Role::Member,
    )
    .with_fullname("Alice Liddell");
    with_world_async(&world, |_| async move {
        users.create_user(&alice).await.expect("seed alice");
    });
}

#[when("a superuser fetches alice by name")]
fn a_superuser_fetches_alice_by_name(world: &WorldFixture) {
    perform_request(
        &world.world(),
        RequestSpec::as_role(Method::GET, "/api/protected/users/name/alice", Role::Superuser),
    );
}

#[when("a member soft deletes alice")]
fn a_member_soft_deletes_alice(world: &WorldFixture) {
    perform_request(
        &world.world(),
        RequestSpec::as_role(Method::DELETE, "/api/protected/users/soft/alice", Role::Member),
    );
}

#[when("a superuser lists active users")]
fn a_superuser_lists_active_users(world: &WorldFixture) {
    perform_request(
        &world.world(),
        RequestSpec::as_role(Method::GET, "/api/protected/users", Role::Superuser),
    );
}

#[when("a superuser lists deleted users")]
fn a_superuser_lists_deleted_users(world: &WorldFixture) {
    perform_request(
        &world.world(),
        RequestSpec::as_role(
            Method::GET,
            "/api/protected/users?onlyDeleted=true",
            Role::Superuser,
        ),
    );
}

#[when("a superuser restores alice")]
fn a_superuser_restores_alice(world: &WorldFixture) {
    perform_request(
        &world.world(),
        RequestSpec::as_role(
            Method::PATCH,
            "/api/protected/users/restore/alice",
            Role::Superuser,
        ),
    );
}

#[when("an admin restores alice")]
fn an_admin_restores_alice(world: &WorldFixture) {
    perform_request(
        &world.world(),
        RequestSpec::as_role(Method::PATCH, "/api/protected/users/restore/alice", Role::Admin),
    );
}

#[when("a superuser hard deletes alice")]
fn a_superuser_hard_deletes_alice(world: &WorldFixture) {
    perform_request(
        &world.world(),
        RequestSpec::as_role(
            Method::DELETE,
            "/api/protected/users/hard/alice",
            Role::Superuser,
        ),
    );
}

#[when("an anonymous caller lists users with a trace identifier")]
fn an_anonymous_caller_lists_users_with_a_trace_identifier(world: &WorldFixture) {
    perform_request(
        &world.world(),
        RequestSpec {
            method: Method::GET,
            path: "/api/protected/users",
            role: None,
            trace_id: Some(SUPPLIED_TRACE_ID),
        },
    );
}

#[then("the response status is 200")]
fn the_response_status_is_200(world: &WorldFixture) {
    assert_eq!(world.world().borrow().last_status, Some(200));
}

#[then("the response status is 401")]
fn the_response_status_is_401(world: &WorldFixture) {
    assert_eq!(world.world().borrow().last_status, Some(401));
}

#[then("the response status is 403")]
fn the_response_status_is_403(world: &WorldFixture) {
    assert_eq!(world.world().borrow().last_status, Some(403));
}

#[then("the response status is 404")]
fn the_response_status_is_404(world: &WorldFixture) {
    assert_eq!(world.world().borrow().last_status, Some(404));
}

#[then("the response describes an active alice")]
fn the_response_describes_an_active_alice(world: &WorldFixture) {
    let body = last_body(&world.world());
    let user = body.get("user").unwrap_or(&body);
    assert_eq!(user.get("name").and_then(Value::as_str), Some("alice"));
    assert_eq!(
        user.get("fullname").and_then(Value::as_str),
        Some("Alice Liddell")
    );
    assert_eq!(user.get("isDeleted").and_then(Value::as_bool), Some(false));
    assert!(user.get("deletedAt").is_none_or(Value::is_null));
}

#[then("the response confirms the deletion")]
fn the_response_confirms_the_deletion(world: &WorldFixture) {
    let body = last_body(&world.world());
    assert_eq!(body.get("statusCode").and_then(Value::as_u64), Some(200));
    assert_eq!(
        body.get("message").and_then(Value::as_str),
        Some("Successfully delete the user!")
    );
}

#[then("the listing is empty")]
fn the_listing_is_empty(world: &WorldFixture) {
    let body = last_body(&world.world());
    let users = body
        .get("user")
        .and_then(Value::as_array)
        .expect("user array");
    assert!(users.is_empty());
    assert_eq!(body.pointer("/meta/count").and_then(Value::as_u64), Some(0));
}

#[then("the listing contains only alice")]
fn the_listing_contains_only_alice(world: &WorldFixture) {
    let body = last_body(&world.world());
    let users = body
        .get("user")
        .and_then(Value::as_array)
        .expect("user array");
    let names: Vec<_> = users
        .iter()
        .filter_map(|user| user.get("name").and_then(Value::as_str))
        .collect();
    assert_eq!(names, vec!["alice"]);
    assert_eq!(
        users[0].get("isDeleted").and_then(Value::as_bool),
        Some(true)
    );
    assert_eq!(body.pointer("/meta/count").and_then(Value::as_u64), Some(1));
}

#[then("the error message is \"User not found!\"")]
fn the_error_message_is_user_not_found(world: &WorldFixture) {
    let body = last_body(&world.world());
    assert_eq!(
        body.get("message").and_then(Value::as_str),
        Some("User not found!")
    );
}

#[then("the error code is forbidden")]
fn the_error_code_is_forbidden(world: &WorldFixture) {
    let body = last_body(&world.world());
    assert_eq!(body.get("code").and_then(Value::as_str), Some("forbidden"));
}

#[then("the error code is unauthorized")]
fn the_error_code_is_unauthorized(world: &WorldFixture) {
    let body = last_body(&world.world());
    assert_eq!(
        body.get("code").and_then(Value::as_str),
        Some("unauthorized")
    );
}

#[then("the error trace identifier matches the response header")]
fn the_error_trace_identifier_matches_the_response_header(world: &WorldFixture) {
    let world = world.world();
    let header_trace_id = world.borrow().last_trace_id.clone().expect("trace header");
    let body = last_body(&world);
    assert_eq!(
        body.get("traceId").and_then(Value::as_str),
        Some(header_trace_id.as_str())
    );
}

#[then("the response header echoes the supplied trace identifier")]
fn the_response_header_echoes_the_supplied_trace_identifier(world: &WorldFixture) {
    let ctx = world.world();
    let ctx = ctx.borrow();
    assert_eq!(ctx.last_trace_id, ctx.sent_trace_id);
}

#[scenario(
    path = "tests/features/user_lifecycle.feature",
    name = "A member is soft deleted, restored and removed"
)]
fn a_member_is_soft_deleted_restored_and_removed(world: WorldFixture) {
    drop(world);
}

#[scenario(
    path = "tests/features/user_lifecycle.feature",
    name = "Restoring is reserved for superusers"
)]
fn restoring_is_reserved_for_superusers(world: WorldFixture) {
    drop(world);
}

#[scenario(
    path = "tests/features/user_lifecycle.feature",
    name = "Unauthenticated requests carry the trace identifier"
)]
fn unauthenticated_requests_carry_the_trace_identifier(world: WorldFixture) {
    drop(world);
}
