//! User directory HTTP handlers.
//!
//! ```text
//! GET    /api/protected/users?pgNum=&pgSize=&name=&fullname=&role=&onlyDeleted=
//! GET    /api/protected/users/id/{id}
//! GET    /api/protected/users/name/{name}
//! GET    /api/protected/users/email/{email}
//! PATCH  /api/protected/users/{name}
//! PATCH  /api/protected/users/restore/{name}
//! DELETE /api/protected/users/soft/{name}
//! DELETE /api/protected/users/hard/{name}
//! ```
//!
//! Every route requires a bearer token. Mutations additionally check the
//! caller's role before touching the directory.

use actix_web::http::StatusCode;
use actix_web::{HttpRequest, delete, get, patch, web};
use serde::{Deserialize, Serialize};
use tracing::warn;
use utoipa::{IntoParams, ToSchema};

use crate::domain::ports::{MediaStoreError, PhotoUpload};
use crate::domain::{
    DEFAULT_PAGE, DEFAULT_PAGE_SIZE, DeletedScope, Error, PageRequest, USER_NOT_FOUND_MESSAGE,
    User, UserFilter, UserRecord,
};
use crate::inbound::http::ApiResult;
use crate::inbound::http::auth::{Authenticated, PROFILE_EDITORS, SUPERUSERS_ONLY};
use crate::inbound::http::schemas::{ErrorSchema, UserRecordSchema, UserSchema};
use crate::inbound::http::state::HttpState;
use crate::inbound::http::user_update::{UpdateUserRequest, read_update_request};
use crate::inbound::http::validation::{
    FieldName, parse_email, parse_positive_u32, parse_role, parse_user_id, parse_user_name,
};

/// Message returned after a successful profile update.
pub const UPDATE_SUCCESS_MESSAGE: &str = "Successfully update this user data!";
/// Message returned after a successful restore.
pub const RESTORE_SUCCESS_MESSAGE: &str = "Successfully restore this user data!";
/// Message returned after a soft or hard delete.
pub const DELETE_SUCCESS_MESSAGE: &str = "Successfully delete the user!";

const PAGE_NUMBER: FieldName = FieldName::new("pgNum");
const PAGE_SIZE: FieldName = FieldName::new("pgSize");
const ROLE: FieldName = FieldName::new("role");
const ID: FieldName = FieldName::new("id");
const NAME: FieldName = FieldName::new("name");
const EMAIL: FieldName = FieldName::new("email");

/// Query string accepted by the listing endpoint.
///
/// Values stay raw strings so the handler can reject bad input with the
/// standard error envelope rather than the framework's plain-text 400.
#[derive(Debug, Default, Deserialize, IntoParams)]
#[serde(rename_all = "camelCase")]
#[into_params(parameter_in = Query, rename_all = "camelCase")]
pub struct ListUsersQuery {
    /// One-based page number, default 1.
    pub pg_num: Option<String>,
    /// Page size, default 10, clamped to the configured maximum.
    pub pg_size: Option<String>,
    /// Case-insensitive substring of the name.
    pub name: Option<String>,
    /// Case-insensitive substring of the full name.
    pub fullname: Option<String>,
    /// Exact role.
    pub role: Option<String>,
    /// `true` lists only soft-deleted users; anything else lists active ones.
    pub only_deleted: Option<String>,
}

/// Pagination metadata.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ListMeta {
    /// Total users matching the filter, ignoring pagination.
    pub count: u64,
}

/// Listing response.
#[derive(Debug, Serialize, ToSchema)]
pub struct UserListResponse {
    #[schema(value_type = Vec<UserSchema>)]
    pub user: Vec<User>,
    pub meta: ListMeta,
}

/// Envelope for update and restore.
#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UserMutationResponse {
    #[schema(example = 200)]
    pub status_code: u16,
    pub message: String,
    #[schema(value_type = UserSchema)]
    pub user: User,
}

/// Envelope for soft and hard delete.
#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct StatusResponse {
    #[schema(example = 200)]
    pub status_code: u16,
    #[schema(example = "Successfully delete the user!")]
    pub message: String,
}

impl StatusResponse {
    fn ok(message: &str) -> Self {
        Self {
            status_code: StatusCode::OK.as_u16(),
            message: message.to_owned(),
        }
    }
}

fn not_found() -> Error {
    Error::not_found(USER_NOT_FOUND_MESSAGE)
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|value| !value.is_empty())
}

fn parse_list_query(
    query: ListUsersQuery,
    max_page_size: u32,
) -> Result<(UserFilter, PageRequest), Error> {
    let page = parse_positive_u32(query.pg_num.as_deref(), PAGE_NUMBER, DEFAULT_PAGE, None)?;
    let page_size = parse_positive_u32(
        query.pg_size.as_deref(),
        PAGE_SIZE,
        DEFAULT_PAGE_SIZE.min(max_page_size),
        Some(max_page_size),
    )?;
    let page_request = PageRequest::new(page, page_size)
        .map_err(|err| Error::invalid_request(err.to_string()))?;

    let mut filter = UserFilter::new(DeletedScope::from_flag(query.only_deleted.as_deref()));
    if let Some(name) = non_empty(query.name) {
        filter = filter.with_name_contains(name);
    }
    if let Some(fullname) = non_empty(query.fullname) {
        filter = filter.with_fullname_contains(fullname);
    }
    if let Some(role) = non_empty(query.role) {
        filter = filter.with_role(parse_role(&role, ROLE)?);
    }
    Ok((filter, page_request))
}

fn map_media_error(error: MediaStoreError) -> Error {
    warn!(%error, "photo upload failed");
    match error {
        MediaStoreError::Rejected { status, .. } if (400..500).contains(&status) => {
            Error::invalid_request("the media service rejected the photo")
        }
        MediaStoreError::Decode { .. } => Error::internal("media service response was unreadable"),
        _ => Error::service_unavailable("media service is unavailable"),
    }
}

async fn upload_photo(state: &HttpState, upload: PhotoUpload) -> Result<String, Error> {
    state
        .media
        .upload_image(upload)
        .await
        .map(|media| media.secure_url)
        .map_err(map_media_error)
}

/// List users matching the filters, one page at a time.
#[utoipa::path(
    get,
    path = "/api/protected/users",
    params(ListUsersQuery),
    responses(
        (status = 200, description = "One page of users and the total count", body = UserListResponse),
        (status = 400, description = "Invalid query", body = ErrorSchema),
        (status = 401, description = "Unauthorised", body = ErrorSchema),
        (status = 503, description = "User store unavailable", body = ErrorSchema)
    ),
    tags = ["users"],
    operation_id = "listUsers"
)]
#[get("/users")]
pub async fn list_users(
    state: web::Data<HttpState>,
    _caller: Authenticated,
    query: web::Query<ListUsersQuery>,
) -> ApiResult<web::Json<UserListResponse>> {
    let (filter, page) = parse_list_query(query.into_inner(), state.limits.max_page_size)?;
    let result = state.users_query.list_users(&filter, page).await?;
    Ok(web::Json(UserListResponse {
        user: result.items,
        meta: ListMeta {
            count: result.total_count,
        },
    }))
}

/// Look up a user by id.
#[utoipa::path(
    get,
    path = "/api/protected/users/id/{id}",
    params(("id" = String, Path, description = "User id (UUID)")),
    responses(
        (status = 200, description = "User", body = UserSchema),
        (status = 400, description = "Malformed id", body = ErrorSchema),
        (status = 401, description = "Unauthorised", body = ErrorSchema),
        (status = 404, description = "User not found", body = ErrorSchema)
    ),
    tags = ["users"],
    operation_id = "getUserById"
)]
#[get("/users/id/{id}")]
pub async fn get_user_by_id(
    state: web::Data<HttpState>,
    _caller: Authenticated,
    path: web::Path<String>,
) -> ApiResult<web::Json<User>> {
    let id = parse_user_id(path.into_inner(), ID)?;
    let user = state.users_query.find_user_by_id(&id).await?;
    user.map(web::Json).ok_or_else(not_found)
}

/// Look up a user by name.
#[utoipa::path(
    get,
    path = "/api/protected/users/name/{name}",
    params(("name" = String, Path, description = "Unique user name")),
    responses(
        (status = 200, description = "User", body = UserSchema),
        (status = 401, description = "Unauthorised", body = ErrorSchema),
        (status = 404, description = "User not found", body = ErrorSchema)
    ),
    tags = ["users"],
    operation_id = "getUserByName"
)]
#[get("/users/name/{name}")]
pub async fn get_user_by_name(
    state: web::Data<HttpState>,
    _caller: Authenticated,
    path: web::Path<String>,
) -> ApiResult<web::Json<User>> {
    let name = parse_user_name(path.into_inner(), NAME)?;
    let user = state.users_query.find_user_by_name(&name).await?;
    user.map(web::Json).ok_or_else(not_found)
}

/// Look up a user by email.
///
/// Unlike the other lookups this returns the full stored record.
#[utoipa::path(
    get,
    path = "/api/protected/users/email/{email}",
    params(("email" = String, Path, description = "Unique email address")),
    responses(
        (status = 200, description = "Full user record", body = UserRecordSchema),
        (status = 400, description = "Malformed email", body = ErrorSchema),
        (status = 401, description = "Unauthorised", body = ErrorSchema),
        (status = 404, description = "User not found", body = ErrorSchema)
    ),
    tags = ["users"],
    operation_id = "getUserByEmail"
)]
#[get("/users/email/{email}")]
pub async fn get_user_by_email(
    state: web::Data<HttpState>,
    _caller: Authenticated,
    path: web::Path<String>,
) -> ApiResult<web::Json<UserRecord>> {
    let email = parse_email(path.into_inner(), EMAIL)?;
    let record = state.users_query.find_user_by_email(&email).await?;
    record.map(web::Json).ok_or_else(not_found)
}

/// Update a user's profile.
///
/// Accepts JSON or `multipart/form-data`. An uploaded `photo` file is sent to
/// the media service and its URL stored on the user.
#[utoipa::path(
    patch,
    path = "/api/protected/users/{name}",
    params(("name" = String, Path, description = "Unique user name")),
    request_body(
        content = UpdateUserRequest,
        description = "JSON, or multipart/form-data with an optional `photo` file part"
    ),
    responses(
        (status = 200, description = "Updated user", body = UserMutationResponse),
        (status = 400, description = "Invalid request", body = ErrorSchema),
        (status = 401, description = "Unauthorised", body = ErrorSchema),
        (status = 403, description = "Role not permitted", body = ErrorSchema),
        (status = 404, description = "User not found", body = ErrorSchema),
        (status = 409, description = "Name already taken", body = ErrorSchema)
    ),
    tags = ["users"],
    operation_id = "updateUser"
)]
#[patch("/users/{name}")]
pub async fn update_user(
    state: web::Data<HttpState>,
    caller: Authenticated,
    path: web::Path<String>,
    request: HttpRequest,
    payload: web::Payload,
) -> ApiResult<web::Json<UserMutationResponse>> {
    caller.require_any_role(PROFILE_EDITORS)?;
    let name = parse_user_name(path.into_inner(), NAME)?;
    let parsed =
        read_update_request(request.headers(), payload, state.limits.max_upload_bytes).await?;
    let mut changes = parsed.changes;

    if let Some(upload) = parsed.photo_upload {
        // Avoid storing an orphaned image for a user that does not exist.
        if state.users_query.find_user_by_name(&name).await?.is_none() {
            return Err(not_found());
        }
        changes.photo = Some(upload_photo(&state, upload).await?);
    }

    let user = state.users_command.update_user(&name, &changes).await?;
    Ok(web::Json(UserMutationResponse {
        status_code: StatusCode::OK.as_u16(),
        message: UPDATE_SUCCESS_MESSAGE.to_owned(),
        user,
    }))
}

/// Restore a soft-deleted user.
#[utoipa::path(
    patch,
    path = "/api/protected/users/restore/{name}",
    params(("name" = String, Path, description = "Unique user name")),
    responses(
        (status = 200, description = "Restored user", body = UserMutationResponse),
        (status = 401, description = "Unauthorised", body = ErrorSchema),
        (status = 403, description = "Role not permitted", body = ErrorSchema),
        (status = 404, description = "User not found", body = ErrorSchema)
    ),
    tags = ["users"],
    operation_id = "restoreUser"
)]
#[patch("/users/restore/{name}")]
pub async fn restore_user(
    state: web::Data<HttpState>,
    caller: Authenticated,
    path: web::Path<String>,
) -> ApiResult<web::Json<UserMutationResponse>> {
    caller.require_any_role(SUPERUSERS_ONLY)?;
    let name = parse_user_name(path.into_inner(), NAME)?;
    let user = state.users_command.restore_user(&name).await?;
    Ok(web::Json(UserMutationResponse {
        status_code: StatusCode::OK.as_u16(),
        message: RESTORE_SUCCESS_MESSAGE.to_owned(),
        user,
    }))
}

/// Soft delete a user.
#[utoipa::path(
    delete,
    path = "/api/protected/users/soft/{name}",
    params(("name" = String, Path, description = "Unique user name")),
    responses(
        (status = 200, description = "User soft deleted", body = StatusResponse),
        (status = 401, description = "Unauthorised", body = ErrorSchema),
        (status = 403, description = "Role not permitted", body = ErrorSchema),
        (status = 404, description = "User not found", body = ErrorSchema)
    ),
    tags = ["users"],
    operation_id = "softDeleteUser"
)]
#[delete("/users/soft/{name}")]
pub async fn soft_delete_user(
    state: web::Data<HttpState>,
    caller: Authenticated,
    path: web::Path<String>,
) -> ApiResult<web::Json<StatusResponse>> {
    caller.require_any_role(PROFILE_EDITORS)?;
    let name = parse_user_name(path.into_inner(), NAME)?;
    state.users_command.soft_delete_user(&name).await?;
    Ok(web::Json(StatusResponse::ok(DELETE_SUCCESS_MESSAGE)))
}

/// Permanently delete a user.
#[utoipa::path(
    delete,
    path = "/api/protected/users/hard/{name}",
    params(("name" = String, Path, description = "Unique user name")),
    responses(
        (status = 200, description = "User removed", body = StatusResponse),
        (status = 401, description = "Unauthorised", body = ErrorSchema),
        (status = 403, description = "Role not permitted", body = ErrorSchema),
        (status = 404, description = "User not found", body = ErrorSchema)
    ),
    tags = ["users"],
    operation_id = "hardDeleteUser"
)]
#[delete("/users/hard/{name}")]
pub async fn hard_delete_user(
    state: web::Data<HttpState>,
    caller: Authenticated,
    path: web::Path<String>,
) -> ApiResult<web::Json<StatusResponse>> {
    caller.require_any_role(SUPERUSERS_ONLY)?;
    let name = parse_user_name(path.into_inner(), NAME)?;
    state.users_command.hard_delete_user(&name).await?;
    Ok(web::Json(StatusResponse::ok(DELETE_SUCCESS_MESSAGE)))
}

/// Register every user route under `/api/protected`.
///
/// # Examples
/// ```
/// use actix_web::App;
/// use user_directory::inbound::http::users::configure;
///
/// let _app = App::new().configure(configure);
/// ```
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/api/protected")
            .service(list_users)
            .service(get_user_by_id)
            .service(get_user_by_name)
            .service(get_user_by_email)
            .service(restore_user)
            .service(update_user)
            .service(soft_delete_user)
            .service(hard_delete_user),
    );
}

#[cfg(test)]
#[path = "users_tests.rs"]
mod tests;
