//! OpenAPI mirrors of the domain types.
//!
//! The domain module stays free of utoipa derives; each type here is
//! registered under the domain type's name with `#[schema(as = ...)]` and
//! only exists to describe the JSON shape.

use utoipa::ToSchema;

/// OpenAPI schema for [`crate::domain::ErrorCode`].
#[derive(ToSchema)]
#[schema(as = crate::domain::ErrorCode)]
pub enum ErrorCodeSchema {
    /// Input failed parsing or validation.
    #[schema(rename = "invalid_request")]
    InvalidRequest,
    /// Missing or rejected bearer token.
    #[schema(rename = "unauthorized")]
    Unauthorized,
    /// The caller's role is not allowed.
    #[schema(rename = "forbidden")]
    Forbidden,
    /// No such user.
    #[schema(rename = "not_found")]
    NotFound,
    /// A unique value is already taken.
    #[schema(rename = "conflict")]
    Conflict,
    /// The user store is unreachable.
    #[schema(rename = "service_unavailable")]
    ServiceUnavailable,
    /// Redacted server-side failure.
    #[schema(rename = "internal_error")]
    InternalError,
}

/// OpenAPI schema for [`crate::domain::Error`].
#[derive(ToSchema)]
#[schema(as = crate::domain::Error)]
#[schema(rename_all = "camelCase")]
#[expect(
    dead_code,
    reason = "Used only for OpenAPI schema generation via utoipa"
)]
pub struct ErrorSchema {
    /// Failure category.
    #[schema(example = "not_found")]
    code: ErrorCodeSchema,
    /// Message safe to show to the caller.
    #[schema(example = "User not found!")]
    message: String,
    /// Correlation identifier, also sent in the `trace-id` header.
    #[schema(example = "3fa85f64-5717-4562-b3fc-2c963f66afa6")]
    trace_id: Option<String>,
    /// Supplementary details such as the offending `field`.
    details: Option<serde_json::Value>,
}

/// OpenAPI schema for [`crate::domain::Role`].
#[derive(ToSchema)]
#[schema(as = crate::domain::Role)]
pub enum RoleSchema {
    #[schema(rename = "SUPERUSER")]
    Superuser,
    #[schema(rename = "ADMIN")]
    Admin,
    #[schema(rename = "MEMBER")]
    Member,
    #[schema(rename = "GUEST")]
    Guest,
}

/// OpenAPI schema for [`crate::domain::User`], the standard projection.
#[derive(ToSchema)]
#[schema(as = crate::domain::User)]
#[schema(rename_all = "camelCase")]
#[expect(
    dead_code,
    reason = "Used only for OpenAPI schema generation via utoipa"
)]
pub struct UserSchema {
    #[schema(example = "3fa85f64-5717-4562-b3fc-2c963f66afa6")]
    id: String,
    /// Unique, case-sensitive handle.
    #[schema(example = "alice")]
    name: String,
    #[schema(example = "alice@example.com")]
    email: String,
    #[schema(example = "Alice Liddell")]
    fullname: Option<String>,
    /// Photo URL.
    photo: Option<String>,
    role: RoleSchema,
    is_deleted: bool,
    #[schema(value_type = String, format = DateTime)]
    created_at: String,
    #[schema(value_type = String, format = DateTime)]
    updated_at: String,
    #[schema(value_type = Option<String>, format = DateTime)]
    deleted_at: Option<String>,
}

/// OpenAPI schema for [`crate::domain::UserRecord`].
///
/// The full stored record, returned only by the by-email lookup.
#[derive(ToSchema)]
#[schema(as = crate::domain::UserRecord)]
#[schema(rename_all = "camelCase")]
#[expect(
    dead_code,
    reason = "Used only for OpenAPI schema generation via utoipa"
)]
pub struct UserRecordSchema {
    #[schema(example = "3fa85f64-5717-4562-b3fc-2c963f66afa6")]
    id: String,
    #[schema(example = "alice")]
    name: String,
    #[schema(example = "alice@example.com")]
    email: String,
    fullname: Option<String>,
    photo: Option<String>,
    role: RoleSchema,
    is_deleted: bool,
    #[schema(value_type = String, format = DateTime)]
    created_at: String,
    #[schema(value_type = String, format = DateTime)]
    updated_at: String,
    #[schema(value_type = Option<String>, format = DateTime)]
    deleted_at: Option<String>,
    /// Stored password hash.
    password_hash: Option<String>,
    /// Stored refresh token hash.
    refresh_token_hash: Option<String>,
}
