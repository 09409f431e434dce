//! Domain primitives, ports and services.
//!
//! Purpose: Define the strongly typed user model, the listing and
//! pagination vocabulary, and the [`UserDirectory`] service that drives the
//! record store. Nothing in this module knows about HTTP or SQL.
//!
//! Public surface:
//! - Error, ErrorCode: transport-agnostic failure payload.
//! - User, UserRecord, NewUser, UserChanges: the user data model.
//! - UserFilter, PageRequest, UserPage: listing inputs and outputs.
//! - UserDirectory: implementation of the `UsersQuery` and `UsersCommand`
//!   driving ports.

pub mod auth;
pub mod error;
pub mod ports;
pub mod trace_id;
pub mod user;
pub mod user_directory;
pub mod user_query;

pub use self::auth::Principal;
pub use self::error::{Error, ErrorCode, ErrorPayloadError};
pub use self::trace_id::{TRACE_ID_HEADER, TraceId};
pub use self::user::{
    EMAIL_MAX, Email, NewUser, Role, USER_NAME_MAX, User, UserChanges, UserId, UserName,
    UserRecord, UserValidationError,
};
pub use self::user_directory::{USER_NOT_FOUND_MESSAGE, UserDirectory};
pub use self::user_query::{
    DEFAULT_PAGE, DEFAULT_PAGE_SIZE, DeletedScope, PageRequest, PageRequestError, PageWindow,
    UserFilter, UserPage,
};
