//! Driving port for user directory reads.
//!
//! Inbound adapters use this port to list and look up users without
//! importing persistence concerns.

use async_trait::async_trait;

use crate::domain::{
    Email, Error, PageRequest, User, UserFilter, UserId, UserName, UserPage, UserRecord,
};

/// Read-side use cases of the user directory.
///
/// Absent records are `Ok(None)`, never an error.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait UsersQuery: Send + Sync {
    /// One page of users matching `filter`, plus the total match count.
    async fn list_users(&self, filter: &UserFilter, page: PageRequest) -> Result<UserPage, Error>;

    async fn find_user_by_id(&self, id: &UserId) -> Result<Option<User>, Error>;

    async fn find_user_by_name(&self, name: &UserName) -> Result<Option<User>, Error>;

    /// Lookup by email returns the full record, credential fields included.
    async fn find_user_by_email(&self, email: &Email) -> Result<Option<UserRecord>, Error>;
}
