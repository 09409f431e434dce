//! Driving port for user directory mutations.

use async_trait::async_trait;

use crate::domain::{Error, NewUser, User, UserChanges, UserName};

/// Write-side use cases of the user directory.
///
/// Every by-name mutation reports a missing user as
/// [`crate::domain::ErrorCode::NotFound`].
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait UsersCommand: Send + Sync {
    /// Store a new user as supplied.
    async fn create_user(&self, user: &NewUser) -> Result<User, Error>;

    /// Apply a partial profile update.
    async fn update_user(&self, name: &UserName, changes: &UserChanges) -> Result<User, Error>;

    /// Reverse a soft delete.
    async fn restore_user(&self, name: &UserName) -> Result<User, Error>;

    /// Mark the user deleted without removing the record.
    async fn soft_delete_user(&self, name: &UserName) -> Result<(), Error>;

    /// Remove the record permanently.
    async fn hard_delete_user(&self, name: &UserName) -> Result<(), Error>;
}
