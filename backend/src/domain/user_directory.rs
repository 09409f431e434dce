//! User directory service.
//!
//! Implements the [`UsersQuery`] and [`UsersCommand`] driving ports over a
//! [`UserRecordStore`]. The service holds no state between calls: each
//! operation is a short sequence of store calls, and every user it returns
//! passes through the standard projection except the by-email lookup.

use std::sync::Arc;

use async_trait::async_trait;
use futures_util::future::try_join;
use mockable::Clock;
use serde_json::json;
use tracing::{debug, info};

use crate::domain::ports::{
    RecordChanges, UserKey, UserRecordStore, UserStoreError, UsersCommand, UsersQuery,
};
use crate::domain::{
    Email, Error, NewUser, PageRequest, User, UserChanges, UserFilter, UserId, UserName, UserPage,
    UserRecord,
};

/// Message carried by every not-found error from the directory.
pub const USER_NOT_FOUND_MESSAGE: &str = "User not found!";

/// Data-access facade over the user record store.
#[derive(Clone)]
pub struct UserDirectory<S> {
    store: Arc<S>,
    clock: Arc<dyn Clock>,
}

impl<S> UserDirectory<S> {
    /// Create a directory backed by `store`, stamping soft deletes with `clock`.
    pub fn new(store: Arc<S>, clock: Arc<dyn Clock>) -> Self {
        Self { store, clock }
    }
}

impl<S> UserDirectory<S>
where
    S: UserRecordStore,
{
    fn map_store_error(error: UserStoreError) -> Error {
        match error {
            UserStoreError::Connection { message } => {
                Error::service_unavailable(format!("user store unavailable: {message}"))
            }
            UserStoreError::Query { message } => {
                Error::internal(format!("user store error: {message}"))
            }
            UserStoreError::Conflict { field } => {
                Error::conflict(format!("a user with this {field} already exists"))
                    .with_details(json!({ "field": field, "code": "duplicate_value" }))
            }
            UserStoreError::NotFound => Error::not_found(USER_NOT_FOUND_MESSAGE),
        }
    }

    async fn find_record(&self, key: &UserKey) -> Result<Option<UserRecord>, Error> {
        self.store
            .find_unique(key)
            .await
            .map_err(Self::map_store_error)
    }

    /// Existence check preceding every by-name mutation.
    async fn require_existing(&self, name: &UserName) -> Result<UserKey, Error> {
        let key = UserKey::Name(name.clone());
        match self.find_record(&key).await? {
            Some(_) => Ok(key),
            None => {
                debug!(user_name = %name, "mutation target does not exist");
                Err(Error::not_found(USER_NOT_FOUND_MESSAGE))
            }
        }
    }

    async fn write(&self, key: &UserKey, changes: &RecordChanges) -> Result<User, Error> {
        self.store
            .update(key, changes)
            .await
            .map(UserRecord::into_projection)
            .map_err(Self::map_store_error)
    }
}

#[async_trait]
impl<S> UsersQuery for UserDirectory<S>
where
    S: UserRecordStore,
{
    async fn list_users(&self, filter: &UserFilter, page: PageRequest) -> Result<UserPage, Error> {
        let window = page.window();
        let (records, total_count) = try_join(
            self.store.find_many(filter, window),
            self.store.count(filter),
        )
        .await
        .map_err(Self::map_store_error)?;

        debug!(
            page = page.page(),
            page_size = page.page_size(),
            returned = records.len(),
            total_count,
            "listed users"
        );
        Ok(UserPage {
            items: records.into_iter().map(UserRecord::into_projection).collect(),
            total_count,
        })
    }

    async fn find_user_by_id(&self, id: &UserId) -> Result<Option<User>, Error> {
        let record = self.find_record(&UserKey::Id(id.clone())).await?;
        Ok(record.map(UserRecord::into_projection))
    }

    async fn find_user_by_name(&self, name: &UserName) -> Result<Option<User>, Error> {
        let record = self.find_record(&UserKey::Name(name.clone())).await?;
        Ok(record.map(UserRecord::into_projection))
    }

    async fn find_user_by_email(&self, email: &Email) -> Result<Option<UserRecord>, Error> {
        self.find_record(&UserKey::Email(email.clone())).await
    }
}

#[async_trait]
impl<S> UsersCommand for UserDirectory<S>
where
    S: UserRecordStore,
{
    async fn create_user(&self, user: &NewUser) -> Result<User, Error> {
        let record = self
            .store
            .create(user)
            .await
            .map_err(Self::map_store_error)?;
        info!(user_id = %record.user.id, user_name = %record.user.name, "user created");
        Ok(record.into_projection())
    }

    async fn update_user(&self, name: &UserName, changes: &UserChanges) -> Result<User, Error> {
        let key = self.require_existing(name).await?;
        let user = self
            .write(&key, &RecordChanges::profile(changes.clone()))
            .await?;
        info!(user_id = %user.id, user_name = %name, "user updated");
        Ok(user)
    }

    async fn restore_user(&self, name: &UserName) -> Result<User, Error> {
        let key = self.require_existing(name).await?;
        let user = self.write(&key, &RecordChanges::restore()).await?;
        info!(user_id = %user.id, user_name = %name, "user restored");
        Ok(user)
    }

    async fn soft_delete_user(&self, name: &UserName) -> Result<(), Error> {
        let key = self.require_existing(name).await?;
        let user = self
            .write(&key, &RecordChanges::soft_delete(self.clock.utc()))
            .await?;
        info!(user_id = %user.id, user_name = %name, "user soft deleted");
        Ok(())
    }

    async fn hard_delete_user(&self, name: &UserName) -> Result<(), Error> {
        let key = self.require_existing(name).await?;
        self.store
            .delete(&key)
            .await
            .map_err(Self::map_store_error)?;
        info!(user_name = %name, "user permanently deleted");
        Ok(())
    }
}

#[cfg(test)]
#[path = "user_directory_tests.rs"]
mod tests;
