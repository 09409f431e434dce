//! Driven port for the canonical user record store.
//!
//! The store owns every user record. Adapters translate [`UserFilter`] and
//! [`RecordChanges`] into their native query language and must apply each
//! [`RecordChanges`] as a single write.

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::domain::{
    Email, NewUser, PageWindow, User, UserChanges, UserFilter, UserId, UserName, UserRecord,
};

use super::define_port_error;

define_port_error! {
    /// Errors raised by user record store adapters.
    pub enum UserStoreError {
        /// Store connection could not be established.
        Connection { message: String } => "user store connection failed: {message}",
        /// Query or mutation failed during execution.
        Query { message: String } => "user store query failed: {message}",
        /// A unique column already holds the submitted value.
        Conflict { field: String } => "user store unique constraint violated on {field}",
        /// The addressed record does not exist.
        NotFound => "user record not found",
    }
}

/// Unique key addressing a single user record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UserKey {
    Id(UserId),
    Name(UserName),
    Email(Email),
}

impl UserKey {
    /// Whether `user` is the record this key addresses.
    pub fn addresses(&self, user: &User) -> bool {
        match self {
            Self::Id(id) => user.id.as_uuid() == id.as_uuid(),
            Self::Name(name) => &user.name == name,
            Self::Email(email) => &user.email == email,
        }
    }
}

/// Soft-delete transition written together with any profile changes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeletionMark {
    /// Set `is_deleted = true` and `deleted_at = at`.
    Deleted { at: DateTime<Utc> },
    /// Set `is_deleted = false` and clear `deleted_at`.
    Restored,
}

impl DeletionMark {
    pub fn is_deleted(self) -> bool {
        matches!(self, Self::Deleted { .. })
    }

    pub fn deleted_at(self) -> Option<DateTime<Utc>> {
        match self {
            Self::Deleted { at } => Some(at),
            Self::Restored => None,
        }
    }
}

/// One store write.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RecordChanges {
    pub profile: UserChanges,
    pub deletion: Option<DeletionMark>,
}

impl RecordChanges {
    pub fn profile(changes: UserChanges) -> Self {
        Self {
            profile: changes,
            deletion: None,
        }
    }

    pub fn soft_delete(at: DateTime<Utc>) -> Self {
        Self {
            profile: UserChanges::default(),
            deletion: Some(DeletionMark::Deleted { at }),
        }
    }

    pub fn restore() -> Self {
        Self {
            profile: UserChanges::default(),
            deletion: Some(DeletionMark::Restored),
        }
    }

    /// Whether the write would change nothing.
    pub fn is_empty(&self) -> bool {
        self.profile.is_empty() && self.deletion.is_none()
    }

    /// Apply the write to an in-memory record.
    pub fn apply_to(&self, user: &mut User) {
        self.profile.apply_to(user);
        if let Some(mark) = self.deletion {
            user.is_deleted = mark.is_deleted();
            user.deleted_at = mark.deleted_at();
        }
    }
}

/// Port for the user record store.
///
/// Listings are ordered by `created_at` then `id` so that page windows are
/// stable between calls.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait UserRecordStore: Send + Sync {
    /// Fetch one window of records matching `filter`.
    async fn find_many(
        &self,
        filter: &UserFilter,
        window: PageWindow,
    ) -> Result<Vec<UserRecord>, UserStoreError>;

    /// Count every record matching `filter`, ignoring pagination.
    async fn count(&self, filter: &UserFilter) -> Result<u64, UserStoreError>;

    /// Fetch the record addressed by `key`, if any.
    async fn find_unique(&self, key: &UserKey) -> Result<Option<UserRecord>, UserStoreError>;

    /// Insert a new record. The store assigns `id` and timestamps.
    async fn create(&self, user: &NewUser) -> Result<UserRecord, UserStoreError>;

    /// Apply `changes` to the record addressed by `key` in one write.
    ///
    /// Returns [`UserStoreError::NotFound`] when no record matches.
    async fn update(
        &self,
        key: &UserKey,
        changes: &RecordChanges,
    ) -> Result<UserRecord, UserStoreError>;

    /// Permanently remove the record addressed by `key`.
    ///
    /// Returns [`UserStoreError::NotFound`] when no record matches.
    async fn delete(&self, key: &UserKey) -> Result<(), UserStoreError>;
}
