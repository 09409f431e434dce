//! Internal Diesel row structs for the `users` table.
//!
//! These types never leave the persistence layer; the store converts them to
//! and from domain types at its boundary.

use std::str::FromStr;

use chrono::{DateTime, Utc};
use diesel::prelude::*;
use uuid::Uuid;

use crate::domain::ports::{RecordChanges, UserStoreError};
use crate::domain::{Email, NewUser, Role, User, UserId, UserName, UserRecord};

use super::schema::users;

/// Row struct for reading from the users table.
#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = users)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub(crate) struct UserRow {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    pub fullname: Option<String>,
    pub photo: Option<String>,
    pub role: String,
    pub password_hash: Option<String>,
    pub refresh_token_hash: Option<String>,
    pub is_deleted: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub deleted_at: Option<DateTime<Utc>>,
}

impl TryFrom<UserRow> for UserRecord {
    type Error = UserStoreError;

    fn try_from(row: UserRow) -> Result<Self, Self::Error> {
        let invalid = |column: &str, error: &dyn std::fmt::Display| {
            UserStoreError::query(format!("stored {column} for user {} is invalid: {error}", row.id))
        };
        let name = UserName::new(row.name.clone()).map_err(|err| invalid("name", &err))?;
        let email = Email::new(row.email.clone()).map_err(|err| invalid("email", &err))?;
        let role = Role::from_str(&row.role).map_err(|err| invalid("role", &err))?;

        Ok(UserRecord {
            user: User {
                id: UserId::from_uuid(row.id),
                name,
                email,
                fullname: row.fullname,
                photo: row.photo,
                role,
                is_deleted: row.is_deleted,
                created_at: row.created_at,
                updated_at: row.updated_at,
                deleted_at: row.deleted_at,
            },
            password_hash: row.password_hash,
            refresh_token_hash: row.refresh_token_hash,
        })
    }
}

/// Insertable struct for creating user records.
#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = users)]
pub(crate) struct NewUserRow<'a> {
    pub name: &'a str,
    pub email: &'a str,
    pub fullname: Option<&'a str>,
    pub photo: Option<&'a str>,
    pub role: &'static str,
    pub password_hash: Option<&'a str>,
    pub refresh_token_hash: Option<&'a str>,
}

impl<'a> From<&'a NewUser> for NewUserRow<'a> {
    fn from(user: &'a NewUser) -> Self {
        Self {
            name: user.name.as_ref(),
            email: user.email.as_ref(),
            fullname: user.fullname.as_deref(),
            photo: user.photo.as_deref(),
            role: user.role.as_str(),
            password_hash: user.password_hash.as_deref(),
            refresh_token_hash: user.refresh_token_hash.as_deref(),
        }
    }
}

/// Changeset for a single store write.
///
/// `None` leaves a column untouched; `deleted_at: Some(None)` clears it.
#[derive(Debug, Clone, Default, AsChangeset)]
#[diesel(table_name = users)]
pub(crate) struct UserChangeset<'a> {
    pub name: Option<&'a str>,
    pub fullname: Option<&'a str>,
    pub role: Option<&'static str>,
    pub photo: Option<&'a str>,
    pub is_deleted: Option<bool>,
    pub deleted_at: Option<Option<DateTime<Utc>>>,
}

impl UserChangeset<'_> {
    /// Diesel refuses an `UPDATE` without columns.
    pub fn is_empty(&self) -> bool {
        self.name.is_none()
            && self.fullname.is_none()
            && self.role.is_none()
            && self.photo.is_none()
            && self.is_deleted.is_none()
            && self.deleted_at.is_none()
    }
}

impl<'a> From<&'a RecordChanges> for UserChangeset<'a> {
    fn from(changes: &'a RecordChanges) -> Self {
        let profile = &changes.profile;
        Self {
            name: profile.name.as_ref().map(AsRef::as_ref),
            fullname: profile.fullname.as_deref(),
            role: profile.role.map(Role::as_str),
            photo: profile.photo.as_deref(),
            is_deleted: changes.deletion.map(|mark| mark.is_deleted()),
            deleted_at: changes.deletion.map(|mark| mark.deleted_at()),
        }
    }
}
