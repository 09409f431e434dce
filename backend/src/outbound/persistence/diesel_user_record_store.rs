//! PostgreSQL-backed `UserRecordStore` implementation using Diesel ORM.
//!
//! Listing filters are compiled into a boxed query so that `find_many` and
//! `count` share one `WHERE` clause. Writes are single statements; unique
//! violations are reported with the offending column.

use async_trait::async_trait;
use diesel::pg::Pg;
use diesel::prelude::*;
use diesel_async::RunQueryDsl;
use tracing::debug;

use crate::domain::ports::{RecordChanges, UserKey, UserRecordStore, UserStoreError};
use crate::domain::{NewUser, PageWindow, UserFilter, UserRecord};

use super::models::{NewUserRow, UserChangeset, UserRow};
use super::pool::DbPool;
use super::schema::users;

/// Diesel-backed implementation of the [`UserRecordStore`] port.
#[derive(Clone)]
pub struct DieselUserRecordStore {
    pool: DbPool,
}

impl DieselUserRecordStore {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

/// Expand `$body` once per key variant with `$filter` bound to the matching
/// column predicate.
macro_rules! with_key_filter {
    ($key:expr, |$filter:ident| $body:expr) => {
        match $key {
            UserKey::Id(id) => {
                let $filter = users::id.eq(*id.as_uuid());
                $body
            }
            UserKey::Name(name) => {
                let $filter = users::name.eq(name.as_ref().to_owned());
                $body
            }
            UserKey::Email(email) => {
                let $filter = users::email.eq(email.as_ref().to_owned());
                $body
            }
        }
    };
}

/// Column named by a unique constraint, if it is one of ours.
fn conflicting_field(constraint: Option<&str>, message: &str) -> Option<&'static str> {
    let haystack = constraint.unwrap_or(message);
    if haystack.contains("users_name_key") {
        Some("name")
    } else if haystack.contains("users_email_key") {
        Some("email")
    } else {
        None
    }
}

fn map_diesel_error(error: diesel::result::Error) -> UserStoreError {
    use diesel::result::{DatabaseErrorKind, Error as DieselError};

    match &error {
        DieselError::DatabaseError(kind, info) => {
            debug!(?kind, message = info.message(), "diesel operation failed");
        }
        _ => debug!(
            error_type = %std::any::type_name_of_val(&error),
            "diesel operation failed"
        ),
    }

    match error {
        DieselError::NotFound => UserStoreError::not_found(),
        DieselError::DatabaseError(DatabaseErrorKind::UniqueViolation, info) => {
            match conflicting_field(info.constraint_name(), info.message()) {
                Some(field) => UserStoreError::conflict(field),
                None => UserStoreError::query("unique constraint violated"),
            }
        }
        DieselError::DatabaseError(DatabaseErrorKind::ClosedConnection, _) => {
            UserStoreError::connection("database connection error")
        }
        DieselError::QueryBuilderError(_) => UserStoreError::query("database query error"),
        _ => UserStoreError::query("database error"),
    }
}

/// `ILIKE` pattern matching `needle` anywhere, with wildcards escaped.
fn contains_pattern(needle: &str) -> String {
    let mut pattern = String::with_capacity(needle.len() + 2);
    pattern.push('%');
    for ch in needle.chars() {
        if matches!(ch, '%' | '_' | '\\') {
            pattern.push('\\');
        }
        pattern.push(ch);
    }
    pattern.push('%');
    pattern
}

fn filtered(filter: &UserFilter) -> users::BoxedQuery<'static, Pg> {
    let mut query = users::table
        .into_boxed()
        .filter(users::is_deleted.eq(filter.scope().is_deleted()));
    if let Some(needle) = filter.name_contains() {
        query = query.filter(users::name.ilike(contains_pattern(needle)));
    }
    if let Some(needle) = filter.fullname_contains() {
        query = query.filter(users::fullname.ilike(contains_pattern(needle)));
    }
    if let Some(role) = filter.role() {
        query = query.filter(users::role.eq(role.as_str()));
    }
    query
}

fn to_records(rows: Vec<UserRow>) -> Result<Vec<UserRecord>, UserStoreError> {
    rows.into_iter().map(UserRecord::try_from).collect()
}

#[async_trait]
impl UserRecordStore for DieselUserRecordStore {
    async fn find_many(
        &self,
        filter: &UserFilter,
        window: PageWindow,
    ) -> Result<Vec<UserRecord>, UserStoreError> {
        let mut conn = self.pool.get().await?;
        let offset = i64::try_from(window.skip).unwrap_or(i64::MAX);

        let rows: Vec<UserRow> = filtered(filter)
            .order((users::created_at.asc(), users::id.asc()))
            .offset(offset)
            .limit(i64::from(window.take))
            .select(UserRow::as_select())
            .load(&mut conn)
            .await
            .map_err(map_diesel_error)?;

        to_records(rows)
    }

    async fn count(&self, filter: &UserFilter) -> Result<u64, UserStoreError> {
        let mut conn = self.pool.get().await?;

        let total: i64 = filtered(filter)
            .count()
            .get_result(&mut conn)
            .await
            .map_err(map_diesel_error)?;

        Ok(u64::try_from(total).unwrap_or_default())
    }

    async fn find_unique(&self, key: &UserKey) -> Result<Option<UserRecord>, UserStoreError> {
        let mut conn = self.pool.get().await?;

        let row: Option<UserRow> = with_key_filter!(key, |predicate| {
            users::table
                .filter(predicate)
                .select(UserRow::as_select())
                .first(&mut conn)
                .await
                .optional()
                .map_err(map_diesel_error)?
        });

        row.map(UserRecord::try_from).transpose()
    }

    async fn create(&self, user: &NewUser) -> Result<UserRecord, UserStoreError> {
        let mut conn = self.pool.get().await?;

        let row: UserRow = diesel::insert_into(users::table)
            .values(NewUserRow::from(user))
            .returning(UserRow::as_returning())
            .get_result(&mut conn)
            .await
            .map_err(map_diesel_error)?;

        UserRecord::try_from(row)
    }

    async fn update(
        &self,
        key: &UserKey,
        changes: &RecordChanges,
    ) -> Result<UserRecord, UserStoreError> {
        let changeset = UserChangeset::from(changes);
        if changeset.is_empty() {
            return self
                .find_unique(key)
                .await?
                .ok_or_else(UserStoreError::not_found);
        }

        let mut conn = self.pool.get().await?;
        let row: Option<UserRow> = with_key_filter!(key, |predicate| {
            diesel::update(users::table.filter(predicate))
                .set(&changeset)
                .returning(UserRow::as_returning())
                .get_result(&mut conn)
                .await
                .optional()
                .map_err(map_diesel_error)?
        });

        row.ok_or_else(UserStoreError::not_found)
            .and_then(UserRecord::try_from)
    }

    async fn delete(&self, key: &UserKey) -> Result<(), UserStoreError> {
        let mut conn = self.pool.get().await?;

        let removed = with_key_filter!(key, |predicate| {
            diesel::delete(users::table.filter(predicate))
                .execute(&mut conn)
                .await
                .map_err(map_diesel_error)?
        });

        if removed == 0 {
            return Err(UserStoreError::not_found());
        }
        Ok(())
    }
}
