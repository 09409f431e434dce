//! In-process user record store.
//!
//! Serves deployments without a database and backs the integration suites.
//! Filtering goes through [`UserFilter::matches`] so listing semantics match
//! the SQL store, including the `created_at`, `id` ordering.

use std::sync::{Arc, Mutex, MutexGuard};

use async_trait::async_trait;
use mockable::Clock;
use tracing::debug;

use crate::domain::ports::{RecordChanges, UserKey, UserRecordStore, UserStoreError};
use crate::domain::{NewUser, PageWindow, User, UserFilter, UserId, UserRecord};

/// Mutex-guarded vector of records. The lock is never held across `.await`.
pub struct InMemoryUserRecordStore {
    records: Mutex<Vec<UserRecord>>,
    clock: Arc<dyn Clock>,
}

impl InMemoryUserRecordStore {
    /// Create an empty store stamping `created_at`/`updated_at` from `clock`.
    pub fn new(clock: Arc<dyn Clock>) -> Self {
        Self {
            records: Mutex::new(Vec::new()),
            clock,
        }
    }

    fn lock(&self) -> Result<MutexGuard<'_, Vec<UserRecord>>, UserStoreError> {
        self.records
            .lock()
            .map_err(|_| UserStoreError::query("in-memory user store lock poisoned"))
    }
}

fn ensure_unique(
    records: &[UserRecord],
    candidate: &User,
    skip: Option<&UserId>,
) -> Result<(), UserStoreError> {
    let others = records
        .iter()
        .filter(|record| Some(&record.user.id) != skip);
    for record in others {
        if record.user.name == candidate.name {
            return Err(UserStoreError::conflict("name"));
        }
        if record.user.email == candidate.email {
            return Err(UserStoreError::conflict("email"));
        }
    }
    Ok(())
}

#[async_trait]
impl UserRecordStore for InMemoryUserRecordStore {
    async fn find_many(
        &self,
        filter: &UserFilter,
        window: PageWindow,
    ) -> Result<Vec<UserRecord>, UserStoreError> {
        let records = self.lock()?;
        let mut matching: Vec<&UserRecord> = records
            .iter()
            .filter(|record| filter.matches(&record.user))
            .collect();
        matching.sort_by(|a, b| {
            (a.user.created_at, a.user.id.as_uuid()).cmp(&(b.user.created_at, b.user.id.as_uuid()))
        });
        let skip = usize::try_from(window.skip).unwrap_or(usize::MAX);
        let take = usize::try_from(window.take).unwrap_or(usize::MAX);
        Ok(matching.into_iter().skip(skip).take(take).cloned().collect())
    }

    async fn count(&self, filter: &UserFilter) -> Result<u64, UserStoreError> {
        let records = self.lock()?;
        let total = records
            .iter()
            .filter(|record| filter.matches(&record.user))
            .count();
        Ok(total as u64)
    }

    async fn find_unique(&self, key: &UserKey) -> Result<Option<UserRecord>, UserStoreError> {
        let records = self.lock()?;
        Ok(records
            .iter()
            .find(|record| key.addresses(&record.user))
            .cloned())
    }

    async fn create(&self, user: &NewUser) -> Result<UserRecord, UserStoreError> {
        let now = self.clock.utc();
        let record = UserRecord {
            user: User {
                id: UserId::random(),
                name: user.name.clone(),
                email: user.email.clone(),
                fullname: user.fullname.clone(),
                photo: user.photo.clone(),
                role: user.role,
                is_deleted: false,
                created_at: now,
                updated_at: now,
                deleted_at: None,
            },
            password_hash: user.password_hash.clone(),
            refresh_token_hash: user.refresh_token_hash.clone(),
        };

        let mut records = self.lock()?;
        ensure_unique(&records, &record.user, None)?;
        records.push(record.clone());
        debug!(user_id = %record.user.id, "stored new in-memory user");
        Ok(record)
    }

    async fn update(
        &self,
        key: &UserKey,
        changes: &RecordChanges,
    ) -> Result<UserRecord, UserStoreError> {
        let now = self.clock.utc();
        let mut records = self.lock()?;
        let index = records
            .iter()
            .position(|record| key.addresses(&record.user))
            .ok_or_else(UserStoreError::not_found)?;

        if changes.is_empty() {
            return Ok(records[index].clone());
        }

        let mut updated = records[index].clone();
        changes.apply_to(&mut updated.user);
        ensure_unique(&records, &updated.user, Some(&updated.user.id))?;
        updated.user.updated_at = now;
        records[index] = updated.clone();
        Ok(updated)
    }

    async fn delete(&self, key: &UserKey) -> Result<(), UserStoreError> {
        let mut records = self.lock()?;
        let before = records.len();
        records.retain(|record| !key.addresses(&record.user));
        if records.len() == before {
            return Err(UserStoreError::not_found());
        }
        Ok(())
    }
}
