pub mod memory;
pub mod pool;
pub mod postgres;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::error::Result;
use crate::models::time_entry::{Completion, EntrySpan, TimeEntry};
use crate::models::user::{UpdateProfile, UpsertUser, User};

pub use memory::MemoryStore;
pub use postgres::PgStore;

/// Persistence seam for users and time entries.
///
/// `insert_active_entry` and `complete_active_entry` are conditional writes:
/// each must check and mutate in one atomic step so that concurrent callers
/// can never produce two open entries for a user or complete an entry twice.
#[async_trait]
pub trait Store: Send + Sync {
    async fn get_user(&self, id: &str) -> Result<Option<User>>;

    async fn upsert_user(&self, user: UpsertUser, now: DateTime<Utc>) -> Result<User>;

    /// Creates a bare, active user record when none exists for `id`.
    /// Existing records are left untouched.
    async fn ensure_user(&self, id: &str, now: DateTime<Utc>) -> Result<()>;

    /// Returns `None` when the user does not exist.
    async fn update_profile(
        &self,
        id: &str,
        profile: UpdateProfile,
        now: DateTime<Utc>,
    ) -> Result<Option<User>>;

    async fn list_active_users(&self) -> Result<Vec<User>>;

    async fn count_active_users(&self) -> Result<i64>;

    /// Inserts a new active entry unless the user already has one, in which
    /// case nothing is written and `None` is returned. The user record must
    /// already exist.
    async fn insert_active_entry(
        &self,
        user_id: &str,
        clock_in_time: DateTime<Utc>,
    ) -> Result<Option<TimeEntry>>;

    /// Completes the entry only if it belongs to `user_id` and is still
    /// active. Returns `None` when no row matched.
    async fn complete_active_entry(
        &self,
        id: Uuid,
        user_id: &str,
        completion: &Completion,
    ) -> Result<Option<TimeEntry>>;

    async fn get_entry(&self, id: Uuid) -> Result<Option<TimeEntry>>;

    async fn get_active_entry(&self, user_id: &str) -> Result<Option<TimeEntry>>;

    /// Newest clock-in first.
    async fn list_user_entries(&self, user_id: &str, limit: i64) -> Result<Vec<TimeEntry>>;

    /// Newest clock-in first.
    async fn list_entries(&self) -> Result<Vec<TimeEntry>>;

    /// Spans clocked in at or after `since`, optionally for a single user.
    async fn spans_since(
        &self,
        since: DateTime<Utc>,
        user_id: Option<&str>,
    ) -> Result<Vec<EntrySpan>>;

    async fn active_spans(&self) -> Result<Vec<EntrySpan>>;

    async fn count_active_entries(&self) -> Result<i64>;

    /// Latest clock-in per user, across all entries.
    async fn last_clock_ins(&self) -> Result<Vec<(String, DateTime<Utc>)>>;
}
