use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::database::Store;
use crate::error::{Error, Result};
use crate::models::time_entry::{Completion, EntrySpan, EntryStatus, TimeEntry};
use crate::models::user::{UpdateProfile, UpsertUser, User};

#[derive(Default)]
struct Tables {
    users: HashMap<String, User>,
    entries: Vec<TimeEntry>,
}

/// Process-local store. Every conditional write runs under a single write
/// lock, which gives it the same atomicity as the Postgres statements.
#[derive(Clone, Default)]
pub struct MemoryStore {
    inner: Arc<RwLock<Tables>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts or replaces a user record verbatim.
    pub async fn put_user(&self, user: User) {
        self.inner.write().await.users.insert(user.id.clone(), user);
    }

    /// Inserts an entry verbatim, bypassing the lifecycle rules. Intended
    /// for seeding history.
    pub async fn put_entry(&self, entry: TimeEntry) {
        self.inner.write().await.entries.push(entry);
    }
}

fn newest_first(entries: &mut [TimeEntry]) {
    entries.sort_by(|a, b| {
        b.clock_in_time
            .cmp(&a.clock_in_time)
            .then_with(|| b.id.cmp(&a.id))
    });
}

#[async_trait]
impl Store for MemoryStore {
    async fn get_user(&self, id: &str) -> Result<Option<User>> {
        Ok(self.inner.read().await.users.get(id).cloned())
    }

    async fn upsert_user(&self, user: UpsertUser, now: DateTime<Utc>) -> Result<User> {
        let mut tables = self.inner.write().await;
        let record = tables
            .users
            .entry(user.id.clone())
            .and_modify(|existing| {
                if user.first_name.is_some() {
                    existing.first_name = user.first_name.clone();
                }
                if user.last_name.is_some() {
                    existing.last_name = user.last_name.clone();
                }
                if user.email.is_some() {
                    existing.email = user.email.clone();
                }
                if user.profile_image_url.is_some() {
                    existing.profile_image_url = user.profile_image_url.clone();
                }
                existing.is_admin = user.is_admin;
                existing.updated_at = now;
            })
            .or_insert_with(|| User {
                id: user.id.clone(),
                first_name: user.first_name.clone(),
                last_name: user.last_name.clone(),
                email: user.email.clone(),
                phone: None,
                profile_image_url: user.profile_image_url.clone(),
                is_admin: user.is_admin,
                is_active: true,
                created_at: now,
                updated_at: now,
            });
        Ok(record.clone())
    }

    async fn ensure_user(&self, id: &str, now: DateTime<Utc>) -> Result<()> {
        let mut tables = self.inner.write().await;
        tables.users.entry(id.to_string()).or_insert_with(|| User {
            id: id.to_string(),
            first_name: None,
            last_name: None,
            email: None,
            phone: None,
            profile_image_url: None,
            is_admin: false,
            is_active: true,
            created_at: now,
            updated_at: now,
        });
        Ok(())
    }

    async fn update_profile(
        &self,
        id: &str,
        profile: UpdateProfile,
        now: DateTime<Utc>,
    ) -> Result<Option<User>> {
        let mut tables = self.inner.write().await;
        let Some(user) = tables.users.get_mut(id) else {
            return Ok(None);
        };
        user.first_name = Some(profile.first_name);
        user.last_name = Some(profile.last_name);
        user.email = Some(profile.email);
        user.phone = profile.phone;
        if profile.profile_image_url.is_some() {
            user.profile_image_url = profile.profile_image_url;
        }
        user.updated_at = now;
        Ok(Some(user.clone()))
    }

    async fn list_active_users(&self) -> Result<Vec<User>> {
        let tables = self.inner.read().await;
        let mut users: Vec<User> = tables
            .users
            .values()
            .filter(|u| u.is_active)
            .cloned()
            .collect();
        users.sort_by(|a, b| {
            (&a.last_name, &a.first_name, &a.id).cmp(&(&b.last_name, &b.first_name, &b.id))
        });
        Ok(users)
    }

    async fn count_active_users(&self) -> Result<i64> {
        let tables = self.inner.read().await;
        Ok(tables.users.values().filter(|u| u.is_active).count() as i64)
    }

    async fn insert_active_entry(
        &self,
        user_id: &str,
        clock_in_time: DateTime<Utc>,
    ) -> Result<Option<TimeEntry>> {
        let mut tables = self.inner.write().await;
        // Mirrors the foreign key on time_entries.user_id.
        if !tables.users.contains_key(user_id) {
            return Err(Error::Internal(format!(
                "time entry owner {} does not exist",
                user_id
            )));
        }
        if tables
            .entries
            .iter()
            .any(|e| e.user_id == user_id && e.is_active())
        {
            return Ok(None);
        }
        let entry = TimeEntry {
            id: Uuid::new_v4(),
            user_id: user_id.to_string(),
            clock_in_time,
            clock_out_time: None,
            status: EntryStatus::Active,
            total_minutes: None,
            employee_signature: None,
            supervisor_signature: None,
            created_at: clock_in_time,
            updated_at: clock_in_time,
        };
        tables.entries.push(entry.clone());
        Ok(Some(entry))
    }

    async fn complete_active_entry(
        &self,
        id: Uuid,
        user_id: &str,
        completion: &Completion,
    ) -> Result<Option<TimeEntry>> {
        let mut tables = self.inner.write().await;
        let Some(entry) = tables
            .entries
            .iter_mut()
            .find(|e| e.id == id && e.user_id == user_id && e.is_active())
        else {
            return Ok(None);
        };
        entry.clock_out_time = Some(completion.clock_out_time);
        entry.total_minutes = Some(completion.total_minutes);
        entry.employee_signature = Some(completion.employee_signature.clone());
        entry.supervisor_signature = Some(completion.supervisor_signature.clone());
        entry.status = EntryStatus::Completed;
        entry.updated_at = completion.clock_out_time;
        Ok(Some(entry.clone()))
    }

    async fn get_entry(&self, id: Uuid) -> Result<Option<TimeEntry>> {
        let tables = self.inner.read().await;
        Ok(tables.entries.iter().find(|e| e.id == id).cloned())
    }

    async fn get_active_entry(&self, user_id: &str) -> Result<Option<TimeEntry>> {
        let tables = self.inner.read().await;
        Ok(tables
            .entries
            .iter()
            .filter(|e| e.user_id == user_id && e.is_active())
            .max_by_key(|e| e.clock_in_time)
            .cloned())
    }

    async fn list_user_entries(&self, user_id: &str, limit: i64) -> Result<Vec<TimeEntry>> {
        let tables = self.inner.read().await;
        let mut entries: Vec<TimeEntry> = tables
            .entries
            .iter()
            .filter(|e| e.user_id == user_id)
            .cloned()
            .collect();
        newest_first(&mut entries);
        entries.truncate(usize::try_from(limit).unwrap_or(0));
        Ok(entries)
    }

    async fn list_entries(&self) -> Result<Vec<TimeEntry>> {
        let mut entries = self.inner.read().await.entries.clone();
        newest_first(&mut entries);
        Ok(entries)
    }

    async fn spans_since(
        &self,
        since: DateTime<Utc>,
        user_id: Option<&str>,
    ) -> Result<Vec<EntrySpan>> {
        let tables = self.inner.read().await;
        Ok(tables
            .entries
            .iter()
            .filter(|e| e.clock_in_time >= since)
            .filter(|e| user_id.map_or(true, |id| e.user_id == id))
            .map(TimeEntry::span)
            .collect())
    }

    async fn active_spans(&self) -> Result<Vec<EntrySpan>> {
        let tables = self.inner.read().await;
        Ok(tables
            .entries
            .iter()
            .filter(|e| e.is_active())
            .map(TimeEntry::span)
            .collect())
    }

    async fn count_active_entries(&self) -> Result<i64> {
        let tables = self.inner.read().await;
        Ok(tables.entries.iter().filter(|e| e.is_active()).count() as i64)
    }

    async fn last_clock_ins(&self) -> Result<Vec<(String, DateTime<Utc>)>> {
        let tables = self.inner.read().await;
        let mut latest: HashMap<&str, DateTime<Utc>> = HashMap::new();
        for entry in &tables.entries {
            latest
                .entry(entry.user_id.as_str())
                .and_modify(|t| *t = (*t).max(entry.clock_in_time))
                .or_insert(entry.clock_in_time);
        }
        Ok(latest
            .into_iter()
            .map(|(user_id, at)| (user_id.to_string(), at))
            .collect())
    }
}
