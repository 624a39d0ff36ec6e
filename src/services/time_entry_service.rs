use std::sync::Arc;

use uuid::Uuid;

use crate::database::Store;
use crate::error::{Error, Result};
use crate::models::time_entry::{Completion, EntryStatus, TimeEntry};
use crate::utils::time::{elapsed_minutes, Clock};
use crate::utils::validation::validate_signatures;

pub const DEFAULT_HISTORY_LIMIT: i64 = 50;
pub const MAX_HISTORY_LIMIT: i64 = 500;

#[derive(Debug, Clone)]
pub struct ClockOutRequest {
    pub employee_signature: String,
    pub supervisor_signature: String,
}

/// Owns the active -> completed transition of time entries.
#[derive(Clone)]
pub struct TimeEntryService {
    store: Arc<dyn Store>,
    clock: Arc<dyn Clock>,
}

impl TimeEntryService {
    pub fn new(store: Arc<dyn Store>, clock: Arc<dyn Clock>) -> Self {
        Self { store, clock }
    }

    /// Opens a session for `user_id`. A caller without a user record yet gets
    /// a bare one, so entries always have an owner row.
    pub async fn clock_in(&self, user_id: &str) -> Result<TimeEntry> {
        let now = self.clock.now();
        self.store.ensure_user(user_id, now).await?;
        match self.store.insert_active_entry(user_id, now).await? {
            Some(entry) => {
                tracing::info!(user_id, entry_id = %entry.id, "clocked in");
                Ok(entry)
            }
            None => {
                tracing::warn!(user_id, "clock-in rejected: active entry exists");
                Err(Error::Conflict("Already clocked in".to_string()))
            }
        }
    }

    pub async fn clock_out(
        &self,
        entry_id: Uuid,
        user_id: &str,
        request: ClockOutRequest,
    ) -> Result<TimeEntry> {
        validate_signatures(&[
            ("employeeSignature", request.employee_signature.as_str()),
            ("supervisorSignature", request.supervisor_signature.as_str()),
        ])?;

        let entry = self.owned_entry(entry_id, user_id).await?;
        if entry.status == EntryStatus::Completed {
            tracing::warn!(user_id, entry_id = %entry_id, "clock-out rejected: already completed");
            return Err(Error::InvalidState(
                "Time entry is already completed".to_string(),
            ));
        }

        let clock_out_time = self.clock.now();
        let completion = Completion {
            clock_out_time,
            total_minutes: elapsed_minutes(entry.clock_in_time, clock_out_time),
            employee_signature: request.employee_signature,
            supervisor_signature: request.supervisor_signature,
        };

        // The write is conditional on the entry still being active; losing a
        // race against another clock-out lands here as `None`.
        match self
            .store
            .complete_active_entry(entry_id, user_id, &completion)
            .await?
        {
            Some(done) => {
                tracing::info!(
                    user_id,
                    entry_id = %done.id,
                    total_minutes = completion.total_minutes,
                    "clocked out"
                );
                Ok(done)
            }
            None => {
                tracing::warn!(user_id, entry_id = %entry_id, "clock-out lost race to concurrent completion");
                Err(Error::InvalidState(
                    "Time entry is already completed".to_string(),
                ))
            }
        }
    }

    pub async fn active_entry(&self, user_id: &str) -> Result<Option<TimeEntry>> {
        self.store.get_active_entry(user_id).await
    }

    pub async fn user_history(&self, user_id: &str, limit: Option<i64>) -> Result<Vec<TimeEntry>> {
        let limit = limit
            .unwrap_or(DEFAULT_HISTORY_LIMIT)
            .clamp(1, MAX_HISTORY_LIMIT);
        self.store.list_user_entries(user_id, limit).await
    }

    pub async fn all_entries(&self) -> Result<Vec<TimeEntry>> {
        self.store.list_entries().await
    }

    /// Entries owned by someone else are reported as missing.
    async fn owned_entry(&self, entry_id: Uuid, user_id: &str) -> Result<TimeEntry> {
        match self.store.get_entry(entry_id).await? {
            Some(entry) if entry.user_id == user_id => Ok(entry),
            _ => Err(Error::NotFound("Time entry not found".to_string())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::database::MemoryStore;
    use crate::utils::time::MockClock;
    use chrono::{DateTime, Duration, TimeZone, Utc};
    use std::sync::Mutex;

    const SIG: &str = "data:image/png;base64,iVBORw0KGgo=";

    /// Hands out the queued instants in order, repeating the last one.
    fn clock_sequence(times: Vec<DateTime<Utc>>) -> Arc<dyn Clock> {
        let queue = Mutex::new(times);
        let mut clock = MockClock::new();
        clock.expect_now().returning(move || {
            let mut q = queue.lock().unwrap();
            if q.len() > 1 {
                q.remove(0)
            } else {
                q[0]
            }
        });
        Arc::new(clock)
    }

    fn service(store: &MemoryStore, times: Vec<DateTime<Utc>>) -> TimeEntryService {
        TimeEntryService::new(Arc::new(store.clone()), clock_sequence(times))
    }

    fn signatures() -> ClockOutRequest {
        ClockOutRequest {
            employee_signature: SIG.to_string(),
            supervisor_signature: SIG.to_string(),
        }
    }

    fn nine_am() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 10, 13, 9, 0, 0).unwrap()
    }

    #[tokio::test]
    async fn full_shift_records_minutes_and_signatures() {
        let store = MemoryStore::new();
        let svc = service(&store, vec![nine_am(), nine_am() + Duration::minutes(510)]);

        let entry = svc.clock_in("u1").await.unwrap();
        assert_eq!(entry.status, EntryStatus::Active);
        assert!(entry.clock_out_time.is_none());
        assert!(entry.total_minutes.is_none());

        let done = svc.clock_out(entry.id, "u1", signatures()).await.unwrap();
        assert_eq!(done.status, EntryStatus::Completed);
        assert_eq!(done.total_minutes, Some(510));
        assert_eq!(done.employee_signature.as_deref(), Some(SIG));
        assert_eq!(done.supervisor_signature.as_deref(), Some(SIG));
        assert!(svc.active_entry("u1").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn partial_minutes_are_truncated() {
        let store = MemoryStore::new();
        let out = nine_am() + Duration::minutes(125) + Duration::seconds(59);
        let svc = service(&store, vec![nine_am(), out]);
        let entry = svc.clock_in("u1").await.unwrap();
        let done = svc.clock_out(entry.id, "u1", signatures()).await.unwrap();
        assert_eq!(done.total_minutes, Some(125));
    }

    #[tokio::test]
    async fn second_clock_in_conflicts() {
        let store = MemoryStore::new();
        let svc = service(&store, vec![nine_am()]);
        svc.clock_in("u1").await.unwrap();
        let err = svc.clock_in("u1").await.unwrap_err();
        assert!(matches!(err, Error::Conflict(_)));
        assert_eq!(store.list_user_entries("u1", 10).await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn concurrent_clock_ins_leave_one_active_entry() {
        let store = MemoryStore::new();
        let svc = service(&store, vec![nine_am()]);
        let attempts: Vec<_> = (0..16)
            .map(|_| {
                let svc = svc.clone();
                tokio::spawn(async move { svc.clock_in("u1").await })
            })
            .collect();

        let mut created = 0;
        for attempt in attempts {
            if attempt.await.unwrap().is_ok() {
                created += 1;
            }
        }
        assert_eq!(created, 1);
        assert_eq!(store.count_active_entries().await.unwrap(), 1);
    }

    #[tokio::test]
    async fn clock_out_twice_is_invalid_state_and_leaves_entry() {
        let store = MemoryStore::new();
        let svc = service(
            &store,
            vec![nine_am(), nine_am() + Duration::hours(1), nine_am() + Duration::hours(2)],
        );
        let entry = svc.clock_in("u1").await.unwrap();
        let done = svc.clock_out(entry.id, "u1", signatures()).await.unwrap();

        let other = ClockOutRequest {
            employee_signature: "data:image/jpeg;base64,/9j/".to_string(),
            supervisor_signature: "data:image/jpeg;base64,/9j/".to_string(),
        };
        let err = svc.clock_out(entry.id, "u1", other).await.unwrap_err();
        assert!(matches!(err, Error::InvalidState(_)));
        assert_eq!(store.get_entry(entry.id).await.unwrap().unwrap(), done);
    }

    #[tokio::test]
    async fn clock_out_of_someone_elses_entry_is_not_found() {
        let store = MemoryStore::new();
        let svc = service(&store, vec![nine_am()]);
        let entry = svc.clock_in("owner").await.unwrap();
        let err = svc.clock_out(entry.id, "intruder", signatures()).await.unwrap_err();
        assert!(matches!(err, Error::NotFound(_)));
        assert!(store.get_entry(entry.id).await.unwrap().unwrap().is_active());
    }

    #[tokio::test]
    async fn clock_out_of_unknown_entry_is_not_found() {
        let store = MemoryStore::new();
        let svc = service(&store, vec![nine_am()]);
        let err = svc
            .clock_out(Uuid::new_v4(), "u1", signatures())
            .await
            .unwrap_err();
        assert!(matches!(err, Error::NotFound(_)));
    }

    #[tokio::test]
    async fn malformed_signature_is_rejected_without_mutation() {
        let store = MemoryStore::new();
        let svc = service(&store, vec![nine_am(), nine_am() + Duration::hours(1)]);
        let entry = svc.clock_in("u1").await.unwrap();
        let request = ClockOutRequest {
            employee_signature: "not-a-data-uri".to_string(),
            supervisor_signature: SIG.to_string(),
        };
        let err = svc.clock_out(entry.id, "u1", request).await.unwrap_err();
        match err {
            Error::Validation(errors) => {
                assert!(errors.field_errors().contains_key("employeeSignature"));
            }
            other => panic!("expected validation error, got {:?}", other),
        }
        assert_eq!(store.get_entry(entry.id).await.unwrap().unwrap(), entry);
    }

    #[tokio::test]
    async fn history_limit_is_clamped() {
        let store = MemoryStore::new();
        let svc = service(&store, vec![nine_am()]);
        let entry = svc.clock_in("u1").await.unwrap();
        let history = svc.user_history("u1", Some(0)).await.unwrap();
        assert_eq!(history, vec![entry]);
    }

    #[tokio::test]
    async fn first_clock_in_creates_the_owner_record() {
        let store = MemoryStore::new();
        let svc = service(&store, vec![nine_am()]);
        assert!(store.get_user("newcomer").await.unwrap().is_none());

        let entry = svc.clock_in("newcomer").await.unwrap();
        assert_eq!(entry.status, EntryStatus::Active);

        let owner = store.get_user("newcomer").await.unwrap().unwrap();
        assert!(owner.is_active);
        assert!(!owner.is_admin);
        assert_eq!(store.count_active_users().await.unwrap(), 1);
    }
}
