use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{FromRow, PgPool};
use uuid::Uuid;

use crate::database::Store;
use crate::error::{Error, Result};
use crate::models::time_entry::{Completion, EntrySpan, EntryStatus, TimeEntry};
use crate::models::user::{UpdateProfile, UpsertUser, User};

const ENTRY_COLUMNS: &str = "id, user_id, clock_in_time, clock_out_time, status, total_minutes, \
     employee_signature, supervisor_signature, created_at, updated_at";

#[derive(Debug, FromRow)]
struct TimeEntryRow {
    id: Uuid,
    user_id: String,
    clock_in_time: DateTime<Utc>,
    clock_out_time: Option<DateTime<Utc>>,
    status: String,
    total_minutes: Option<i64>,
    employee_signature: Option<String>,
    supervisor_signature: Option<String>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl TryFrom<TimeEntryRow> for TimeEntry {
    type Error = Error;

    fn try_from(row: TimeEntryRow) -> Result<Self> {
        Ok(TimeEntry {
            id: row.id,
            user_id: row.user_id,
            clock_in_time: row.clock_in_time,
            clock_out_time: row.clock_out_time,
            status: row.status.parse().map_err(Error::Internal)?,
            total_minutes: row.total_minutes,
            employee_signature: row.employee_signature,
            supervisor_signature: row.supervisor_signature,
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}

fn into_entries(rows: Vec<TimeEntryRow>) -> Result<Vec<TimeEntry>> {
    rows.into_iter().map(TimeEntry::try_from).collect()
}

#[derive(Clone)]
pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl Store for PgStore {
    async fn get_user(&self, id: &str) -> Result<Option<User>> {
        let user = sqlx::query_as::<_, User>(r#"SELECT * FROM users WHERE id = $1"#)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(user)
    }

    async fn upsert_user(&self, user: UpsertUser, now: DateTime<Utc>) -> Result<User> {
        let user = sqlx::query_as::<_, User>(
            r#"
            INSERT INTO users (id, first_name, last_name, email, profile_image_url, is_admin, created_at, updated_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $7)
            ON CONFLICT (id) DO UPDATE SET
                first_name = COALESCE(EXCLUDED.first_name, users.first_name),
                last_name = COALESCE(EXCLUDED.last_name, users.last_name),
                email = COALESCE(EXCLUDED.email, users.email),
                profile_image_url = COALESCE(EXCLUDED.profile_image_url, users.profile_image_url),
                is_admin = EXCLUDED.is_admin,
                updated_at = EXCLUDED.updated_at
            RETURNING *
            "#,
        )
        .bind(&user.id)
        .bind(&user.first_name)
        .bind(&user.last_name)
        .bind(&user.email)
        .bind(&user.profile_image_url)
        .bind(user.is_admin)
        .bind(now)
        .fetch_one(&self.pool)
        .await?;
        Ok(user)
    }

    async fn ensure_user(&self, id: &str, now: DateTime<Utc>) -> Result<()> {
        sqlx::query(
            r#"
            INSERT INTO users (id, created_at, updated_at)
            VALUES ($1, $2, $2)
            ON CONFLICT (id) DO NOTHING
            "#,
        )
        .bind(id)
        .bind(now)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn update_profile(
        &self,
        id: &str,
        profile: UpdateProfile,
        now: DateTime<Utc>,
    ) -> Result<Option<User>> {
        let user = sqlx::query_as::<_, User>(
            r#"
            UPDATE users
            SET
                first_name = $2,
                last_name = $3,
                email = $4,
                phone = $5,
                profile_image_url = COALESCE($6, profile_image_url),
                updated_at = $7
            WHERE id = $1
            RETURNING *
            "#,
        )
        .bind(id)
        .bind(&profile.first_name)
        .bind(&profile.last_name)
        .bind(&profile.email)
        .bind(&profile.phone)
        .bind(&profile.profile_image_url)
        .bind(now)
        .fetch_optional(&self.pool)
        .await?;
        Ok(user)
    }

    async fn list_active_users(&self) -> Result<Vec<User>> {
        let users = sqlx::query_as::<_, User>(
            r#"SELECT * FROM users WHERE is_active ORDER BY last_name, first_name, id"#,
        )
        .fetch_all(&self.pool)
        .await?;
        Ok(users)
    }

    async fn count_active_users(&self) -> Result<i64> {
        let count: i64 = sqlx::query_scalar(r#"SELECT COUNT(*) FROM users WHERE is_active"#)
            .fetch_one(&self.pool)
            .await?;
        Ok(count)
    }

    async fn insert_active_entry(
        &self,
        user_id: &str,
        clock_in_time: DateTime<Utc>,
    ) -> Result<Option<TimeEntry>> {
        // The partial unique index turns a concurrent second clock-in into a no-op.
        let sql = format!(
            r#"
            INSERT INTO time_entries (id, user_id, clock_in_time, status, created_at, updated_at)
            VALUES ($1, $2, $3, 'active', $3, $3)
            ON CONFLICT (user_id) WHERE status = 'active' DO NOTHING
            RETURNING {}
            "#,
            ENTRY_COLUMNS
        );
        let row = sqlx::query_as::<_, TimeEntryRow>(&sql)
            .bind(Uuid::new_v4())
            .bind(user_id)
            .bind(clock_in_time)
            .fetch_optional(&self.pool)
            .await?;
        row.map(TimeEntry::try_from).transpose()
    }

    async fn complete_active_entry(
        &self,
        id: Uuid,
        user_id: &str,
        completion: &Completion,
    ) -> Result<Option<TimeEntry>> {
        let sql = format!(
            r#"
            UPDATE time_entries
            SET
                clock_out_time = $3,
                total_minutes = $4,
                employee_signature = $5,
                supervisor_signature = $6,
                status = $7,
                updated_at = $3
            WHERE id = $1 AND user_id = $2 AND status = $8
            RETURNING {}
            "#,
            ENTRY_COLUMNS
        );
        let row = sqlx::query_as::<_, TimeEntryRow>(&sql)
            .bind(id)
            .bind(user_id)
            .bind(completion.clock_out_time)
            .bind(completion.total_minutes)
            .bind(&completion.employee_signature)
            .bind(&completion.supervisor_signature)
            .bind(EntryStatus::Completed.as_str())
            .bind(EntryStatus::Active.as_str())
            .fetch_optional(&self.pool)
            .await?;
        row.map(TimeEntry::try_from).transpose()
    }

    async fn get_entry(&self, id: Uuid) -> Result<Option<TimeEntry>> {
        let sql = format!("SELECT {} FROM time_entries WHERE id = $1", ENTRY_COLUMNS);
        let row = sqlx::query_as::<_, TimeEntryRow>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        row.map(TimeEntry::try_from).transpose()
    }

    async fn get_active_entry(&self, user_id: &str) -> Result<Option<TimeEntry>> {
        let sql = format!(
            "SELECT {} FROM time_entries WHERE user_id = $1 AND status = 'active' \
             ORDER BY clock_in_time DESC LIMIT 1",
            ENTRY_COLUMNS
        );
        let row = sqlx::query_as::<_, TimeEntryRow>(&sql)
            .bind(user_id)
            .fetch_optional(&self.pool)
            .await?;
        row.map(TimeEntry::try_from).transpose()
    }

    async fn list_user_entries(&self, user_id: &str, limit: i64) -> Result<Vec<TimeEntry>> {
        let sql = format!(
            "SELECT {} FROM time_entries WHERE user_id = $1 \
             ORDER BY clock_in_time DESC, id DESC LIMIT $2",
            ENTRY_COLUMNS
        );
        let rows = sqlx::query_as::<_, TimeEntryRow>(&sql)
            .bind(user_id)
            .bind(limit)
            .fetch_all(&self.pool)
            .await?;
        into_entries(rows)
    }

    async fn list_entries(&self) -> Result<Vec<TimeEntry>> {
        let sql = format!(
            "SELECT {} FROM time_entries ORDER BY clock_in_time DESC, id DESC",
            ENTRY_COLUMNS
        );
        let rows = sqlx::query_as::<_, TimeEntryRow>(&sql)
            .fetch_all(&self.pool)
            .await?;
        into_entries(rows)
    }

    async fn spans_since(
        &self,
        since: DateTime<Utc>,
        user_id: Option<&str>,
    ) -> Result<Vec<EntrySpan>> {
        let spans = sqlx::query_as::<_, EntrySpan>(
            r#"
            SELECT user_id, clock_in_time, total_minutes
            FROM time_entries
            WHERE clock_in_time >= $1 AND ($2::TEXT IS NULL OR user_id = $2)
            "#,
        )
        .bind(since)
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(spans)
    }

    async fn active_spans(&self) -> Result<Vec<EntrySpan>> {
        let spans = sqlx::query_as::<_, EntrySpan>(
            r#"
            SELECT user_id, clock_in_time, total_minutes
            FROM time_entries
            WHERE status = 'active'
            "#,
        )
        .fetch_all(&self.pool)
        .await?;
        Ok(spans)
    }

    async fn count_active_entries(&self) -> Result<i64> {
        let count: i64 =
            sqlx::query_scalar(r#"SELECT COUNT(*) FROM time_entries WHERE status = 'active'"#)
                .fetch_one(&self.pool)
                .await?;
        Ok(count)
    }

    async fn last_clock_ins(&self) -> Result<Vec<(String, DateTime<Utc>)>> {
        let rows = sqlx::query_as::<_, (String, DateTime<Utc>)>(
            r#"SELECT user_id, MAX(clock_in_time) FROM time_entries GROUP BY user_id"#,
        )
        .fetch_all(&self.pool)
        .await?;
        Ok(rows)
    }
}
