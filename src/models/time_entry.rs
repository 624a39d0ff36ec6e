use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use utoipa::ToSchema;
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum EntryStatus {
    Active,
    Completed,
}

impl EntryStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            EntryStatus::Active => "active",
            EntryStatus::Completed => "completed",
        }
    }
}

impl fmt::Display for EntryStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for EntryStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "active" => Ok(EntryStatus::Active),
            "completed" => Ok(EntryStatus::Completed),
            other => Err(format!("unknown time entry status: {}", other)),
        }
    }
}

/// One clock-in/clock-out session. `clock_out_time` and `total_minutes`
/// are present exactly when the status is `Completed`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TimeEntry {
    pub id: Uuid,
    pub user_id: String,
    pub clock_in_time: DateTime<Utc>,
    pub clock_out_time: Option<DateTime<Utc>>,
    pub status: EntryStatus,
    pub total_minutes: Option<i64>,
    pub employee_signature: Option<String>,
    pub supervisor_signature: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl TimeEntry {
    pub fn is_active(&self) -> bool {
        self.status == EntryStatus::Active
    }

    pub fn span(&self) -> EntrySpan {
        EntrySpan {
            user_id: self.user_id.clone(),
            clock_in_time: self.clock_in_time,
            total_minutes: self.total_minutes,
        }
    }
}

/// Fields set by a successful clock-out.
#[derive(Debug, Clone)]
pub struct Completion {
    pub clock_out_time: DateTime<Utc>,
    pub total_minutes: i64,
    pub employee_signature: String,
    pub supervisor_signature: String,
}

/// The part of an entry the aggregator reads; signatures are left behind.
#[derive(Debug, Clone, PartialEq, Eq, sqlx::FromRow)]
pub struct EntrySpan {
    pub user_id: String,
    pub clock_in_time: DateTime<Utc>,
    pub total_minutes: Option<i64>,
}
