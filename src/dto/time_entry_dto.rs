use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;

use crate::models::time_entry::{EntryStatus, TimeEntry};
use crate::services::time_entry_service::ClockOutRequest;

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ClockOutPayload {
    /// `data:image/<type>;base64,<payload>`
    #[serde(default)]
    pub employee_signature: String,
    #[serde(default)]
    pub supervisor_signature: String,
}

impl From<ClockOutPayload> for ClockOutRequest {
    fn from(payload: ClockOutPayload) -> Self {
        ClockOutRequest {
            employee_signature: payload.employee_signature,
            supervisor_signature: payload.supervisor_signature,
        }
    }
}

#[derive(Debug, Clone, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct HistoryQuery {
    /// Defaults to 50, clamped to 1..=500.
    pub limit: Option<i64>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct TimeEntryResponse {
    pub id: Uuid,
    pub user_id: String,
    pub clock_in_time: DateTime<Utc>,
    pub clock_out_time: Option<DateTime<Utc>>,
    pub status: EntryStatus,
    /// Whole minutes worked; null while the entry is active.
    #[serde(rename = "totalHours")]
    pub total_minutes: Option<i64>,
    pub employee_signature: Option<String>,
    pub supervisor_signature: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<TimeEntry> for TimeEntryResponse {
    fn from(entry: TimeEntry) -> Self {
        Self {
            id: entry.id,
            user_id: entry.user_id,
            clock_in_time: entry.clock_in_time,
            clock_out_time: entry.clock_out_time,
            status: entry.status,
            total_minutes: entry.total_minutes,
            employee_signature: entry.employee_signature,
            supervisor_signature: entry.supervisor_signature,
            created_at: entry.created_at,
            updated_at: entry.updated_at,
        }
    }
}
