use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::services::analytics_service::{split_hours, EmployeeSummary, SystemStats, UserTotals};

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UserStatsResponse {
    pub weekly_hours: i64,
    pub weekly_minutes: i64,
    pub monthly_hours: i64,
    pub monthly_minutes: i64,
}

impl From<UserTotals> for UserStatsResponse {
    fn from(totals: UserTotals) -> Self {
        let (weekly_hours, weekly_minutes) = split_hours(totals.weekly_minutes);
        let (monthly_hours, monthly_minutes) = split_hours(totals.monthly_minutes);
        Self {
            weekly_hours,
            weekly_minutes,
            monthly_hours,
            monthly_minutes,
        }
    }
}

/// `weeklyHours` and `avgHours` are expressed in minutes.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SystemStatsResponse {
    pub total_employees: i64,
    pub active_sessions: i64,
    pub weekly_hours: i64,
    pub avg_hours: f64,
}

impl From<SystemStats> for SystemStatsResponse {
    fn from(stats: SystemStats) -> Self {
        Self {
            total_employees: stats.total_employees,
            active_sessions: stats.active_sessions,
            weekly_hours: stats.weekly_hours,
            avg_hours: stats.avg_hours,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct EmployeeSummaryResponse {
    pub user_id: String,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub email: Option<String>,
    pub today_hours: i64,
    pub today_minutes: i64,
    pub week_hours: i64,
    pub week_minutes: i64,
    pub is_active: bool,
    pub last_clock_in: Option<DateTime<Utc>>,
}

impl From<EmployeeSummary> for EmployeeSummaryResponse {
    fn from(summary: EmployeeSummary) -> Self {
        let (today_hours, today_minutes) = split_hours(summary.today_minutes);
        let (week_hours, week_minutes) = split_hours(summary.week_minutes);
        Self {
            user_id: summary.user.id,
            first_name: summary.user.first_name,
            last_name: summary.user.last_name,
            email: summary.user.email,
            today_hours,
            today_minutes,
            week_hours,
            week_minutes,
            is_active: summary.is_active,
            last_clock_in: summary.last_clock_in,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn user_stats_split_minutes_for_display() {
        let body = UserStatsResponse::from(UserTotals {
            weekly_minutes: 510,
            monthly_minutes: 1_505,
        });
        let json = serde_json::to_value(body).unwrap();
        assert_eq!(json["weeklyHours"], 8);
        assert_eq!(json["weeklyMinutes"], 30);
        assert_eq!(json["monthlyHours"], 25);
        assert_eq!(json["monthlyMinutes"], 5);
    }
}
