use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use chrono::{DateTime, Utc};

use crate::database::Store;
use crate::error::Result;
use crate::models::time_entry::EntrySpan;
use crate::models::user::User;
use crate::utils::time::{Clock, ReportingZone};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct UserTotals {
    pub weekly_minutes: i64,
    pub monthly_minutes: i64,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SystemStats {
    pub total_employees: i64,
    pub active_sessions: i64,
    /// Minutes, despite the name carried over from the public API.
    pub weekly_hours: i64,
    pub avg_hours: f64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct EmployeeSummary {
    pub user: User,
    pub today_minutes: i64,
    pub week_minutes: i64,
    pub is_active: bool,
    pub last_clock_in: Option<DateTime<Utc>>,
}

/// Sum of completed minutes over spans clocked in at or after `since`.
/// Active spans contribute nothing.
pub fn minutes_since<'a, I>(spans: I, since: DateTime<Utc>) -> i64
where
    I: IntoIterator<Item = &'a EntrySpan>,
{
    spans
        .into_iter()
        .filter(|s| s.clock_in_time >= since)
        .filter_map(|s| s.total_minutes)
        .sum()
}

/// Minutes per entry in the window, counting active entries in the
/// denominator. Zero for an empty window.
pub fn average_per_entry(total_minutes: i64, entry_count: usize) -> f64 {
    if entry_count == 0 {
        0.0
    } else {
        total_minutes as f64 / entry_count as f64
    }
}

/// Splits minutes into (hours, minutes) for display.
pub fn split_hours(total_minutes: i64) -> (i64, i64) {
    (
        total_minutes.div_euclid(60),
        total_minutes.rem_euclid(60),
    )
}

/// Read-only aggregation over the entry set; every call recomputes.
#[derive(Clone)]
pub struct AnalyticsService {
    store: Arc<dyn Store>,
    clock: Arc<dyn Clock>,
    zone: ReportingZone,
}

impl AnalyticsService {
    pub fn new(store: Arc<dyn Store>, clock: Arc<dyn Clock>, zone: ReportingZone) -> Self {
        Self { store, clock, zone }
    }

    pub async fn user_weekly_minutes(&self, user_id: &str) -> Result<i64> {
        let windows = self.zone.windows(self.clock.now());
        let spans = self
            .store
            .spans_since(windows.week_start, Some(user_id))
            .await?;
        Ok(minutes_since(&spans, windows.week_start))
    }

    pub async fn user_monthly_minutes(&self, user_id: &str) -> Result<i64> {
        let windows = self.zone.windows(self.clock.now());
        let spans = self
            .store
            .spans_since(windows.month_start, Some(user_id))
            .await?;
        Ok(minutes_since(&spans, windows.month_start))
    }

    /// Weekly and monthly totals from a single read of the wider window.
    pub async fn user_totals(&self, user_id: &str) -> Result<UserTotals> {
        let windows = self.zone.windows(self.clock.now());
        let since = windows.week_start.min(windows.month_start);
        let spans = self.store.spans_since(since, Some(user_id)).await?;
        Ok(UserTotals {
            weekly_minutes: minutes_since(&spans, windows.week_start),
            monthly_minutes: minutes_since(&spans, windows.month_start),
        })
    }

    pub async fn system_stats(&self) -> Result<SystemStats> {
        let windows = self.zone.windows(self.clock.now());
        let total_employees = self.store.count_active_users().await?;
        let active_sessions = self.store.count_active_entries().await?;
        let spans = self.store.spans_since(windows.week_start, None).await?;

        let weekly = minutes_since(&spans, windows.week_start);
        Ok(SystemStats {
            total_employees,
            active_sessions,
            weekly_hours: weekly,
            avg_hours: average_per_entry(weekly, spans.len()),
        })
    }

    pub async fn employee_summaries(&self) -> Result<Vec<EmployeeSummary>> {
        let windows = self.zone.windows(self.clock.now());
        let users = self.store.list_active_users().await?;
        let since = windows.week_start.min(windows.day_start);
        let spans = self.store.spans_since(since, None).await?;
        let active: HashSet<String> = self
            .store
            .active_spans()
            .await?
            .into_iter()
            .map(|s| s.user_id)
            .collect();
        let last: HashMap<String, DateTime<Utc>> =
            self.store.last_clock_ins().await?.into_iter().collect();

        let mut by_user: HashMap<&str, Vec<&EntrySpan>> = HashMap::new();
        for span in &spans {
            by_user.entry(span.user_id.as_str()).or_default().push(span);
        }

        Ok(users
            .into_iter()
            .map(|user| {
                let own = by_user.get(user.id.as_str()).cloned().unwrap_or_default();
                EmployeeSummary {
                    today_minutes: minutes_since(own.iter().copied(), windows.day_start),
                    week_minutes: minutes_since(own.iter().copied(), windows.week_start),
                    is_active: active.contains(&user.id),
                    last_clock_in: last.get(&user.id).copied(),
                    user,
                }
            })
            .collect())
    }
}
