use chrono::{
    DateTime, Datelike, Duration, FixedOffset, Local, LocalResult, NaiveDate, NaiveTime, TimeZone,
    Utc,
};

/// Source of the current instant. Services never call `Utc::now()` directly.
#[cfg_attr(test, mockall::automock)]
pub trait Clock: Send + Sync {
    fn now(&self) -> DateTime<Utc>;
}

#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// Zone in which day, week and month boundaries are drawn.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReportingZone {
    Local,
    Fixed(FixedOffset),
}

/// Window starts for a reference instant. Each window runs from its start
/// to "now"; there is no upper bound.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReportingWindows {
    pub day_start: DateTime<Utc>,
    pub week_start: DateTime<Utc>,
    pub month_start: DateTime<Utc>,
}

impl ReportingZone {
    pub fn windows(&self, reference: DateTime<Utc>) -> ReportingWindows {
        match self {
            ReportingZone::Local => windows_in(&reference.with_timezone(&Local)),
            ReportingZone::Fixed(offset) => windows_in(&reference.with_timezone(offset)),
        }
    }
}

pub fn windows_in<Tz: TimeZone>(reference: &DateTime<Tz>) -> ReportingWindows {
    ReportingWindows {
        day_start: day_start(reference),
        week_start: week_start(reference),
        month_start: month_start(reference),
    }
}

pub fn day_start<Tz: TimeZone>(reference: &DateTime<Tz>) -> DateTime<Utc> {
    local_midnight(&reference.timezone(), reference.date_naive())
}

/// Weeks start on Sunday.
pub fn week_start<Tz: TimeZone>(reference: &DateTime<Tz>) -> DateTime<Utc> {
    let date = reference.date_naive();
    let back = i64::from(date.weekday().num_days_from_sunday());
    local_midnight(&reference.timezone(), date - Duration::days(back))
}

pub fn month_start<Tz: TimeZone>(reference: &DateTime<Tz>) -> DateTime<Utc> {
    let date = reference.date_naive();
    let first = NaiveDate::from_ymd_opt(date.year(), date.month(), 1).unwrap_or(date);
    local_midnight(&reference.timezone(), first)
}

/// Midnight of `date` in `tz`. A midnight skipped by a DST jump resolves to
/// the first instant that exists after it; a repeated one to the earlier.
fn local_midnight<Tz: TimeZone>(tz: &Tz, date: NaiveDate) -> DateTime<Utc> {
    let midnight = date.and_time(NaiveTime::MIN);
    match tz.from_local_datetime(&midnight) {
        LocalResult::Single(dt) => dt.with_timezone(&Utc),
        LocalResult::Ambiguous(earliest, _) => earliest.with_timezone(&Utc),
        // Gaps are whole minutes and never longer than a few hours.
        LocalResult::None => (1..=180)
            .find_map(|minutes| {
                tz.from_local_datetime(&(midnight + Duration::minutes(minutes)))
                    .earliest()
            })
            .map(|dt| dt.with_timezone(&Utc))
            .unwrap_or_else(|| Utc.from_utc_datetime(&midnight)),
    }
}

/// Whole minutes between two instants, truncating any partial minute.
/// A clock-out earlier than its clock-in counts as zero.
pub fn elapsed_minutes(start: DateTime<Utc>, end: DateTime<Utc>) -> i64 {
    (end - start).num_milliseconds().div_euclid(60_000).max(0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDateTime;

    fn at(offset: &FixedOffset, y: i32, m: u32, d: u32, h: u32, min: u32) -> DateTime<FixedOffset> {
        offset.with_ymd_and_hms(y, m, d, h, min, 0).unwrap()
    }

    #[test]
    fn week_starts_on_previous_sunday_midnight() {
        let utc = FixedOffset::east_opt(0).unwrap();
        // 2026-10-14 is a Wednesday.
        let start = week_start(&at(&utc, 2026, 10, 14, 15, 30));
        assert_eq!(start, Utc.with_ymd_and_hms(2026, 10, 11, 0, 0, 0).unwrap());
    }

    #[test]
    fn sunday_is_its_own_week_start() {
        let utc = FixedOffset::east_opt(0).unwrap();
        let start = week_start(&at(&utc, 2026, 10, 18, 0, 1));
        assert_eq!(start, Utc.with_ymd_and_hms(2026, 10, 18, 0, 0, 0).unwrap());
    }

    #[test]
    fn week_can_start_in_previous_month() {
        let utc = FixedOffset::east_opt(0).unwrap();
        // 2026-10-01 is a Thursday.
        let start = week_start(&at(&utc, 2026, 10, 1, 8, 0));
        assert_eq!(start, Utc.with_ymd_and_hms(2026, 9, 27, 0, 0, 0).unwrap());
    }

    #[test]
    fn month_start_uses_local_midnight() {
        let plus_two = FixedOffset::east_opt(2 * 3600).unwrap();
        let start = month_start(&at(&plus_two, 2026, 10, 18, 12, 0));
        assert_eq!(start, Utc.with_ymd_and_hms(2026, 9, 30, 22, 0, 0).unwrap());
    }

    #[test]
    fn windows_follow_zone_not_utc_date() {
        let minus_five = FixedOffset::west_opt(5 * 3600).unwrap();
        // 03:00 UTC on Sunday is still Saturday evening at UTC-5.
        let reference = Utc.with_ymd_and_hms(2026, 10, 18, 3, 0, 0).unwrap();
        let windows = ReportingZone::Fixed(minus_five).windows(reference);
        assert_eq!(
            windows.day_start,
            Utc.with_ymd_and_hms(2026, 10, 17, 5, 0, 0).unwrap()
        );
        assert_eq!(
            windows.week_start,
            Utc.with_ymd_and_hms(2026, 10, 11, 5, 0, 0).unwrap()
        );
        assert_eq!(
            windows.month_start,
            Utc.with_ymd_and_hms(2026, 10, 1, 5, 0, 0).unwrap()
        );
    }

    #[test]
    fn elapsed_minutes_truncates_partial_minutes() {
        let start = Utc.with_ymd_and_hms(2026, 10, 12, 9, 0, 0).unwrap();
        let end = start + Duration::minutes(125) + Duration::seconds(59);
        assert_eq!(elapsed_minutes(start, end), 125);
        assert_eq!(elapsed_minutes(start, start + Duration::milliseconds(59_999)), 0);
    }

    #[test]
    fn elapsed_minutes_never_negative() {
        let start = Utc.with_ymd_and_hms(2026, 10, 12, 9, 0, 0).unwrap();
        assert_eq!(elapsed_minutes(start, start - Duration::seconds(30)), 0);
    }

    #[test]
    fn mocked_clock_drives_windows() {
        let mut clock = MockClock::new();
        clock
            .expect_now()
            .return_const(Utc.with_ymd_and_hms(2026, 10, 14, 12, 0, 0).unwrap());
        let utc = FixedOffset::east_opt(0).unwrap();
        let windows = ReportingZone::Fixed(utc).windows(clock.now());
        assert_eq!(
            windows.week_start,
            Utc.with_ymd_and_hms(2026, 10, 11, 0, 0, 0).unwrap()
        );
    }

    /// Lord Howe style zone: clocks jump from 00:00 at +10:30 straight to
    /// 00:30 at +11:00 on 2026-10-04.
    #[derive(Debug, Clone, Copy)]
    struct HalfHourGap;

    impl HalfHourGap {
        fn gap_start() -> NaiveDateTime {
            NaiveDate::from_ymd_opt(2026, 10, 4)
                .unwrap()
                .and_time(NaiveTime::MIN)
        }

        fn before() -> FixedOffset {
            FixedOffset::east_opt(10 * 3600 + 1800).unwrap()
        }

        fn after() -> FixedOffset {
            FixedOffset::east_opt(11 * 3600).unwrap()
        }
    }

    impl TimeZone for HalfHourGap {
        type Offset = FixedOffset;

        fn from_offset(_: &FixedOffset) -> Self {
            HalfHourGap
        }

        fn offset_from_local_date(&self, local: &NaiveDate) -> LocalResult<FixedOffset> {
            self.offset_from_local_datetime(&local.and_time(NaiveTime::MIN))
        }

        fn offset_from_local_datetime(&self, local: &NaiveDateTime) -> LocalResult<FixedOffset> {
            let start = Self::gap_start();
            if *local < start {
                LocalResult::Single(Self::before())
            } else if *local >= start + Duration::minutes(30) {
                LocalResult::Single(Self::after())
            } else {
                LocalResult::None
            }
        }

        fn offset_from_utc_date(&self, utc: &NaiveDate) -> FixedOffset {
            self.offset_from_utc_datetime(&utc.and_time(NaiveTime::MIN))
        }

        fn offset_from_utc_datetime(&self, utc: &NaiveDateTime) -> FixedOffset {
            let transition = Self::gap_start() - Duration::minutes(10 * 60 + 30);
            if *utc < transition {
                Self::before()
            } else {
                Self::after()
            }
        }
    }

    #[test]
    fn skipped_midnight_resolves_to_end_of_short_gap() {
        let reference = Utc
            .with_ymd_and_hms(2026, 10, 4, 0, 0, 0)
            .unwrap()
            .with_timezone(&HalfHourGap);
        // 00:30 at +11:00.
        assert_eq!(
            day_start(&reference),
            Utc.with_ymd_and_hms(2026, 10, 3, 13, 30, 0).unwrap()
        );
    }
}
