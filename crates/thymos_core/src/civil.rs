//! Civil-date utilities: timezone-scoped normalization and calendar math.
//!
//! Periods and day records are keyed by calendar dates as the user lives
//! them, while all comparisons happen on absolute instants. The bridge is
//! "interpret a date-only value in timezone Z as local midnight" and its
//! inverse. Getting this wrong shows up as off-by-one-day drift whenever
//! the user's timezone differs from the reference frame, so everything
//! date-shaped in the workspace goes through this module.

use chrono::{DateTime, Datelike, Days, Months, NaiveDate, NaiveTime, TimeZone, Utc};
use chrono_tz::Tz;

use crate::error::ThymosError;

/// Parses a `YYYY-MM-DD` date-only string.
pub fn parse_date(input: &str) -> Result<NaiveDate, ThymosError> {
    NaiveDate::parse_from_str(input.trim(), "%Y-%m-%d").map_err(|_| ThymosError::InvalidDate {
        input: input.to_string(),
    })
}

/// Interprets `date` as local midnight in `tz` and returns the instant in
/// UTC.
///
/// Some zones skip local midnight on DST transition days; the civil day
/// then starts at the first representable local time after the gap
/// (scanned in one-hour steps). Ambiguous midnights resolve to the earlier
/// instant.
pub fn local_midnight_utc(date: NaiveDate, tz: Tz) -> DateTime<Utc> {
    let mut local = date.and_time(NaiveTime::MIN);
    for _ in 0..4 {
        match tz.from_local_datetime(&local) {
            chrono::LocalResult::Single(dt) => return dt.with_timezone(&Utc),
            chrono::LocalResult::Ambiguous(earlier, _) => return earlier.with_timezone(&Utc),
            chrono::LocalResult::None => {
                local += chrono::Duration::hours(1);
            }
        }
    }
    // No real zone skips four consecutive hours; interpret as UTC rather
    // than fail the whole mutation.
    tracing::warn!(%date, %tz, "could not resolve local midnight, falling back to UTC");
    Utc.from_utc_datetime(&date.and_time(NaiveTime::MIN))
}

/// Inverse of [`local_midnight_utc`]: the calendar date `instant` falls on
/// in `tz`.
pub fn civil_date_in(instant: DateTime<Utc>, tz: Tz) -> NaiveDate {
    instant.with_timezone(&tz).date_naive()
}

/// Today's calendar date in `tz`.
pub fn today_in(tz: Tz) -> NaiveDate {
    Utc::now().with_timezone(&tz).date_naive()
}

/// Calendar-unit month subtraction with end-of-month clamping.
///
/// Subtracting a month from a day the target month does not have lands on
/// the last valid day of that month: 2024-03-31 minus one month is
/// 2024-02-29, 2024-01-31 minus one month is 2023-12-31.
pub fn months_back(date: NaiveDate, months: u32) -> NaiveDate {
    date.checked_sub_months(Months::new(months)).unwrap_or(date)
}

/// Calendar-unit year subtraction, clamped like [`months_back`]:
/// 2024-02-29 minus one year is 2023-02-28.
pub fn years_back(date: NaiveDate, years: u32) -> NaiveDate {
    months_back(date, years.saturating_mul(12))
}

/// Weekday index with Monday = 0 through Sunday = 6.
pub fn weekday_index(date: NaiveDate) -> usize {
    date.weekday().num_days_from_monday() as usize
}

/// Inclusive Monday..Sunday bounds of the ISO week containing `date`.
pub fn week_bounds(date: NaiveDate) -> (NaiveDate, NaiveDate) {
    let offset = date.weekday().num_days_from_monday() as u64;
    let monday = date.checked_sub_days(Days::new(offset)).unwrap_or(date);
    let sunday = monday.checked_add_days(Days::new(6)).unwrap_or(monday);
    (monday, sunday)
}

/// English weekday name for a Monday-based index, for reports and logs.
pub fn weekday_name(index: usize) -> &'static str {
    match index {
        0 => "Monday",
        1 => "Tuesday",
        2 => "Wednesday",
        3 => "Thursday",
        4 => "Friday",
        5 => "Saturday",
        _ => "Sunday",
    }
}
