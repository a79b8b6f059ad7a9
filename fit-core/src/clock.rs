//! Local calendar day helpers.
//!
//! Every day boundary in FitTogether is computed in the viewer's timezone,
//! which is the timezone of the `now` value handed to an aggregator.
//! Stored timestamps are UTC and are converted into that timezone before
//! any calendar comparison. Mixing UTC and local boundaries is never done.

use chrono::{DateTime, Datelike, Days, NaiveDate, TimeZone, Utc};

/// Calendar date of `ts` in the timezone `tz`.
pub fn local_date<Tz: TimeZone>(ts: &DateTime<Utc>, tz: &Tz) -> NaiveDate {
    ts.with_timezone(tz).date_naive()
}

/// Today's calendar date in the timezone carried by `now`.
pub fn today<Tz: TimeZone>(now: &DateTime<Tz>) -> NaiveDate {
    now.date_naive()
}

/// Most recent Sunday on or before `now`'s local date.
pub fn week_start<Tz: TimeZone>(now: &DateTime<Tz>) -> NaiveDate {
    let today = now.date_naive();
    let back = u64::from(today.weekday().num_days_from_sunday());
    today.checked_sub_days(Days::new(back)).unwrap_or(NaiveDate::MIN)
}

/// Whole calendar days from `earlier` to `later` (negative if `earlier` is
/// after `later`).
///
/// Equivalent to normalising both instants to the end of their local day
/// and flooring the difference in days.
pub fn days_between(later: NaiveDate, earlier: NaiveDate) -> i64 {
    later.signed_duration_since(earlier).num_days()
}
