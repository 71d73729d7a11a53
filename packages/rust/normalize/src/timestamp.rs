//! Roll-call timestamps from the separate `Data` and `Hora` fields.

use std::sync::LazyLock;

use chrono::{DateTime, NaiveDate, TimeDelta, Utc};
use regex::Regex;

static DIGITS_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[0-9]+").expect("valid regex"));

/// Combine a `day/month/year` date and an `hour:minute` time into a UTC instant.
///
/// Only the digit runs of each field matter, so `"2/5/2007"` and
/// `"02-05-2007"` read the same. Returns `None` when either field is missing
/// or yields too few digit groups.
///
/// Out-of-range parts carry into the next unit: `31/2/2007` is March 3rd,
/// month 13 is January of the following year and `24:00` is midnight of the
/// next day.
pub fn parse_timestamp(date: Option<&str>, time: Option<&str>) -> Option<DateTime<Utc>> {
    let date = digit_groups(date?);
    let time = digit_groups(time?);
    if date.len() < 3 || time.len() < 2 {
        return None;
    }

    let (day, month, year) = (date[0], date[1], date[2]);
    let (hour, minute) = (time[0], time[1]);

    let months = i64::try_from(year)
        .ok()?
        .checked_mul(12)?
        .checked_add(i64::try_from(month).ok()? - 1)?;
    let first_of_month = NaiveDate::from_ymd_opt(
        i32::try_from(months.div_euclid(12)).ok()?,
        u32::try_from(months.rem_euclid(12) + 1).ok()?,
        1,
    )?;

    let offset = TimeDelta::try_days(i64::try_from(day).ok()? - 1)?
        .checked_add(&TimeDelta::try_hours(i64::try_from(hour).ok()?)?)?
        .checked_add(&TimeDelta::try_minutes(i64::try_from(minute).ok()?)?)?;

    first_of_month
        .and_hms_opt(0, 0, 0)?
        .checked_add_signed(offset)
        .map(|naive| naive.and_utc())
}

fn digit_groups(text: &str) -> Vec<u64> {
    DIGITS_RE
        .find_iter(text)
        .filter_map(|m| m.as_str().parse().ok())
        .collect()
}
