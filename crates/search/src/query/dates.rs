//! Relative and absolute date values for `before:` / `after:`
//!
//! Accepted forms:
//! - `YYYY`, `YYYY-MM`, `YYYY-MM-DD` (missing parts default to the 1st)
//! - `today`, `yesterday`
//! - a non-negative integer N other than a four digit year: N days ago
//! - weekday names (`monday`, `mon`): the most recent such day before today
//! - month names (`march`, `mar`): the 1st of the most recent such month,
//!   this year when that month is the current one or already passed
//!
//! Anything else is unparsable and the token stays literal text.

use chrono::{Datelike, Duration, NaiveDate, Weekday};

/// Parse a date value relative to `today`
///
/// # Example
///
/// ```
/// use agora_search::query::dates::parse_date;
/// use chrono::NaiveDate;
///
/// let today = NaiveDate::from_ymd_opt(2024, 5, 15).unwrap();
/// assert_eq!(parse_date("2023-02", today), NaiveDate::from_ymd_opt(2023, 2, 1));
/// assert_eq!(parse_date("yesterday", today), NaiveDate::from_ymd_opt(2024, 5, 14));
/// assert_eq!(parse_date("soon", today), None);
/// ```
pub fn parse_date(value: &str, today: NaiveDate) -> Option<NaiveDate> {
    let value = value.trim().to_lowercase();
    match value.as_str() {
        "" => None,
        "today" => Some(today),
        "yesterday" => today.pred_opt(),
        v if v.chars().all(|c| c.is_ascii_digit()) => {
            if v.len() == 4 {
                NaiveDate::from_ymd_opt(v.parse().ok()?, 1, 1)
            } else {
                let days: i64 = v.parse().ok()?;
                today.checked_sub_signed(Duration::try_days(days)?)
            }
        }
        v if v.contains('-') => parse_absolute(v),
        v => parse_weekday(v)
            .map(|weekday| last_weekday_before(today, weekday))
            .or_else(|| parse_month(v).and_then(|month| last_month_start(today, month))),
    }
}

/// `YYYY-MM` or `YYYY-MM-DD`
fn parse_absolute(value: &str) -> Option<NaiveDate> {
    let mut parts = value.split('-');
    let year: i32 = parts.next()?.parse().ok()?;
    let month: u32 = parts.next()?.parse().ok()?;
    let day: u32 = match parts.next() {
        Some(d) => d.parse().ok()?,
        None => 1,
    };
    if parts.next().is_some() {
        return None;
    }
    NaiveDate::from_ymd_opt(year, month, day)
}

fn parse_weekday(value: &str) -> Option<Weekday> {
    match value {
        "monday" | "mon" => Some(Weekday::Mon),
        "tuesday" | "tue" | "tues" => Some(Weekday::Tue),
        "wednesday" | "wed" => Some(Weekday::Wed),
        "thursday" | "thu" | "thurs" => Some(Weekday::Thu),
        "friday" | "fri" => Some(Weekday::Fri),
        "saturday" | "sat" => Some(Weekday::Sat),
        "sunday" | "sun" => Some(Weekday::Sun),
        _ => None,
    }
}

fn parse_month(value: &str) -> Option<u32> {
    const MONTHS: [&str; 12] = [
        "january",
        "february",
        "march",
        "april",
        "may",
        "june",
        "july",
        "august",
        "september",
        "october",
        "november",
        "december",
    ];
    MONTHS
        .iter()
        .position(|m| *m == value || (value.len() == 3 && m.starts_with(value)))
        .map(|i| i as u32 + 1)
}

/// Most recent `weekday` strictly before `today` (1 to 7 days back)
fn last_weekday_before(today: NaiveDate, weekday: Weekday) -> NaiveDate {
    let today_idx = today.weekday().num_days_from_monday() as i64;
    let target_idx = weekday.num_days_from_monday() as i64;
    let mut back = (today_idx - target_idx).rem_euclid(7);
    if back == 0 {
        back = 7;
    }
    today - Duration::days(back)
}

/// First day of the most recent `month` on or before `today`
fn last_month_start(today: NaiveDate, month: u32) -> Option<NaiveDate> {
    let year = if month <= today.month() {
        today.year()
    } else {
        today.year() - 1
    };
    NaiveDate::from_ymd_opt(year, month, 1)
}
