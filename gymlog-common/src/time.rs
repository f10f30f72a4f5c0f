//! Calendar date utilities
//!
//! All dates exchanged with clients are ISO `YYYY-MM-DD` strings. Weeks are
//! ISO weeks running Monday through Sunday.

use chrono::{Datelike, Duration, Local, NaiveDate, Weekday};

use crate::{Error, Result};

/// Wire format for every date column and query parameter
pub const DATE_FORMAT: &str = "%Y-%m-%d";

/// Today's date in the server's local time zone
pub fn today() -> NaiveDate {
    Local::now().date_naive()
}

/// Parse a strict `YYYY-MM-DD` date
pub fn parse_date(value: &str) -> Result<NaiveDate> {
    let trimmed = value.trim();
    // chrono accepts single-digit months/days for %m/%d; the wire format does not
    if trimmed.len() != 10 {
        return Err(Error::InvalidInput(format!(
            "invalid date '{}', expected YYYY-MM-DD",
            value
        )));
    }
    NaiveDate::parse_from_str(trimmed, DATE_FORMAT).map_err(|_| {
        Error::InvalidInput(format!("invalid date '{}', expected YYYY-MM-DD", value))
    })
}

/// Parse an optional date query parameter, treating empty strings as absent
pub fn parse_optional_date(value: Option<&str>) -> Result<Option<NaiveDate>> {
    match value.map(str::trim) {
        None | Some("") => Ok(None),
        Some(v) => parse_date(v).map(Some),
    }
}

/// Monday and Sunday of the ISO week containing `date`
pub fn week_bounds(date: NaiveDate) -> (NaiveDate, NaiveDate) {
    let offset = i64::from(date.weekday().num_days_from_monday());
    let start = date - Duration::days(offset);
    (start, start + Duration::days(6))
}

/// The seven dates of the ISO week containing `date`, Monday first
pub fn week_days(date: NaiveDate) -> Vec<NaiveDate> {
    let (start, _) = week_bounds(date);
    (0..7).map(|i| start + Duration::days(i)).collect()
}

/// English weekday name used in calendar responses
pub fn weekday_name(date: NaiveDate) -> &'static str {
    match date.weekday() {
        Weekday::Mon => "Monday",
        Weekday::Tue => "Tuesday",
        Weekday::Wed => "Wednesday",
        Weekday::Thu => "Thursday",
        Weekday::Fri => "Friday",
        Weekday::Sat => "Saturday",
        Weekday::Sun => "Sunday",
    }
}

/// Inclusive number of days between two dates
pub fn days_inclusive(from: NaiveDate, to: NaiveDate) -> i64 {
    (to - from).num_days() + 1
}

#[cfg(test)]
mod tests {
    use super::*;

    fn d(s: &str) -> NaiveDate {
        NaiveDate::parse_from_str(s, DATE_FORMAT).unwrap()
    }

    #[test]
    fn test_week_bounds_midweek() {
        // 2024-05-15 is a Wednesday
        let (start, end) = week_bounds(d("2024-05-15"));
        assert_eq!(start, d("2024-05-13"));
        assert_eq!(end, d("2024-05-19"));
    }

    #[test]
    fn test_week_bounds_on_monday_and_sunday() {
        assert_eq!(week_bounds(d("2024-05-13")).0, d("2024-05-13"));
        assert_eq!(week_bounds(d("2024-05-19")).0, d("2024-05-13"));
    }

    #[test]
    fn test_week_bounds_across_year_boundary() {
        // 2025-01-01 is a Wednesday; its ISO week starts in 2024
        let (start, end) = week_bounds(d("2025-01-01"));
        assert_eq!(start, d("2024-12-30"));
        assert_eq!(end, d("2025-01-05"));
    }

    #[test]
    fn test_week_days_has_seven_consecutive_days() {
        let days = week_days(d("2024-02-29"));
        assert_eq!(days.len(), 7);
        assert_eq!(days[0], d("2024-02-26"));
        assert_eq!(days[6], d("2024-03-03"));
        assert_eq!(weekday_name(days[0]), "Monday");
        assert_eq!(weekday_name(days[6]), "Sunday");
    }

    #[test]
    fn test_parse_date_strict() {
        assert_eq!(parse_date("2024-01-09").unwrap(), d("2024-01-09"));
        assert_eq!(parse_date(" 2024-01-09 ").unwrap(), d("2024-01-09"));
        assert!(parse_date("2024-1-9").is_err());
        assert!(parse_date("2024-02-30").is_err());
        assert!(parse_date("09/01/2024").is_err());
        assert!(parse_date("").is_err());
    }

    #[test]
    fn test_parse_optional_date() {
        assert_eq!(parse_optional_date(None).unwrap(), None);
        assert_eq!(parse_optional_date(Some("  ")).unwrap(), None);
        assert_eq!(
            parse_optional_date(Some("2024-03-01")).unwrap(),
            Some(d("2024-03-01"))
        );
        assert!(parse_optional_date(Some("tomorrow")).is_err());
    }

    #[test]
    fn test_days_inclusive() {
        assert_eq!(days_inclusive(d("2024-01-01"), d("2024-01-01")), 1);
        assert_eq!(days_inclusive(d("2024-01-01"), d("2024-12-31")), 366);
    }
}
