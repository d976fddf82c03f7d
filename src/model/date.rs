//! Parsing of the date strings found on expense records.

use chrono::{DateTime, Local, NaiveDate, NaiveDateTime, NaiveTime, TimeZone};

/// The format used when the application writes a record date.
pub const RECORD_DATE_FORMAT: &str = "%Y-%m-%dT%H:%M:%S";

const DATE_TIME_FORMATS: [&str; 3] = [RECORD_DATE_FORMAT, "%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S"];
const DATE_FORMATS: [&str; 2] = ["%Y-%m-%d", "%m/%d/%Y"];

/// Parses a record date. Accepts ISO-like timestamps with or without a time part, RFC 3339
/// timestamps, and `MM/DD/YYYY`. Values without a time are placed at midnight.
///
/// ```
/// # use spendscope::model::parse_record_date;
/// let a = parse_record_date("2025-01-05T00:00:00").unwrap();
/// let b = parse_record_date("01/05/2025").unwrap();
/// assert_eq!(a, b);
/// assert!(parse_record_date("yesterday").is_none());
/// ```
pub fn parse_record_date(s: &str) -> Option<NaiveDateTime> {
    let s = s.trim();
    for format in DATE_TIME_FORMATS {
        if let Ok(dt) = NaiveDateTime::parse_from_str(s, format) {
            return Some(dt);
        }
    }
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Some(dt.with_timezone(&Local).naive_local());
    }
    for format in DATE_FORMATS {
        if let Ok(d) = NaiveDate::parse_from_str(s, format) {
            return Some(d.and_time(NaiveTime::MIN));
        }
    }
    None
}

/// Milliseconds since the epoch for a local wall-clock time. Ambiguous times resolve to the
/// earlier instant.
pub fn local_millis(dt: NaiveDateTime) -> Option<i64> {
    Local
        .from_local_datetime(&dt)
        .earliest()
        .map(|d| d.timestamp_millis())
}

/// The local wall-clock time for milliseconds since the epoch.
pub fn from_local_millis(ms: i64) -> Option<NaiveDateTime> {
    Local
        .timestamp_millis_opt(ms)
        .earliest()
        .map(|d| d.naive_local())
}

/// Formats a date the way records store it.
pub fn format_record_date(date: NaiveDate) -> String {
    date.and_time(NaiveTime::MIN)
        .format(RECORD_DATE_FORMAT)
        .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Datelike;

    #[test]
    fn test_parse_iso_with_fraction() {
        let dt = parse_record_date("2024-03-09T14:30:00.250").unwrap();
        assert_eq!(dt.date(), NaiveDate::from_ymd_opt(2024, 3, 9).unwrap());
    }

    #[test]
    fn test_parse_date_only() {
        let dt = parse_record_date("2024-12-31").unwrap();
        assert_eq!(dt.year(), 2024);
        assert_eq!(dt.month(), 12);
        assert_eq!(dt.time(), NaiveTime::MIN);
    }

    #[test]
    fn test_local_millis_round_trip() {
        let dt = parse_record_date("2025-06-15T12:00:00").unwrap();
        let ms = local_millis(dt).unwrap();
        assert_eq!(from_local_millis(ms).unwrap(), dt);
    }

    #[test]
    fn test_format_record_date() {
        let d = NaiveDate::from_ymd_opt(2025, 2, 3).unwrap();
        assert_eq!(format_record_date(d), "2025-02-03T00:00:00");
    }
}
