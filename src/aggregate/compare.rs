use crate::model::parse_record_date;
use chrono::NaiveDate;
use std::cmp::Ordering;

/// Reads a date out of a chart group label. Recognizes `Mon YYYY`, `MM/DD/YYYY`, `YYYY` and
/// `YYYY-MM-DD`, then anything a record date may look like. Trailing characters that are not
/// ASCII letters or digits, such as invisible markers, are ignored. Month labels read as the
/// first of the month and year labels as the first of January.
pub fn parse_group_label(label: &str) -> Option<NaiveDate> {
    let s = label
        .trim()
        .trim_end_matches(|c: char| !c.is_ascii_alphanumeric());
    if s.is_empty() {
        return None;
    }
    if let Ok(d) = NaiveDate::parse_from_str(&format!("01 {s}"), "%d %b %Y") {
        return Some(d);
    }
    if let Ok(d) = NaiveDate::parse_from_str(s, "%m/%d/%Y") {
        return Some(d);
    }
    if s.len() == 4 && s.bytes().all(|b| b.is_ascii_digit()) {
        return s
            .parse::<i32>()
            .ok()
            .and_then(|y| NaiveDate::from_ymd_opt(y, 1, 1));
    }
    if let Ok(d) = NaiveDate::parse_from_str(s, "%Y-%m-%d") {
        return Some(d);
    }
    parse_record_date(s).map(|dt| dt.date())
}

/// Orders chart group labels by the date they name. Labels that name no date sort after those
/// that do, and compare equal to each other.
///
/// ```
/// # use spendscope::aggregate::chart_date_compare;
/// let mut labels = vec!["Mar 2025", "oops", "01/15/2025", "2024"];
/// labels.sort_by(|a, b| chart_date_compare(a, b));
/// assert_eq!(labels, vec!["2024", "01/15/2025", "Mar 2025", "oops"]);
/// ```
pub fn chart_date_compare(a: &str, b: &str) -> Ordering {
    match (parse_group_label(a), parse_group_label(b)) {
        (Some(a), Some(b)) => a.cmp(&b),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    }
}
