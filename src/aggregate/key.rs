//! Keys that records are grouped under.

use crate::aggregate::chart_date_compare;
use crate::model::{Expense, Tag};
use chrono::{Datelike, NaiveDate};
use serde::Serialize;
use std::cmp::Ordering;
use std::fmt::{Display, Formatter};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum KeyKind {
    Day,
    Month,
    Year,
    Tag,
}

/// A group key: what kind of bucket it is, the label shown for it, and, for date buckets, the
/// first day the bucket covers.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct GroupKey {
    kind: KeyKind,
    label: String,
    date: Option<NaiveDate>,
}

impl GroupKey {
    /// `MM/DD/YYYY`
    pub fn day(date: NaiveDate) -> Self {
        Self {
            kind: KeyKind::Day,
            label: date.format("%m/%d/%Y").to_string(),
            date: Some(date),
        }
    }

    /// `Jan 2025`
    pub fn month(date: NaiveDate) -> Self {
        let first = date.with_day(1).unwrap_or(date);
        Self {
            kind: KeyKind::Month,
            label: first.format("%b %Y").to_string(),
            date: Some(first),
        }
    }

    /// `2025`
    pub fn year(year: i32) -> Self {
        Self {
            kind: KeyKind::Year,
            label: year.to_string(),
            date: NaiveDate::from_ymd_opt(year, 1, 1),
        }
    }

    pub fn tag(tag: &Tag) -> Self {
        Self {
            kind: KeyKind::Tag,
            label: tag.to_string(),
            date: None,
        }
    }

    pub fn kind(&self) -> KeyKind {
        self.kind
    }

    pub fn label(&self) -> &str {
        &self.label
    }

    pub fn date(&self) -> Option<NaiveDate> {
        self.date
    }

    /// Orders date keys by the day they start on. Keys without a date sort after those with one;
    /// between themselves they fall back to their labels.
    pub fn cmp_chronological(&self, other: &Self) -> Ordering {
        match (self.date, other.date) {
            (Some(a), Some(b)) => a.cmp(&b),
            (Some(_), None) => Ordering::Less,
            (None, Some(_)) => Ordering::Greater,
            (None, None) => chart_date_compare(&self.label, &other.label),
        }
    }
}

impl Display for GroupKey {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.label)
    }
}

/// Produces the keys a record belongs under. An empty list places the record in no group.
pub type KeyFn<T> = dyn Fn(&T) -> Vec<GroupKey> + Sync;

fn date_key(e: &Expense, f: impl FnOnce(NaiveDate) -> GroupKey) -> Vec<GroupKey> {
    e.parsed_date().map(|d| f(d.date())).into_iter().collect()
}

pub fn by_day(e: &Expense) -> Vec<GroupKey> {
    date_key(e, GroupKey::day)
}

pub fn by_month(e: &Expense) -> Vec<GroupKey> {
    date_key(e, GroupKey::month)
}

pub fn by_year(e: &Expense) -> Vec<GroupKey> {
    date_key(e, |d| GroupKey::year(d.year()))
}

/// One key per tag on the record. Untagged records belong to no group.
pub fn by_tag(e: &Expense) -> Vec<GroupKey> {
    e.tags().iter().map(GroupKey::tag).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(tags: &[&str], date: &str) -> Expense {
        Expense::new(
            "id",
            1.0,
            tags.iter().map(|t| Tag::from(*t)).collect(),
            date,
            "",
        )
    }

    #[test]
    fn test_date_labels() {
        let e = record(&[], "2025-03-07T18:30:00");
        assert_eq!(by_day(&e)[0].label(), "03/07/2025");
        assert_eq!(by_month(&e)[0].label(), "Mar 2025");
        assert_eq!(by_year(&e)[0].label(), "2025");
        assert_eq!(by_month(&e)[0].date(), NaiveDate::from_ymd_opt(2025, 3, 1));
    }

    #[test]
    fn test_unreadable_date_yields_no_key() {
        let e = record(&["Food"], "someday");
        assert!(by_day(&e).is_empty());
        assert!(by_year(&e).is_empty());
        assert_eq!(by_tag(&e).len(), 1);
    }

    #[test]
    fn test_tag_keys_fan_out() {
        let e = record(&["Food", "Travel"], "2025-01-01");
        let keys: Vec<String> = by_tag(&e).iter().map(|k| k.to_string()).collect();
        assert_eq!(keys, vec!["Food", "Travel"]);
        assert!(by_tag(&record(&[], "2025-01-01")).is_empty());
    }

    #[test]
    fn test_chronological_order() {
        let jan = GroupKey::month(NaiveDate::from_ymd_opt(2025, 1, 20).unwrap());
        let year = GroupKey::year(2024);
        let food = GroupKey::tag(&Tag::from("Food"));
        assert_eq!(year.cmp_chronological(&jan), Ordering::Less);
        assert_eq!(food.cmp_chronological(&jan), Ordering::Greater);
        assert_eq!(jan.label(), "Jan 2025");
    }
}
