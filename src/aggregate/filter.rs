//! Selecting which records feed a view.

use crate::model::{
    BrushRange, Expense, KnownTag, NonExpenseTag, Settings, Tag, ALL_EXPENSE_TAGS,
    ALL_NON_EXPENSE_TAGS,
};
use chrono::Datelike;
use serde::Serialize;
use std::collections::BTreeSet;

/// Records whose date falls inside `range`, bounds included. With no range every record is kept.
/// Records with unreadable dates are dropped whenever a range is given.
pub fn in_range(records: &[Expense], range: Option<BrushRange>) -> Vec<Expense> {
    match range {
        None => records.to_vec(),
        Some(range) => records
            .iter()
            .filter(|e| e.timestamp_ms().is_some_and(|ms| range.contains(ms)))
            .cloned()
            .collect(),
    }
}

/// Records dated in the calendar year `year`.
pub fn in_year(records: &[Expense], year: i32) -> Vec<Expense> {
    records
        .iter()
        .filter(|e| e.parsed_date().is_some_and(|d| d.year() == year))
        .cloned()
        .collect()
}

fn has_non_expense_tag(e: &Expense) -> bool {
    e.tags()
        .iter()
        .any(|t| matches!(t.known(), Some(KnownTag::NonExpense(_))))
}

/// Whether a record counts as spending under `settings`.
///
/// Records carrying any non-expense tag never count. Untagged records always count, as do records
/// that carry no known expense tag at all. Otherwise at least one of the record's expense tags
/// must be enabled.
pub fn is_expense(e: &Expense, settings: &Settings) -> bool {
    if has_non_expense_tag(e) {
        return false;
    }
    if e.is_untagged() || e.is_custom_only() {
        return true;
    }
    e.tags()
        .iter()
        .filter_map(Tag::expense_tag)
        .any(|t| settings.is_expense_enabled(t))
}

pub fn expenses(records: &[Expense], settings: &Settings) -> Vec<Expense> {
    records
        .iter()
        .filter(|e| is_expense(e, settings))
        .cloned()
        .collect()
}

/// Income records, plus stock vesting when `include_rsu` is set and RSU is enabled.
pub fn income(records: &[Expense], settings: &Settings, include_rsu: bool) -> Vec<Expense> {
    let rsu = include_rsu && settings.rsu_enabled();
    records
        .iter()
        .filter(|e| e.has_tag(NonExpenseTag::Income) || (rsu && e.has_tag(NonExpenseTag::Rsu)))
        .cloned()
        .collect()
}

/// Savings records, plus stock vesting when `include_rsu` is set and RSU is enabled. Vesting is
/// recorded as an inflow, so its sign is flipped to read as money saved.
pub fn savings(records: &[Expense], settings: &Settings, include_rsu: bool) -> Vec<Expense> {
    let rsu = include_rsu && settings.rsu_enabled();
    records
        .iter()
        .filter_map(|e| {
            if e.has_tag(NonExpenseTag::Savings) {
                Some(e.clone())
            } else if rsu && e.has_tag(NonExpenseTag::Rsu) {
                Some(e.inverted())
            } else {
                None
            }
        })
        .collect()
}

/// Stock vesting records, or nothing when RSU is disabled.
pub fn rsu(records: &[Expense], settings: &Settings) -> Vec<Expense> {
    if !settings.rsu_enabled() {
        return Vec::new();
    }
    with_tag(records, NonExpenseTag::Rsu)
}

pub fn retirement(records: &[Expense]) -> Vec<Expense> {
    with_tag(records, NonExpenseTag::Retirement)
}

fn with_tag(records: &[Expense], tag: NonExpenseTag) -> Vec<Expense> {
    records.iter().filter(|e| e.has_tag(tag)).cloned().collect()
}

/// Every record set a chart may need, split out of one list of records.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Views {
    pub expenses: Vec<Expense>,
    pub income: Vec<Expense>,
    pub savings: Vec<Expense>,
    pub rsu: Vec<Expense>,
    pub retirement: Vec<Expense>,
}

impl Views {
    pub fn classify(records: &[Expense], settings: &Settings, include_rsu: bool) -> Self {
        Self {
            expenses: expenses(records, settings),
            income: income(records, settings, include_rsu),
            savings: savings(records, settings, include_rsu),
            rsu: rsu(records, settings),
            retirement: retirement(records),
        }
    }

    /// Classifies only the records inside `range`.
    pub fn classify_in(
        records: &[Expense],
        settings: &Settings,
        include_rsu: bool,
        range: Option<BrushRange>,
    ) -> Self {
        Self::classify(&in_range(records, range), settings, include_rsu)
    }

    pub fn in_year(&self, year: i32) -> Self {
        Self {
            expenses: in_year(&self.expenses, year),
            income: in_year(&self.income, year),
            savings: in_year(&self.savings, year),
            rsu: in_year(&self.rsu, year),
            retirement: in_year(&self.retirement, year),
        }
    }
}

/// Every tag that can be offered for tagging: the tags already in use plus all known tags, minus
/// Income, Savings and Retirement.
pub fn all_tags(records: &[Expense]) -> Vec<Tag> {
    let mut tags: BTreeSet<Tag> = records.iter().flat_map(|e| e.tags().to_vec()).collect();
    tags.extend(ALL_EXPENSE_TAGS.iter().map(|t| Tag::from(*t)));
    tags.extend(ALL_NON_EXPENSE_TAGS.iter().map(|t| Tag::from(*t)));
    for excluded in [
        NonExpenseTag::Income,
        NonExpenseTag::Savings,
        NonExpenseTag::Retirement,
    ] {
        tags.remove(&Tag::from(excluded));
    }
    tags.into_iter().collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{local_millis, parse_record_date, ExpenseTag};

    fn record(id: &str, amount: f64, tags: &[&str], date: &str) -> Expense {
        Expense::new(
            id,
            amount,
            tags.iter().map(|t| Tag::from(*t)).collect(),
            date,
            id,
        )
    }

    fn ids(records: &[Expense]) -> Vec<&str> {
        records.iter().map(Expense::id).collect()
    }

    fn sample() -> Vec<Expense> {
        vec![
            record("food", 10.0, &["Food"], "2025-01-01"),
            record("gas", 20.0, &["Gas"], "2025-01-02"),
            record("blank", 30.0, &[], "2025-01-03"),
            record("kids", 40.0, &["Kids"], "2025-02-01"),
            record("pay", -1000.0, &["Income"], "2025-02-01"),
            record("vest", -500.0, &["RSU"], "2025-02-15"),
            record("save", 200.0, &["Savings"], "2025-03-01"),
            record("401k", 300.0, &["Retirement"], "2025-03-01"),
            record("mixed", 5.0, &["Gas", "Kids"], "2025-03-02"),
        ]
    }

    #[test]
    fn test_expense_inclusion() {
        let settings = Settings::new([Tag::from(ExpenseTag::Food)]);
        let got = expenses(&sample(), &settings);
        assert_eq!(ids(&got), vec!["food", "blank", "kids"]);

        let mixed = record("mixed", 5.0, &["Gas", "Kids"], "2025-03-02");
        assert!(!is_expense(&mixed, &settings));
        assert!(is_expense(&mixed, &Settings::new([Tag::from(ExpenseTag::Gas)])));
        assert!(is_expense(&record("none", 1.0, &[], "2025-03-02"), &Settings::new([])));
    }

    #[test]
    fn test_income_and_savings_with_rsu() {
        let settings = Settings::default();
        assert_eq!(ids(&income(&sample(), &settings, false)), vec!["pay"]);
        assert_eq!(ids(&income(&sample(), &settings, true)), vec!["pay", "vest"]);
        let saved = savings(&sample(), &settings, true);
        assert_eq!(ids(&saved), vec!["vest", "save"]);
        assert_eq!(saved[0].amount(), 500.0);
    }

    #[test]
    fn test_rsu_disabled() {
        let settings = Settings::new([Tag::from(ExpenseTag::Food)]);
        assert!(rsu(&sample(), &settings).is_empty());
        assert_eq!(ids(&income(&sample(), &settings, true)), vec!["pay"]);
        assert_eq!(ids(&retirement(&sample())), vec!["401k"]);
    }

    #[test]
    fn test_in_range_is_inclusive() {
        let start = local_millis(parse_record_date("2025-01-02").unwrap()).unwrap();
        let end = local_millis(parse_record_date("2025-02-01").unwrap()).unwrap();
        let got = in_range(&sample(), Some(BrushRange::new(start, end)));
        assert_eq!(ids(&got), vec!["gas", "blank", "kids", "pay"]);
        assert_eq!(in_range(&sample(), None).len(), sample().len());
    }

    #[test]
    fn test_in_year() {
        let mut records = sample();
        records.push(record("old", 1.0, &[], "2024-12-31T23:59:59"));
        assert_eq!(ids(&in_year(&records, 2024)), vec!["old"]);
    }

    #[test]
    fn test_all_tags() {
        let tags = all_tags(&sample());
        assert!(tags.contains(&Tag::from("Kids")));
        assert!(tags.contains(&Tag::from(NonExpenseTag::Rsu)));
        assert!(tags.contains(&Tag::from(ExpenseTag::Travel)));
        assert!(!tags.contains(&Tag::from(NonExpenseTag::Income)));
        assert!(!tags.contains(&Tag::from(NonExpenseTag::Savings)));
        assert_eq!(tags.len(), ALL_EXPENSE_TAGS.len() + 2);
    }
}
