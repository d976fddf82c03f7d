//! Chart-ready series built from classified records.

use crate::aggregate::{
    by_day, by_month, by_tag, by_year, chart_date_compare, group_and_sum, group_by_multiple,
    monthly_running_totals, sum_grouped, GroupTotal, KeyFn, Views,
};
use crate::model::{BrushRange, Expense};
use chrono::Datelike;
use serde::{Deserialize, Serialize};

/// The date bucket records are grouped into along the x axis.
#[derive(
    Debug,
    Clone,
    Copy,
    Default,
    PartialEq,
    Eq,
    Hash,
    PartialOrd,
    Ord,
    Serialize,
    Deserialize,
    clap::ValueEnum,
)]
#[serde(rename_all = "lowercase")]
pub enum Bucket {
    /// One group per day.
    Daily,
    /// One group per calendar month.
    #[default]
    Monthly,
    /// One group per calendar year.
    Yearly,
}

serde_plain::derive_display_from_serialize!(Bucket);
serde_plain::derive_fromstr_from_deserialize!(Bucket);

impl Bucket {
    pub fn key_fn(self) -> &'static KeyFn<Expense> {
        match self {
            Bucket::Daily => &by_day,
            Bucket::Monthly => &by_month,
            Bucket::Yearly => &by_year,
        }
    }
}

/// A named row of values, one per x label of its chart.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Series {
    pub name: String,
    pub values: Vec<f64>,
}

impl Series {
    pub fn new(name: impl Into<String>, values: Vec<f64>) -> Self {
        Self {
            name: name.into(),
            values,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Chart {
    pub x: Vec<String>,
    pub series: Vec<Series>,
}

impl Chart {
    pub fn series(&self, name: &str) -> Option<&Series> {
        self.series.iter().find(|s| s.name == name)
    }
}

/// Every distinct group label across `sets`, in date order.
pub fn merged_groups(sets: &[&[GroupTotal]]) -> Vec<String> {
    let mut groups: Vec<String> = Vec::new();
    for total in sets.iter().flat_map(|s| s.iter()) {
        if !groups.contains(&total.group) {
            groups.push(total.group.clone());
        }
    }
    groups.sort_by(|a, b| chart_date_compare(a, b));
    groups
}

/// The size of each group's total, or zero for groups `totals` lacks.
pub fn align(totals: &[GroupTotal], groups: &[String]) -> Vec<f64> {
    groups
        .iter()
        .map(|g| {
            totals
                .iter()
                .find(|t| &t.group == g)
                .map(|t| t.total.abs())
                .unwrap_or(0.0)
        })
        .collect()
}

/// Expenses, income and savings side by side per date bucket.
pub fn date_grouped(views: &Views, bucket: Bucket) -> Chart {
    let key_fns: [&KeyFn<Expense>; 1] = [bucket.key_fn()];
    let expenses = group_and_sum(&views.expenses, &key_fns);
    let income = sum_grouped(&group_by_multiple(&views.income, &key_fns));
    let savings = group_and_sum(&views.savings, &key_fns);
    let x = merged_groups(&[&expenses, &income, &savings]);
    Chart {
        series: vec![
            Series::new("Expenses", align(&expenses, &x)),
            Series::new("Income", align(&income, &x)),
            Series::new("Savings", align(&savings, &x)),
        ],
        x,
    }
}

/// Turns `outer > inner` rows into one series per outer label, indexed by inner label. Totals
/// keep their sign.
fn stacked(totals: &[GroupTotal], sort_x: bool) -> Chart {
    let mut x: Vec<String> = Vec::new();
    let mut names: Vec<String> = Vec::new();
    let mut cells: Vec<(String, String, f64)> = Vec::new();
    for t in totals {
        let (outer, inner) = match t.keys.as_slice() {
            [outer, inner, ..] => (outer.label().to_string(), inner.label().to_string()),
            [outer] => (outer.label().to_string(), String::new()),
            [] => (t.group.clone(), String::new()),
        };
        if !names.contains(&outer) {
            names.push(outer.clone());
        }
        if !x.contains(&inner) {
            x.push(inner.clone());
        }
        cells.push((outer, inner, t.total));
    }
    if sort_x {
        x.sort_by(|a, b| chart_date_compare(a, b));
    }
    let series = names
        .into_iter()
        .map(|name| {
            let values = x
                .iter()
                .map(|g| {
                    cells
                        .iter()
                        .find(|(o, i, _)| *o == name && i == g)
                        .map(|(_, _, v)| *v)
                        .unwrap_or(0.0)
                })
                .collect();
            Series { name, values }
        })
        .collect();
    Chart { x, series }
}

/// Spending per tag, stacked per date bucket.
pub fn tag_stacked(expenses: &[Expense], bucket: Bucket) -> Chart {
    stacked(&group_and_sum(expenses, &[&by_tag, bucket.key_fn()]), true)
}

/// The x label of the average spending chart.
pub const RANGE_AVERAGE: &str = "Range Average";

/// Spending and savings per tag, divided by the number of months `range` spans. Without a range
/// the totals are left undivided.
pub fn average_spending(views: &Views, range: Option<BrushRange>) -> Chart {
    let records: Vec<Expense> = views
        .expenses
        .iter()
        .chain(views.savings.iter())
        .cloned()
        .collect();
    let months = range.map(|r| r.month_span()).unwrap_or(1).max(1);
    let mut chart = stacked(&group_and_sum(&records, &[&by_tag]), false);
    chart.x = vec![RANGE_AVERAGE.to_string()];
    for s in chart.series.iter_mut() {
        for v in s.values.iter_mut() {
            *v /= f64::from(months);
        }
    }
    chart
}

/// Plain totals of each record set.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct RangeTotals {
    pub expenses: f64,
    pub income: f64,
    pub savings: f64,
    pub retirement: f64,
}

fn sum(records: &[Expense]) -> f64 {
    records.iter().map(Expense::amount).sum()
}

pub fn range_totals(views: &Views) -> RangeTotals {
    RangeTotals {
        expenses: sum(&views.expenses).abs(),
        income: sum(&views.income).abs(),
        savings: sum(&views.savings).abs(),
        retirement: sum(&views.retirement).abs(),
    }
}

/// Running totals through each month of every year in `years`. The x axis is `Jan` through
/// `Dec`; each year contributes Income, Expenses, Savings and Retirement series.
pub fn year_to_date(views: &Views, years: &[i32]) -> Chart {
    let mut x: Vec<String> = Vec::new();
    let mut series = Vec::new();
    for &year in years {
        for (name, records) in [
            ("Income", &views.income),
            ("Expenses", &views.expenses),
            ("Savings", &views.savings),
            ("Retirement", &views.retirement),
        ] {
            let totals = monthly_running_totals(records, year);
            if x.is_empty() {
                x = totals.iter().map(|t| t.label.clone()).collect();
            }
            series.push(Series::new(
                format!("{year} {name}"),
                totals.iter().map(|t| t.total.abs()).collect(),
            ));
        }
    }
    Chart { x, series }
}

/// Consecutive `(older, newer)` year pairs covering every year the records span. With fewer than
/// two years of data the pair ending in `current_year` is returned.
pub fn year_pairs(records: &[Expense], current_year: i32) -> Vec<(i32, i32)> {
    let years = records.iter().filter_map(|e| e.parsed_date().map(|d| d.year()));
    let (first, last) = years.fold((None, None), |(lo, hi): (Option<i32>, Option<i32>), y| {
        (
            Some(lo.map_or(y, |lo| lo.min(y))),
            Some(hi.map_or(y, |hi| hi.max(y))),
        )
    });
    match (first, last) {
        (Some(first), Some(last)) if first < last => (first..last).map(|y| (y, y + 1)).collect(),
        _ => vec![(current_year - 1, current_year)],
    }
}
