use crate::aggregate::{chart_date_compare, group_by_multiple, GroupKey, Grouped, KeyFn};
use crate::model::{Expense, NonExpenseTag};
use serde::Serialize;

/// Separates the keys of a nested group in its flattened label.
pub const GROUP_SEPARATOR: &str = " > ";

/// One innermost group and the sum of its records.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GroupTotal {
    /// The keys from the outermost group down, joined with [`GROUP_SEPARATOR`]. Empty when no
    /// grouping was applied.
    pub group: String,
    pub total: f64,
    #[serde(skip)]
    pub keys: Vec<GroupKey>,
}

impl GroupTotal {
    /// The key of the innermost group.
    pub fn leaf_key(&self) -> Option<&GroupKey> {
        self.keys.last()
    }
}

fn flatten(
    grouped: &Grouped<Expense>,
    path: &mut Vec<GroupKey>,
    include: &impl Fn(&Expense) -> bool,
    out: &mut Vec<GroupTotal>,
) {
    match grouped {
        Grouped::Leaf(records) => {
            let total = records
                .iter()
                .filter(|e| include(e))
                .map(Expense::amount)
                .sum();
            let group = path
                .iter()
                .map(GroupKey::label)
                .collect::<Vec<_>>()
                .join(GROUP_SEPARATOR);
            out.push(GroupTotal {
                group,
                total,
                keys: path.clone(),
            });
        }
        Grouped::Node(groups) => {
            for (key, child) in groups.iter() {
                path.push(key.clone());
                flatten(child, path, include, out);
                path.pop();
            }
        }
    }
}

/// One row per innermost group, in grouping order. Records tagged Income are left out of every
/// total, even when they also carry other tags.
pub fn sum_grouped_expenses(grouped: &Grouped<Expense>) -> Vec<GroupTotal> {
    let mut out = Vec::new();
    flatten(
        grouped,
        &mut Vec::new(),
        &|e: &Expense| !e.has_tag(NonExpenseTag::Income),
        &mut out,
    );
    out
}

/// Like [`sum_grouped_expenses`] but every record counts. Used for series built from income.
pub fn sum_grouped(grouped: &Grouped<Expense>) -> Vec<GroupTotal> {
    let mut out = Vec::new();
    flatten(grouped, &mut Vec::new(), &|_: &Expense| true, &mut out);
    out
}

/// Groups `records` by `key_fns` and sums each innermost group, leaving out Income.
pub fn group_and_sum(records: &[Expense], key_fns: &[&KeyFn<Expense>]) -> Vec<GroupTotal> {
    sum_grouped_expenses(&group_by_multiple(records, key_fns))
}

/// Sorts rows by their innermost key, oldest first. Rows whose keys carry no date are ordered by
/// their label.
pub fn sort_chronologically(totals: &mut [GroupTotal]) {
    totals.sort_by(|a, b| match (a.leaf_key(), b.leaf_key()) {
        (Some(a), Some(b)) => a.cmp_chronological(b),
        _ => chart_date_compare(&a.group, &b.group),
    });
}
