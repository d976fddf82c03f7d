//! Pure functions that turn records into grouped, summed series for charts. Nothing here holds
//! state between calls.

mod cash_flow;
mod compare;
mod filter;
mod group;
mod key;
mod running;
mod series;
mod sum;

pub use cash_flow::{cash_flow, format_money, CashFlow, CashFlowWindow, Link, Node};
pub use compare::{chart_date_compare, parse_group_label};
pub use filter::{
    all_tags, expenses, in_range, in_year, income, is_expense, retirement, rsu, savings, Views,
};
pub use group::{group_by, group_by_multiple, Grouped, Groups};
pub use key::{by_day, by_month, by_tag, by_year, GroupKey, KeyFn, KeyKind};
pub use running::{month_label, monthly_running_totals, MonthTotal};
pub use series::{
    align, average_spending, date_grouped, merged_groups, range_totals, tag_stacked,
    year_pairs, year_to_date, Bucket, Chart, RangeTotals, Series, RANGE_AVERAGE,
};
pub use sum::{
    group_and_sum, sort_chronologically, sum_grouped, sum_grouped_expenses, GroupTotal,
    GROUP_SEPARATOR,
};
