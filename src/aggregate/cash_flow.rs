//! The cash-flow graph: where income comes from and where it goes.

use crate::aggregate::Views;
use crate::model::{BrushRange, Expense, ExpenseTag, Settings, ALL_EXPENSE_TAGS};
use serde::{Deserialize, Serialize};

/// Which records feed the graph.
#[derive(
    Debug,
    Clone,
    Copy,
    Default,
    PartialEq,
    Eq,
    Hash,
    Serialize,
    Deserialize,
    clap::ValueEnum,
)]
#[serde(rename_all = "kebab-case")]
pub enum CashFlowWindow {
    /// Records dated in the current calendar year.
    YearToDate,
    /// Every record.
    AllTime,
    /// Records inside the brush range.
    #[default]
    Range,
}

serde_plain::derive_display_from_serialize!(CashFlowWindow);
serde_plain::derive_fromstr_from_deserialize!(CashFlowWindow);

impl CashFlowWindow {
    /// Classifies `records` for the graph. Stock vesting gets its own nodes, so it is kept out of
    /// income and savings.
    pub fn views(
        self,
        records: &[Expense],
        settings: &Settings,
        range: Option<BrushRange>,
        current_year: i32,
    ) -> Views {
        match self {
            CashFlowWindow::YearToDate => {
                Views::classify(records, settings, false).in_year(current_year)
            }
            CashFlowWindow::AllTime => Views::classify(records, settings, false),
            CashFlowWindow::Range => Views::classify_in(records, settings, false, range),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Node {
    pub id: String,
    pub label: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Link {
    pub source: String,
    pub target: String,
    pub value: f64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct CashFlow {
    pub nodes: Vec<Node>,
    pub links: Vec<Link>,
}

impl CashFlow {
    pub fn node(&self, id: &str) -> Option<&Node> {
        self.nodes.iter().find(|n| n.id == id)
    }

    pub fn link(&self, source: &str, target: &str) -> Option<&Link> {
        self.links
            .iter()
            .find(|l| l.source == source && l.target == target)
    }
}

/// Tag spending below this is treated as zero.
const TAG_THRESHOLD: f64 = 0.009;

/// `$12.34`, or `$1.23k` from a thousand up.
pub fn format_money(value: f64) -> String {
    if value.abs() < 1000.0 {
        format!("${value:.2}")
    } else {
        format!("${:.2}k", value / 1000.0)
    }
}

fn rounded_sum(records: &[Expense]) -> f64 {
    let sum: f64 = records.iter().map(Expense::amount).sum();
    (sum * 100.0).round() / 100.0
}

fn node(id: impl Into<String>, label: impl Into<String>) -> Node {
    Node {
        id: id.into(),
        label: label.into(),
    }
}

fn link(source: &str, target: impl Into<String>, value: f64) -> Link {
    Link {
        source: source.to_string(),
        target: target.into(),
        value,
    }
}

/// Spending per expense tag. A record counts toward the first known expense tag it carries.
fn spending_by_tag(expenses: &[Expense]) -> Vec<(ExpenseTag, f64)> {
    let mut totals: Vec<(ExpenseTag, f64)> = ALL_EXPENSE_TAGS.iter().map(|t| (*t, 0.0)).collect();
    for e in expenses {
        if let Some(tag) = e.tags().iter().find_map(|t| t.expense_tag()) {
            if let Some(slot) = totals.iter_mut().find(|(t, _)| *t == tag) {
                slot.1 += e.amount();
            }
        }
    }
    totals
}

/// Builds the graph from already classified records. Income is recorded as negative amounts and
/// stock vesting likewise, so both are flipped to read as inflows.
pub fn cash_flow(views: &Views) -> CashFlow {
    let income = rounded_sum(&views.income);
    let savings = rounded_sum(&views.savings);
    let expenses = rounded_sum(&views.expenses);
    let rsu = -rounded_sum(&views.rsu);
    let retirement = rounded_sum(&views.retirement);
    let total_comp = income - rsu;
    let by_tag = spending_by_tag(&views.expenses);
    let excess = total_comp.abs() - (expenses + savings + rsu);

    let mut nodes = vec![
        node(
            "retirementded",
            format!(
                "Retirement Deductions – {}",
                format_money(retirement.abs())
            ),
        ),
        node(
            "retirement",
            format!("Retirement – {}", format_money(retirement.abs())),
        ),
        node(
            "base",
            format!(
                "Base Salary (After tax & Deductions) – {}",
                format_money(income.abs())
            ),
        ),
        node("stock", format!("RSU Vesting – {}", format_money(rsu.abs()))),
        node(
            "income",
            format!("Total Comp – {}", format_money(total_comp.abs())),
        ),
        node("savings", format!("Savings – {}", format_money(savings))),
        node("rsu", format!("RSU's – {}", format_money(rsu))),
    ];
    nodes.extend(
        by_tag
            .iter()
            .filter(|(_, v)| *v > TAG_THRESHOLD)
            .map(|(tag, v)| {
                let tag = tag.as_str();
                node(format!("tag:{tag}"), format!("{tag} – {}", format_money(*v)))
            }),
    );
    nodes.push(node(
        "excess",
        format!("Unallocated – {}", format_money(excess)),
    ));

    let mut links = vec![
        link("retirementded", "retirement", retirement.abs()),
        link("base", "income", income.abs()),
        link("stock", "income", rsu),
        link("income", "savings", savings),
        link("income", "rsu", rsu),
        link("income", "excess", excess),
    ];
    links.extend(
        by_tag
            .iter()
            .filter(|(_, v)| *v > 0.0)
            .map(|(tag, v)| link("income", format!("tag:{}", tag.as_str()), *v)),
    );

    CashFlow { nodes, links }
}
