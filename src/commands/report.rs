//! Read-only commands that print the views a dashboard would chart.

use crate::aggregate::{
    self, average_spending, date_grouped, format_money, range_totals, tag_stacked, year_pairs,
    CashFlow, Chart, RangeTotals,
};
use crate::api::Mode;
use crate::args::{CashFlowArgs, SummaryArgs, ViewArgs, YearToDateArgs};
use crate::commands::{open, Out};
use crate::store::AppContext;
use crate::{Config, Result};
use chrono::{Datelike, Local};

/// Expenses, income and savings per date bucket, or spending per tag with `--by-tag`.
pub async fn summary(config: Config, mode: Mode, args: SummaryArgs) -> Result<Out<Chart>> {
    let context = open(&config, mode).await?;
    let views = views(&context, args.view());
    let chart = if args.by_tag() {
        tag_stacked(&views.expenses, args.bucket())
    } else {
        date_grouped(&views, args.bucket())
    };
    if chart.x.is_empty() {
        return Ok(Out::new("No records to summarize", chart));
    }
    Ok(Out::new(table(&chart), chart))
}

pub async fn totals(config: Config, mode: Mode, args: ViewArgs) -> Result<Out<RangeTotals>> {
    let context = open(&config, mode).await?;
    let totals = range_totals(&views(&context, &args));
    let message = format!(
        "Expenses {}, Income {}, Savings {}, Retirement {}",
        format_money(totals.expenses),
        format_money(totals.income),
        format_money(totals.savings),
        format_money(totals.retirement)
    );
    Ok(Out::new(message, totals))
}

/// Running monthly totals for two years. Without explicit years the most recent pair of years
/// found in the records is used.
pub async fn year_to_date(config: Config, mode: Mode, args: YearToDateArgs) -> Result<Out<Chart>> {
    let context = open(&config, mode).await?;
    let (older, newer) = match args.years() {
        Some(years) => years,
        None => year_pairs(&context.records(), Local::now().year())
            .last()
            .copied()
            .unwrap_or_else(|| {
                let year = Local::now().year();
                (year - 1, year)
            }),
    };
    let views = context.views(args.include_rsu(), false);
    let chart = aggregate::year_to_date(&views, &[older, newer]);
    Ok(Out::new(table(&chart), chart))
}

pub async fn average(config: Config, mode: Mode, args: ViewArgs) -> Result<Out<Chart>> {
    let context = open(&config, mode).await?;
    let range = if args.all() {
        None
    } else {
        context.range().current()
    };
    let chart = average_spending(&views(&context, &args), range);
    if chart.series.is_empty() {
        return Ok(Out::new("No spending in the date range", chart));
    }
    Ok(Out::new(table(&chart), chart))
}

pub async fn cash_flow(config: Config, mode: Mode, args: CashFlowArgs) -> Result<Out<CashFlow>> {
    let context = open(&config, mode).await?;
    let views = args.window().views(
        &context.records(),
        &context.current_settings(),
        context.range().current(),
        Local::now().year(),
    );
    let graph = aggregate::cash_flow(&views);
    let mut message = format!("Cash flow ({})", args.window());
    for link in graph.links.iter().filter(|l| l.value != 0.0) {
        let target = graph
            .node(&link.target)
            .map(|n| n.label.as_str())
            .unwrap_or(&link.target);
        message.push_str(&format!("\n  {} -> {target}", link.source));
    }
    Ok(Out::new(message, graph))
}

fn views(context: &AppContext, args: &ViewArgs) -> aggregate::Views {
    context.views(args.include_rsu(), !args.all())
}

/// Renders a chart as a markdown table with one row per x label and one column per series.
fn table(chart: &Chart) -> String {
    let mut out = String::from("| Group |");
    for s in &chart.series {
        out.push_str(&format!(" {} |", s.name));
    }
    out.push_str("\n|---|");
    out.push_str(&"---|".repeat(chart.series.len()));
    for (i, x) in chart.x.iter().enumerate() {
        out.push_str(&format!("\n| {x} |"));
        for s in &chart.series {
            let v = s.values.get(i).copied().unwrap_or(0.0);
            out.push_str(&format!(" {v:.2} |"));
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::aggregate::{Bucket, CashFlowWindow};
    use crate::test::TestEnv;

    #[tokio::test]
    async fn test_summary_is_limited_to_the_range() {
        let env = TestEnv::new().await;
        let args = SummaryArgs::new(ViewArgs::default(), Bucket::Monthly, false);
        let out = summary(env.config(), Mode::Test, args).await.unwrap();
        let chart = out.structure().unwrap();
        assert!(!chart.x.is_empty());
        assert!(chart.x.iter().all(|x| x.ends_with("2025")));
        assert!(out.message().starts_with("| Group | Expenses | Income | Savings |"));
    }

    #[tokio::test]
    async fn test_summary_by_tag_all_time() {
        let env = TestEnv::new().await;
        let args = SummaryArgs::new(ViewArgs::new(true, false), Bucket::Yearly, true);
        let out = summary(env.config(), Mode::Test, args).await.unwrap();
        let chart = out.structure().unwrap();
        assert_eq!(chart.x, vec!["2024", "2025"]);
        assert!(chart.series("Rent").is_some());
        assert!(chart.series("Income").is_none());
    }

    #[tokio::test]
    async fn test_totals_and_average() {
        let env = TestEnv::new().await;
        let out = totals(env.config(), Mode::Test, ViewArgs::default())
            .await
            .unwrap();
        let totals = out.structure().unwrap();
        assert!(totals.income > 0.0);
        assert!(totals.expenses > 0.0);

        let out = average(env.config(), Mode::Test, ViewArgs::default())
            .await
            .unwrap();
        assert_eq!(out.structure().unwrap().x, vec!["Range Average"]);
    }

    #[tokio::test]
    async fn test_year_to_date_defaults_to_latest_pair() {
        let env = TestEnv::new().await;
        let out = year_to_date(env.config(), Mode::Test, YearToDateArgs::default())
            .await
            .unwrap();
        let chart = out.structure().unwrap();
        assert_eq!(chart.x.len(), 12);
        assert!(chart.series("2024 Income").is_some());
        assert!(chart.series("2025 Retirement").is_some());
    }

    #[tokio::test]
    async fn test_cash_flow_all_time() {
        let env = TestEnv::new().await;
        let out = cash_flow(
            env.config(),
            Mode::Test,
            CashFlowArgs::new(CashFlowWindow::AllTime),
        )
        .await
        .unwrap();
        let graph = out.structure().unwrap();
        assert!(graph.link("base", "income").unwrap().value > 0.0);
        assert!(graph.node("excess").is_some());
        assert!(out.message().starts_with("Cash flow (all-time)"));
    }

    #[test]
    fn test_table() {
        let chart = Chart {
            x: vec!["Jan 2025".to_string()],
            series: vec![aggregate::Series::new("Expenses", vec![12.5])],
        };
        assert_eq!(
            table(&chart),
            "| Group | Expenses |\n|---|---|\n| Jan 2025 | 12.50 |"
        );
    }
}
