use crate::aggregate::{format_money, range_totals};
use crate::api::Mode;
use crate::args::WatchArgs;
use crate::commands::{open, Out};
use crate::store::AppContext;
use crate::{Config, Result};
use std::time::Duration;
use tokio::time::sleep;
use tracing::{debug, info};

fn log_totals(context: &AppContext) {
    let totals = range_totals(&context.views(false, true));
    info!(
        "{} records, expenses {}, income {}, savings {}",
        context.records().len(),
        format_money(totals.expenses),
        format_money(totals.income),
        format_money(totals.savings)
    );
}

/// Follows the records and the date range, logging the totals each time a burst of changes
/// settles. Runs until interrupted or until `--seconds` elapse. Returns the number of updates.
pub async fn watch(config: Config, mode: Mode, args: WatchArgs) -> Result<Out<usize>> {
    let context = open(&config, mode).await?;
    let mut expenses = context.expenses().debounced();
    let mut range = context.range().debounced();
    let deadline = async {
        match args.seconds() {
            Some(seconds) => sleep(Duration::from_secs(seconds)).await,
            None => std::future::pending().await,
        }
    };
    tokio::pin!(deadline);

    log_totals(&context);
    let mut updates = 0;
    loop {
        tokio::select! {
            Some(records) = expenses.changed() => {
                debug!("Expenses settled at {} records", records.len());
            }
            Some(range) = range.changed() => {
                debug!("Date range settled at {range:?}");
            }
            _ = tokio::signal::ctrl_c() => break,
            _ = &mut deadline => break,
        }
        updates += 1;
        log_totals(&context);
    }
    Ok(Out::new(format!("Stopped watching after {updates} updates"), updates))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test::TestEnv;

    #[tokio::test(start_paused = true)]
    async fn test_watch_stops_at_deadline() {
        let env = TestEnv::new().await;
        let out = watch(env.config(), Mode::Test, WatchArgs::new(Some(5)))
            .await
            .unwrap();
        assert_eq!(out.structure(), Some(&0));
        assert_eq!(out.message(), "Stopped watching after 0 updates");
    }
}
