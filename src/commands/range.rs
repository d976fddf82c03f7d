use crate::api::Mode;
use crate::commands::{open, Out};
use crate::model::{local_millis, parse_record_date, BrushRange};
use crate::{Config, Result};
use anyhow::Context;
use chrono::{NaiveDateTime, NaiveTime};

fn describe(range: &BrushRange) -> String {
    let format = |d: Option<NaiveDateTime>| {
        d.map(|d| d.format("%Y-%m-%d").to_string())
            .unwrap_or_else(|| "?".to_string())
    };
    format!(
        "{} to {}",
        format(range.start_date()),
        format(range.end_date())
    )
}

fn millis(s: &str, end_of_day: bool) -> Result<i64> {
    let mut date = parse_record_date(s).with_context(|| format!("Unable to read the date '{s}'"))?;
    if end_of_day && date.time() == NaiveTime::MIN {
        if let Some(last) = date.date().and_hms_opt(23, 59, 59) {
            date = last;
        }
    }
    local_millis(date).with_context(|| format!("'{s}' does not exist in the local time zone"))
}

pub async fn range_get(config: Config, mode: Mode) -> Result<Out<Option<BrushRange>>> {
    let context = open(&config, mode).await?;
    let range = context.range().current();
    let message = match &range {
        Some(range) => format!("The date range is {}", describe(range)),
        None => "No date range is set".to_string(),
    };
    Ok(Out::new(message, range))
}

/// Saves a new date range. A bound given without a time covers its whole day.
pub async fn range_set(config: Config, mode: Mode, start: &str, end: &str) -> Result<Out<BrushRange>> {
    let range = BrushRange::new(millis(start, false)?, millis(end, true)?);
    let context = open(&config, mode).await?;
    context.range().save(range).await?;
    Ok(Out::new(
        format!("The date range is now {}", describe(&range)),
        range,
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test::TestEnv;

    #[tokio::test]
    async fn test_set_then_get() {
        let env = TestEnv::new().await;
        let out = range_get(env.config(), Mode::Local).await.unwrap();
        assert_eq!(out.message(), "No date range is set");

        range_set(env.config(), Mode::Local, "2025-02-01", "02/28/2025")
            .await
            .unwrap();
        let out = range_get(env.config(), Mode::Local).await.unwrap();
        assert_eq!(out.message(), "The date range is 2025-02-01 to 2025-02-28");
        let range = out.structure().unwrap().unwrap();
        let last = parse_record_date("2025-02-28T23:59:59").unwrap();
        assert!(range.contains(local_millis(last).unwrap()));
    }

    #[tokio::test]
    async fn test_reversed_bounds_are_swapped() {
        let env = TestEnv::new().await;
        let out = range_set(env.config(), Mode::Local, "2025-03-01", "2025-01-01")
            .await
            .unwrap();
        let range = out.structure().unwrap();
        assert!(range.start() < range.end());
    }

    #[tokio::test]
    async fn test_bad_date() {
        let env = TestEnv::new().await;
        assert!(range_set(env.config(), Mode::Local, "soon", "later")
            .await
            .is_err());
    }
}
