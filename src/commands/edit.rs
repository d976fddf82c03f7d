//! Commands that change expense records.

use crate::api::Mode;
use crate::args::{AddArgs, RemoveArgs, TagArgs, UpdateArgs};
use crate::commands::{open, Out};
use crate::model::{parse_record_date, Expense, Tag, RECORD_DATE_FORMAT};
use crate::{Config, Result};
use anyhow::{bail, Context};
use tracing::warn;

/// Parses a user supplied date and writes it back out the way records store dates.
fn record_date(s: &str) -> Result<String> {
    let date = parse_record_date(s).with_context(|| format!("Unable to read the date '{s}'"))?;
    Ok(date.format(RECORD_DATE_FORMAT).to_string())
}

fn tags(names: &[String]) -> Vec<Tag> {
    names.iter().map(|t| Tag::from(t.as_str())).collect()
}

pub async fn add(config: Config, mode: Mode, args: AddArgs) -> Result<Out<Expense>> {
    if !args.amount().is_finite() {
        bail!("The amount must be a finite number")
    }
    let expense = Expense::with_derived_id(
        args.amount(),
        tags(args.tags()),
        record_date(args.date())?,
        args.description(),
    );
    let context = open(&config, mode).await?;
    context.add_expense(expense.clone()).await?;
    Ok(Out::new(format!("Added expense {}", expense.id()), expense))
}

/// Changes the fields given in `args` and keeps the rest.
pub async fn update(config: Config, mode: Mode, args: UpdateArgs) -> Result<Out<Expense>> {
    let context = open(&config, mode).await?;
    let Some(existing) = context.records().into_iter().find(|e| e.id() == args.id()) else {
        bail!("There is no expense with id '{}'", args.id())
    };
    let tags = if args.untag() {
        Vec::new()
    } else if args.tags().is_empty() {
        existing.tags().to_vec()
    } else {
        tags(args.tags())
    };
    let date = match args.date() {
        Some(date) => record_date(date)?,
        None => existing.date().to_string(),
    };
    let updated = Expense::new(
        existing.id(),
        args.amount().unwrap_or(existing.amount()),
        tags,
        date,
        args.description().unwrap_or(existing.description()),
    );
    context.update_expense(args.id(), updated.clone()).await?;
    Ok(Out::new(format!("Updated expense {}", args.id()), updated))
}

pub async fn remove(config: Config, mode: Mode, args: RemoveArgs) -> Result<Out<String>> {
    let context = open(&config, mode).await?;
    let removed = context.remove_expense(args.id()).await?;
    Ok(Out::new(format!("Removed expense {removed}"), removed))
}

/// Replaces the tags of every record named in `args` in a single write.
pub async fn tag(config: Config, mode: Mode, args: TagArgs) -> Result<Out<usize>> {
    let context = open(&config, mode).await?;
    context.selection().set(args.ids().to_vec());
    let tagged = context.tag_selection(tags(args.tags())).await?;
    if tagged < args.ids().len() {
        warn!(
            "{} of the given ids did not match any expense",
            args.ids().len() - tagged
        );
    }
    Ok(Out::new(format!("Tagged {tagged} expenses"), tagged))
}
