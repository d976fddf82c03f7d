use clap::Parser;
use spendscope::args::{Args, Command, RangeAction, SettingsAction};
use spendscope::{commands, Config, Mode, Result};
use std::process::ExitCode;
use tracing::{debug, error, trace};
use tracing_subscriber::filter::LevelFilter;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> ExitCode {
    let args = Args::parse();
    let log_level = args.common().log_level();
    init_logger(log_level);
    debug!("Log level set to {}", log_level.to_string().to_lowercase());

    match main_inner(args).await {
        Ok(_) => ExitCode::SUCCESS,
        Err(e) => {
            error!("Exiting with error: {e:#}");
            ExitCode::FAILURE
        }
    }
}

pub async fn main_inner(args: Args) -> Result<()> {
    trace!("{args:?}");
    let home = args.common().home().path();

    // When SPENDSCOPE_IN_TEST_MODE is set and non-empty the mode is Mode::Test and commands run
    // against seeded data in memory, otherwise they use the store file under home.
    let mode = Mode::from_env();

    let load = || Config::load(home);
    let _: () = match args.command() {
        Command::Init => commands::init(home).await?.print(),
        Command::Summary(a) => commands::summary(load().await?, mode, a.clone()).await?.print(),
        Command::Totals(a) => commands::totals(load().await?, mode, a.clone()).await?.print(),
        Command::YearToDate(a) => {
            commands::year_to_date(load().await?, mode, a.clone())
                .await?
                .print()
        }
        Command::Average(a) => commands::average(load().await?, mode, a.clone()).await?.print(),
        Command::CashFlow(a) => {
            commands::cash_flow(load().await?, mode, a.clone())
                .await?
                .print()
        }
        Command::Range(a) => {
            let config = load().await?;
            match a.action() {
                RangeAction::Get => commands::range_get(config, mode).await?.print(),
                RangeAction::Set { start, end } => {
                    commands::range_set(config, mode, start, end).await?.print()
                }
            }
        }
        Command::Settings(a) => {
            let config = load().await?;
            match a.action() {
                SettingsAction::Get => commands::settings_get(config, mode).await?.print(),
                SettingsAction::Set { tags } => {
                    commands::settings_set(config, mode, tags).await?.print()
                }
                SettingsAction::Reset => commands::settings_reset(config, mode).await?.print(),
            }
        }
        Command::Add(a) => commands::add(load().await?, mode, a.clone()).await?.print(),
        Command::Update(a) => commands::update(load().await?, mode, a.clone()).await?.print(),
        Command::Remove(a) => commands::remove(load().await?, mode, a.clone()).await?.print(),
        Command::Tag(a) => commands::tag(load().await?, mode, a.clone()).await?.print(),
        Command::Import(a) => commands::import(load().await?, mode, a.clone()).await?.print(),
        Command::Watch(a) => commands::watch(load().await?, mode, a.clone()).await?.print(),
    };
    Ok(())
}

/// Initializes the tracing subscriber.
pub fn init_logger(level: LevelFilter) {
    let filter = match std::env::var("RUST_LOG").ok() {
        Some(_) => {
            // RUST_LOG exists; use it.
            EnvFilter::from_default_env()
        }
        None => {
            // RUST_LOG does not exist; use default log level for this crate only.
            EnvFilter::new(format!(
                "{}={},{}={}",
                env!("CARGO_CRATE_NAME"),
                level,
                env!("CARGO_BIN_NAME"),
                level
            ))
        }
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}
