//! These structs provide the CLI interface for the spendscope CLI.

use crate::aggregate::{Bucket, CashFlowWindow};
use crate::api::CsvDefinitionKey;
use clap::{Args as ClapArgs, Parser, Subcommand};
use std::convert::Infallible;
use std::fmt::{Display, Formatter};
use std::ops::Deref;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use tracing::error;
use tracing_subscriber::filter::LevelFilter;

/// spendscope: A command-line tool for exploring your expenses.
///
/// Records are kept in a local store file inside the spendscope home directory. You can import
/// bank exports in CSV form, tag records, pick a date range, and print the same grouped and
/// summed views a dashboard would chart.
///
/// Set SPENDSCOPE_IN_TEST_MODE to any non-empty value to run against seeded sample data that is
/// never written to disk.
#[derive(Debug, Parser, Clone)]
pub struct Args {
    #[clap(flatten)]
    common: Common,

    #[command(subcommand)]
    command: Command,
}

impl Args {
    pub fn new(common: Common, command: Command) -> Self {
        Self { common, command }
    }

    pub fn common(&self) -> &Common {
        &self.common
    }

    pub fn command(&self) -> &Command {
        &self.command
    }
}

#[derive(Subcommand, Debug, Clone)]
pub enum Command {
    /// Create the data directory and initialize the configuration file.
    ///
    /// This is the first command you should run. By default the data directory is
    /// $HOME/spendscope; pass --home or set SPENDSCOPE_HOME to put it somewhere else.
    Init,
    /// Expenses, income and savings per day, month or year.
    Summary(SummaryArgs),
    /// Total expenses, income, savings and retirement contributions.
    Totals(ViewArgs),
    /// Running totals through each month of two years, side by side.
    YearToDate(YearToDateArgs),
    /// Average monthly spending per tag over the date range.
    Average(ViewArgs),
    /// Where income comes from and where it goes.
    CashFlow(CashFlowArgs),
    /// Show or change the date range that views are filtered by.
    Range(RangeArgs),
    /// Show or replace the tags that count towards expenses and whether RSU vesting is counted.
    Settings(SettingsArgs),
    /// Add an expense record.
    Add(AddArgs),
    /// Change an existing expense record.
    Update(UpdateArgs),
    /// Remove an expense record.
    Remove(RemoveArgs),
    /// Replace the tags of one or more records.
    Tag(TagArgs),
    /// Import records from a bank's CSV export.
    Import(ImportArgs),
    /// Follow the records and the date range, printing totals whenever they settle.
    Watch(WatchArgs),
}

/// Arguments common to all subcommands.
#[derive(Debug, Parser, Clone)]
pub struct Common {
    /// The logging verbosity. One of, from least to most verbose:
    /// off, error, warn, info, debug, trace
    ///
    /// This can be overridden by RUST_LOG.
    #[arg(long, default_value_t = LevelFilter::INFO)]
    log_level: LevelFilter,

    /// The directory where spendscope data and configuration is held. Defaults to ~/spendscope
    #[arg(long, env = "SPENDSCOPE_HOME", default_value_t = default_home())]
    home: DisplayPath,
}

impl Common {
    pub fn new(log_level: LevelFilter, home: PathBuf) -> Self {
        Self {
            log_level,
            home: home.into(),
        }
    }

    pub fn log_level(&self) -> LevelFilter {
        self.log_level
    }

    pub fn home(&self) -> &DisplayPath {
        &self.home
    }
}

/// Selects which records a view is built from.
#[derive(Debug, ClapArgs, Clone, Default)]
pub struct ViewArgs {
    /// Use every record instead of only those inside the date range.
    #[arg(long)]
    all: bool,

    /// Count stock vesting as income and savings.
    #[arg(long)]
    include_rsu: bool,
}

impl ViewArgs {
    pub fn new(all: bool, include_rsu: bool) -> Self {
        Self { all, include_rsu }
    }

    pub fn all(&self) -> bool {
        self.all
    }

    pub fn include_rsu(&self) -> bool {
        self.include_rsu
    }
}

/// (Not shown): Args for the `spendscope summary` command.
#[derive(Debug, ClapArgs, Clone, Default)]
pub struct SummaryArgs {
    #[clap(flatten)]
    view: ViewArgs,

    /// The date bucket to group by.
    #[arg(long, value_enum, default_value_t = Bucket::Monthly)]
    bucket: Bucket,

    /// Break spending down per tag instead of showing expenses, income and savings.
    #[arg(long)]
    by_tag: bool,
}

impl SummaryArgs {
    pub fn new(view: ViewArgs, bucket: Bucket, by_tag: bool) -> Self {
        Self {
            view,
            bucket,
            by_tag,
        }
    }

    pub fn view(&self) -> &ViewArgs {
        &self.view
    }

    pub fn bucket(&self) -> Bucket {
        self.bucket
    }

    pub fn by_tag(&self) -> bool {
        self.by_tag
    }
}

/// (Not shown): Args for the `spendscope year-to-date` command.
#[derive(Debug, ClapArgs, Clone, Default)]
pub struct YearToDateArgs {
    /// The older of the two years. Defaults to the most recent pair of years in the data.
    #[arg(long, requires = "newer")]
    older: Option<i32>,

    /// The newer of the two years.
    #[arg(long, requires = "older")]
    newer: Option<i32>,

    /// Count stock vesting as income and savings.
    #[arg(long)]
    include_rsu: bool,
}

impl YearToDateArgs {
    pub fn new(years: Option<(i32, i32)>, include_rsu: bool) -> Self {
        Self {
            older: years.map(|(older, _)| older),
            newer: years.map(|(_, newer)| newer),
            include_rsu,
        }
    }

    pub fn years(&self) -> Option<(i32, i32)> {
        self.older.zip(self.newer)
    }

    pub fn include_rsu(&self) -> bool {
        self.include_rsu
    }
}

/// (Not shown): Args for the `spendscope cash-flow` command.
#[derive(Debug, ClapArgs, Clone, Default)]
pub struct CashFlowArgs {
    /// Which records to include.
    #[arg(long, value_enum, default_value_t = CashFlowWindow::Range)]
    window: CashFlowWindow,
}

impl CashFlowArgs {
    pub fn new(window: CashFlowWindow) -> Self {
        Self { window }
    }

    pub fn window(&self) -> CashFlowWindow {
        self.window
    }
}

/// (Not shown): Args for the `spendscope range` command.
#[derive(Debug, ClapArgs, Clone)]
pub struct RangeArgs {
    #[command(subcommand)]
    action: RangeAction,
}

impl RangeArgs {
    pub fn new(action: RangeAction) -> Self {
        Self { action }
    }

    pub fn action(&self) -> &RangeAction {
        &self.action
    }
}

#[derive(Subcommand, Debug, Clone)]
pub enum RangeAction {
    /// Print the current date range.
    Get,
    /// Set the date range. Dates are YYYY-MM-DD or MM/DD/YYYY, both bounds included.
    Set {
        /// The first day of the range.
        start: String,
        /// The last day of the range.
        end: String,
    },
}

/// (Not shown): Args for the `spendscope settings` command.
#[derive(Debug, ClapArgs, Clone)]
pub struct SettingsArgs {
    #[command(subcommand)]
    action: SettingsAction,
}

impl SettingsArgs {
    pub fn new(action: SettingsAction) -> Self {
        Self { action }
    }

    pub fn action(&self) -> &SettingsAction {
        &self.action
    }
}

#[derive(Subcommand, Debug, Clone)]
pub enum SettingsAction {
    /// Print the enabled tags.
    Get,
    /// Replace the enabled tags with exactly the ones given. Include RSU to count stock vesting.
    Set {
        /// The tags to enable.
        #[arg(required = true)]
        tags: Vec<String>,
    },
    /// Enable every expense tag and RSU again.
    Reset,
}

/// (Not shown): Args for the `spendscope add` command.
#[derive(Debug, ClapArgs, Clone)]
pub struct AddArgs {
    /// The amount. Spending is positive, income negative.
    #[arg(long, allow_hyphen_values = true)]
    amount: f64,

    /// The date, e.g. 2025-03-14 or 2025-03-14T09:30:00.
    #[arg(long)]
    date: String,

    /// What the record is for.
    #[arg(long, default_value = "")]
    description: String,

    /// A tag for the record. Repeat to add several.
    #[arg(long = "tag")]
    tags: Vec<String>,
}

impl AddArgs {
    pub fn new(
        amount: f64,
        date: impl Into<String>,
        description: impl Into<String>,
        tags: Vec<String>,
    ) -> Self {
        Self {
            amount,
            date: date.into(),
            description: description.into(),
            tags,
        }
    }

    pub fn amount(&self) -> f64 {
        self.amount
    }

    pub fn date(&self) -> &str {
        &self.date
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    pub fn tags(&self) -> &[String] {
        &self.tags
    }
}

/// (Not shown): Args for the `spendscope update` command.
#[derive(Debug, ClapArgs, Clone, Default)]
pub struct UpdateArgs {
    /// The id of the record to change.
    id: String,

    /// A new amount.
    #[arg(long, allow_hyphen_values = true)]
    amount: Option<f64>,

    /// A new date.
    #[arg(long)]
    date: Option<String>,

    /// A new description.
    #[arg(long)]
    description: Option<String>,

    /// Replace the tags. Repeat to set several.
    #[arg(long = "tag")]
    tags: Vec<String>,

    /// Remove every tag from the record.
    #[arg(long, conflicts_with = "tags")]
    untag: bool,
}

impl UpdateArgs {
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            ..Self::default()
        }
    }

    pub fn with_amount(mut self, amount: f64) -> Self {
        self.amount = Some(amount);
        self
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn with_tags(mut self, tags: Vec<String>) -> Self {
        self.tags = tags;
        self
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn amount(&self) -> Option<f64> {
        self.amount
    }

    pub fn date(&self) -> Option<&str> {
        self.date.as_deref()
    }

    pub fn description(&self) -> Option<&str> {
        self.description.as_deref()
    }

    pub fn tags(&self) -> &[String] {
        &self.tags
    }

    pub fn untag(&self) -> bool {
        self.untag
    }
}

/// (Not shown): Args for the `spendscope remove` command.
#[derive(Debug, ClapArgs, Clone)]
pub struct RemoveArgs {
    /// The id of the record to remove.
    id: String,
}

impl RemoveArgs {
    pub fn new(id: impl Into<String>) -> Self {
        Self { id: id.into() }
    }

    pub fn id(&self) -> &str {
        &self.id
    }
}

/// (Not shown): Args for the `spendscope tag` command.
#[derive(Debug, ClapArgs, Clone)]
pub struct TagArgs {
    /// The ids of the records to retag.
    #[arg(required = true)]
    ids: Vec<String>,

    /// The tag to set. Repeat to set several; omit to clear the tags.
    #[arg(long = "tag")]
    tags: Vec<String>,
}

impl TagArgs {
    pub fn new(ids: Vec<String>, tags: Vec<String>) -> Self {
        Self { ids, tags }
    }

    pub fn ids(&self) -> &[String] {
        &self.ids
    }

    pub fn tags(&self) -> &[String] {
        &self.tags
    }
}

/// (Not shown): Args for the `spendscope import` command.
#[derive(Debug, ClapArgs, Clone)]
pub struct ImportArgs {
    /// The CSV file to import.
    file: PathBuf,

    /// The layout of the file. Detected from the file's contents when omitted.
    #[arg(long)]
    definition: Option<CsvDefinitionKey>,
}

impl ImportArgs {
    pub fn new(file: impl Into<PathBuf>, definition: Option<CsvDefinitionKey>) -> Self {
        Self {
            file: file.into(),
            definition,
        }
    }

    pub fn file(&self) -> &Path {
        &self.file
    }

    pub fn definition(&self) -> Option<CsvDefinitionKey> {
        self.definition
    }
}

/// (Not shown): Args for the `spendscope watch` command.
#[derive(Debug, ClapArgs, Clone, Default)]
pub struct WatchArgs {
    /// Stop after this many seconds. Runs until interrupted when omitted.
    #[arg(long)]
    seconds: Option<u64>,
}

impl WatchArgs {
    pub fn new(seconds: Option<u64>) -> Self {
        Self { seconds }
    }

    pub fn seconds(&self) -> Option<u64> {
        self.seconds
    }
}

fn default_home() -> DisplayPath {
    DisplayPath(match dirs::home_dir() {
        Some(home) => home.join("spendscope"),
        None => {
            error!(
                "There was an error when trying to get your home directory. You can get around \
                this by providing --home or SPENDSCOPE_HOME instead of relying on the default \
                spendscope home directory. If you continue using the program right now, you may \
                have problems!",
            );
            PathBuf::from("spendscope")
        }
    })
}

#[derive(Debug, Default, Clone, Eq, PartialEq, Ord, PartialOrd, Hash)]
pub struct DisplayPath(PathBuf);

impl From<PathBuf> for DisplayPath {
    fn from(value: PathBuf) -> Self {
        DisplayPath(value)
    }
}

impl Deref for DisplayPath {
    type Target = Path;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl AsRef<Path> for DisplayPath {
    fn as_ref(&self) -> &Path {
        &self.0
    }
}

impl Display for DisplayPath {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0.to_string_lossy())
    }
}

impl FromStr for DisplayPath {
    type Err = Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self(PathBuf::from(s)))
    }
}

impl DisplayPath {
    pub fn path(&self) -> &Path {
        &self.0
    }
}
