//! Command handlers for the spendscope CLI.
//!
//! This module contains implementations for all CLI subcommands.

mod edit;
mod import;
mod init;
mod range;
mod report;
mod settings;
mod watch;

use crate::api::{self, EventBus, Mode};
use crate::store::AppContext;
use crate::{Config, Result};
use serde::Serialize;
use std::fmt::Debug;
use tracing::{debug, info};

pub use edit::{add, remove, tag, update};
pub use import::import;
pub use init::init;
pub use range::{range_get, range_set};
pub use report::{average, cash_flow, summary, totals, year_to_date};
pub use settings::{settings_get, settings_reset, settings_set};
pub use watch::watch;

/// The output type for a command. This allows the command to return a consistent message and,
/// optionally, structured data.
#[derive(Debug, Clone, Serialize)]
pub struct Out<T>
where
    T: Serialize + Clone + Debug,
{
    /// A message that can be printed to the user regarding the outcome of the command execution.
    message: String,

    /// Any structured data that needs to be output from the call.
    structure: Option<T>,
}

impl<T, S> From<S> for Out<T>
where
    T: Debug + Clone + Serialize,
    S: Into<String>,
{
    fn from(value: S) -> Self {
        Out::new_message(value)
    }
}

impl<T> Out<T>
where
    T: Serialize + Clone + Debug,
{
    /// Create a new `Out` object that has `Some(structure)`.
    pub fn new<S>(message: S, structure: T) -> Self
    where
        S: Into<String>,
    {
        Self {
            message: message.into(),
            structure: Some(structure),
        }
    }

    /// Create a new `Out` object that has `None` for `structure`.
    pub fn new_message<S>(message: S) -> Self
    where
        S: Into<String>,
    {
        Self {
            message: message.into(),
            structure: None,
        }
    }

    /// Get the `message`.
    pub fn message(&self) -> &str {
        &self.message
    }

    /// Get the structured data stored in `structure`.
    pub fn structure(&self) -> Option<&T> {
        self.structure.as_ref()
    }

    /// Print the message to `info!` and the structured data (if it exists) as JSON to `debug!`.
    pub fn print(&self) {
        info!("{}", self.message);
        if let Some(structure) = self.structure() {
            if let Ok(json) = serde_json::to_string_pretty(structure) {
                debug!("Command output:\n\n{json}\n\n");
            }
        }
    }
}

/// Opens the window a command works through and waits for its first reads of the records and
/// the date range.
async fn open(config: &Config, mode: Mode) -> Result<AppContext> {
    let backend = api::backend(config, mode).await?;
    let context = AppContext::new(backend, EventBus::new(), config.store_options());
    context.refresh().await?;
    Ok(context)
}
