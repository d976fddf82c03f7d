//! The backend the application talks to. Every interaction is a named command with JSON arguments
//! that answers with an `Envelope`.
//!
//! The `Backend` trait is the seam: `LocalBackend` serves the commands in-process, either from a
//! JSON file on disk or, in test mode, from seeded memory.

mod csv_definition;
mod envelope;
mod events;
mod local_backend;
#[cfg(test)]
mod scripted;
mod seed;

pub use csv_definition::{
    matching_definitions, parse_with_definition, CsvDefinition, CsvDefinitionKey,
    ALL_CSV_DEFINITIONS,
};
pub use envelope::{Envelope, Failure, Status};
pub use events::{EventBus, RangeChanged, DATE_RANGE_CHANGED};
pub use local_backend::LocalBackend;
#[cfg(test)]
pub(crate) use scripted::ScriptedBackend;

use crate::{Config, Result};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::sync::Arc;

/// The key under which the expense records are stored.
pub const EXPENSES_KEY: &str = "expenses";

/// The key under which the enabled-tag settings are stored.
pub const SETTINGS_KEY: &str = "settings";

/// The commands a backend understands. The string form of each is its wire name.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Command {
    StoreGetValue,
    StoreSetValue,
    GetDateRange,
    SetDateRange,
    OpenCsvFromPath,
    ParseCsvFromPath,
    UpdateExpense,
    AddExpenseManual,
    RemoveExpense,
    UpdateBulkExpenses,
    NewWindow,
}

serde_plain::derive_display_from_serialize!(Command);
serde_plain::derive_fromstr_from_deserialize!(Command);

/// Something that can execute backend commands.
///
/// An `Err` return means the command never produced an envelope, i.e. a transport failure.
/// Application errors arrive as an `Ok` envelope with an error status.
#[async_trait::async_trait]
pub trait Backend: Send + Sync {
    async fn invoke(&self, command: Command, args: Value) -> Result<Envelope>;
}

/// Invokes `command` and decodes its payload, which must be present.
pub async fn fetch<T>(backend: &dyn Backend, command: Command, args: Value) -> Result<T, Failure>
where
    T: DeserializeOwned,
{
    invoke(backend, command, args).await?.into_payload()
}

/// Invokes `command` and decodes its payload. A `null` payload is `None`.
pub async fn fetch_optional<T>(
    backend: &dyn Backend,
    command: Command,
    args: Value,
) -> Result<Option<T>, Failure>
where
    T: DeserializeOwned,
{
    invoke(backend, command, args).await?.into_optional()
}

/// Invokes a command that carries no payload in its response.
pub async fn send(backend: &dyn Backend, command: Command, args: Value) -> Result<(), Failure> {
    invoke(backend, command, args).await?.into_unit()
}

async fn invoke(backend: &dyn Backend, command: Command, args: Value) -> Result<Envelope, Failure> {
    backend
        .invoke(command, args)
        .await
        .map_err(Failure::Transport)
}

/// Selects which backend the application runs against.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Mode {
    /// Expenses and values persist to the store file in the home directory.
    #[default]
    Local,
    /// Seeded, in-memory data. Nothing is written to disk.
    Test,
}

/// When this environment variable is set and non-empty the application runs in `Mode::Test`.
pub const TEST_MODE_VAR: &str = "SPENDSCOPE_IN_TEST_MODE";

impl Mode {
    pub fn from_env() -> Self {
        match std::env::var(TEST_MODE_VAR) {
            Ok(s) if !s.is_empty() => Mode::Test,
            _ => Mode::Local,
        }
    }
}

/// Creates the backend for `mode`.
pub async fn backend(config: &Config, mode: Mode) -> Result<Arc<dyn Backend>> {
    let backend = match mode {
        Mode::Local => LocalBackend::open(config.store_path()).await?,
        Mode::Test => LocalBackend::seeded()?,
    };
    Ok(Arc::new(backend))
}
