//! An in-process implementation of every backend command.

use crate::api::{
    matching_definitions, parse_with_definition, seed, Backend, Command, CsvDefinitionKey,
    Envelope, Status, EXPENSES_KEY, SETTINGS_KEY,
};
use crate::model::{BrushRange, Expense, Settings};
use crate::{utils, Result};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::{BTreeMap, HashSet};
use std::path::{Path, PathBuf};
use tokio::sync::Mutex;
use tracing::{debug, info, trace};
use uuid::Uuid;

/// Serves backend commands from memory, optionally persisting every change to a JSON file.
///
/// Expense records live under the `expenses` key as an array and the settings under `settings`. Their ids are derived from their
/// content, so importing the same statement twice adds nothing the second time.
pub struct LocalBackend {
    state: Mutex<State>,
    path: Option<PathBuf>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
struct State {
    #[serde(default)]
    values: BTreeMap<String, Value>,
    #[serde(default)]
    range: Option<BrushRange>,
    #[serde(skip)]
    windows: u32,
}

/// A handled command. `Err` carries the envelope of a rejected request.
type Reply = std::result::Result<Envelope, Envelope>;

#[derive(Deserialize)]
struct KeyArgs {
    key: String,
}

#[derive(Deserialize)]
struct SetValueArgs {
    key: String,
    value: Value,
}

#[derive(Deserialize)]
struct RangeArgs {
    start: i64,
    end: i64,
}

#[derive(Deserialize)]
struct FileArgs {
    file: PathBuf,
}

#[derive(Deserialize)]
struct ParseCsvArgs {
    path: PathBuf,
    #[serde(rename = "csvDefinitionKey")]
    csv_definition_key: CsvDefinitionKey,
}

#[derive(Deserialize)]
struct UpdateArgs {
    hash: String,
    expense: Expense,
}

#[derive(Deserialize)]
struct AddArgs {
    expense: Expense,
}

#[derive(Deserialize)]
struct RemoveArgs {
    hash: String,
}

#[derive(Deserialize)]
struct BulkArgs {
    hashes: Vec<String>,
    expenses: Vec<Expense>,
}

impl LocalBackend {
    /// A backend with an empty expense list that is never written to disk.
    pub fn in_memory() -> Self {
        Self::with_state(State::new(Vec::new(), None), None)
    }

    /// A backend holding the seed data used by `Mode::Test`.
    pub fn seeded() -> Result<Self> {
        Ok(Self::with_state(
            State::new(seed::expenses()?, seed::range()),
            None,
        ))
    }

    /// Loads the store file at `path`, creating it if it does not exist.
    pub async fn open(path: impl Into<PathBuf>) -> Result<Self> {
        let path = path.into();
        let state = if path.is_file() {
            debug!("Loading store from {}", path.display());
            let mut state: State = utils::deserialize(&path).await?;
            state
                .values
                .entry(EXPENSES_KEY.to_string())
                .or_insert_with(|| Value::Array(Vec::new()));
            state
                .values
                .entry(SETTINGS_KEY.to_string())
                .or_insert_with(default_settings);
            state
        } else {
            info!("Creating a new store at {}", path.display());
            let state = State::new(Vec::new(), None);
            utils::serialize(&path, &state).await?;
            state
        };
        Ok(Self::with_state(state, Some(path)))
    }

    fn with_state(state: State, path: Option<PathBuf>) -> Self {
        Self {
            state: Mutex::new(state),
            path,
        }
    }

    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    /// The number of additional windows that have been opened.
    pub async fn windows(&self) -> u32 {
        self.state.lock().await.windows
    }

    async fn dispatch(&self, command: Command, args: Value) -> Reply {
        match command {
            Command::StoreGetValue => self.store_get_value(decode(command, args)?).await,
            Command::StoreSetValue => self.store_set_value(decode(command, args)?).await,
            Command::GetDateRange => self.get_date_range().await,
            Command::SetDateRange => self.set_date_range(decode(command, args)?).await,
            Command::OpenCsvFromPath => open_csv_from_path(decode(command, args)?).await,
            Command::ParseCsvFromPath => self.parse_csv_from_path(decode(command, args)?).await,
            Command::UpdateExpense => self.update_expense(decode(command, args)?).await,
            Command::AddExpenseManual => self.add_expense_manual(decode(command, args)?).await,
            Command::RemoveExpense => self.remove_expense(decode(command, args)?).await,
            Command::UpdateBulkExpenses => {
                self.update_bulk_expenses(decode(command, args)?).await
            }
            Command::NewWindow => self.new_window().await,
        }
    }

    async fn store_get_value(&self, args: KeyArgs) -> Reply {
        let state = self.state.lock().await;
        match state.values.get(&args.key) {
            Some(value) => Ok(Envelope::ok(format!("Result: {}", args.key), value.clone())),
            None => Err(Envelope::empty(
                Status::NotFound,
                format!("Could not find a value for the key {}", args.key),
            )),
        }
    }

    async fn store_set_value(&self, args: SetValueArgs) -> Reply {
        if args.key == EXPENSES_KEY {
            serde_json::from_value::<Vec<Expense>>(args.value.clone()).map_err(|e| {
                Envelope::empty(Status::BadRequest, format!("Invalid expense list: {e}"))
            })?;
        }
        let mut state = self.state.lock().await;
        let mut next = state.clone();
        next.values.insert(args.key, args.value);
        self.commit(&mut state, next).await?;
        Ok(Envelope::empty(Status::Ok, "Value saved successfully"))
    }

    async fn get_date_range(&self) -> Reply {
        let state = self.state.lock().await;
        let range = serde_json::to_value(state.range).map_err(internal)?;
        Ok(Envelope::ok("Range got successfully", range))
    }

    async fn set_date_range(&self, args: RangeArgs) -> Reply {
        let mut state = self.state.lock().await;
        let mut next = state.clone();
        next.range = Some(BrushRange::new(args.start, args.end));
        self.commit(&mut state, next).await?;
        Ok(Envelope::empty(Status::Ok, "Date range saved successfully"))
    }

    async fn parse_csv_from_path(&self, args: ParseCsvArgs) -> Reply {
        let data = utils::read(&args.path).await.map_err(|e| {
            Envelope::empty(Status::Error, format!("Failed to parse CSV: {e:#}"))
        })?;
        let parsed = parse_with_definition(&data, args.csv_definition_key).map_err(|e| {
            Envelope::empty(Status::Error, format!("Failed to parse CSV: {e:#}"))
        })?;
        let mut state = self.state.lock().await;
        let mut expenses = state.expenses()?;
        let mut seen: HashSet<String> = expenses.iter().map(|e| e.id().to_string()).collect();
        let mut added = 0;
        let mut duplicates = 0;
        for expense in parsed {
            if seen.insert(expense.id().to_string()) {
                expenses.push(expense);
                added += 1;
            } else {
                duplicates += 1;
            }
        }
        let mut next = state.clone();
        next.set_expenses(&expenses)?;
        self.commit(&mut state, next).await?;
        Ok(Envelope::ok(
            "CSV parsed successfully",
            Value::String(format!(
                "Added {added} entries, ignored {duplicates} duplicate entries"
            )),
        ))
    }

    async fn update_expense(&self, args: UpdateArgs) -> Reply {
        if args.hash != args.expense.id() {
            return Err(Envelope::empty(
                Status::BadRequest,
                format!(
                    "The expense id {} does not match the hash {}",
                    args.expense.id(),
                    args.hash
                ),
            ));
        }
        let mut state = self.state.lock().await;
        let mut expenses = state.expenses()?;
        let slot = expenses
            .iter_mut()
            .find(|e| e.id() == args.hash)
            .ok_or_else(|| not_found(&args.hash))?;
        *slot = args.expense;
        let mut next = state.clone();
        next.set_expenses(&expenses)?;
        self.commit(&mut state, next).await?;
        Ok(Envelope::empty(Status::Ok, "Expense updated successfully"))
    }

    async fn add_expense_manual(&self, args: AddArgs) -> Reply {
        let expense = args.expense;
        let expense = Expense::new(
            expense.content_id(),
            expense.amount(),
            expense.tags().to_vec(),
            expense.date(),
            expense.description(),
        );
        let mut state = self.state.lock().await;
        let mut expenses = state.expenses()?;
        if expenses.iter().any(|e| e.id() == expense.id()) {
            return Err(Envelope::empty(
                Status::Conflict,
                "Expense already exists for same time",
            ));
        }
        expenses.push(expense);
        let mut next = state.clone();
        next.set_expenses(&expenses)?;
        self.commit(&mut state, next).await?;
        Ok(Envelope::empty(Status::Ok, "Expense added successfully"))
    }

    async fn remove_expense(&self, args: RemoveArgs) -> Reply {
        let mut state = self.state.lock().await;
        let mut expenses = state.expenses()?;
        let before = expenses.len();
        expenses.retain(|e| e.id() != args.hash);
        if expenses.len() == before {
            return Err(not_found(&args.hash));
        }
        let mut next = state.clone();
        next.set_expenses(&expenses)?;
        self.commit(&mut state, next).await?;
        Ok(Envelope::ok(
            "Expense removed successfully",
            Value::String(args.hash),
        ))
    }

    /// Applies every update or none of them.
    async fn update_bulk_expenses(&self, args: BulkArgs) -> Reply {
        if args.hashes.len() != args.expenses.len() {
            return Err(Envelope::empty(
                Status::BadRequest,
                format!(
                    "Received {} hashes but {} expenses",
                    args.hashes.len(),
                    args.expenses.len()
                ),
            ));
        }
        if let Some((hash, _)) = args
            .hashes
            .iter()
            .zip(&args.expenses)
            .find(|(hash, expense)| expense.id() != hash.as_str())
        {
            return Err(Envelope::empty(
                Status::BadRequest,
                format!("The expense for hash {hash} carries a different id"),
            ));
        }
        let mut state = self.state.lock().await;
        let mut expenses = state.expenses()?;
        for (hash, update) in args.hashes.iter().zip(args.expenses) {
            let slot = expenses
                .iter_mut()
                .find(|e| e.id() == hash)
                .ok_or_else(|| not_found(hash))?;
            *slot = update;
        }
        let mut next = state.clone();
        next.set_expenses(&expenses)?;
        self.commit(&mut state, next).await?;
        Ok(Envelope::empty(Status::Ok, "Expenses updated successfully"))
    }

    async fn new_window(&self) -> Reply {
        let mut state = self.state.lock().await;
        state.windows += 1;
        let label = Uuid::new_v4().to_string();
        debug!("Opened window {label}, {} windows open", state.windows + 1);
        Ok(Envelope::ok("Window opened", Value::String(label)))
    }

    /// Writes `next` to the store file and only then makes it the current state. A failed write
    /// leaves `state` as it was.
    async fn commit(&self, state: &mut State, next: State) -> std::result::Result<(), Envelope> {
        if let Some(path) = &self.path {
            utils::serialize(path, &next).await.map_err(internal)?;
        }
        *state = next;
        Ok(())
    }
}

#[async_trait::async_trait]
impl Backend for LocalBackend {
    async fn invoke(&self, command: Command, args: Value) -> Result<Envelope> {
        trace!("invoke {command}");
        let envelope = match self.dispatch(command, args).await {
            Ok(envelope) => envelope,
            Err(rejected) => {
                debug!("{command} rejected: {}", rejected.header());
                rejected
            }
        };
        Ok(envelope)
    }
}

impl State {
    fn new(expenses: Vec<Expense>, range: Option<BrushRange>) -> Self {
        let mut values = BTreeMap::new();
        values.insert(
            EXPENSES_KEY.to_string(),
            serde_json::to_value(expenses).unwrap_or_else(|_| Value::Array(Vec::new())),
        );
        values.insert(SETTINGS_KEY.to_string(), default_settings());
        Self {
            values,
            range,
            windows: 0,
        }
    }

    fn expenses(&self) -> std::result::Result<Vec<Expense>, Envelope> {
        match self.values.get(EXPENSES_KEY) {
            None | Some(Value::Null) => Ok(Vec::new()),
            Some(value) => serde_json::from_value(value.clone()).map_err(internal),
        }
    }

    fn set_expenses(&mut self, expenses: &[Expense]) -> std::result::Result<(), Envelope> {
        let value = serde_json::to_value(expenses).map_err(internal)?;
        self.values.insert(EXPENSES_KEY.to_string(), value);
        Ok(())
    }
}

async fn open_csv_from_path(args: FileArgs) -> Reply {
    let data = utils::read(&args.file).await.map_err(|e| {
        Envelope::empty(Status::Error, format!("Failed to open file: {e:#}"))
    })?;
    let keys = matching_definitions(&data).map_err(|e| {
        Envelope::empty(
            Status::Error,
            format!("Failed to find matching definition: {e:#}"),
        )
    })?;
    if keys.is_empty() {
        return Err(Envelope::empty(
            Status::NotFound,
            "No matching definition found",
        ));
    }
    let keys = serde_json::to_value(keys).map_err(internal)?;
    Ok(Envelope::ok("Matching definition found", keys))
}

fn decode<A>(command: Command, args: Value) -> std::result::Result<A, Envelope>
where
    A: DeserializeOwned,
{
    serde_json::from_value(args).map_err(|e| {
        Envelope::empty(
            Status::BadRequest,
            format!("Invalid arguments for {command}: {e}"),
        )
    })
}

fn default_settings() -> Value {
    serde_json::to_value(Settings::default()).unwrap_or(Value::Null)
}

fn not_found(hash: &str) -> Envelope {
    Envelope::empty(Status::NotFound, format!("Expense not found: {hash}"))
}

fn internal(e: impl std::fmt::Display) -> Envelope {
    Envelope::empty(Status::Error, format!("Internal error: {e:#}"))
}
