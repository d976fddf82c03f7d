use crate::aggregate::Views;
use crate::api::{
    fetch, send, Backend, Command, CsvDefinitionKey, EventBus, Failure, EXPENSES_KEY,
    SETTINGS_KEY,
};
use crate::model::{BrushRange, Expense, Selection, Settings, Tag};
use crate::store::{LocalStore, RangeStore, StoreHook, StoreOptions};
use serde_json::{json, Value};
use std::path::Path;
use std::sync::Arc;
use tracing::{debug, warn};

/// The label of the first window.
pub const MAIN_WINDOW: &str = "main";

/// Everything one application window reads and writes: the expense records, the brush range and
/// the settings mirrored from the backend, plus the selection, which lives only in this window.
///
/// Must be created inside a tokio runtime. Dropping it stops its poll loops.
pub struct AppContext {
    label: String,
    backend: Arc<dyn Backend>,
    bus: EventBus,
    options: StoreOptions,
    expenses: StoreHook<Vec<Expense>>,
    range: RangeStore,
    settings: StoreHook<Settings>,
    selection: LocalStore<Selection>,
}

impl AppContext {
    pub fn new(backend: Arc<dyn Backend>, bus: EventBus, options: StoreOptions) -> Self {
        Self::build(MAIN_WINDOW.to_string(), backend, bus, options)
    }

    fn build(
        label: String,
        backend: Arc<dyn Backend>,
        bus: EventBus,
        options: StoreOptions,
    ) -> Self {
        let expenses = StoreHook::spawn(backend.clone(), EXPENSES_KEY, &options);
        let settings = StoreHook::spawn(backend.clone(), SETTINGS_KEY, &options);
        let range = RangeStore::spawn(backend.clone(), bus.clone(), &options);
        let selection = LocalStore::new(Selection::new(), options.debounce);
        Self {
            label,
            backend,
            bus,
            options,
            expenses,
            range,
            settings,
            selection,
        }
    }

    /// Asks the backend for a new window and returns its context. The new window shares the
    /// backend and the event bus with this one, and so sees the same settings. Its selection
    /// starts empty.
    pub async fn open_window(&self) -> Result<AppContext, Failure> {
        let label: String = fetch(self.backend.as_ref(), Command::NewWindow, Value::Null).await?;
        debug!("Opened window {label}");
        Ok(Self::build(
            label,
            self.backend.clone(),
            self.bus.clone(),
            self.options,
        ))
    }

    pub fn label(&self) -> &str {
        &self.label
    }

    pub fn backend(&self) -> &Arc<dyn Backend> {
        &self.backend
    }

    pub fn bus(&self) -> &EventBus {
        &self.bus
    }

    pub fn options(&self) -> &StoreOptions {
        &self.options
    }

    pub fn expenses(&self) -> &StoreHook<Vec<Expense>> {
        &self.expenses
    }

    pub fn range(&self) -> &RangeStore {
        &self.range
    }

    pub fn settings(&self) -> &StoreHook<Settings> {
        &self.settings
    }

    /// The latest known settings, the defaults before the first read lands.
    pub fn current_settings(&self) -> Settings {
        self.settings.current().unwrap_or_default()
    }

    /// Replaces the enabled tags as a whole and saves them to the backend.
    pub async fn set_settings(&self, settings: Settings) -> Result<(), Failure> {
        self.settings.set(settings).await
    }

    pub fn selection(&self) -> &LocalStore<Selection> {
        &self.selection
    }

    /// The latest known records, empty before the first read lands.
    pub fn records(&self) -> Vec<Expense> {
        self.expenses.current().unwrap_or_default()
    }

    /// Shows `range` in every reader at once and saves it once it settles.
    pub fn set_range(&self, range: BrushRange) {
        self.range.set(range)
    }

    /// Reads the records, the range and the settings now instead of waiting for the next poll.
    pub async fn refresh(&self) -> Result<(), Failure> {
        self.expenses.refresh().await?;
        self.range.refresh().await?;
        self.settings.refresh().await
    }

    /// The current records split into the sets each chart needs. With `restrict_to_range` only
    /// records inside the brush range are considered.
    pub fn views(&self, include_rsu: bool, restrict_to_range: bool) -> Views {
        let range = if restrict_to_range {
            self.range.current()
        } else {
            None
        };
        Views::classify_in(&self.records(), &self.current_settings(), include_rsu, range)
    }

    pub async fn add_expense(&self, expense: Expense) -> Result<(), Failure> {
        send(
            self.backend.as_ref(),
            Command::AddExpenseManual,
            json!({ "expense": expense }),
        )
        .await?;
        self.reload().await;
        Ok(())
    }

    /// Replaces the record stored under `hash`.
    pub async fn update_expense(&self, hash: &str, expense: Expense) -> Result<(), Failure> {
        send(
            self.backend.as_ref(),
            Command::UpdateExpense,
            json!({ "hash": hash, "expense": expense }),
        )
        .await?;
        self.reload().await;
        Ok(())
    }

    /// Removes the record stored under `hash` and returns its id.
    pub async fn remove_expense(&self, hash: &str) -> Result<String, Failure> {
        let removed: String = fetch(
            self.backend.as_ref(),
            Command::RemoveExpense,
            json!({ "hash": hash }),
        )
        .await?;
        self.selection.update(|ids| ids.iter().filter(|id| *id != hash).cloned().collect());
        self.reload().await;
        Ok(removed)
    }

    /// Sets the tags of every selected record to `tags` in one write, then clears the selection.
    /// Returns how many records were retagged.
    pub async fn tag_selection(&self, tags: Vec<Tag>) -> Result<usize, Failure> {
        let selected = self.selection.get();
        let expenses: Vec<Expense> = self
            .records()
            .into_iter()
            .filter(|e| selected.iter().any(|id| id == e.id()))
            .map(|mut e| {
                e.set_tags(tags.clone());
                e
            })
            .collect();
        if expenses.is_empty() {
            return Ok(0);
        }
        let hashes: Vec<&str> = expenses.iter().map(Expense::id).collect();
        send(
            self.backend.as_ref(),
            Command::UpdateBulkExpenses,
            json!({ "hashes": hashes, "expenses": expenses }),
        )
        .await?;
        self.selection.set(Selection::new());
        self.reload().await;
        Ok(expenses.len())
    }

    /// The CSV layouts `file` can be imported with.
    pub async fn open_csv(&self, file: &Path) -> Result<Vec<CsvDefinitionKey>, Failure> {
        fetch(
            self.backend.as_ref(),
            Command::OpenCsvFromPath,
            json!({ "file": file }),
        )
        .await
    }

    /// Imports `path` using the `key` layout and returns the backend's summary.
    pub async fn import_csv(&self, path: &Path, key: CsvDefinitionKey) -> Result<String, Failure> {
        let summary: String = fetch(
            self.backend.as_ref(),
            Command::ParseCsvFromPath,
            json!({ "path": path, "csvDefinitionKey": key }),
        )
        .await?;
        self.reload().await;
        Ok(summary)
    }

    async fn reload(&self) {
        if let Err(failure) = self.expenses.refresh().await {
            warn!("Unable to reload expenses: {failure}");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::LocalBackend;
    use crate::model::{ExpenseTag, NonExpenseTag};
    use chrono::Datelike;
    use std::time::Duration;
    use tokio::time::timeout;

    fn context(backend: LocalBackend) -> AppContext {
        AppContext::new(Arc::new(backend), EventBus::new(), StoreOptions::default())
    }

    fn record(amount: f64, tags: Vec<Tag>, date: &str, description: &str) -> Expense {
        Expense::with_derived_id(amount, tags, date, description)
    }

    #[tokio::test]
    async fn test_views_follow_settings_and_range() {
        let ctx = context(LocalBackend::seeded().unwrap());
        ctx.refresh().await.unwrap();
        let all = ctx.views(false, false);
        assert!(!all.expenses.is_empty());
        assert!(!all.income.is_empty());

        let ranged = ctx.views(false, true);
        assert!(ranged
            .expenses
            .iter()
            .all(|e| e.parsed_date().unwrap().year() == 2025));
        assert!(ranged.expenses.len() < all.expenses.len());

        let rent_only = ctx.current_settings().replace([Tag::from(ExpenseTag::Rent)]);
        ctx.set_settings(rent_only).await.unwrap();
        let narrowed = ctx.views(false, false);
        assert!(narrowed.expenses.len() < all.expenses.len());
        assert!(narrowed
            .expenses
            .iter()
            .all(|e| !e.has_tag(NonExpenseTag::Income)));
    }

    #[tokio::test]
    async fn test_writes_reload_expenses() {
        let ctx = context(LocalBackend::in_memory());
        let lunch = record(12.5, vec![Tag::from("Food")], "2025-04-01T12:00:00", "Lunch");
        ctx.add_expense(lunch.clone()).await.unwrap();
        let records = ctx.records();
        assert_eq!(records.len(), 1);
        let id = records[0].id().to_string();

        let duplicate = ctx.add_expense(lunch).await.unwrap_err();
        assert_eq!(duplicate.status(), Some(409));

        let mut edited = records[0].clone();
        edited.set_tags(vec![Tag::from("Kids")]);
        ctx.update_expense(&id, edited).await.unwrap();
        assert_eq!(ctx.records()[0].tags(), &[Tag::from("Kids")]);

        assert_eq!(ctx.remove_expense(&id).await.unwrap(), id);
        assert!(ctx.records().is_empty());
        assert_eq!(ctx.remove_expense(&id).await.unwrap_err().status(), Some(404));
    }

    #[tokio::test]
    async fn test_tag_selection() {
        let ctx = context(LocalBackend::in_memory());
        for (amount, description) in [(3.0, "Coffee"), (40.0, "Fuel"), (9.0, "Book")] {
            let e = record(amount, vec![], "2025-05-01T08:00:00", description);
            ctx.add_expense(e).await.unwrap();
        }
        let ids: Vec<String> = ctx
            .records()
            .iter()
            .filter(|e| e.description() != "Book")
            .map(|e| e.id().to_string())
            .collect();
        ctx.selection().set(ids.clone());

        let tagged = ctx.tag_selection(vec![Tag::from("Travel")]).await.unwrap();
        assert_eq!(tagged, 2);
        assert!(ctx.selection().get().is_empty());
        for e in ctx.records() {
            let travel = e.tags() == [Tag::from("Travel")];
            assert_eq!(travel, ids.iter().any(|id| id == e.id()));
        }
        assert_eq!(ctx.tag_selection(vec![]).await.unwrap(), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_range_reaches_other_windows() {
        let backend = Arc::new(LocalBackend::in_memory());
        let ctx = AppContext::new(backend.clone(), EventBus::new(), StoreOptions::default());
        let sibling = ctx.open_window().await.unwrap();
        assert_ne!(sibling.label(), MAIN_WINDOW);
        assert_eq!(backend.windows().await, 1);

        let mut reader = sibling.range().instant();
        let range = BrushRange::new(1_000, 2_000);
        ctx.set_range(range);
        assert_eq!(ctx.range().current(), Some(range));

        let seen = timeout(Duration::from_secs(5), reader.changed())
            .await
            .unwrap();
        assert_eq!(seen, Some(range));
    }

    #[tokio::test]
    async fn test_windows_share_settings() {
        let ctx = context(LocalBackend::in_memory());
        ctx.refresh().await.unwrap();
        assert_eq!(ctx.current_settings(), Settings::default());
        let sibling = ctx.open_window().await.unwrap();
        ctx.set_settings(Settings::new([Tag::from(ExpenseTag::Health)]))
            .await
            .unwrap();
        sibling.refresh().await.unwrap();
        assert!(sibling.current_settings().is_expense_enabled(ExpenseTag::Health));
        assert!(!sibling.current_settings().rsu_enabled());

        sibling.selection().set(vec!["x".to_string()]);
        assert!(ctx.selection().get().is_empty());
    }
}
