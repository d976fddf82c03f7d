use crate::api::{send, Backend, Command, Failure};
use crate::store::poller::{spawn_poll, Slot, TaskGuard};
use crate::store::{DebouncedReader, InstantReader};
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::{json, Value};
use std::sync::Arc;
use std::time::Duration;
use tracing::warn;

pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_millis(2000);
pub const DEFAULT_DEBOUNCE: Duration = Duration::from_millis(500);
pub const DEFAULT_RANGE_WRITE_DEBOUNCE: Duration = Duration::from_millis(300);

/// Timing shared by every store in an `AppContext`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StoreOptions {
    /// How often backend values are read.
    pub poll_interval: Duration,
    /// The idle window of debounced readers.
    pub debounce: Duration,
    /// How long range changes settle before they are written to the backend.
    pub range_write_debounce: Duration,
}

impl Default for StoreOptions {
    fn default() -> Self {
        Self {
            poll_interval: DEFAULT_POLL_INTERVAL,
            debounce: DEFAULT_DEBOUNCE,
            range_write_debounce: DEFAULT_RANGE_WRITE_DEBOUNCE,
        }
    }
}

/// A value read from the backend with `command`, kept current by polling.
///
/// All readers share the one poll loop, which stops when the `PolledValue` is dropped. Must be
/// created inside a tokio runtime.
pub struct PolledValue<T> {
    slot: Slot<T>,
    backend: Arc<dyn Backend>,
    command: Command,
    args: Value,
    debounce: Duration,
    _poll: TaskGuard,
}

impl<T> PolledValue<T>
where
    T: Clone + PartialEq + DeserializeOwned + Send + Sync + 'static,
{
    pub fn spawn(
        backend: Arc<dyn Backend>,
        command: Command,
        args: Value,
        options: &StoreOptions,
    ) -> Self {
        let slot = Slot::new();
        let poll = spawn_poll(
            slot.clone(),
            backend.clone(),
            command,
            args.clone(),
            options.poll_interval,
        );
        Self {
            slot,
            backend,
            command,
            args,
            debounce: options.debounce,
            _poll: poll,
        }
    }

    pub fn command(&self) -> Command {
        self.command
    }

    /// The latest known value, `None` before the first read lands.
    pub fn current(&self) -> Option<T> {
        self.slot.subject().current()
    }

    pub fn instant(&self) -> InstantReader<T> {
        self.slot.subject().instant()
    }

    /// A reader using the configured debounce window.
    pub fn debounced(&self) -> DebouncedReader<T> {
        self.slot.subject().debounced(self.debounce)
    }

    pub fn debounced_with(&self, window: Duration) -> DebouncedReader<T> {
        self.slot.subject().debounced(window)
    }

    /// Reads now, outside the poll schedule.
    pub async fn refresh(&self) -> Result<(), Failure> {
        self.slot
            .refresh(self.backend.as_ref(), self.command, self.args.clone())
            .await
    }

    /// Publishes a value known locally. It wins over any read still in flight.
    pub fn push(&self, value: T) {
        self.slot.push(value)
    }

    pub(crate) fn slot(&self) -> &Slot<T> {
        &self.slot
    }
}

/// A value held by the backend's key/value store under `key`: polled through `store_get_value`
/// and written through `store_set_value`.
pub struct StoreHook<T> {
    key: String,
    value: PolledValue<T>,
}

impl<T> StoreHook<T>
where
    T: Clone + PartialEq + Serialize + DeserializeOwned + Send + Sync + 'static,
{
    pub fn spawn(backend: Arc<dyn Backend>, key: impl Into<String>, options: &StoreOptions) -> Self {
        let key = key.into();
        let value = PolledValue::spawn(
            backend,
            Command::StoreGetValue,
            json!({ "key": key }),
            options,
        );
        Self { key, value }
    }

    pub fn key(&self) -> &str {
        &self.key
    }

    pub fn current(&self) -> Option<T> {
        self.value.current()
    }

    pub fn instant(&self) -> InstantReader<T> {
        self.value.instant()
    }

    pub fn debounced(&self) -> DebouncedReader<T> {
        self.value.debounced()
    }

    pub fn debounced_with(&self, window: Duration) -> DebouncedReader<T> {
        self.value.debounced_with(window)
    }

    pub async fn refresh(&self) -> Result<(), Failure> {
        self.value.refresh().await
    }

    /// Writes `value` to the backend. Only once the backend accepts it is it published to
    /// readers; on failure nothing changes locally and the failure is returned.
    pub async fn set(&self, value: T) -> Result<(), Failure> {
        let encoded = serde_json::to_value(&value).map_err(|e| Failure::Malformed {
            header: format!("{} {}", Command::StoreSetValue, self.key),
            reason: e.to_string(),
        })?;
        let args = json!({ "key": self.key, "value": encoded });
        match send(self.value.backend.as_ref(), Command::StoreSetValue, args).await {
            Ok(()) => {
                self.value.push(value);
                Ok(())
            }
            Err(failure) => {
                warn!("Unable to set {}: {failure}", self.key);
                Err(failure)
            }
        }
    }
}
