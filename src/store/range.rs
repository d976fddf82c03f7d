//! The brush range: the time window every chart is filtered by.
//!
//! Local changes are shown at once, written to the backend after they settle, and then announced
//! on the event bus so every other window follows.

use crate::api::{send, Backend, Command, EventBus, Failure, RangeChanged};
use crate::model::BrushRange;
use crate::store::poller::TaskGuard;
use crate::store::{DebouncedReader, InstantReader, PolledValue, StoreOptions};
use serde_json::{json, Value};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::broadcast::error::RecvError;
use tokio::sync::mpsc;
use tracing::{debug, warn};

pub struct RangeStore {
    value: Arc<PolledValue<BrushRange>>,
    backend: Arc<dyn Backend>,
    bus: EventBus,
    writes: mpsc::UnboundedSender<BrushRange>,
    _writer: TaskGuard,
    _listener: TaskGuard,
}

impl RangeStore {
    pub fn spawn(backend: Arc<dyn Backend>, bus: EventBus, options: &StoreOptions) -> Self {
        let value = Arc::new(PolledValue::spawn(
            backend.clone(),
            Command::GetDateRange,
            Value::Null,
            options,
        ));
        let (writes, requests) = mpsc::unbounded_channel();
        let writer = TaskGuard::new(tokio::spawn(write_settled(
            value.clone(),
            backend.clone(),
            bus.clone(),
            requests,
            options.range_write_debounce,
        )));
        let listener = TaskGuard::new(tokio::spawn(follow_bus(value.clone(), bus.clone())));
        Self {
            value,
            backend,
            bus,
            writes,
            _writer: writer,
            _listener: listener,
        }
    }

    /// Shows `range` to every reader immediately and schedules it to be written to the backend.
    /// Backend reads are held back until the write has gone through.
    pub fn set(&self, range: BrushRange) {
        let sequencer = self.value.slot().sequencer();
        sequencer.pin();
        self.value.push(range);
        if self.writes.send(range).is_err() {
            sequencer.unpin(1);
        }
    }

    /// Writes `range` to the backend right away, without waiting for it to settle. Readers and
    /// other windows see it once the backend has accepted it.
    pub async fn save(&self, range: BrushRange) -> Result<(), Failure> {
        let args = json!({ "start": range.start(), "end": range.end() });
        send(self.backend.as_ref(), Command::SetDateRange, args).await?;
        self.value.push(range);
        self.bus.emit_range_changed(RangeChanged::from(range));
        Ok(())
    }

    pub fn current(&self) -> Option<BrushRange> {
        self.value.current()
    }

    pub fn instant(&self) -> InstantReader<BrushRange> {
        self.value.instant()
    }

    pub fn debounced(&self) -> DebouncedReader<BrushRange> {
        self.value.debounced()
    }

    pub fn debounced_with(&self, window: Duration) -> DebouncedReader<BrushRange> {
        self.value.debounced_with(window)
    }

    pub async fn refresh(&self) -> Result<(), Failure> {
        self.value.refresh().await
    }
}

/// Writes the last of each burst of requested ranges, then announces it.
async fn write_settled(
    value: Arc<PolledValue<BrushRange>>,
    backend: Arc<dyn Backend>,
    bus: EventBus,
    mut requests: mpsc::UnboundedReceiver<BrushRange>,
    window: Duration,
) {
    while let Some(mut range) = requests.recv().await {
        let mut consumed = 1;
        loop {
            tokio::select! {
                _ = tokio::time::sleep(window) => break,
                next = requests.recv() => match next {
                    Some(next) => {
                        range = next;
                        consumed += 1;
                    }
                    None => break,
                },
            }
        }
        let args = json!({ "start": range.start(), "end": range.end() });
        match send(backend.as_ref(), Command::SetDateRange, args).await {
            Ok(()) => {
                let listeners = bus.emit_range_changed(RangeChanged::from(range));
                debug!("Saved range {range:?}, notified {listeners} windows");
            }
            Err(failure) => warn!("Unable to save the date range: {failure}"),
        }
        value.slot().sequencer().unpin(consumed);
    }
}

/// Applies range changes announced by any window.
async fn follow_bus(value: Arc<PolledValue<BrushRange>>, bus: EventBus) {
    let mut events = bus.listen_range_changed();
    loop {
        match events.recv().await {
            Ok(event) => value.push(BrushRange::from(event)),
            Err(RecvError::Lagged(skipped)) => debug!("Missed {skipped} range events"),
            Err(RecvError::Closed) => break,
        }
    }
}
