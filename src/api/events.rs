//! The process-wide event channel shared by every window.

use crate::model::BrushRange;
use serde::{Deserialize, Serialize};
use tokio::sync::broadcast;
use tracing::trace;

/// The name under which range changes are published.
pub const DATE_RANGE_CHANGED: &str = "date-range-changed";

const CAPACITY: usize = 64;

/// Payload of the `date-range-changed` event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RangeChanged {
    pub start: i64,
    pub end: i64,
}

impl From<BrushRange> for RangeChanged {
    fn from(value: BrushRange) -> Self {
        Self {
            start: value.start(),
            end: value.end(),
        }
    }
}

impl From<RangeChanged> for BrushRange {
    fn from(value: RangeChanged) -> Self {
        BrushRange::new(value.start, value.end)
    }
}

/// Broadcasts events to every subscribed window. Cloning shares the channel.
#[derive(Debug, Clone)]
pub struct EventBus {
    range_changed: broadcast::Sender<RangeChanged>,
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new()
    }
}

impl EventBus {
    pub fn new() -> Self {
        let (range_changed, _) = broadcast::channel(CAPACITY);
        Self { range_changed }
    }

    /// Publishes a range change. Returns the number of listeners that will see it.
    pub fn emit_range_changed(&self, event: RangeChanged) -> usize {
        trace!("emit {DATE_RANGE_CHANGED} {event:?}");
        self.range_changed.send(event).unwrap_or(0)
    }

    pub fn listen_range_changed(&self) -> broadcast::Receiver<RangeChanged> {
        self.range_changed.subscribe()
    }
}
