//! A single shared cell of state with subscribable readers.

use std::sync::Arc;
use std::time::Duration;
use tokio::sync::watch;

/// Holds the current known value of one piece of state. `None` until the first value arrives.
///
/// Publishing a value equal to the current one does not notify readers. Cloning a `Subject`
/// shares the cell.
#[derive(Debug)]
pub struct Subject<T> {
    tx: Arc<watch::Sender<Option<T>>>,
}

impl<T> Clone for Subject<T> {
    fn clone(&self) -> Self {
        Self {
            tx: self.tx.clone(),
        }
    }
}

impl<T> Default for Subject<T>
where
    T: Clone + PartialEq,
{
    fn default() -> Self {
        Self::new()
    }
}

impl<T> Subject<T>
where
    T: Clone + PartialEq,
{
    pub fn new() -> Self {
        let (tx, _) = watch::channel(None);
        Self { tx: Arc::new(tx) }
    }

    /// Starts the subject at `value` rather than `None`.
    pub fn with_value(value: T) -> Self {
        let (tx, _) = watch::channel(Some(value));
        Self { tx: Arc::new(tx) }
    }

    /// Stores `value` and notifies readers. Returns `false`, and notifies nobody, if the value is
    /// equal to the one already held.
    pub fn publish(&self, value: T) -> bool {
        self.tx.send_if_modified(|current| {
            if current.as_ref() == Some(&value) {
                false
            } else {
                *current = Some(value);
                true
            }
        })
    }

    pub fn current(&self) -> Option<T> {
        self.tx.borrow().clone()
    }

    /// A reader that sees every value as soon as it is published.
    pub fn instant(&self) -> InstantReader<T> {
        InstantReader {
            rx: self.tx.subscribe(),
        }
    }

    /// A reader that waits until no new value has arrived for `window` before delivering.
    pub fn debounced(&self, window: Duration) -> DebouncedReader<T> {
        DebouncedReader {
            rx: self.tx.subscribe(),
            window,
        }
    }

    pub fn reader_count(&self) -> usize {
        self.tx.receiver_count()
    }
}

/// Mirrors a `Subject`, delivering each change as it happens. If several values are published
/// between two calls to `changed`, only the latest is seen.
#[derive(Debug)]
pub struct InstantReader<T> {
    rx: watch::Receiver<Option<T>>,
}

impl<T> InstantReader<T>
where
    T: Clone,
{
    pub fn current(&self) -> Option<T> {
        self.rx.borrow().clone()
    }

    /// Waits for a value newer than the last one seen. Returns `None` once the subject is gone.
    pub async fn changed(&mut self) -> Option<T> {
        loop {
            self.rx.changed().await.ok()?;
            if let Some(value) = self.rx.borrow_and_update().clone() {
                return Some(value);
            }
        }
    }

    /// The current value if there is one, otherwise the first value to arrive.
    pub async fn value(&mut self) -> Option<T> {
        if let Some(value) = self.rx.borrow_and_update().clone() {
            return Some(value);
        }
        self.changed().await
    }
}

/// Mirrors a `Subject`, coalescing bursts of changes. A value is delivered once `window` passes
/// with nothing newer published, and the last value of a burst is always the one delivered.
#[derive(Debug)]
pub struct DebouncedReader<T> {
    rx: watch::Receiver<Option<T>>,
    window: Duration,
}

impl<T> DebouncedReader<T>
where
    T: Clone,
{
    pub fn window(&self) -> Duration {
        self.window
    }

    /// The latest value, ignoring the debounce window.
    pub fn current(&self) -> Option<T> {
        self.rx.borrow().clone()
    }

    /// Waits for the next burst of changes to settle and returns its final value. Returns `None`
    /// once the subject is gone and nothing is left to deliver.
    pub async fn changed(&mut self) -> Option<T> {
        loop {
            self.rx.changed().await.ok()?;
            loop {
                tokio::select! {
                    _ = tokio::time::sleep(self.window) => break,
                    changed = self.rx.changed() => {
                        if changed.is_err() {
                            break;
                        }
                    }
                }
            }
            if let Some(value) = self.rx.borrow_and_update().clone() {
                return Some(value);
            }
        }
    }
}
