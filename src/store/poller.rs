//! Keeps a `Subject` in step with a backend read command.
//!
//! Every read is stamped with a sequence number when it is issued, and a response is applied only
//! if no newer read, and no local write, has been applied since. Reads still in flight when the
//! next tick comes are left to finish, so a backend slower than the poll period still gets its
//! answers applied, in order.

use crate::api::{fetch_optional, Backend, Command, Failure};
use crate::store::Subject;
use serde::de::DeserializeOwned;
use serde_json::Value;
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;
use tokio::task::{JoinHandle, JoinSet};
use tokio::time::MissedTickBehavior;
use tracing::{trace, warn};

#[derive(Debug, Default)]
struct Sequence {
    issued: u64,
    applied: u64,
    /// While non-zero, backend reads are not applied.
    pins: u64,
}

/// Orders the values that reach a subject.
#[derive(Debug, Default)]
pub(crate) struct Sequencer {
    inner: Mutex<Sequence>,
}

impl Sequencer {
    fn with<R>(&self, f: impl FnOnce(&mut Sequence) -> R) -> R {
        let mut guard = self.inner.lock().unwrap_or_else(PoisonError::into_inner);
        f(&mut guard)
    }

    /// Stamps a new read.
    pub(crate) fn issue(&self) -> u64 {
        self.with(|s| {
            s.issued += 1;
            s.issued
        })
    }

    /// Runs `apply` if the read stamped `seq` is newer than everything applied so far and nothing
    /// is pinned. Returns whether it ran.
    pub(crate) fn apply(&self, seq: u64, apply: impl FnOnce()) -> bool {
        self.with(|s| {
            if seq <= s.applied || s.pins > 0 {
                return false;
            }
            s.applied = seq;
            apply();
            true
        })
    }

    /// Runs `apply` unconditionally and makes every read issued before now stale.
    pub(crate) fn supersede(&self, apply: impl FnOnce()) {
        self.with(|s| {
            s.issued += 1;
            s.applied = s.issued;
            apply();
        })
    }

    /// Stops reads from being applied until a matching `unpin`.
    pub(crate) fn pin(&self) {
        self.with(|s| s.pins += 1)
    }

    pub(crate) fn unpin(&self, count: u64) {
        self.with(|s| s.pins = s.pins.saturating_sub(count))
    }

    #[cfg(test)]
    pub(crate) fn pins(&self) -> u64 {
        self.with(|s| s.pins)
    }
}

/// A subject together with the sequencer that guards it.
pub(crate) struct Slot<T> {
    subject: Subject<T>,
    sequencer: Arc<Sequencer>,
}

impl<T> Clone for Slot<T> {
    fn clone(&self) -> Self {
        Self {
            subject: self.subject.clone(),
            sequencer: self.sequencer.clone(),
        }
    }
}

impl<T> Slot<T>
where
    T: Clone + PartialEq + DeserializeOwned + Send + Sync + 'static,
{
    pub(crate) fn new() -> Self {
        Self {
            subject: Subject::new(),
            sequencer: Arc::new(Sequencer::default()),
        }
    }

    pub(crate) fn subject(&self) -> &Subject<T> {
        &self.subject
    }

    pub(crate) fn sequencer(&self) -> &Sequencer {
        &self.sequencer
    }

    /// Publishes a locally known value ahead of any read in flight.
    pub(crate) fn push(&self, value: T) {
        self.sequencer.supersede(|| {
            self.subject.publish(value);
        })
    }

    /// Reads once from the backend and applies the result if it is still the latest. A `null`
    /// payload leaves the subject untouched.
    pub(crate) async fn refresh(
        &self,
        backend: &dyn Backend,
        command: Command,
        args: Value,
    ) -> Result<(), Failure> {
        let seq = self.sequencer.issue();
        let Some(value) = fetch_optional::<T>(backend, command, args).await? else {
            trace!("{command} #{seq} returned nothing");
            return Ok(());
        };
        let applied = self.sequencer.apply(seq, || {
            self.subject.publish(value);
        });
        trace!("{command} #{seq} applied: {applied}");
        Ok(())
    }
}

/// Aborts the task when dropped.
#[derive(Debug)]
pub(crate) struct TaskGuard(JoinHandle<()>);

impl TaskGuard {
    pub(crate) fn new(handle: JoinHandle<()>) -> Self {
        Self(handle)
    }
}

impl Drop for TaskGuard {
    fn drop(&mut self) {
        self.0.abort();
    }
}

/// Reads immediately, then once per `period`, forever. Failures are logged and the next tick
/// tries again.
pub(crate) fn spawn_poll<T>(
    slot: Slot<T>,
    backend: Arc<dyn Backend>,
    command: Command,
    args: Value,
    period: Duration,
) -> TaskGuard
where
    T: Clone + PartialEq + DeserializeOwned + Send + Sync + 'static,
{
    TaskGuard::new(tokio::spawn(async move {
        let mut ticker = tokio::time::interval(period);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
        // Dropped with the poll task, which aborts every read still running.
        let mut reads = JoinSet::new();
        loop {
            tokio::select! {
                _ = ticker.tick() => {
                    let slot = slot.clone();
                    let backend = backend.clone();
                    let args = args.clone();
                    reads.spawn(async move {
                        if let Err(failure) = slot.refresh(backend.as_ref(), command, args).await {
                            warn!("Polling {command} failed: {failure}");
                        }
                    });
                }
                Some(_) = reads.join_next() => {}
            }
        }
    }))
}
