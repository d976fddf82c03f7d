//! Reactive state shared by everything that renders: values mirrored from the backend by polling,
//! the brush range, and process-local settings.
//!
//! Each value lives in one `Subject`. Readers subscribe to it either instantly, seeing every
//! change, or debounced, seeing only the value a burst of changes settles on. Values equal to the
//! current one are never announced.

mod context;
mod hooks;
mod local;
pub(crate) mod poller;
mod range;
mod subject;

pub use context::{AppContext, MAIN_WINDOW};
pub use hooks::{
    PolledValue, StoreHook, StoreOptions, DEFAULT_DEBOUNCE, DEFAULT_POLL_INTERVAL,
    DEFAULT_RANGE_WRITE_DEBOUNCE,
};
pub use local::LocalStore;
pub use range::RangeStore;
pub use subject::{DebouncedReader, InstantReader, Subject};
