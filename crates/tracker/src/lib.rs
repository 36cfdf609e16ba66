//! Per-user tracked-section store.

pub mod store;

pub use store::{StoreError, WatchStore};
