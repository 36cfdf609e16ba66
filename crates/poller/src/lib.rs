//! Polling scheduler for tracked course sections.
//!
//! This crate provides:
//! - `Poller` — fixed-interval sweeps over every tracked section, with
//!   bounded in-sweep concurrency and edge-triggered open notifications
//! - `NotificationSink` trait for the external delivery layer
//! - `LogSink`, a tracing-backed sink for headless operation

pub mod poller;
pub mod sink;

pub use poller::Poller;
pub use sink::{LogSink, NotificationSink, SinkError};
