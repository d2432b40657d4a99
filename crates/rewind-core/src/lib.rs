//! Bounded, list-based undo/redo history for a single value.
//!
//! [`History`] records successive states of one value and steps
//! backward and forward through them in O(1), with branch pruning on
//! divergent writes and head eviction once the configured capacity is
//! reached. Hosts plug in through transition callbacks and the
//! [`HistoryObserver`] invalidation hook; everything stays in memory
//! and on one thread.

pub mod chain;
pub mod config;
pub mod controller;
pub mod observer;

pub use chain::SnapshotChain;
pub use config::{HistoryConfig, DEFAULT_CAPACITY};
pub use controller::{CallbackId, CallbackKind, History};
pub use observer::HistoryObserver;
