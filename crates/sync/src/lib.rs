//! `echo-sync` -- the alert lifecycle and synchronization engine.
//!
//! [`store::SyncStore`] owns the canonical alert cache and reconciles
//! poll merges with optimistic operator actions; [`poller`] drives the
//! periodic refreshes; [`stats::StatsCache`] holds the opaque aggregate
//! read models. Consumers subscribe to [`events::StoreEvent`]s and
//! recompute the `echo-core` projections on each change notification.

pub mod events;
pub mod poller;
pub mod stats;
pub mod store;

pub use events::StoreEvent;
pub use poller::{spawn_alert_poller, spawn_stats_poller, PollerConfig};
pub use stats::{AggregateSnapshot, StatsCache};
pub use store::{SyncError, SyncStore};
