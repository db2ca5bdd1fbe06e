//! Aggregate dashboard read models.
//!
//! The overview cards and charts render server-computed aggregates
//! (summary counters, time series, per-category counts). These are
//! opaque to the sync core -- they are cached as raw JSON and replaced
//! wholesale on each successful stats poll.

use chrono::Utc;
use std::sync::Arc;
use tokio::sync::RwLock;

use echo_core::types::Timestamp;

/// One consistent set of aggregate read models.
#[derive(Debug, Clone)]
pub struct AggregateSnapshot {
    pub summary: serde_json::Value,
    pub time_series: serde_json::Value,
    pub categories: serde_json::Value,
    /// When this snapshot was fetched.
    pub refreshed_at: Timestamp,
}

/// Latest aggregate snapshot, if any poll has succeeded yet.
#[derive(Default)]
pub struct StatsCache {
    inner: RwLock<Option<AggregateSnapshot>>,
}

impl StatsCache {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    /// Replace the cached snapshot.
    pub async fn store(
        &self,
        summary: serde_json::Value,
        time_series: serde_json::Value,
        categories: serde_json::Value,
    ) {
        let snapshot = AggregateSnapshot {
            summary,
            time_series,
            categories,
            refreshed_at: Utc::now(),
        };
        *self.inner.write().await = Some(snapshot);
    }

    /// The most recent snapshot, or `None` before the first successful
    /// stats poll.
    pub async fn latest(&self) -> Option<AggregateSnapshot> {
        self.inner.read().await.clone()
    }
}
