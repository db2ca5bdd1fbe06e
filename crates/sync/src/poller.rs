//! Cancellable periodic refresh loops.
//!
//! Two independent pollers feed the dashboard: a fast one for the live
//! alert cache and a slower one for the aggregate statistics read
//! models. Both run on `tokio::time::interval` with skipped missed
//! ticks (a fetch that outlives its interval coalesces instead of
//! piling up) and stop deterministically when their
//! [`CancellationToken`] fires -- including discarding the result of a
//! fetch already in flight at cancellation time.

use std::sync::Arc;
use std::time::Duration;

use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tokio_util::sync::CancellationToken;

use echo_client::{DashboardApi, StatsPeriod};

use crate::stats::StatsCache;
use crate::store::SyncStore;

/// Refresh intervals for the two polling loops.
#[derive(Debug, Clone, Copy)]
pub struct PollerConfig {
    /// Live alert refresh interval.
    pub alert_interval: Duration,
    /// Aggregate dashboard refresh interval.
    pub stats_interval: Duration,
}

impl Default for PollerConfig {
    fn default() -> Self {
        Self {
            alert_interval: Duration::from_secs(30),
            stats_interval: Duration::from_secs(60),
        }
    }
}

/// Spawn the live alert polling loop.
///
/// Each tick fetches the full active-alert snapshot and hands it to
/// [`SyncStore::merge_poll`]. A failed fetch is surfaced as a
/// `StoreEvent::PollFailed` warning and the previous cache is kept
/// intact. The first tick fires immediately.
pub fn spawn_alert_poller(
    api: Arc<dyn DashboardApi>,
    store: Arc<SyncStore>,
    interval: Duration,
    cancel: CancellationToken,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        tracing::info!(interval_secs = interval.as_secs(), "Alert poller started");
        let mut ticker = tokio::time::interval(interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);

        loop {
            tokio::select! {
                _ = cancel.cancelled() => {
                    tracing::info!("Alert poller stopping");
                    break;
                }
                _ = ticker.tick() => {
                    // Biased so a cancellation racing a completed fetch
                    // always wins and the result is discarded.
                    tokio::select! {
                        biased;
                        _ = cancel.cancelled() => {
                            tracing::info!("Alert poller cancelled mid-fetch, discarding result");
                            break;
                        }
                        result = api.active_alerts() => match result {
                            Ok(snapshot) => store.merge_poll(snapshot).await,
                            Err(e) => {
                                tracing::warn!(error = %e, "Alert poll failed, keeping previous cache");
                                store.publish_poll_failure(e.to_string());
                            }
                        }
                    }
                }
            }
        }
    })
}

/// Spawn the aggregate statistics polling loop.
///
/// Each tick refreshes the summary, time-series, and category-count
/// read models into the [`StatsCache`]. Any failure leaves the
/// previous snapshot in place.
pub fn spawn_stats_poller(
    api: Arc<dyn DashboardApi>,
    cache: Arc<StatsCache>,
    period: StatsPeriod,
    interval: Duration,
    cancel: CancellationToken,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        tracing::info!(
            interval_secs = interval.as_secs(),
            period = period.as_str(),
            "Stats poller started"
        );
        let mut ticker = tokio::time::interval(interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);

        loop {
            tokio::select! {
                _ = cancel.cancelled() => {
                    tracing::info!("Stats poller stopping");
                    break;
                }
                _ = ticker.tick() => {
                    tokio::select! {
                        biased;
                        _ = cancel.cancelled() => {
                            tracing::info!("Stats poller cancelled mid-fetch, discarding result");
                            break;
                        }
                        result = fetch_aggregates(api.as_ref(), period) => match result {
                            Ok((summary, time_series, categories)) => {
                                cache.store(summary, time_series, categories).await;
                            }
                            Err(e) => {
                                tracing::warn!(error = %e, "Stats refresh failed, keeping previous snapshot");
                            }
                        }
                    }
                }
            }
        }
    })
}

/// Fetch the three aggregate read models concurrently.
async fn fetch_aggregates(
    api: &dyn DashboardApi,
    period: StatsPeriod,
) -> Result<(serde_json::Value, serde_json::Value, serde_json::Value), echo_client::ApiError> {
    tokio::try_join!(
        api.statistics_summary(),
        api.time_series(period),
        api.category_counts(),
    )
}
