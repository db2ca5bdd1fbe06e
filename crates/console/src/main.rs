//! `echo-console` -- headless operator console for the ECHO dashboard.
//!
//! Wires the sync engine together: polls the dashboard API, keeps the
//! local alert cache reconciled, and recomputes the read-side
//! projections (sorted/filtered list, map viewport) on every cache
//! change notification. The rendering layer proper is expected to
//! replace the logging subscriber loop; everything else is the real
//! wiring.

mod config;

use std::sync::Arc;

use tokio_util::sync::CancellationToken;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use echo_client::{DashboardApi, EchoApi};
use echo_core::geo::{self, Viewport, ViewportSize, DEFAULT_PADDING_PX};
use echo_core::projection::{self, AlertFilter};
use echo_sync::{spawn_alert_poller, spawn_stats_poller, StatsCache, StoreEvent, SyncStore};

use config::Config;

/// Map canvas assumed by the headless console.
const MAP_SIZE: ViewportSize = ViewportSize {
    width: 1280,
    height: 720,
};

/// Home view before any located alert arrives: metropolitan France.
const HOME_VIEWPORT: Viewport = Viewport {
    longitude: 2.333333,
    latitude: 48.866667,
    zoom: 5.0,
};

#[tokio::main]
async fn main() {
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "echo=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = match Config::from_env() {
        Ok(config) => config,
        Err(e) => {
            tracing::error!(error = %e, "Invalid configuration");
            std::process::exit(1);
        }
    };

    tracing::info!(
        api = %config.api_base_url,
        alert_poll_secs = config.alert_interval.as_secs(),
        stats_poll_secs = config.stats_interval.as_secs(),
        "Starting echo-console",
    );

    let api: Arc<dyn DashboardApi> = Arc::new(EchoApi::new(config.api_base_url.clone()));
    let store = SyncStore::new(Arc::clone(&api));
    let stats = StatsCache::new();
    let cancel = CancellationToken::new();

    let alert_poller = spawn_alert_poller(
        Arc::clone(&api),
        Arc::clone(&store),
        config.alert_interval,
        cancel.child_token(),
    );
    let stats_poller = spawn_stats_poller(
        Arc::clone(&api),
        Arc::clone(&stats),
        config.stats_period,
        config.stats_interval,
        cancel.child_token(),
    );

    let filter = AlertFilter {
        severity: config.severity_filter,
        category: config.category_filter.clone(),
    };
    let view_task = tokio::spawn(run_view_loop(
        Arc::clone(&store),
        Arc::clone(&stats),
        filter,
        cancel.child_token(),
    ));

    // Run until ctrl-c, then tear everything down deterministically.
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "Failed to listen for shutdown signal");
    }
    tracing::info!("Shutting down");

    cancel.cancel();
    store.close();
    let _ = alert_poller.await;
    let _ = stats_poller.await;
    let _ = view_task.await;

    tracing::info!("echo-console stopped");
}

/// Recompute the read-side projections on every cache change.
///
/// Stand-in for the rendering layer: each notification triggers one
/// projection pass over a read-only snapshot, exactly the contract a
/// real view would use.
async fn run_view_loop(
    store: Arc<SyncStore>,
    stats: Arc<StatsCache>,
    filter: AlertFilter,
    cancel: CancellationToken,
) {
    let mut events = store.subscribe();
    let mut viewport = HOME_VIEWPORT;

    loop {
        let event = tokio::select! {
            _ = cancel.cancelled() => break,
            event = events.recv() => event,
        };

        match event {
            Ok(StoreEvent::PollFailed { message }) => {
                tracing::warn!(%message, "Poll failed, showing cached data");
            }
            Ok(event) => {
                let snapshot = store.snapshot().await;
                let view = projection::project(&snapshot, &filter);
                viewport = geo::fit_bounds(&snapshot, &viewport, MAP_SIZE, DEFAULT_PADDING_PX);

                let open = view
                    .iter()
                    .filter(|a| a.status != echo_core::alert::AlertStatus::Resolved)
                    .count();
                tracing::info!(
                    ?event,
                    total = view.len(),
                    open,
                    lat = viewport.latitude,
                    lng = viewport.longitude,
                    zoom = viewport.zoom,
                    "View refreshed"
                );
                if let Some(aggregates) = stats.latest().await {
                    tracing::debug!(
                        summary = %aggregates.summary,
                        refreshed_at = %aggregates.refreshed_at,
                        "Latest dashboard aggregates"
                    );
                }
                if let Some(top) = view.first() {
                    tracing::debug!(
                        alert_id = %top.alert_id,
                        severity = top.severity.label(),
                        status = ?top.status,
                        "Top of the triage list"
                    );
                }
            }
            Err(tokio::sync::broadcast::error::RecvError::Lagged(missed)) => {
                tracing::warn!(missed, "View loop lagged behind store events");
            }
            Err(tokio::sync::broadcast::error::RecvError::Closed) => break,
        }
    }
}
