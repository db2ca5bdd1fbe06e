//! The alert cache and its reconciliation contract.
//!
//! [`SyncStore`] is the single owner of the locally-cached alert state.
//! Two writers exist -- periodic poll merges and operator-triggered
//! dispatches -- and both go through the one `RwLock` guarding the
//! state, so cache mutations are serialized even though they originate
//! from independent asynchronous sources.
//!
//! Dispatches are optimistic: the transitioned alert is written to the
//! cache before the confirmation endpoint is called, and a
//! [`PendingMutation`] records the in-flight target so a concurrently
//! arriving poll cannot visually revert the operator's action. A failed
//! confirmation rolls the alert back to its last server-confirmed
//! value.

use std::collections::HashMap;
use std::sync::Arc;

use chrono::Utc;
use tokio::sync::{broadcast, RwLock};
use tokio_util::sync::CancellationToken;

use echo_client::{ApiError, DashboardApi};
use echo_core::alert::{Alert, AlertStatus, Incident};
use echo_core::state_machine::{self, AlertAction, TransitionError};
use echo_core::types::{AlertId, Timestamp};

use crate::events::StoreEvent;

/// Broadcast channel capacity for store change events.
const EVENT_CHANNEL_CAPACITY: usize = 256;

/// Errors surfaced by the sync engine.
#[derive(Debug, thiserror::Error)]
pub enum SyncError {
    /// The requested transition is not legal from the alert's current
    /// (possibly optimistic) state. Synchronous; no network call was
    /// made and the cache is untouched.
    #[error(transparent)]
    IllegalTransition(#[from] TransitionError),

    /// The dispatch target is not in the cache.
    #[error("Alert {0} is not in the local cache")]
    UnknownAlert(AlertId),

    /// The confirmation call failed after the optimistic apply; the
    /// alert was rolled back to its last server-confirmed value.
    #[error("Failed to confirm {action} for alert {alert_id}: {source}")]
    Dispatch {
        alert_id: AlertId,
        action: &'static str,
        source: ApiError,
    },

    /// A read-side fetch failed (incident lookup); the alert cache is
    /// unaffected.
    #[error("Fetch failed: {0}")]
    Fetch(ApiError),
}

/// Bookkeeping for a transition issued but not yet confirmed.
#[derive(Debug, Clone)]
struct PendingMutation {
    /// Status the in-flight action transitions the alert into.
    target: AlertStatus,
    /// When the optimistic copy was applied locally. Doubles as a
    /// generation marker: reconciliation only settles the pending entry
    /// it created.
    applied_at: Timestamp,
    /// The alert's last server-confirmed value, restored on rollback.
    prior: Alert,
}

#[derive(Default)]
struct StoreState {
    alerts: HashMap<AlertId, Alert>,
    pending: HashMap<AlertId, PendingMutation>,
}

/// Locally-cached, continuously-refreshed view of server-held alert
/// state.
///
/// Created once via [`SyncStore::new`]; the returned `Arc` is cheaply
/// cloned into the poller and the view layer.
pub struct SyncStore {
    state: RwLock<StoreState>,
    api: Arc<dyn DashboardApi>,
    events: broadcast::Sender<StoreEvent>,
    /// Triggered by [`close`](Self::close) on dashboard teardown; once
    /// set, every mutation path becomes a no-op.
    closed: CancellationToken,
}

impl SyncStore {
    /// Create an empty store backed by the given API.
    pub fn new(api: Arc<dyn DashboardApi>) -> Arc<Self> {
        let (events, _) = broadcast::channel(EVENT_CHANNEL_CAPACITY);
        Arc::new(Self {
            state: RwLock::new(StoreState::default()),
            api,
            events,
            closed: CancellationToken::new(),
        })
    }

    /// Subscribe to cache change notifications.
    pub fn subscribe(&self) -> broadcast::Receiver<StoreEvent> {
        self.events.subscribe()
    }

    /// Tear the store down. Subsequent merges and in-flight dispatch
    /// reconciliations become safe no-ops.
    pub fn close(&self) {
        self.closed.cancel();
    }

    /// Whether [`close`](Self::close) has been called.
    pub fn is_closed(&self) -> bool {
        self.closed.is_cancelled()
    }

    /// Read-only copy of the cached alerts, in no particular order.
    ///
    /// Feed this to `echo_core::projection::project` /
    /// `echo_core::geo::fit_bounds` on each change notification.
    pub async fn snapshot(&self) -> Vec<Alert> {
        self.state.read().await.alerts.values().cloned().collect()
    }

    /// Read-only copy of one cached alert.
    pub async fn alert(&self, alert_id: &str) -> Option<Alert> {
        self.state.read().await.alerts.get(alert_id).cloned()
    }

    /// Whether an unconfirmed mutation is in flight for the alert.
    pub async fn has_pending(&self, alert_id: &str) -> bool {
        self.state.read().await.pending.contains_key(alert_id)
    }

    /// Merge a full poll snapshot into the cache.
    ///
    /// Per alert: the server copy wins unless a [`PendingMutation`] is
    /// in flight and the server has not yet caught up to its target, in
    /// which case the optimistic copy is kept and the stale poll value
    /// discarded for that alert only. Cached alerts absent from the
    /// snapshot are dropped (the active feed is authoritative for
    /// liveness) unless they have a pending mutation.
    ///
    /// No-op after [`close`](Self::close).
    pub async fn merge_poll(&self, snapshot: Vec<Alert>) {
        if self.is_closed() {
            tracing::debug!("Discarding poll snapshot: store is closed");
            return;
        }

        let mut merged = 0usize;
        let mut kept_optimistic = 0usize;
        {
            let mut state = self.state.write().await;
            let mut next: HashMap<AlertId, Alert> = HashMap::with_capacity(snapshot.len());

            for server_copy in snapshot {
                let id = server_copy.alert_id.clone();
                match state.pending.get(&id) {
                    Some(pending) if server_copy.status < pending.target => {
                        // Stale poll: the server has not seen the
                        // operator's action yet. Keep the optimistic copy.
                        if let Some(optimistic) = state.alerts.get(&id) {
                            next.insert(id, optimistic.clone());
                        }
                        kept_optimistic += 1;
                    }
                    Some(_) => {
                        // Server caught up to (or passed) the target; it
                        // is authoritative again.
                        state.pending.remove(&id);
                        next.insert(id, server_copy);
                        merged += 1;
                    }
                    None => {
                        next.insert(id, server_copy);
                        merged += 1;
                    }
                }
            }

            // Alerts with an unconfirmed mutation survive even when the
            // snapshot no longer lists them.
            for id in state.pending.keys() {
                if !next.contains_key(id) {
                    if let Some(optimistic) = state.alerts.get(id) {
                        next.insert(id.clone(), optimistic.clone());
                        kept_optimistic += 1;
                    }
                }
            }

            state.alerts = next;
        }

        tracing::debug!(merged, kept_optimistic, "Poll snapshot merged");
        self.emit(StoreEvent::PollMerged {
            merged,
            kept_optimistic,
        });
    }

    /// Apply an operator action: optimistic local transition, then
    /// confirmation against the server.
    ///
    /// Legality is checked against the current cache value -- which is
    /// the optimistic one while a mutation is pending, so illegal
    /// double-actions are rejected before reaching the network. On
    /// confirmation failure the alert is rolled back to its last
    /// server-confirmed value and [`SyncError::Dispatch`] is returned.
    ///
    /// Returns the optimistic alert value this dispatch wrote.
    pub async fn dispatch(&self, alert_id: &str, action: AlertAction) -> Result<Alert, SyncError> {
        let now = Utc::now();

        let optimistic = {
            let mut state = self.state.write().await;
            let current = state
                .alerts
                .get(alert_id)
                .ok_or_else(|| SyncError::UnknownAlert(alert_id.to_string()))?;

            // Rejection is synchronous and leaves the cache untouched.
            let next = state_machine::apply(current, &action, now)?;

            // A re-dispatch while a mutation is pending keeps the
            // original server-confirmed rollback value, preserving the
            // one-pending-per-alert invariant.
            let prior = match state.pending.get(alert_id) {
                Some(existing) => existing.prior.clone(),
                None => current.clone(),
            };

            state.alerts.insert(alert_id.to_string(), next.clone());
            state.pending.insert(
                alert_id.to_string(),
                PendingMutation {
                    target: action.target_status(),
                    applied_at: now,
                    prior,
                },
            );
            next
        };

        tracing::info!(
            alert_id = %alert_id,
            action = action.name(),
            "Applied optimistic transition"
        );
        self.emit(StoreEvent::AlertChanged {
            alert_id: alert_id.to_string(),
        });

        // Confirmation call, no lock held.
        let confirmation = match &action {
            AlertAction::Acknowledge => self.api.acknowledge(alert_id).await,
            AlertAction::Resolve { notes } => self.api.resolve(alert_id, notes).await,
        };

        match confirmation {
            Ok(()) => {
                self.settle(alert_id, now, None).await;
                Ok(optimistic)
            }
            Err(source) => {
                tracing::warn!(
                    alert_id = %alert_id,
                    action = action.name(),
                    error = %source,
                    "Confirmation failed, rolling back optimistic transition"
                );
                self.settle(alert_id, now, Some(StoreEvent::RolledBack {
                    alert_id: alert_id.to_string(),
                }))
                .await;
                Err(SyncError::Dispatch {
                    alert_id: alert_id.to_string(),
                    action: action.name(),
                    source,
                })
            }
        }
    }

    /// Resolve the incident an alert references, if any.
    ///
    /// Pure read: failures never touch the alert cache.
    pub async fn incident_for(&self, alert: &Alert) -> Result<Option<Incident>, SyncError> {
        match &alert.incident_id {
            None => Ok(None),
            Some(id) => self
                .api
                .incident(id)
                .await
                .map(Some)
                .map_err(SyncError::Fetch),
        }
    }

    /// Publish a poll failure on behalf of the poller.
    pub(crate) fn publish_poll_failure(&self, message: String) {
        self.emit(StoreEvent::PollFailed { message });
    }

    // ---- private helpers ----

    /// Settle the pending mutation created at `applied_at`.
    ///
    /// Only the entry this dispatch created is touched -- a poll merge
    /// or a superseding dispatch may already have replaced it. When
    /// `rollback` carries an event the prior value is restored and the
    /// event published. No-op after [`close`](Self::close): a dispatch
    /// that outlives teardown settles without reaching the store.
    async fn settle(&self, alert_id: &str, applied_at: Timestamp, rollback: Option<StoreEvent>) {
        if self.is_closed() {
            tracing::debug!(alert_id = %alert_id, "Store closed, dropping dispatch settlement");
            return;
        }

        let mut state = self.state.write().await;
        let ours = state
            .pending
            .get(alert_id)
            .map(|p| p.applied_at == applied_at)
            .unwrap_or(false);
        if !ours {
            return;
        }

        if let Some(pending) = state.pending.remove(alert_id) {
            if let Some(event) = rollback {
                state.alerts.insert(alert_id.to_string(), pending.prior);
                drop(state);
                self.emit(event);
            }
            // On confirmation the optimistic copy stands until the next
            // poll re-asserts it.
        }
    }

    fn emit(&self, event: StoreEvent) {
        // Zero receivers is fine -- nobody is watching yet.
        let _ = self.events.send(event);
    }
}
