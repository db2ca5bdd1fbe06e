//! Store change notifications.
//!
//! [`StoreEvent`]s are broadcast whenever the alert cache changes so
//! the consuming layer can recompute its read-side projections
//! (sort/filter view, map bounds) on each notification instead of
//! re-rendering implicitly.

use echo_core::types::AlertId;

/// A change notification published by the [`SyncStore`](crate::store::SyncStore).
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StoreEvent {
    /// A poll snapshot was merged into the cache.
    PollMerged {
        /// Alerts taken from the server copy.
        merged: usize,
        /// Alerts where a pending optimistic value beat a stale poll copy.
        kept_optimistic: usize,
    },
    /// A poll tick failed; the cache was left intact.
    PollFailed { message: String },
    /// An operator action was applied optimistically.
    AlertChanged { alert_id: AlertId },
    /// A failed confirmation call rolled an alert back to its last
    /// server-confirmed value.
    RolledBack { alert_id: AlertId },
}
