//! Read-side sort/filter projection over the alert cache.
//!
//! [`project`] turns an unordered alert collection into the ordered,
//! filtered view the list panes render. Pure: inputs are never mutated
//! and the output owns its clones, so the view layer can call it on
//! every cache-change notification.

use crate::alert::{Alert, Severity};

/// Conjunctive filter criteria. `None` means "no filter" for that axis.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AlertFilter {
    /// Exact severity match.
    pub severity: Option<Severity>,
    /// Alert passes iff its category set contains this value.
    pub category: Option<String>,
}

impl AlertFilter {
    /// Whether an alert passes both criteria.
    pub fn matches(&self, alert: &Alert) -> bool {
        if let Some(severity) = self.severity {
            if alert.severity != severity {
                return false;
            }
        }
        if let Some(category) = &self.category {
            if !alert.has_category(category) {
                return false;
            }
        }
        true
    }
}

/// Produce the ordered, filtered alert view.
///
/// Sort key, applied lexicographically:
/// 1. status rank ascending (open work first),
/// 2. severity descending,
/// 3. `created_at` descending (most recent first),
/// 4. `alert_id` ascending.
///
/// The id tiebreak makes the order a total order, so repeated calls on
/// the same input yield identical output even when timestamps collide.
pub fn project(alerts: &[Alert], filter: &AlertFilter) -> Vec<Alert> {
    let mut view: Vec<Alert> = alerts
        .iter()
        .filter(|alert| filter.matches(alert))
        .cloned()
        .collect();

    view.sort_by(|a, b| {
        a.status
            .rank()
            .cmp(&b.status.rank())
            .then(b.severity.cmp(&a.severity))
            .then(b.created_at.cmp(&a.created_at))
            .then(a.alert_id.cmp(&b.alert_id))
    });

    view
}
