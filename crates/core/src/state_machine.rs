//! Pure alert lifecycle transition function.
//!
//! [`apply`] takes an alert and an operator action and returns either
//! the transitioned alert or a rejection. The input alert is never
//! mutated; callers decide whether to commit the result. `now` is a
//! parameter so the sync layer stamps one consistent time and tests
//! stay deterministic.

use crate::alert::{Alert, AlertStatus};
use crate::types::Timestamp;

/// Operator action on an alert.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AlertAction {
    /// Take charge of the alert. Legal from `created` or `notified`.
    Acknowledge,
    /// Close the alert with a resolution note. Legal from any
    /// non-resolved status. The note may be empty but must be supplied
    /// by the caller.
    Resolve { notes: String },
}

impl AlertAction {
    /// The status this action transitions an alert into.
    pub fn target_status(&self) -> AlertStatus {
        match self {
            AlertAction::Acknowledge => AlertStatus::Acknowledged,
            AlertAction::Resolve { .. } => AlertStatus::Resolved,
        }
    }

    /// Short name for log lines and error messages.
    pub fn name(&self) -> &'static str {
        match self {
            AlertAction::Acknowledge => "acknowledge",
            AlertAction::Resolve { .. } => "resolve",
        }
    }
}

/// Rejection of an illegal lifecycle transition.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TransitionError {
    /// The action is not legal from the alert's current status.
    #[error("Cannot {action} an alert in status {status:?}")]
    Illegal {
        status: AlertStatus,
        action: &'static str,
    },
}

/// Apply an operator action to an alert.
///
/// Returns the transitioned copy on success. On rejection the caller
/// must leave its cache untouched -- no transition ever un-resolves an
/// alert or moves its status backwards.
pub fn apply(alert: &Alert, action: &AlertAction, now: Timestamp) -> Result<Alert, TransitionError> {
    match (action, alert.status) {
        (AlertAction::Acknowledge, AlertStatus::Created | AlertStatus::Notified) => {
            let mut next = alert.clone();
            next.status = AlertStatus::Acknowledged;
            next.acknowledged_at = Some(now);
            Ok(next)
        }
        (
            AlertAction::Resolve { notes },
            AlertStatus::Created | AlertStatus::Notified | AlertStatus::Acknowledged,
        ) => {
            let mut next = alert.clone();
            next.status = AlertStatus::Resolved;
            next.resolved_at = Some(now);
            next.resolution_notes = Some(notes.clone());
            Ok(next)
        }
        _ => Err(TransitionError::Illegal {
            status: alert.status,
            action: action.name(),
        }),
    }
}
