//! Alert and incident data model.
//!
//! Mirrors the wire format served by the dashboard API: severity travels
//! as an integer 1..=5, status as a lowercase string. Lifecycle
//! timestamps (`acknowledged_at`, `resolved_at`) are set exactly once,
//! when the alert reaches that stage, and never cleared.

use serde::{Deserialize, Serialize};

use crate::types::{AlertId, Timestamp};

/// Urgency level of an alert, from informational to critical.
///
/// Ordered by urgency: `Information < ... < Critical`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub enum Severity {
    Information = 1,
    Advisory = 2,
    Intervention = 3,
    Urgent = 4,
    Critical = 5,
}

impl Severity {
    /// Human-readable label for dashboards and log lines.
    pub fn label(self) -> &'static str {
        match self {
            Severity::Information => "Information",
            Severity::Advisory => "Advisory",
            Severity::Intervention => "Intervention",
            Severity::Urgent => "Urgent",
            Severity::Critical => "Critical",
        }
    }
}

impl TryFrom<u8> for Severity {
    type Error = String;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            1 => Ok(Severity::Information),
            2 => Ok(Severity::Advisory),
            3 => Ok(Severity::Intervention),
            4 => Ok(Severity::Urgent),
            5 => Ok(Severity::Critical),
            other => Err(format!("Severity must be 1..=5, got {other}")),
        }
    }
}

impl From<Severity> for u8 {
    fn from(value: Severity) -> Self {
        value as u8
    }
}

/// Lifecycle status of an alert.
///
/// The declaration order is the lifecycle order: an alert only ever
/// moves forward (`created < notified < acknowledged < resolved`), and
/// `resolved` is terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AlertStatus {
    Created,
    Notified,
    Acknowledged,
    Resolved,
}

impl AlertStatus {
    /// Position in the lifecycle order (`created` = 0 .. `resolved` = 3).
    pub fn rank(self) -> u8 {
        self as u8
    }
}

/// A geographic point attached to an alert or emergency service.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Location {
    pub lat: f64,
    pub lng: f64,
}

/// A single reported condition with severity and lifecycle status.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Alert {
    /// Stable, unique identifier assigned by the server.
    pub alert_id: AlertId,
    /// Short operator-facing description.
    pub summary: String,
    /// Longer free-form description, when available.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub severity: Severity,
    pub status: AlertStatus,
    pub created_at: Timestamp,
    /// Set exactly once, when the alert reaches `acknowledged`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub acknowledged_at: Option<Timestamp>,
    /// Set exactly once, when the alert reaches `resolved`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub resolved_at: Option<Timestamp>,
    /// Free-form classification tags.
    #[serde(default)]
    pub categories: Vec<String>,
    /// Geographic position, when the alert is located.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location: Option<Location>,
    /// Link to the incident this alert belongs to, if any.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub incident_id: Option<String>,
    /// Present iff `status == Resolved`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub resolution_notes: Option<String>,
}

impl Alert {
    /// Whether the alert carries a category tag.
    pub fn has_category(&self, category: &str) -> bool {
        self.categories.iter().any(|c| c == category)
    }
}

/// A higher-level grouping that zero or more alerts may reference.
///
/// Incidents are owned by the server; the console only ever displays
/// them, so the model stays deliberately loose.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Incident {
    pub incident_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub summary: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<Timestamp>,
}
