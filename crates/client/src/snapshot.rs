//! Per-record parsing of alert snapshot payloads.
//!
//! The active-alerts feed is merged record by record: a single
//! malformed entry (missing `alert_id`, out-of-range severity, ...)
//! is dropped with a logged warning instead of failing the whole poll
//! or corrupting the cache.

use echo_core::alert::Alert;

/// Parse a raw snapshot array into well-formed alerts.
///
/// Malformed records are skipped with a `warn` log; the remainder of
/// the snapshot is still usable.
pub fn parse_alerts(raw: Vec<serde_json::Value>) -> Vec<Alert> {
    let mut alerts = Vec::with_capacity(raw.len());
    for record in raw {
        match serde_json::from_value::<Alert>(record.clone()) {
            Ok(alert) => alerts.push(alert),
            Err(e) => {
                let id = record
                    .get("alert_id")
                    .and_then(|v| v.as_str())
                    .unwrap_or("<missing>");
                tracing::warn!(alert_id = %id, error = %e, "Dropping malformed alert record");
            }
        }
    }
    alerts
}

#[cfg(test)]
mod tests {
    use super::*;
    use echo_core::alert::{AlertStatus, Severity};

    fn well_formed(id: &str) -> serde_json::Value {
        serde_json::json!({
            "alert_id": id,
            "summary": "Power outage in the 5th arrondissement",
            "severity": 4,
            "status": "notified",
            "created_at": "2025-06-01T10:00:00Z",
            "categories": ["infrastructure"],
        })
    }

    #[test]
    fn well_formed_records_parse() {
        let alerts = parse_alerts(vec![well_formed("a-1"), well_formed("a-2")]);
        assert_eq!(alerts.len(), 2);
        assert_eq!(alerts[0].alert_id, "a-1");
        assert_eq!(alerts[0].severity, Severity::Urgent);
        assert_eq!(alerts[0].status, AlertStatus::Notified);
    }

    #[test]
    fn record_without_alert_id_is_dropped() {
        let mut broken = well_formed("a-1");
        broken.as_object_mut().unwrap().remove("alert_id");
        let alerts = parse_alerts(vec![broken, well_formed("a-2")]);
        assert_eq!(alerts.len(), 1);
        assert_eq!(alerts[0].alert_id, "a-2");
    }

    #[test]
    fn record_with_out_of_range_severity_is_dropped() {
        let mut broken = well_formed("a-1");
        broken["severity"] = serde_json::json!(9);
        let alerts = parse_alerts(vec![broken]);
        assert!(alerts.is_empty());
    }

    #[test]
    fn record_with_unknown_status_is_dropped() {
        let mut broken = well_formed("a-1");
        broken["status"] = serde_json::json!("reopened");
        let alerts = parse_alerts(vec![broken]);
        assert!(alerts.is_empty());
    }

    #[test]
    fn empty_snapshot_is_fine() {
        assert!(parse_alerts(vec![]).is_empty());
    }
}
