//! Shared test fixtures: a programmable in-memory [`DashboardApi`].

// Each test binary uses a different slice of the mock.
#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use chrono::{TimeZone, Utc};
use tokio::sync::Notify;

use echo_client::{ApiError, DashboardApi, StatsPeriod};
use echo_core::alert::{Alert, AlertStatus, Incident, Severity};

/// Build a test alert with the usual defaults.
pub fn alert(id: &str, severity: Severity, status: AlertStatus) -> Alert {
    Alert {
        alert_id: id.into(),
        summary: format!("alert {id}"),
        description: None,
        severity,
        status,
        created_at: Utc.with_ymd_and_hms(2025, 6, 1, 12, 0, 0).unwrap(),
        acknowledged_at: None,
        resolved_at: None,
        categories: vec!["test".into()],
        location: None,
        incident_id: None,
        resolution_notes: None,
    }
}

/// In-memory [`DashboardApi`] with programmable responses.
///
/// - `alerts` is what `active_alerts` returns.
/// - `fail_*` flags make the corresponding call return a 500 once set.
/// - `*_gate`, when armed via [`MockApi::gate_acknowledge`] /
///   [`MockApi::gate_active`], holds the call until the returned
///   [`Notify`] is notified -- used to stage in-flight races.
#[derive(Default)]
pub struct MockApi {
    pub alerts: Mutex<Vec<Alert>>,
    pub incidents: Mutex<HashMap<String, Incident>>,

    pub fail_acknowledge: AtomicBool,
    pub fail_resolve: AtomicBool,
    pub fail_active: AtomicBool,

    pub acknowledge_calls: AtomicUsize,
    pub resolve_calls: AtomicUsize,
    pub active_calls: AtomicUsize,

    ack_gate: Mutex<Option<Arc<Notify>>>,
    active_gate: Mutex<Option<Arc<Notify>>>,
}

impl MockApi {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn set_alerts(&self, alerts: Vec<Alert>) {
        *self.alerts.lock().unwrap() = alerts;
    }

    /// Hold the next acknowledge calls until the returned handle is
    /// notified.
    pub fn gate_acknowledge(&self) -> Arc<Notify> {
        let gate = Arc::new(Notify::new());
        *self.ack_gate.lock().unwrap() = Some(Arc::clone(&gate));
        gate
    }

    /// Hold the next active-alert fetches until the returned handle is
    /// notified.
    pub fn gate_active(&self) -> Arc<Notify> {
        let gate = Arc::new(Notify::new());
        *self.active_gate.lock().unwrap() = Some(Arc::clone(&gate));
        gate
    }

    fn server_error(what: &str) -> ApiError {
        ApiError::Api {
            status: 500,
            body: format!("{what} exploded"),
        }
    }
}

#[async_trait]
impl DashboardApi for MockApi {
    async fn active_alerts(&self) -> Result<Vec<Alert>, ApiError> {
        self.active_calls.fetch_add(1, Ordering::SeqCst);
        let gate = self.active_gate.lock().unwrap().clone();
        if let Some(gate) = gate {
            gate.notified().await;
        }
        if self.fail_active.load(Ordering::SeqCst) {
            return Err(Self::server_error("active_alerts"));
        }
        Ok(self.alerts.lock().unwrap().clone())
    }

    async fn incidents(&self) -> Result<Vec<Incident>, ApiError> {
        Ok(self.incidents.lock().unwrap().values().cloned().collect())
    }

    async fn incident(&self, incident_id: &str) -> Result<Incident, ApiError> {
        self.incidents
            .lock()
            .unwrap()
            .get(incident_id)
            .cloned()
            .ok_or(ApiError::Api {
                status: 404,
                body: format!("incident {incident_id} not found"),
            })
    }

    async fn acknowledge(&self, _alert_id: &str) -> Result<(), ApiError> {
        self.acknowledge_calls.fetch_add(1, Ordering::SeqCst);
        let gate = self.ack_gate.lock().unwrap().clone();
        if let Some(gate) = gate {
            gate.notified().await;
        }
        if self.fail_acknowledge.load(Ordering::SeqCst) {
            return Err(Self::server_error("acknowledge"));
        }
        Ok(())
    }

    async fn resolve(&self, _alert_id: &str, _notes: &str) -> Result<(), ApiError> {
        self.resolve_calls.fetch_add(1, Ordering::SeqCst);
        if self.fail_resolve.load(Ordering::SeqCst) {
            return Err(Self::server_error("resolve"));
        }
        Ok(())
    }

    async fn statistics_summary(&self) -> Result<serde_json::Value, ApiError> {
        if self.fail_active.load(Ordering::SeqCst) {
            return Err(Self::server_error("statistics_summary"));
        }
        Ok(serde_json::json!({
            "activeAlerts": self.alerts.lock().unwrap().len(),
        }))
    }

    async fn time_series(&self, period: StatsPeriod) -> Result<serde_json::Value, ApiError> {
        Ok(serde_json::json!([{ "period": period.as_str() }]))
    }

    async fn category_counts(&self) -> Result<serde_json::Value, ApiError> {
        Ok(serde_json::json!([{ "name": "test", "count": 1 }]))
    }

    async fn emergency_services(&self) -> Result<serde_json::Value, ApiError> {
        Ok(serde_json::json!([]))
    }
}
