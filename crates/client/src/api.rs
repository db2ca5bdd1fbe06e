//! REST client for the ECHO dashboard API.
//!
//! Wraps the alert, incident, and statistics endpoints using
//! [`reqwest`]. The [`DashboardApi`] trait abstracts the surface the
//! sync layer consumes so tests can substitute a mock.

use async_trait::async_trait;
use echo_core::alert::{Alert, Incident};

use crate::snapshot::parse_alerts;

/// Aggregate statistics window, matching the API's `period` parameter.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatsPeriod {
    Today,
    Week,
    Month,
}

impl StatsPeriod {
    /// Wire value for the `period` query parameter.
    pub fn as_str(self) -> &'static str {
        match self {
            StatsPeriod::Today => "today",
            StatsPeriod::Week => "week",
            StatsPeriod::Month => "month",
        }
    }
}

/// Errors from the dashboard REST layer.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    /// The HTTP request itself failed (network, DNS, TLS, etc.).
    #[error("HTTP request failed: {0}")]
    Request(#[from] reqwest::Error),

    /// The API returned a non-2xx status code.
    #[error("Dashboard API error ({status}): {body}")]
    Api {
        /// HTTP status code.
        status: u16,
        /// Raw response body for debugging.
        body: String,
    },
}

/// The slice of the dashboard API the sync engine depends on.
///
/// Implemented by [`EchoApi`] over HTTP and by mocks in tests.
#[async_trait]
pub trait DashboardApi: Send + Sync {
    /// Fetch the full active-alert snapshot.
    ///
    /// Malformed records are dropped by the implementation, never
    /// surfaced as an error.
    async fn active_alerts(&self) -> Result<Vec<Alert>, ApiError>;

    /// Fetch all incidents.
    async fn incidents(&self) -> Result<Vec<Incident>, ApiError>;

    /// Fetch a single incident by id.
    async fn incident(&self, incident_id: &str) -> Result<Incident, ApiError>;

    /// Confirm an acknowledge transition on the server.
    async fn acknowledge(&self, alert_id: &str) -> Result<(), ApiError>;

    /// Confirm a resolve transition on the server.
    async fn resolve(&self, alert_id: &str, notes: &str) -> Result<(), ApiError>;

    /// Aggregate summary read model (opaque to the core).
    async fn statistics_summary(&self) -> Result<serde_json::Value, ApiError>;

    /// Time-series read model for the given window (opaque).
    async fn time_series(&self, period: StatsPeriod) -> Result<serde_json::Value, ApiError>;

    /// Per-category alert counts (opaque).
    async fn category_counts(&self) -> Result<serde_json::Value, ApiError>;

    /// Emergency service point features for the map layer (opaque).
    async fn emergency_services(&self) -> Result<serde_json::Value, ApiError>;
}

/// HTTP client for one dashboard API deployment.
pub struct EchoApi {
    client: reqwest::Client,
    base_url: String,
}

impl EchoApi {
    /// Create a new API client.
    ///
    /// * `base_url` - Base HTTP URL, e.g. `http://host:8000/api`.
    pub fn new(base_url: String) -> Self {
        Self {
            client: reqwest::Client::new(),
            base_url,
        }
    }

    /// Create an API client reusing an existing [`reqwest::Client`]
    /// (useful for connection pooling).
    pub fn with_client(client: reqwest::Client, base_url: String) -> Self {
        Self { client, base_url }
    }

    // ---- private helpers ----

    /// Ensure the response has a success status code. Returns the
    /// response unchanged on success, or an [`ApiError::Api`] carrying
    /// the status and body text on failure.
    async fn ensure_success(response: reqwest::Response) -> Result<reqwest::Response, ApiError> {
        let status = response.status();
        if !status.is_success() {
            let body = response
                .text()
                .await
                .unwrap_or_else(|_| "<unreadable body>".to_string());
            return Err(ApiError::Api {
                status: status.as_u16(),
                body,
            });
        }
        Ok(response)
    }

    /// Parse a successful JSON response body into the expected type.
    async fn get_json<T: serde::de::DeserializeOwned>(&self, path: &str) -> Result<T, ApiError> {
        let response = self
            .client
            .get(format!("{}{path}", self.base_url))
            .send()
            .await?;
        let response = Self::ensure_success(response).await?;
        Ok(response.json::<T>().await?)
    }

    /// POST a JSON body, discarding the response body.
    async fn post_json(&self, path: &str, body: Option<serde_json::Value>) -> Result<(), ApiError> {
        let mut request = self.client.post(format!("{}{path}", self.base_url));
        if let Some(body) = body {
            request = request.json(&body);
        }
        let response = request.send().await?;
        Self::ensure_success(response).await?;
        Ok(())
    }
}

#[async_trait]
impl DashboardApi for EchoApi {
    async fn active_alerts(&self) -> Result<Vec<Alert>, ApiError> {
        let raw: Vec<serde_json::Value> = self.get_json("/alerts/active").await?;
        Ok(parse_alerts(raw))
    }

    async fn incidents(&self) -> Result<Vec<Incident>, ApiError> {
        self.get_json("/incidents").await
    }

    async fn incident(&self, incident_id: &str) -> Result<Incident, ApiError> {
        self.get_json(&format!("/incidents/{incident_id}")).await
    }

    async fn acknowledge(&self, alert_id: &str) -> Result<(), ApiError> {
        self.post_json(&format!("/alerts/{alert_id}/acknowledge"), None)
            .await
    }

    async fn resolve(&self, alert_id: &str, notes: &str) -> Result<(), ApiError> {
        let body = serde_json::json!({ "resolution_notes": notes });
        self.post_json(&format!("/alerts/{alert_id}/resolve"), Some(body))
            .await
    }

    async fn statistics_summary(&self) -> Result<serde_json::Value, ApiError> {
        self.get_json("/statistics/summary").await
    }

    async fn time_series(&self, period: StatsPeriod) -> Result<serde_json::Value, ApiError> {
        self.get_json(&format!("/statistics/time-series?period={}", period.as_str()))
            .await
    }

    async fn category_counts(&self) -> Result<serde_json::Value, ApiError> {
        self.get_json("/categories/counts").await
    }

    async fn emergency_services(&self) -> Result<serde_json::Value, ApiError> {
        self.get_json("/emergency-services").await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn stats_period_wire_values() {
        assert_eq!(StatsPeriod::Today.as_str(), "today");
        assert_eq!(StatsPeriod::Week.as_str(), "week");
        assert_eq!(StatsPeriod::Month.as_str(), "month");
    }
}
