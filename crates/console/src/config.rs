use std::time::Duration;

use echo_client::StatsPeriod;
use echo_core::alert::Severity;

/// Console configuration loaded from environment variables.
///
/// All fields except the API base URL have defaults suitable for local
/// development.
#[derive(Debug, Clone)]
pub struct Config {
    /// Dashboard API base URL, e.g. `http://localhost:8000/api`.
    pub api_base_url: String,
    /// Live alert refresh interval.
    pub alert_interval: Duration,
    /// Aggregate dashboard refresh interval.
    pub stats_interval: Duration,
    /// Statistics window for the time-series read model.
    pub stats_period: StatsPeriod,
    /// Optional exact-severity filter for the list view.
    pub severity_filter: Option<Severity>,
    /// Optional category filter for the list view.
    pub category_filter: Option<String>,
}

impl Config {
    /// Load configuration from environment variables with defaults.
    ///
    /// | Env Var             | Default | Description                     |
    /// |---------------------|---------|---------------------------------|
    /// | `ECHO_API_BASE_URL` | --      | required, API base URL          |
    /// | `ALERT_POLL_SECS`   | `30`    | alert refresh interval          |
    /// | `STATS_POLL_SECS`   | `60`    | aggregate refresh interval      |
    /// | `STATS_PERIOD`      | `today` | `today` \| `week` \| `month`    |
    /// | `SEVERITY_FILTER`   | unset   | exact severity 1..=5            |
    /// | `CATEGORY_FILTER`   | unset   | category tag                    |
    pub fn from_env() -> Result<Self, String> {
        let api_base_url = std::env::var("ECHO_API_BASE_URL")
            .map_err(|_| "ECHO_API_BASE_URL environment variable is required".to_string())?;

        let alert_interval = Duration::from_secs(parse_secs("ALERT_POLL_SECS", 30)?);
        let stats_interval = Duration::from_secs(parse_secs("STATS_POLL_SECS", 60)?);

        let stats_period = match std::env::var("STATS_PERIOD").as_deref() {
            Err(_) | Ok("today") => StatsPeriod::Today,
            Ok("week") => StatsPeriod::Week,
            Ok("month") => StatsPeriod::Month,
            Ok(other) => return Err(format!("STATS_PERIOD must be today|week|month, got {other}")),
        };

        let severity_filter = match std::env::var("SEVERITY_FILTER") {
            Err(_) => None,
            Ok(raw) => {
                let value: u8 = raw
                    .parse()
                    .map_err(|_| format!("SEVERITY_FILTER must be an integer, got {raw}"))?;
                Some(Severity::try_from(value)?)
            }
        };

        let category_filter = std::env::var("CATEGORY_FILTER").ok();

        Ok(Self {
            api_base_url,
            alert_interval,
            stats_interval,
            stats_period,
            severity_filter,
            category_filter,
        })
    }
}

fn parse_secs(var: &str, default: u64) -> Result<u64, String> {
    match std::env::var(var) {
        Err(_) => Ok(default),
        Ok(raw) => raw
            .parse()
            .map_err(|_| format!("{var} must be a whole number of seconds, got {raw}")),
    }
}
