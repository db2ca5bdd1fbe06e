/// Alert and incident identifiers are server-assigned opaque strings.
pub type AlertId = String;

/// All timestamps are UTC.
pub type Timestamp = chrono::DateTime<chrono::Utc>;
