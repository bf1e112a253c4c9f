use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Sentinel returned in place of `details` when the stored JSON blob fails to decode.
pub fn invalid_details_sentinel() -> Value {
    serde_json::json!({ "error": "invalid encoded details" })
}

/// A security-relevant observation tied to a scan, and optionally to a host/service.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Finding {
    pub id: i64,
    pub scan_id: i64,
    pub host_id: i64,
    pub service_id: Option<i64>,
    #[serde(rename = "type")]
    pub finding_type: String,
    pub title: String,
    pub description: String,
    pub severity: Option<String>,
    pub recommendation: Option<String>,
    /// Opaque JSON payload (e.g. raw CVE records, LLM analysis). Decodes to
    /// [`invalid_details_sentinel`] rather than failing if the stored blob is corrupt.
    pub details: Option<Value>,
    pub timestamp: DateTime<Utc>,
}
