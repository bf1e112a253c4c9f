use serde::{Deserialize, Serialize};

/// A port/service discovered on a host.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Service {
    pub id: i64,
    pub host_id: i64,
    pub port: u16,
    pub protocol: String,
    pub service_name: Option<String>,
    pub version: Option<String>,
    pub state: Option<String>,
}
