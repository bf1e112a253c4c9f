use serde::{Deserialize, Serialize};

/// A host discovered during a scan.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Host {
    pub id: i64,
    pub scan_id: i64,
    pub ip_address: String,
    pub hostname: Option<String>,
    pub os_info: Option<String>,
}
