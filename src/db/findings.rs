use chrono::{DateTime, Utc};
use rusqlite::{params, Row};
use serde_json::Value;

use crate::errors::MollyError;
use crate::models::finding::invalid_details_sentinel;
use crate::models::Finding;
use super::Database;

fn row_to_finding(row: &Row) -> rusqlite::Result<Finding> {
    let details_raw: Option<String> = row.get("details")?;
    let details = details_raw.map(|raw| {
        serde_json::from_str::<Value>(&raw).unwrap_or_else(|_| invalid_details_sentinel())
    });
    let timestamp: String = row.get("timestamp")?;

    Ok(Finding {
        id: row.get("id")?,
        scan_id: row.get("scan_id")?,
        host_id: row.get("host_id")?,
        service_id: row.get("service_id")?,
        finding_type: row.get("type")?,
        title: row.get("title")?,
        description: row.get("description")?,
        severity: row.get("severity")?,
        recommendation: row.get("recommendation")?,
        details,
        timestamp: DateTime::parse_from_rfc3339(&timestamp)
            .map(|d| d.with_timezone(&Utc))
            .unwrap_or_else(|_| Utc::now()),
    })
}

impl Database {
    #[allow(clippy::too_many_arguments)]
    pub fn add_finding(
        &self,
        scan_id: i64,
        host_id: i64,
        service_id: Option<i64>,
        finding_type: &str,
        title: &str,
        description: &str,
        severity: Option<&str>,
        recommendation: Option<&str>,
        details: Option<&Value>,
    ) -> Result<i64, MollyError> {
        let conn = self.conn.lock().unwrap();
        let timestamp = Utc::now().to_rfc3339();
        let details_json = details.map(|v| v.to_string());
        conn.execute(
            "INSERT INTO findings (scan_id, host_id, service_id, type, title, description, severity, recommendation, details, timestamp)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10)",
            params![scan_id, host_id, service_id, finding_type, title, description, severity, recommendation, details_json, timestamp],
        )?;
        Ok(conn.last_insert_rowid())
    }

    pub fn get_findings_for_scan(&self, scan_id: i64) -> Result<Vec<Finding>, MollyError> {
        let conn = self.conn.lock().unwrap();
        let mut stmt = conn.prepare("SELECT * FROM findings WHERE scan_id = ?1")?;
        let rows = stmt.query_map(params![scan_id], row_to_finding)?;
        let mut findings = Vec::new();
        for row in rows {
            findings.push(row?);
        }
        Ok(findings)
    }

    pub fn get_findings_for_scan_and_host(&self, scan_id: i64, host_id: i64) -> Result<Vec<Finding>, MollyError> {
        let conn = self.conn.lock().unwrap();
        let mut stmt = conn.prepare("SELECT * FROM findings WHERE scan_id = ?1 AND host_id = ?2")?;
        let rows = stmt.query_map(params![scan_id, host_id], row_to_finding)?;
        let mut findings = Vec::new();
        for row in rows {
            findings.push(row?);
        }
        Ok(findings)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn seed(db: &Database) -> (i64, i64) {
        let scan_id = db.create_scan("finding-tests", "network", "10.0.0.0/24").unwrap();
        let host_id = db.add_host(scan_id, "10.0.0.1", None, None).unwrap();
        (scan_id, host_id)
    }

    #[test]
    fn test_add_and_get_finding_with_details() {
        let db = Database::in_memory().unwrap();
        let (scan_id, host_id) = seed(&db);
        let details = json!({"cve_id": "CVE-2024-0001"});
        db.add_finding(scan_id, host_id, None, "cve", "Outdated OpenSSH", "desc", Some("high"), Some("upgrade"), Some(&details)).unwrap();

        let findings = db.get_findings_for_scan(scan_id).unwrap();
        assert_eq!(findings.len(), 1);
        assert_eq!(findings[0].details.as_ref().unwrap()["cve_id"], "CVE-2024-0001");
    }

    #[test]
    fn test_finding_without_details_is_none() {
        let db = Database::in_memory().unwrap();
        let (scan_id, host_id) = seed(&db);
        db.add_finding(scan_id, host_id, None, "cve", "title", "desc", None, None, None).unwrap();
        let findings = db.get_findings_for_scan(scan_id).unwrap();
        assert!(findings[0].details.is_none());
    }

    #[test]
    fn test_corrupt_details_blob_decodes_to_sentinel() {
        let db = Database::in_memory().unwrap();
        let (scan_id, host_id) = seed(&db);
        {
            let conn = db.conn.lock().unwrap();
            conn.execute(
                "INSERT INTO findings (scan_id, host_id, type, title, description, details, timestamp) VALUES (?1, ?2, 'cve', 't', 'd', ?3, ?4)",
                params![scan_id, host_id, "{not valid json", Utc::now().to_rfc3339()],
            ).unwrap();
        }
        let findings = db.get_findings_for_scan(scan_id).unwrap();
        assert_eq!(findings[0].details.as_ref().unwrap()["error"], "invalid encoded details");
    }

    #[test]
    fn test_get_findings_for_scan_and_host_scopes_correctly() {
        let db = Database::in_memory().unwrap();
        let (scan_id, host_id) = seed(&db);
        let other_host_id = db.add_host(scan_id, "10.0.0.2", None, None).unwrap();
        db.add_finding(scan_id, host_id, None, "cve", "a", "d", None, None, None).unwrap();
        db.add_finding(scan_id, other_host_id, None, "cve", "b", "d", None, None, None).unwrap();

        let findings = db.get_findings_for_scan_and_host(scan_id, host_id).unwrap();
        assert_eq!(findings.len(), 1);
        assert_eq!(findings[0].title, "a");
    }
}
