use std::collections::HashMap;
use std::path::Path;

use chrono::Utc;

use crate::db::Database;
use crate::errors::MollyError;
use crate::models::ScanStatus;
use crate::reporting::{format_detailed_host_report, format_network_scan_summary, generate_pdf_report};

/// Builds and writes the network-summary PDF for a finished scan, updating
/// the scan row with its `results_path` on success. Returns the written
/// path, or `None` if rendering failed (logged upstream by `generate_pdf_report`'s
/// own `MollyError` when propagated).
pub fn generate_network_summary_report(
    db: &Database,
    output_dir: &Path,
    scan_id: i64,
    ai_summary: &str,
) -> Result<String, MollyError> {
    let scan = db
        .get_scan_by_id(scan_id)?
        .ok_or_else(|| MollyError::NotFound(format!("scan {} not found", scan_id)))?;
    let hosts = db.get_hosts_for_scan(scan_id)?;

    let mut services_by_host = HashMap::new();
    for host in &hosts {
        services_by_host.insert(host.ip_address.clone(), db.get_services_for_host(host.id)?);
    }

    let markdown = format_network_scan_summary(&scan, &hosts, &services_by_host);
    let filename = format!("network_summary_{}.pdf", Utc::now().format("%Y%m%d_%H%M%S"));

    let path = generate_pdf_report(output_dir, &markdown, &filename, &scan.session_name, None)?;
    let path_str = path.to_string_lossy().to_string();

    db.update_scan(scan_id, ScanStatus::Completed, Some(ai_summary), None, Some(&path_str))?;

    Ok(path_str)
}

/// Builds and writes the detailed per-host PDF report for a host within a
/// named scan session. Does not update the scan row (the source's equivalent
/// leaves the scan's `results_path` pointing at the network summary, not the
/// per-host detail report).
pub fn generate_detailed_host_report(
    db: &Database,
    output_dir: &Path,
    host_ip: &str,
    session_name: &str,
) -> Result<String, MollyError> {
    let scan = db
        .get_scan_by_name(session_name)?
        .ok_or_else(|| MollyError::NotFound(format!("no scan session named '{}'", session_name)))?;

    let hosts = db.get_hosts_for_scan(scan.id)?;
    let host = hosts
        .into_iter()
        .find(|h| h.ip_address == host_ip)
        .ok_or_else(|| MollyError::NotFound(format!("host '{}' not found in session '{}'", host_ip, session_name)))?;

    let services = db.get_services_for_host(host.id)?;
    let findings = db.get_findings_for_scan_and_host(scan.id, host.id)?;

    let markdown = format_detailed_host_report(&host, &services, &findings);
    let filename = format!(
        "detailed_report_{}_{}.pdf",
        host_ip.replace('.', "_"),
        Utc::now().format("%Y%m%d_%H%M%S")
    );

    let path = generate_pdf_report(output_dir, &markdown, &filename, session_name, Some(host_ip))?;
    Ok(path.to_string_lossy().to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn seeded_db() -> (Database, i64) {
        let db = Database::in_memory().unwrap();
        let scan_id = db.create_scan("Escaneo_IA_test", "Network Scan", "10.0.0.0/24").unwrap();
        let host_id = db.add_host(scan_id, "10.0.0.5", None, None).unwrap();
        db.add_service(host_id, 22, "tcp", Some("ssh"), Some("OpenSSH 8.9"), Some("open")).unwrap();
        (db, scan_id)
    }

    #[test]
    fn test_generate_network_summary_report_updates_scan() {
        let (db, scan_id) = seeded_db();
        let dir = tempfile::tempdir().unwrap();
        let path = generate_network_summary_report(&db, dir.path(), scan_id, "All good").unwrap();
        assert!(Path::new(&path).exists());
        let scan = db.get_scan_by_id(scan_id).unwrap().unwrap();
        assert_eq!(scan.status, ScanStatus::Completed);
        assert_eq!(scan.results_path.as_deref(), Some(path.as_str()));
    }

    #[test]
    fn test_generate_detailed_host_report_unknown_host_errors() {
        let (db, _scan_id) = seeded_db();
        let dir = tempfile::tempdir().unwrap();
        let result = generate_detailed_host_report(&db, dir.path(), "10.0.0.99", "Escaneo_IA_test");
        assert!(matches!(result, Err(MollyError::NotFound(_))));
    }

    #[test]
    fn test_generate_detailed_host_report_writes_file() {
        let (db, _scan_id) = seeded_db();
        let dir = tempfile::tempdir().unwrap();
        let path = generate_detailed_host_report(&db, dir.path(), "10.0.0.5", "Escaneo_IA_test").unwrap();
        assert!(Path::new(&path).exists());
        assert!(path.contains("Escaneo_IP_10_0_0_5_"));
    }
}
