use rusqlite::{params, Row};

use crate::errors::MollyError;
use crate::models::Host;
use super::Database;

fn row_to_host(row: &Row) -> rusqlite::Result<Host> {
    Ok(Host {
        id: row.get("id")?,
        scan_id: row.get("scan_id")?,
        ip_address: row.get("ip_address")?,
        hostname: row.get("hostname")?,
        os_info: row.get("os_info")?,
    })
}

impl Database {
    pub fn add_host(
        &self,
        scan_id: i64,
        ip_address: &str,
        hostname: Option<&str>,
        os_info: Option<&str>,
    ) -> Result<i64, MollyError> {
        let conn = self.conn.lock().unwrap();
        conn.execute(
            "INSERT INTO hosts (scan_id, ip_address, hostname, os_info) VALUES (?1, ?2, ?3, ?4)",
            params![scan_id, ip_address, hostname, os_info],
        )?;
        Ok(conn.last_insert_rowid())
    }

    pub fn get_hosts_for_scan(&self, scan_id: i64) -> Result<Vec<Host>, MollyError> {
        let conn = self.conn.lock().unwrap();
        let mut stmt = conn.prepare("SELECT * FROM hosts WHERE scan_id = ?1")?;
        let rows = stmt.query_map(params![scan_id], row_to_host)?;
        let mut hosts = Vec::new();
        for row in rows {
            hosts.push(row?);
        }
        Ok(hosts)
    }

    pub fn get_host(&self, host_id: i64) -> Result<Option<Host>, MollyError> {
        let conn = self.conn.lock().unwrap();
        let mut stmt = conn.prepare("SELECT * FROM hosts WHERE id = ?1")?;
        match stmt.query_row(params![host_id], row_to_host) {
            Ok(host) => Ok(Some(host)),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    pub fn get_host_by_ip_and_scan_id(&self, ip_address: &str, scan_id: i64) -> Result<Option<Host>, MollyError> {
        let conn = self.conn.lock().unwrap();
        let mut stmt = conn.prepare("SELECT * FROM hosts WHERE ip_address = ?1 AND scan_id = ?2")?;
        match stmt.query_row(params![ip_address, scan_id], row_to_host) {
            Ok(host) => Ok(Some(host)),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(e.into()),
        }
    }
}
