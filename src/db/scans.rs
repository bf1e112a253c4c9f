use chrono::{DateTime, Utc};
use rusqlite::{params, Row};

use crate::errors::MollyError;
use crate::models::{Scan, ScanStatus};
use super::Database;

fn row_to_scan(row: &Row) -> rusqlite::Result<Scan> {
    let status_str: String = row.get("status")?;
    let status = status_str
        .parse::<ScanStatus>()
        .unwrap_or(ScanStatus::InProgress);
    let start_time: String = row.get("start_time")?;
    let end_time: Option<String> = row.get("end_time")?;

    Ok(Scan {
        id: row.get("id")?,
        session_name: row.get("session_name")?,
        scan_type: row.get("scan_type")?,
        target: row.get("target")?,
        start_time: DateTime::parse_from_rfc3339(&start_time)
            .map(|d| d.with_timezone(&Utc))
            .unwrap_or_else(|_| Utc::now()),
        end_time: end_time.and_then(|s| {
            DateTime::parse_from_rfc3339(&s).ok().map(|d| d.with_timezone(&Utc))
        }),
        status,
        summary: row.get("summary")?,
        results_path: row.get("results_path")?,
    })
}

impl Database {
    /// Create a new scan session. Returns `Err(MollyError::DuplicateSession)` if
    /// `session_name` collides with an existing row.
    pub fn create_scan(&self, session_name: &str, scan_type: &str, target: &str) -> Result<i64, MollyError> {
        let conn = self.conn.lock().unwrap();
        let start_time = Utc::now().to_rfc3339();
        conn.execute(
            "INSERT INTO scans (session_name, scan_type, target, start_time, status) VALUES (?1, ?2, ?3, ?4, ?5)",
            params![session_name, scan_type, target, start_time, ScanStatus::InProgress.to_string()],
        )?;
        Ok(conn.last_insert_rowid())
    }

    /// Dynamically update a scan's status, and optionally its summary,
    /// end time, and results path. An end time is stamped automatically when
    /// `status` is terminal and none was supplied.
    pub fn update_scan(
        &self,
        id: i64,
        status: ScanStatus,
        summary: Option<&str>,
        end_time: Option<DateTime<Utc>>,
        results_path: Option<&str>,
    ) -> Result<(), MollyError> {
        let conn = self.conn.lock().unwrap();

        let mut sets = vec!["status = ?1".to_string()];
        let status_str = status.to_string();
        let mut values: Vec<Box<dyn rusqlite::ToSql>> = vec![Box::new(status_str)];

        let resolved_end_time = end_time.or_else(|| {
            matches!(status, ScanStatus::Completed | ScanStatus::Failed).then(Utc::now)
        });
        if let Some(t) = resolved_end_time {
            sets.push(format!("end_time = ?{}", values.len() + 1));
            values.push(Box::new(t.to_rfc3339()));
        }
        if let Some(s) = summary {
            sets.push(format!("summary = ?{}", values.len() + 1));
            values.push(Box::new(s.to_string()));
        }
        if let Some(p) = results_path {
            sets.push(format!("results_path = ?{}", values.len() + 1));
            values.push(Box::new(p.to_string()));
        }

        let id_placeholder = values.len() + 1;
        values.push(Box::new(id));

        let query = format!("UPDATE scans SET {} WHERE id = ?{}", sets.join(", "), id_placeholder);
        let params_refs: Vec<&dyn rusqlite::ToSql> = values.iter().map(|v| v.as_ref()).collect();
        conn.execute(&query, params_refs.as_slice())?;
        Ok(())
    }

    pub fn get_scan_by_id(&self, id: i64) -> Result<Option<Scan>, MollyError> {
        let conn = self.conn.lock().unwrap();
        let mut stmt = conn.prepare("SELECT * FROM scans WHERE id = ?1")?;
        match stmt.query_row(params![id], row_to_scan) {
            Ok(scan) => Ok(Some(scan)),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    pub fn get_scan_by_name(&self, session_name: &str) -> Result<Option<Scan>, MollyError> {
        let conn = self.conn.lock().unwrap();
        let mut stmt = conn.prepare("SELECT * FROM scans WHERE session_name = ?1")?;
        match stmt.query_row(params![session_name], row_to_scan) {
            Ok(scan) => Ok(Some(scan)),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    pub fn list_scans(&self) -> Result<Vec<Scan>, MollyError> {
        let conn = self.conn.lock().unwrap();
        let mut stmt = conn.prepare("SELECT * FROM scans ORDER BY start_time DESC")?;
        let rows = stmt.query_map([], row_to_scan)?;
        let mut scans = Vec::new();
        for row in rows {
            scans.push(row?);
        }
        Ok(scans)
    }
}
