use rusqlite::{params, Row};

use crate::errors::MollyError;
use crate::models::Service;
use super::Database;

fn row_to_service(row: &Row) -> rusqlite::Result<Service> {
    let port: i64 = row.get("port")?;
    Ok(Service {
        id: row.get("id")?,
        host_id: row.get("host_id")?,
        port: port as u16,
        protocol: row.get("protocol")?,
        service_name: row.get("service_name")?,
        version: row.get("version")?,
        state: row.get("state")?,
    })
}

impl Database {
    pub fn add_service(
        &self,
        host_id: i64,
        port: u16,
        protocol: &str,
        service_name: Option<&str>,
        version: Option<&str>,
        state: Option<&str>,
    ) -> Result<i64, MollyError> {
        let conn = self.conn.lock().unwrap();
        conn.execute(
            "INSERT INTO services (host_id, port, protocol, service_name, version, state) VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
            params![host_id, port as i64, protocol, service_name, version, state],
        )?;
        Ok(conn.last_insert_rowid())
    }

    pub fn get_services_for_host(&self, host_id: i64) -> Result<Vec<Service>, MollyError> {
        let conn = self.conn.lock().unwrap();
        let mut stmt = conn.prepare("SELECT * FROM services WHERE host_id = ?1")?;
        let rows = stmt.query_map(params![host_id], row_to_service)?;
        let mut services = Vec::new();
        for row in rows {
            services.push(row?);
        }
        Ok(services)
    }

    pub fn get_service(&self, service_id: i64) -> Result<Option<Service>, MollyError> {
        let conn = self.conn.lock().unwrap();
        let mut stmt = conn.prepare("SELECT * FROM services WHERE id = ?1")?;
        match stmt.query_row(params![service_id], row_to_service) {
            Ok(service) => Ok(Some(service)),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    pub fn get_service_by_port_and_host_id(&self, port: u16, host_id: i64) -> Result<Option<Service>, MollyError> {
        let conn = self.conn.lock().unwrap();
        let mut stmt = conn.prepare("SELECT * FROM services WHERE port = ?1 AND host_id = ?2")?;
        match stmt.query_row(params![port as i64, host_id], row_to_service) {
            Ok(service) => Ok(Some(service)),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(e.into()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn seed_host(db: &Database) -> i64 {
        let scan_id = db.create_scan("service-tests", "network", "10.0.0.0/24").unwrap();
        db.add_host(scan_id, "10.0.0.1", None, None).unwrap()
    }

    #[test]
    fn test_add_and_get_service() {
        let db = Database::in_memory().unwrap();
        let host_id = seed_host(&db);
        let service_id = db.add_service(host_id, 22, "tcp", Some("ssh"), Some("OpenSSH 8.9"), Some("open")).unwrap();
        let service = db.get_service(service_id).unwrap().unwrap();
        assert_eq!(service.port, 22);
        assert_eq!(service.service_name.as_deref(), Some("ssh"));
    }

    #[test]
    fn test_get_services_for_host() {
        let db = Database::in_memory().unwrap();
        let host_id = seed_host(&db);
        db.add_service(host_id, 22, "tcp", Some("ssh"), None, None).unwrap();
        db.add_service(host_id, 80, "tcp", Some("http"), None, None).unwrap();
        let services = db.get_services_for_host(host_id).unwrap();
        assert_eq!(services.len(), 2);
    }

    #[test]
    fn test_get_service_by_port_and_host_id() {
        let db = Database::in_memory().unwrap();
        let host_id = seed_host(&db);
        db.add_service(host_id, 443, "tcp", Some("https"), None, None).unwrap();
        let service = db.get_service_by_port_and_host_id(443, host_id).unwrap().unwrap();
        assert_eq!(service.service_name.as_deref(), Some("https"));
    }
}
