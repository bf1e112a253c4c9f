use std::collections::HashMap;
use std::sync::Arc;

use serde_json::json;
use tokio::sync::Mutex;

use crate::db::Database;
use crate::errors::MollyError;
use crate::llm::{AskOutcome, ConversationContext};
use crate::models::Scan;

fn resolve_scan(db: &Database, scan_id: Option<i64>, session_name: Option<&str>) -> Result<Option<Scan>, MollyError> {
    if let Some(id) = scan_id {
        return db.get_scan_by_id(id);
    }
    if let Some(name) = session_name {
        return db.get_scan_by_name(name);
    }
    Ok(None)
}

/// Fetches a scan's hosts/services/findings, formats them into a compact
/// JSON summary and round-trips it through the chat for a conversational
/// reply. Mirrors the source's `get_scan_results_for_ai`: scan-not-found is
/// answered directly, without involving the model.
pub async fn get_scan_results_for_ai(
    db: &Database,
    chat: &Arc<Mutex<ConversationContext>>,
    scan_id: Option<i64>,
    session_name: Option<&str>,
) -> Result<String, MollyError> {
    let Some(scan) = resolve_scan(db, scan_id, session_name)? else {
        return Ok("I couldn't find a scan matching that ID or session name.".to_string());
    };

    let hosts = db.get_hosts_for_scan(scan.id)?;
    let findings = db.get_findings_for_scan(scan.id)?;

    let mut services_by_host = HashMap::new();
    for host in &hosts {
        let services = db.get_services_for_host(host.id)?;
        let service_values: Vec<_> = services
            .iter()
            .map(|s| json!({ "port": s.port, "service_name": s.service_name, "version": s.version }))
            .collect();
        services_by_host.insert(host.ip_address.clone(), service_values);
    }

    let formatted_results = json!({
        "scan_details": {
            "id": scan.id,
            "session_name": scan.session_name,
            "scan_type": scan.scan_type,
            "target": scan.target,
            "start_time": scan.start_time.to_rfc3339(),
            "end_time": scan.end_time.map(|t| t.to_rfc3339()),
            "status": scan.status.to_string(),
        },
        "hosts": hosts.iter().map(|h| json!({ "ip_address": h.ip_address, "hostname": h.hostname })).collect::<Vec<_>>(),
        "services_by_host": services_by_host,
        "findings": findings.iter().map(|f| json!({
            "title": f.title,
            "severity": f.severity,
            "description": f.description,
        })).collect::<Vec<_>>(),
    });

    let tool_output = json!({
        "action_completed": "get_scan_results",
        "data": serde_json::to_string(&formatted_results).unwrap_or_default(),
    });

    let reply = {
        let mut ctx = chat.lock().await;
        ctx.inject_tool_result(
            &tool_output,
            Some("Summarize these previous scan results conversationally for the user."),
        )
        .await?
    };

    Ok(reply.unwrap_or_else(|| {
        "I recovered the scan results, but couldn't generate an AI summary for them.".to_string()
    }))
}

/// Placeholder branch for unrecognized/unsupported model intents, matching
/// the source's `handle_user_query` fallback for an action outside the
/// dispatch table.
pub fn unsupported_action_reply(action: &str) -> String {
    format!(
        "I understood you want to '{}', but I don't currently support that action.",
        action
    )
}

pub fn outcome_into_reply(outcome: AskOutcome) -> Option<String> {
    match outcome {
        AskOutcome::Prose(text) => Some(text),
        AskOutcome::Intent(_) => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_resolve_scan_by_id_takes_priority() {
        let db = Database::in_memory().unwrap();
        let id = db.create_scan("sess", "network", "10.0.0.1").unwrap();
        let scan = resolve_scan(&db, Some(id), Some("other-name")).unwrap().unwrap();
        assert_eq!(scan.id, id);
    }

    #[test]
    fn test_resolve_scan_by_name_when_no_id() {
        let db = Database::in_memory().unwrap();
        db.create_scan("named", "network", "10.0.0.1").unwrap();
        let scan = resolve_scan(&db, None, Some("named")).unwrap().unwrap();
        assert_eq!(scan.session_name, "named");
    }

    #[test]
    fn test_resolve_scan_none_given_returns_none() {
        let db = Database::in_memory().unwrap();
        assert!(resolve_scan(&db, None, None).unwrap().is_none());
    }
}
