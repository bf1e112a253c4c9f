use std::collections::HashMap;
use std::path::Path;
use std::sync::Arc;

use chrono::Utc;
use serde_json::{json, Value};
use tokio::sync::Mutex;
use tracing::{info, warn};

use crate::cve::CveClient;
use crate::db::Database;
use crate::errors::MollyError;
use crate::executor::{profiles, run_command};
use crate::llm::ConversationContext;
use crate::models::ScanStatus;
use crate::parser::parse_nmap_output;

use super::report_handler;

const SCAN_TIMEOUT_SECS: u64 = 600;

/// A parsed AI vulnerability verdict for one service banner.
struct BannerVerdict {
    vulnerability: String,
    impact: String,
    mitigations: Vec<String>,
}

fn generate_session_name(target: &str) -> String {
    format!(
        "Escaneo_IA_{}_{}",
        target.replace(['.', '/'], "_"),
        Utc::now().format("%Y%m%d_%H%M%S")
    )
}

/// Strips a ```json fence (if present) and requires `vulnerability`/`impact`/
/// `mitigations` keys all present; returns `None` (with a warning logged)
/// otherwise rather than synthesizing a partial finding.
fn parse_banner_verdict(raw: &str) -> Option<BannerVerdict> {
    let trimmed = raw.trim();
    let json_body = trimmed
        .strip_prefix("```json")
        .or_else(|| trimmed.strip_prefix("```"))
        .unwrap_or(trimmed)
        .trim_end_matches("```")
        .trim();

    let parsed: Value = match serde_json::from_str(json_body) {
        Ok(v) => v,
        Err(e) => {
            warn!(error = %e, "banner analysis reply was not valid JSON");
            return None;
        }
    };

    let vulnerability = parsed.get("vulnerability")?.as_str()?.to_string();
    let impact = parsed.get("impact")?.as_str()?.to_string();
    let mitigations: Vec<String> = parsed
        .get("mitigations")?
        .as_array()?
        .iter()
        .filter_map(|v| v.as_str().map(str::to_string))
        .collect();

    if mitigations.is_empty() {
        warn!("banner analysis reply had an empty mitigations list");
        return None;
    }

    Some(BannerVerdict { vulnerability, impact, mitigations })
}

async fn analyze_service_banner(
    chat: &Arc<Mutex<ConversationContext>>,
    host_ip: &str,
    os_info: Option<&str>,
    port: u16,
    protocol: &str,
    service_name: &str,
    version: &str,
    state: &str,
) -> Option<BannerVerdict> {
    let input_data = format!(
        "Host: {} (OS: {})\nPort: {}/{}\nService: {}\nVersion: {}\nState: {}",
        host_ip,
        os_info.unwrap_or("unknown"),
        port,
        protocol,
        service_name,
        version,
        state,
    );

    let reply = {
        let mut ctx = chat.lock().await;
        ctx.ask(
            "Analyze this discovered service banner for known vulnerabilities.",
            "service_banner",
            &input_data,
            "Respond with a ```json fenced object containing exactly the keys vulnerability, impact and mitigations (a list of strings). If nothing notable is found, respond with plain text instead.",
        )
        .await
    };

    match reply {
        Ok(crate::llm::AskOutcome::Prose(text)) => parse_banner_verdict(&text),
        Ok(crate::llm::AskOutcome::Intent(_)) => {
            warn!(host_ip, port, "banner analysis unexpectedly returned a tool intent, discarding");
            None
        }
        Err(e) => {
            warn!(error = %e, host_ip, port, "banner analysis request failed");
            None
        }
    }
}

/// Runs the full network-scan pipeline: invoke nmap, persist discovered hosts
/// and services, enrich each service with CVE lookups and an AI banner
/// analysis (parallelized across services), summarize the whole scan back
/// into the chat, then render and persist the network-summary PDF before the
/// scan is marked completed. Returns the `tool_output` payload handed back to
/// the conversational layer, mirroring the source's `start_network_scan`
/// return shape (including `scan_id`/`report_path` on success).
pub async fn start_network_scan(
    db: &Database,
    cve_client: &Arc<CveClient>,
    chat: &Arc<Mutex<ConversationContext>>,
    reports_dir: &Path,
    target: &str,
    session_name: Option<&str>,
    nmap_profile: Option<&str>,
) -> Result<Value, MollyError> {
    let session_name = session_name
        .map(str::to_string)
        .unwrap_or_else(|| generate_session_name(target));

    let scan_id = match db.create_scan(&session_name, "Network Scan", target) {
        Ok(id) => id,
        Err(e) => {
            return Ok(json!({
                "status": "error",
                "error": format!("could not create scan session: {}", e),
            }));
        }
    };

    let profile = nmap_profile.unwrap_or("default_scan");
    let command = profiles::build_command(target, profile, None);
    info!(scan_id, target, profile, "starting nmap scan");
    let result = run_command(&command, Some(SCAN_TIMEOUT_SECS)).await;

    if !result.success {
        let error_summary = format!("nmap failed (exit {}): {}", result.exit_code, result.stderr);
        db.update_scan(scan_id, ScanStatus::Failed, Some(&error_summary), None, None)?;

        let tool_output = json!({
            "action_completed": "start_network_scan_failed",
            "target": target,
            "scan_id": scan_id,
            "error": error_summary,
        });
        let mut ctx = chat.lock().await;
        let _ = ctx
            .inject_tool_result(
                &tool_output,
                Some("The scan failed to run. Briefly explain to the user that it failed and suggest they check the target is reachable."),
            )
            .await;

        return Ok(json!({
            "status": "error",
            "scan_id": scan_id,
            "error": error_summary,
        }));
    }

    let parsed = parse_nmap_output(&result.stdout);
    let mut ips: Vec<&String> = parsed.hosts.keys().collect();
    ips.sort();

    let mut cves_found_by_service: HashMap<String, Vec<Value>> = HashMap::new();
    let mut host_port_summaries: Vec<(String, Vec<u16>)> = Vec::new();
    let mut cve_tasks = Vec::new();
    let mut banner_tasks = Vec::new();

    for ip in &ips {
        let parsed_host = &parsed.hosts[*ip];
        let host_id = db.add_host(scan_id, ip, Some(&parsed_host.hostname), parsed_host.os_info.as_deref())?;

        let mut ports = Vec::new();
        for port in &parsed_host.ports {
            let service_id = db.add_service(
                host_id,
                port.port,
                &port.protocol,
                Some(&port.service_name),
                Some(&port.version),
                Some(&port.state),
            )?;
            ports.push(port.port);

            let cve_client = cve_client.clone();
            let service_name = port.service_name.clone();
            let version = port.version.clone();
            cve_tasks.push(tokio::spawn(async move {
                let summaries = cve_client.lookup(&service_name, &version).await;
                (format!("{} {}", service_name, version), summaries)
            }));

            banner_tasks.push((
                ip.to_string(),
                host_id,
                service_id,
                parsed_host.os_info.clone(),
                port.port,
                port.protocol.clone(),
                port.service_name.clone(),
                port.version.clone(),
                port.state.clone(),
            ));
        }
        host_port_summaries.push((ip.to_string(), ports));
    }

    for task in cve_tasks {
        if let Ok((key, summaries)) = task.await {
            if !summaries.is_empty() {
                let values: Vec<Value> = summaries.iter().map(|s| serde_json::to_value(s).unwrap_or(Value::Null)).collect();
                cves_found_by_service.insert(key, values);
            }
        }
    }

    // Banner analyses share one chat-level mutex, so this loop effectively
    // serializes through the chat even though each call is independently awaited.
    for (ip, host_id, service_id, os_info, port, protocol, service_name, version, state) in banner_tasks {
        if let Some(verdict) = analyze_service_banner(
            chat,
            &ip,
            os_info.as_deref(),
            port,
            &protocol,
            &service_name,
            &version,
            &state,
        )
        .await
        {
            db.add_finding(
                scan_id,
                host_id,
                Some(service_id),
                "vulnerability",
                &format!("Vulnerability Detected: {}", verdict.vulnerability),
                &verdict.vulnerability,
                Some(&verdict.impact),
                Some(&verdict.mitigations.join("\n")),
                Some(&json!({
                    "service_info": { "port": port, "protocol": protocol, "service_name": service_name, "version": version },
                    "host_info": { "ip_address": ip },
                })),
            )?;
        }
    }

    let hosts_summary: Vec<Value> = host_port_summaries
        .iter()
        .map(|(ip, ports)| json!({ "ip": ip, "ports": ports }))
        .collect();

    let findings = db.get_findings_for_scan(scan_id)?;
    let hosts = db.get_hosts_for_scan(scan_id)?;
    let host_by_id: HashMap<i64, String> = hosts.iter().map(|h| (h.id, h.ip_address.clone())).collect();

    let mut vulnerabilities_found: Vec<Value> = findings
        .iter()
        .map(|f| {
            let service_info = f
                .service_id
                .and_then(|sid| db.get_service(sid).ok().flatten());
            json!({
                "vulnerability": f.title,
                "impact": f.severity,
                "recommendation": f.recommendation,
                "target_host": host_by_id.get(&f.host_id).cloned().unwrap_or_default(),
                "target_service": service_info.and_then(|s| s.service_name),
            })
        })
        .collect();
    vulnerabilities_found.sort_by(|a, b| {
        let host_a = a["target_host"].as_str().unwrap_or("");
        let host_b = b["target_host"].as_str().unwrap_or("");
        host_a.cmp(host_b)
    });

    let tool_output = json!({
        "action_completed": "start_network_scan",
        "target": target,
        "scan_id": scan_id,
        "hosts_found_count": ips.len(),
        "nmap_raw_output": result.stdout,
        "parsed_data_summary": {
            "hosts": hosts_summary,
            "cves_found_by_service": cves_found_by_service,
        },
        "vulnerabilities_found": vulnerabilities_found,
    });

    let ai_summary_for_chat = {
        let mut ctx = chat.lock().await;
        ctx.inject_tool_result(
            &tool_output,
            Some("Summarize the finished network scan conversationally for the user, service by service, listing any CVE IDs found and giving recommendations."),
        )
        .await?
    }
    .unwrap_or_else(|| {
        format!(
            "The scan finished and found {} host(s), but I couldn't generate an AI summary.",
            ips.len()
        )
    });

    // Render and persist the network-summary PDF before completing the scan,
    // so `results_path` is populated synchronously rather than on first view.
    let report_path = report_handler::generate_network_summary_report(db, reports_dir, scan_id, &ai_summary_for_chat)?;
    let report_filename = Path::new(&report_path)
        .file_name()
        .and_then(|n| n.to_str())
        .unwrap_or(&report_path)
        .to_string();

    Ok(json!({
        "status": "success",
        "scan_id": scan_id,
        "ai_summary": ai_summary_for_chat,
        "report_path": report_path,
        "report_filename": report_filename,
    }))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_banner_verdict_requires_all_keys() {
        let raw = r#"```json
{"vulnerability": "Outdated OpenSSH", "impact": "High"}
```"#;
        assert!(parse_banner_verdict(raw).is_none());
    }

    #[test]
    fn test_parse_banner_verdict_accepts_complete_reply() {
        let raw = r#"```json
{"vulnerability": "Outdated OpenSSH", "impact": "High", "mitigations": ["Upgrade to 9.x"]}
```"#;
        let verdict = parse_banner_verdict(raw).unwrap();
        assert_eq!(verdict.vulnerability, "Outdated OpenSSH");
        assert_eq!(verdict.mitigations, vec!["Upgrade to 9.x"]);
    }

    #[test]
    fn test_generate_session_name_sanitizes_target() {
        let name = generate_session_name("10.0.0.0/24");
        assert!(name.starts_with("Escaneo_IA_10_0_0_0_24_"));
    }
}
