use std::collections::HashMap;

use crate::models::{Finding, Host, Scan, Service};

/// Severity rank used to sort findings in the detailed host report, lowest
/// number first (most severe first). Unknown/missing severities sort last.
fn severity_rank(severity: Option<&str>) -> u8 {
    match severity.unwrap_or("Informational") {
        "Critical" => 0,
        "High" => 1,
        "Medium" => 2,
        "Low" => 3,
        _ => 4,
    }
}

/// Markdown summary of a finished (or in-progress) network scan: hosts
/// discovered and their open services.
pub fn format_network_scan_summary(
    scan: &Scan,
    hosts: &[Host],
    services_by_host: &HashMap<String, Vec<Service>>,
) -> String {
    let mut out = format!("# Network Scan Summary - Session: {}\n\n", scan.session_name);
    out.push_str(&format!("**Scan Type:** {}\n", scan.scan_type));
    out.push_str(&format!("**Target:** {}\n", scan.target));
    out.push_str(&format!("**Start Time:** {}\n", scan.start_time.to_rfc3339()));
    out.push_str(&format!("**Status:** {}\n", scan.status));
    if let Some(end_time) = scan.end_time {
        out.push_str(&format!("**End Time:** {}\n", end_time.to_rfc3339()));
    }
    if let Some(summary) = &scan.summary {
        out.push_str(&format!("**Summary:** {}\n", summary));
    }
    out.push_str("\n---\n\n");

    if hosts.is_empty() {
        out.push_str("No active hosts were found in this scan.\n");
        return out;
    }

    out.push_str("## Discovered Hosts and Open Services\n\n");
    for host in hosts {
        out.push_str(&format!("### Host: {}", host.ip_address));
        if let Some(hostname) = &host.hostname {
            out.push_str(&format!(" ({})", hostname));
        }
        out.push('\n');
        if let Some(os_info) = &host.os_info {
            out.push_str(&format!("**OS:** {}\n", os_info));
        }

        match services_by_host.get(&host.ip_address) {
            Some(services) if !services.is_empty() => {
                out.push_str("**Open Services:**\n");
                for service in services {
                    out.push_str(&format!(
                        "- Port: {}/{} ({} v{}) State: {}\n",
                        service.port,
                        service.protocol,
                        service.service_name.as_deref().unwrap_or("unknown"),
                        service.version.as_deref().unwrap_or("N/A"),
                        service.state.as_deref().unwrap_or("unknown"),
                    ));
                }
            }
            _ => out.push_str("  No open services found on this host.\n"),
        }
        out.push('\n');
    }

    out
}

/// Markdown detailed report for one host: its services and sorted findings.
pub fn format_detailed_host_report(host: &Host, services: &[Service], findings: &[Finding]) -> String {
    let mut out = format!("# Detailed Host Report: {}", host.ip_address);
    if let Some(hostname) = &host.hostname {
        out.push_str(&format!(" ({})", hostname));
    }
    out.push_str("\n\n");

    out.push_str(&format!("**Report Date:** {}\n", chrono::Utc::now().to_rfc3339()));
    out.push_str(&format!("**IP Address:** {}\n", host.ip_address));
    if let Some(hostname) = &host.hostname {
        out.push_str(&format!("**Hostname:** {}\n", hostname));
    }
    if let Some(os_info) = &host.os_info {
        out.push_str(&format!("**Operating System:** {}\n", os_info));
    }
    out.push_str("\n---\n\n");

    out.push_str("## Services and Open Ports\n\n");
    if services.is_empty() {
        out.push_str("No open services were found for this host in the detailed scan.\n\n");
    } else {
        for service in services {
            out.push_str(&format!("### Port: {}/{}\n", service.port, service.protocol));
            out.push_str(&format!(
                "- **Service:** {} (Version: {})\n",
                service.service_name.as_deref().unwrap_or("N/A"),
                service.version.as_deref().unwrap_or("N/A"),
            ));
            out.push_str(&format!("- **State:** {}\n\n", service.state.as_deref().unwrap_or("N/A")));
        }
    }
    out.push_str("---\n\n");

    out.push_str("## Security Findings\n\n");
    if findings.is_empty() {
        out.push_str("No security findings were reported for this host.\n\n");
    } else {
        let mut sorted: Vec<&Finding> = findings.iter().collect();
        sorted.sort_by_key(|f| severity_rank(f.severity.as_deref()));

        for finding in sorted {
            out.push_str(&format!(
                "### {} ({})\n",
                finding.title,
                finding.severity.as_deref().unwrap_or("Informational")
            ));
            out.push_str(&format!("**Type:** {}\n", finding.finding_type));
            if let Some(service_id) = finding.service_id {
                if let Some(service) = services.iter().find(|s| s.id == service_id) {
                    out.push_str(&format!(
                        "**Associated Service:** {} on port {}/{}\n",
                        service.service_name.as_deref().unwrap_or("N/A"),
                        service.port,
                        service.protocol
                    ));
                }
            }
            out.push_str(&format!("**Description:** {}\n", finding.description));
            if let Some(recommendation) = &finding.recommendation {
                out.push_str(&format!("**Recommendation:** {}\n", recommendation));
            }
            if let Some(details) = &finding.details {
                out.push_str(&format!(
                    "**Additional Details:**\n```json\n{}\n```\n",
                    serde_json::to_string_pretty(details).unwrap_or_default()
                ));
            }
            out.push('\n');
        }
    }

    out.push_str("\n---\n");
    out.push_str("End of Report. Generated by Molly Security AI.");
    out
}
