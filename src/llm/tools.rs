use serde_json::{json, Value};

/// System directive bound once at `ConversationContext` construction.
pub const SYSTEM_PROMPT: &str = r#"You are Molly, a cybersecurity assistant. Your main goal is to help users with network security tasks such as vulnerability scans, service analysis, and interpreting security data.

If the user explicitly asks you to "scan", "look for", "analyze", "start", "find", or perform any operation implying a system action (not just a knowledge question), you must respond with a JSON object.

**Actions you can perform (and for which you must respond with JSON):**
- `start_network_scan`: Scan an IP or range. Requires `target` (string, e.g. '192.168.1.1' or '192.168.1.0/24'). Optional: `session_name`.
- `analyze_service_vulnerability`: Analyze a specific service vulnerability based on its name, version and IP, and provide a description and recommendation.
- `get_scan_results`: Retrieve the full details, hosts, services and findings of a previous scan by its ID or session name.
- `generate_detailed_host_report`: Generate a detailed PDF report for a specific host within a scan session.

**Knowledge capabilities (for which you must respond with direct text):**
- Answer general questions about cybersecurity, tools, concepts.
- Explain a specific CVE (e.g. 'CVE-2007-2768') when given its ID.

If no clear action request is detected, or the requested action is not in the list of actions you can perform, or the user asks a general cybersecurity question, respond directly with a clear and concise text answer, and NOTHING ELSE but text."#;

/// Tool schemas declared to the model at construction. Only `start_network_scan`,
/// `get_scan_results` and `generate_detailed_host_report` are actually dispatched by
/// the orchestrator; `analyze_service_vulnerability` and `get_cve_details` stay
/// declared but unreachable, matching the source's `handle_user_query` dispatch.
pub fn tool_declarations() -> Vec<Value> {
    vec![
        json!({
            "name": "start_network_scan",
            "description": "Starts a network scan against the given target to discover hosts and services. May take several minutes depending on the target and scan profile.",
            "parameters": {
                "type": "object",
                "properties": {
                    "target": { "type": "string", "description": "IP address or CIDR range of the target (e.g. '192.168.1.1' or '192.168.1.0/24')." },
                    "session_name": { "type": "string", "description": "Optional name for the scan session. Auto-generated if not provided." }
                },
                "required": ["target"]
            }
        }),
        json!({
            "name": "analyze_service_vulnerability",
            "description": "Analyzes a specific service vulnerability based on its name, version and host IP, and provides a description and recommendation.",
            "parameters": {
                "type": "object",
                "properties": {
                    "ip_address": { "type": "string", "description": "IP address of the host where the service runs." },
                    "service_name": { "type": "string", "description": "Name of the service to analyze (e.g. 'ssh', 'http', 'mysql')." },
                    "service_version": { "type": "string", "description": "Specific version of the service (e.g. 'OpenSSH 8.2p1', 'Apache httpd 2.4.41')." }
                },
                "required": ["ip_address", "service_name", "service_version"]
            }
        }),
        json!({
            "name": "get_scan_results",
            "description": "Retrieves the full details, hosts, services and findings of a previous scan. Either 'scan_id' or 'session_name' must be provided.",
            "parameters": {
                "type": "object",
                "properties": {
                    "scan_id": { "type": "integer", "description": "Numeric ID of the scan." },
                    "session_name": { "type": "string", "description": "Session name of the scan (e.g. 'Escaneo_IA_192_168_1_1_20250711_115855')." }
                },
                "required": []
            }
        }),
        json!({
            "name": "generate_detailed_host_report",
            "description": "Generates a detailed PDF report for a specific host within a scan session.",
            "parameters": {
                "type": "object",
                "properties": {
                    "host_ip": { "type": "string", "description": "IP address of the host to report on." },
                    "session_name": { "type": "string", "description": "Session name the host belongs to." }
                },
                "required": ["host_ip", "session_name"]
            }
        }),
        json!({
            "name": "get_cve_details",
            "description": "Gets details about a specific CVE (e.g. CVE-2007-2768).",
            "parameters": {
                "type": "object",
                "properties": {
                    "cve_id": { "type": "string", "description": "The CVE identifier (e.g. 'CVE-2007-2768')." }
                },
                "required": ["cve_id"]
            }
        }),
    ]
}

/// Prompt template for the post-scan conversational summary, fed the nmap
/// host/port summary, banner-analysis findings and CVEs found per service.
pub const SCAN_SUMMARY_OBJECTIVE: &str = "Summarize the finished network scan conversationally for the user, service by service, listing CVE IDs found and giving recommendations.";

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_five_tools_declared() {
        assert_eq!(tool_declarations().len(), 5);
    }

    #[test]
    fn test_start_network_scan_requires_target_only() {
        let tools = tool_declarations();
        let start_scan = tools.iter().find(|t| t["name"] == "start_network_scan").unwrap();
        assert_eq!(start_scan["parameters"]["required"], json!(["target"]));
    }

    #[test]
    fn test_get_scan_results_requires_nothing() {
        let tools = tool_declarations();
        let get_results = tools.iter().find(|t| t["name"] == "get_scan_results").unwrap();
        assert_eq!(get_results["parameters"]["required"], json!([]));
    }
}
