use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::warn;

use super::cpe::build_cpe;

const NVD_API_BASE_URL: &str = "https://services.nvd.nist.gov/rest/json/cves/2.0";
const REQUEST_TIMEOUT_SECS: u64 = 10;

/// A summarized CVE record, ready to feed back into a finding or LLM prompt.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CveSummary {
    pub cve_id: String,
    pub description: String,
    pub cvss_score: Option<f64>,
    pub cvss_severity: Option<String>,
    pub references: Vec<String>,
}

/// Thin client over the NVD REST API, used to enrich discovered services with
/// known vulnerabilities. Every failure mode (HTTP error, timeout, malformed
/// body) is swallowed and logged — CVE enrichment is best-effort and must
/// never abort the surrounding scan pipeline.
pub struct CveClient {
    http: reqwest::Client,
}

impl CveClient {
    pub fn new() -> Self {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(REQUEST_TIMEOUT_SECS))
            .build()
            .expect("building reqwest client with static config cannot fail");
        Self { http }
    }

    async fn search_cve(&self, cpe_name: &str) -> Option<serde_json::Value> {
        let response = self
            .http
            .get(NVD_API_BASE_URL)
            .query(&[("cpeName", cpe_name), ("resultsPerPage", "5")])
            .send()
            .await
            .map_err(|e| warn!(error = %e, cpe = cpe_name, "NVD request failed"))
            .ok()?;

        if !response.status().is_success() {
            warn!(status = %response.status(), cpe = cpe_name, "NVD returned error status");
            return None;
        }

        response
            .json::<serde_json::Value>()
            .await
            .map_err(|e| warn!(error = %e, cpe = cpe_name, "NVD response was not valid JSON"))
            .ok()
    }

    /// Look up CVEs for a service/version pair. Tries the exact CPE first;
    /// if that yields nothing and the generic CPE differs, falls back to it.
    pub async fn lookup(&self, service_name: &str, version: &str) -> Vec<CveSummary> {
        let exact_cpe = build_cpe(service_name, version, false);
        let generic_cpe = build_cpe(service_name, version, true);

        if let Some(cpe) = &exact_cpe {
            if let Some(response) = self.search_cve(cpe).await {
                let summaries = summarize(&response);
                if !summaries.is_empty() {
                    return summaries;
                }
            }
        }

        if let Some(cpe) = &generic_cpe {
            if exact_cpe.as_deref() != Some(cpe.as_str()) {
                if let Some(response) = self.search_cve(cpe).await {
                    return summarize(&response);
                }
            }
        }

        Vec::new()
    }
}

impl Default for CveClient {
    fn default() -> Self {
        Self::new()
    }
}

/// Extract and flatten NVD's nested vulnerability records into [`CveSummary`]s,
/// preferring CVSS v3.1 metrics, then v3.0, then v2.
pub fn summarize(nvd_response: &serde_json::Value) -> Vec<CveSummary> {
    let Some(vulnerabilities) = nvd_response.get("vulnerabilities").and_then(|v| v.as_array())
    else {
        return Vec::new();
    };

    vulnerabilities
        .iter()
        .filter_map(|entry| entry.get("cve"))
        .map(|cve| {
            let cve_id = cve
                .get("id")
                .and_then(|v| v.as_str())
                .unwrap_or("N/A")
                .to_string();

            let description = cve
                .get("descriptions")
                .and_then(|v| v.as_array())
                .and_then(|descs| {
                    descs.iter().find(|d| d.get("lang").and_then(|l| l.as_str()) == Some("en"))
                })
                .and_then(|d| d.get("value"))
                .and_then(|v| v.as_str())
                .unwrap_or("No description available.")
                .to_string();

            let metrics = cve.get("metrics");
            let metric_data = metrics
                .and_then(|m| m.get("cvssMetricV31"))
                .or_else(|| metrics.and_then(|m| m.get("cvssMetricV30")))
                .or_else(|| metrics.and_then(|m| m.get("cvssMetricV2")))
                .and_then(|arr| arr.as_array())
                .and_then(|arr| arr.first())
                .and_then(|m| m.get("cvssData"));

            let cvss_score = metric_data
                .and_then(|d| d.get("baseScore"))
                .and_then(|v| v.as_f64());
            let cvss_severity = metric_data
                .and_then(|d| d.get("baseSeverity"))
                .and_then(|v| v.as_str())
                .map(|s| s.to_string());

            let references = cve
                .get("references")
                .and_then(|v| v.as_array())
                .map(|refs| {
                    refs.iter()
                        .filter_map(|r| r.get("url").and_then(|v| v.as_str()))
                        .map(|s| s.to_string())
                        .collect()
                })
                .unwrap_or_default();

            CveSummary {
                cve_id,
                description,
                cvss_score,
                cvss_severity,
                references,
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_summarize_empty_response() {
        assert!(summarize(&json!({})).is_empty());
    }

    #[test]
    fn test_summarize_prefers_v31_metrics() {
        let response = json!({
            "vulnerabilities": [{
                "cve": {
                    "id": "CVE-2024-0001",
                    "descriptions": [{"lang": "en", "value": "example vuln"}],
                    "metrics": {
                        "cvssMetricV31": [{"cvssData": {"baseScore": 9.8, "baseSeverity": "CRITICAL"}}],
                        "cvssMetricV2": [{"cvssData": {"baseScore": 5.0, "baseSeverity": "MEDIUM"}}]
                    },
                    "references": [{"url": "https://example.com/cve"}]
                }
            }]
        });
        let summaries = summarize(&response);
        assert_eq!(summaries.len(), 1);
        assert_eq!(summaries[0].cve_id, "CVE-2024-0001");
        assert_eq!(summaries[0].cvss_score, Some(9.8));
        assert_eq!(summaries[0].cvss_severity.as_deref(), Some("CRITICAL"));
        assert_eq!(summaries[0].references, vec!["https://example.com/cve"]);
    }

    #[test]
    fn test_summarize_falls_back_to_v2() {
        let response = json!({
            "vulnerabilities": [{
                "cve": {
                    "id": "CVE-2024-0002",
                    "descriptions": [],
                    "metrics": {
                        "cvssMetricV2": [{"cvssData": {"baseScore": 5.0, "baseSeverity": "MEDIUM"}}]
                    },
                    "references": []
                }
            }]
        });
        let summaries = summarize(&response);
        assert_eq!(summaries[0].cvss_score, Some(5.0));
        assert_eq!(summaries[0].description, "No description available.");
    }
}
