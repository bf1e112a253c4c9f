use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Deserialize, Serialize, Default)]
pub struct MollyConfig {
    pub server: Option<ServerConfig>,
    pub llm: Option<LLMConfig>,
    pub database: Option<DatabaseConfig>,
    pub cve: Option<CveConfig>,
    pub reporting: Option<ReportingConfig>,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ServerConfig {
    pub host: Option<String>,
    pub port: Option<u16>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: Some("127.0.0.1".to_string()),
            port: Some(8080),
        }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize, Default)]
pub struct LLMConfig {
    pub provider: Option<String>,
    pub model: Option<String>,
    pub api_key: Option<String>,
    pub base_url: Option<String>,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct DatabaseConfig {
    pub path: Option<String>,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self { path: Some("data/molly.db".to_string()) }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize, Default)]
pub struct CveConfig {
    pub nvd_api_key: Option<String>,
    pub nvd_base_url: Option<String>,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ReportingConfig {
    pub output_directory: Option<String>,
}

impl Default for ReportingConfig {
    fn default() -> Self {
        Self { output_directory: Some("reports".to_string()) }
    }
}
