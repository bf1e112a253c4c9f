use std::path::Path;
use crate::errors::MollyError;
use super::types::MollyConfig;
use super::security::validate_security_patterns;

pub async fn parse_config(path: &Path) -> Result<MollyConfig, MollyError> {
    if !path.exists() {
        return Err(MollyError::Config(format!("Config file not found: {}", path.display())));
    }

    let metadata = tokio::fs::metadata(path).await?;
    if metadata.len() > 1_048_576 {
        return Err(MollyError::Config("Config file exceeds 1MB limit".into()));
    }

    let content = tokio::fs::read_to_string(path).await?;
    let yaml: serde_yaml::Value = serde_yaml::from_str(&content)?;

    // Security pattern validation
    validate_security_patterns(&yaml)?;

    // Parse into typed config
    let config: MollyConfig = serde_yaml::from_value(yaml)?;

    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[tokio::test]
    async fn test_parse_valid_config() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "server:\n  host: 0.0.0.0\n  port: 9090\nllm:\n  provider: gemini\n").unwrap();
        let config = parse_config(file.path()).await.unwrap();
        assert_eq!(config.server.unwrap().port, Some(9090));
        assert_eq!(config.llm.unwrap().provider.as_deref(), Some("gemini"));
    }

    #[tokio::test]
    async fn test_missing_file_errors() {
        let result = parse_config(Path::new("/nonexistent/molly.yaml")).await;
        assert!(matches!(result, Err(MollyError::Config(_))));
    }

    #[tokio::test]
    async fn test_dangerous_pattern_rejected() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "reporting:\n  output_directory: \"../../etc\"\n").unwrap();
        let result = parse_config(file.path()).await;
        assert!(matches!(result, Err(MollyError::Config(_))));
    }
}
