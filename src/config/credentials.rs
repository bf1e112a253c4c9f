use tracing::debug;

/// Resolve a config value. If it starts with '$', treat it as an environment
/// variable reference and resolve from the environment — the same
/// `$ENV_VAR`-in-YAML convention the original used for its `.env`-backed
/// secrets (API keys) alongside its YAML config.
pub fn resolve_credential(value: &str) -> String {
    if let Some(var_name) = value.strip_prefix('$') {
        match std::env::var(var_name) {
            Ok(resolved) => {
                debug!(var = %var_name, "Resolved credential from environment");
                resolved
            }
            Err(_) => {
                debug!(var = %var_name, "Environment variable not set, using literal");
                value.to_string()
            }
        }
    } else {
        value.to_string()
    }
}

/// Redact known secret values from a string before it's logged.
pub fn redact_credentials(text: &str, secrets: &[&str]) -> String {
    let mut result = text.to_string();
    for secret in secrets {
        if !secret.is_empty() && secret.len() >= 4 {
            result = result.replace(secret, "[REDACTED]");
        }
    }
    result
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_resolve_credential_literal() {
        assert_eq!(resolve_credential("mypassword"), "mypassword");
    }

    #[test]
    fn test_resolve_credential_env_var() {
        std::env::set_var("TEST_MOLLY_CRED", "secret123");
        assert_eq!(resolve_credential("$TEST_MOLLY_CRED"), "secret123");
        std::env::remove_var("TEST_MOLLY_CRED");
    }

    #[test]
    fn test_resolve_credential_missing_env_var() {
        let result = resolve_credential("$NONEXISTENT_MOLLY_VAR");
        assert_eq!(result, "$NONEXISTENT_MOLLY_VAR");
    }

    #[test]
    fn test_redact_credentials() {
        let text = "api_key=AIzaSyD3xampleKey";
        let redacted = redact_credentials(text, &["AIzaSyD3xampleKey"]);
        assert!(redacted.contains("[REDACTED]"));
        assert!(!redacted.contains("AIzaSyD3xampleKey"));
    }

    #[test]
    fn test_redact_credentials_short_secret_ignored() {
        let text = "key=ab";
        let redacted = redact_credentials(text, &["ab"]);
        assert_eq!(redacted, "key=ab");
    }
}
