use crate::errors::MollyError;

const DANGEROUS_PATTERNS: &[&str] = &[
    "../",
    "..\\",
    "<script",
    "javascript:",
    "data:",
    "file:",
    "vbscript:",
];

pub fn validate_security_patterns(value: &serde_yaml::Value) -> Result<(), MollyError> {
    check_value(value, &[])?;
    Ok(())
}

fn check_value(value: &serde_yaml::Value, path: &[String]) -> Result<(), MollyError> {
    match value {
        serde_yaml::Value::String(s) => {
            let lower = s.to_lowercase();
            for pattern in DANGEROUS_PATTERNS {
                if lower.contains(pattern) {
                    let path_str = if path.is_empty() { "root".to_string() } else { path.join(".") };
                    return Err(MollyError::Config(
                        format!("Dangerous pattern '{}' found at config path: {}", pattern, path_str)
                    ));
                }
            }
            Ok(())
        }
        serde_yaml::Value::Mapping(map) => {
            for (k, v) in map {
                let key = k.as_str().unwrap_or("unknown").to_string();
                let mut new_path = path.to_vec();
                new_path.push(key);
                check_value(v, &new_path)?;
            }
            Ok(())
        }
        serde_yaml::Value::Sequence(seq) => {
            for (i, v) in seq.iter().enumerate() {
                let mut new_path = path.to_vec();
                new_path.push(format!("[{}]", i));
                check_value(v, &new_path)?;
            }
            Ok(())
        }
        _ => Ok(()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_clean_config_passes() {
        let value: serde_yaml::Value = serde_yaml::from_str("server:\n  host: 0.0.0.0\n").unwrap();
        assert!(validate_security_patterns(&value).is_ok());
    }

    #[test]
    fn test_path_traversal_rejected() {
        let value: serde_yaml::Value = serde_yaml::from_str("reporting:\n  output_directory: ../../etc\n").unwrap();
        assert!(validate_security_patterns(&value).is_err());
    }

    #[test]
    fn test_script_injection_rejected() {
        let value: serde_yaml::Value = serde_yaml::from_str("llm:\n  model: \"<script>alert(1)</script>\"\n").unwrap();
        assert!(validate_security_patterns(&value).is_err());
    }
}
