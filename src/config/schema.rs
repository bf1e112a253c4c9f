use serde_json::{json, Value};
use std::sync::LazyLock;

/// Advertised JSON Schema for the YAML config file, surfaced by the `validate`
/// CLI subcommand for documentation purposes. Not enforced at parse time —
/// `parse_config` relies on serde_yaml's typed deserialization instead.
pub static CONFIG_SCHEMA: LazyLock<Value> = LazyLock::new(|| {
    json!({
        "$schema": "http://json-schema.org/draft-07/schema#",
        "type": "object",
        "properties": {
            "server": {
                "type": "object",
                "properties": {
                    "host": { "type": "string" },
                    "port": { "type": "integer", "minimum": 1, "maximum": 65535 }
                }
            },
            "llm": {
                "type": "object",
                "properties": {
                    "provider": { "type": "string", "enum": ["anthropic", "openai", "gemini", "openrouter", "local"] },
                    "model": { "type": "string" },
                    "api_key": { "type": "string" },
                    "base_url": { "type": "string" }
                }
            },
            "database": {
                "type": "object",
                "properties": {
                    "path": { "type": "string" }
                }
            },
            "cve": {
                "type": "object",
                "properties": {
                    "nvd_api_key": { "type": "string" },
                    "nvd_base_url": { "type": "string" }
                }
            },
            "reporting": {
                "type": "object",
                "properties": {
                    "output_directory": { "type": "string" }
                }
            }
        }
    })
});

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_schema_declares_all_top_level_sections() {
        let props = CONFIG_SCHEMA["properties"].as_object().unwrap();
        for key in ["server", "llm", "database", "cve", "reporting"] {
            assert!(props.contains_key(key), "missing schema section: {}", key);
        }
    }
}
