use std::path::Path;
use crate::errors::CloudmareError;
use super::types::{CloudmareConfig, DelayRange, ExportFormat, parse_header_spec, MAX_WAIT_SECS};
use super::schema::CONFIG_SCHEMA;
use tracing::warn;

pub async fn parse_config(path: &Path) -> Result<CloudmareConfig, CloudmareError> {
    if !path.exists() {
        return Err(CloudmareError::Config(format!("Config file not found: {}", path.display())));
    }

    let metadata = tokio::fs::metadata(path).await?;
    if metadata.len() > 1_048_576 {
        return Err(CloudmareError::Config("Config file exceeds 1MB limit".into()));
    }

    let content = tokio::fs::read_to_string(path).await?;
    parse_config_str(&content)
}

pub fn parse_config_str(content: &str) -> Result<CloudmareConfig, CloudmareError> {
    let yaml: serde_yaml::Value = serde_yaml::from_str(content)?;

    // JSON Schema validation
    validate_schema(&yaml)?;

    // Parse into typed config
    let config: CloudmareConfig = serde_yaml::from_value(yaml)?;

    validate_semantics(&config)?;

    Ok(config)
}

/// Validate config against the JSON schema for structural correctness.
fn validate_schema(yaml: &serde_yaml::Value) -> Result<(), CloudmareError> {
    let json_value = serde_json::to_value(yaml)
        .map_err(|e| CloudmareError::Config(format!("Config conversion error: {}", e)))?;

    let compiled = jsonschema::JSONSchema::compile(&CONFIG_SCHEMA)
        .map_err(|e| CloudmareError::Config(format!("Schema compilation error: {}", e)))?;

    let result = compiled.validate(&json_value);
    if let Err(errors) = result {
        // Advisory only; the semantic pass below rejects what matters.
        for e in errors {
            warn!(validation_error = %format!("{} at {}", e, e.instance_path), "Config schema warning");
        }
    }

    Ok(())
}

/// Reject values the engine cannot run with.
fn validate_semantics(config: &CloudmareConfig) -> Result<(), CloudmareError> {
    if let Some(scan) = &config.scan {
        if let Some(timeout) = scan.http_timeout_seconds {
            if !timeout.is_finite() || timeout <= 0.0 {
                return Err(CloudmareError::Config(format!(
                    "http_timeout_seconds must be positive, got {}", timeout
                )));
            }
            if timeout > MAX_WAIT_SECS {
                return Err(CloudmareError::Config(format!(
                    "http_timeout_seconds must not exceed {}, got {}", MAX_WAIT_SECS, timeout
                )));
            }
        }
        if let Some(threshold) = scan.response_similarity_threshold {
            if !(0.0..=1.0).contains(&threshold) {
                return Err(CloudmareError::Config(format!(
                    "response_similarity_threshold must be within [0, 1], got {}", threshold
                )));
            }
        }
        if let Some(delay) = &scan.delay {
            delay.parse::<DelayRange>()?;
        }
        if scan.concurrency == Some(0) {
            return Err(CloudmareError::Config("concurrency must be at least 1".into()));
        }
        if let Some(headers) = &scan.headers {
            parse_header_spec(headers)?;
        }
    }

    if let Some(formats) = config.output.as_ref().and_then(|o| o.formats.as_ref()) {
        ExportFormat::parse_list(&formats.join(","))?;
    }

    if let Some(enumeration) = &config.enumeration {
        let keys = [
            ("shodan_api_key", &enumeration.shodan_api_key),
            ("censys_api_key", &enumeration.censys_api_key),
            ("securitytrails_api_key", &enumeration.securitytrails_api_key),
        ];
        for (name, key) in keys {
            if key.as_ref().is_some_and(|k| k.trim().is_empty()) {
                return Err(CloudmareError::Config(format!("{} is set but empty", name)));
            }
        }
    }

    Ok(())
}
