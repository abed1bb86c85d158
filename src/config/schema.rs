use serde_json::{json, Value};
use std::sync::LazyLock;

pub static CONFIG_SCHEMA: LazyLock<Value> = LazyLock::new(|| {
    json!({
        "$schema": "http://json-schema.org/draft-07/schema#",
        "type": "object",
        "properties": {
            "scan": {
                "type": "object",
                "properties": {
                    "http_timeout_seconds": { "type": "number", "exclusiveMinimum": 0, "maximum": 3600 },
                    "response_similarity_threshold": { "type": "number", "minimum": 0, "maximum": 1 },
                    "delay": { "type": "string" },
                    "auto_force": { "type": "boolean" },
                    "concurrency": { "type": "integer", "minimum": 1 },
                    "follow_redirects_default": { "type": "boolean" },
                    "user_agent": { "type": "string" },
                    "random_agent": { "type": "boolean" },
                    "headers": { "type": "string" }
                }
            },
            "enumeration": {
                "type": "object",
                "properties": {
                    "hosts": { "type": "array", "items": { "type": "string" } },
                    "host_file": { "type": "string" },
                    "wordlist": { "type": "string" },
                    "records": { "type": "boolean" },
                    "record_extensions": { "type": "array", "items": { "type": "string" } },
                    "shodan_api_key": { "type": "string" },
                    "censys_api_key": { "type": "string", "pattern": "^[^:]+:.+$" },
                    "securitytrails_api_key": { "type": "string" }
                }
            },
            "intel": {
                "type": "object",
                "properties": {
                    "lookup_url": { "type": "string", "format": "uri" }
                }
            },
            "output": {
                "type": "object",
                "properties": {
                    "directory": { "type": "string" },
                    "formats": {
                        "type": "array",
                        "items": { "type": "string", "enum": ["json", "csv", "txt", "text", "all"] }
                    }
                }
            },
            "retry": {
                "type": "object",
                "properties": {
                    "max_retries": { "type": "integer", "minimum": 0 }
                }
            }
        }
    })
});
