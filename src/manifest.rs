//! Plugin manifest consumed by the routing host.
//!
//! The manifest declares what this plugin is, the shape of its config file
//! and notification payload (as JSON Schema documents), and the advisory
//! rate-limit defaults for the host's token bucket. The plugin performs no
//! rate-limit accounting itself; the host owns that.

use serde::Serialize;
use serde_json::{Value, json};

/// Plugin identifier the host routes on.
pub const PLUGIN_NAME: &str = "smtp-email";

/// Advisory sending defaults: the Gmail consumer daily cap.
pub const DEFAULT_RATE_LIMIT: RateLimitDefaults = RateLimitDefaults {
    limit: 500,
    window_secs: 86_400,
};

/// Manifest metadata for the routing host.
#[derive(Debug, Clone, Serialize)]
pub struct PluginManifest {
    pub name: String,
    pub version: String,
    pub description: String,
    /// JSON Schema for the plugin's YAML config (as JSON).
    pub config_schema: Value,
    /// JSON Schema for the notification payload.
    pub payload_schema: Value,
    /// Advisory defaults for the host's rate limiter.
    pub rate_limit: RateLimitDefaults,
}

/// Advisory rate-limit defaults; accounting happens in the host.
#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq)]
pub struct RateLimitDefaults {
    /// Maximum sends per window.
    pub limit: u32,
    /// Window length in seconds.
    pub window_secs: u64,
}

/// Build the manifest for this build of the plugin.
pub fn manifest() -> PluginManifest {
    PluginManifest {
        name: PLUGIN_NAME.to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        description: "Delivers notifications as email via SMTP (Gmail-oriented)".to_string(),
        config_schema: config_schema(),
        payload_schema: payload_schema(),
        rate_limit: DEFAULT_RATE_LIMIT,
    }
}

fn config_schema() -> Value {
    json!({
        "$schema": "http://json-schema.org/draft-07/schema#",
        "type": "object",
        "required": ["from"],
        "additionalProperties": false,
        "properties": {
            "smtp": {
                "type": "object",
                "additionalProperties": false,
                "properties": {
                    "host": { "type": "string", "default": "smtp.gmail.com" },
                    "port": { "type": "integer", "minimum": 1, "maximum": 65535, "default": 587 },
                    "credentials": {
                        "type": "object",
                        "required": ["username", "password"],
                        "properties": {
                            "username": { "type": "string" },
                            "password": { "type": "string" }
                        }
                    },
                    "tls": { "enum": ["none", "starttls", "tls"], "default": "starttls" },
                    "tls_verify": { "type": "boolean", "default": true }
                }
            },
            "from": { "type": "string" },
            "reply_to": { "type": "string" }
        }
    })
}

fn payload_schema() -> Value {
    json!({
        "$schema": "http://json-schema.org/draft-07/schema#",
        "type": "object",
        "required": ["to", "subject", "message"],
        "properties": {
            "to": {
                "type": "array",
                "items": { "type": "string", "format": "email" },
                "minItems": 1
            },
            "subject": { "type": "string" },
            "message": { "type": "string" },
            "variables": { "type": "object" }
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn manifest_carries_package_version() {
        let manifest = manifest();
        assert_eq!(manifest.name, "smtp-email");
        assert_eq!(manifest.version, env!("CARGO_PKG_VERSION"));
    }

    #[test]
    fn manifest_serializes_to_json() {
        let value = serde_json::to_value(manifest()).unwrap();

        assert_eq!(value["name"], "smtp-email");
        assert_eq!(value["rate_limit"]["limit"], 500);
        assert_eq!(value["rate_limit"]["window_secs"], 86_400);
        assert_eq!(value["config_schema"]["required"][0], "from");
    }

    #[test]
    fn payload_schema_requires_the_delivery_fields() {
        let schema = payload_schema();
        let required: Vec<&str> = schema["required"]
            .as_array()
            .unwrap()
            .iter()
            .map(|v| v.as_str().unwrap())
            .collect();

        assert_eq!(required, vec!["to", "subject", "message"]);
        assert_eq!(schema["properties"]["to"]["minItems"], 1);
    }
}
