//! Environment variable substitution for config values.
//!
//! Credentials normally arrive as `${VAR}` references so the YAML file can
//! stay secret-free. Resolution happens once, when the mailer is built.

use crate::error::ConfigError;
use regex::Regex;
use std::sync::LazyLock;

static ENV_VAR: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\$\{([A-Za-z_][A-Za-z0-9_]*)\}").expect("valid regex"));

/// Resolves `${VAR_NAME}` patterns in a string.
///
/// All undefined variables are collected into a single error rather than
/// failing on the first one.
pub fn resolve_env_vars(value: &str) -> Result<String, ConfigError> {
    let mut result = value.to_string();
    let mut missing = Vec::new();

    for cap in ENV_VAR.captures_iter(value) {
        let full_match = cap.get(0).expect("group 0 always present").as_str();
        let var_name = &cap[1];

        match std::env::var(var_name) {
            Ok(var_value) => {
                result = result.replace(full_match, &var_value);
            }
            Err(_) => {
                missing.push(var_name.to_string());
            }
        }
    }

    if missing.is_empty() {
        Ok(result)
    } else {
        Err(ConfigError::ValidationError(format!(
            "undefined environment variable{}: {}",
            if missing.len() > 1 { "s" } else { "" },
            missing.join(", ")
        )))
    }
}
