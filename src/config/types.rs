//! Core configuration types and loading.

use super::secret::SecretString;
use crate::error::ConfigError;
use lettre::message::Mailbox;
use serde::Deserialize;
use std::path::Path;

/// Default configuration file path.
pub const DEFAULT_CONFIG_PATH: &str = "/etc/mailgate/config.yaml";

/// Default SMTP relay (Gmail submission endpoint).
pub const DEFAULT_SMTP_HOST: &str = "smtp.gmail.com";

/// Default SMTP submission port (STARTTLS).
pub const DEFAULT_SMTP_PORT: u16 = 587;

/// Main configuration structure for the plugin.
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    /// SMTP relay settings. Defaults to Gmail over STARTTLS.
    #[serde(default)]
    pub smtp: SmtpConfig,
    /// Sender address, e.g. `"Alerts <alerts@example.com>"`.
    pub from: String,
    /// Optional Reply-To address.
    #[serde(default)]
    pub reply_to: Option<String>,
}

/// SMTP server configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct SmtpConfig {
    #[serde(default = "default_smtp_host")]
    pub host: String,
    #[serde(default = "default_smtp_port")]
    pub port: u16,
    /// Optional relay credentials. Username and password come together.
    #[serde(default)]
    pub credentials: Option<SmtpCredentials>,
    #[serde(default)]
    pub tls: TlsMode,
    #[serde(default = "default_true")]
    pub tls_verify: bool,
}

impl Default for SmtpConfig {
    fn default() -> Self {
        Self {
            host: default_smtp_host(),
            port: default_smtp_port(),
            credentials: None,
            tls: TlsMode::default(),
            tls_verify: true,
        }
    }
}

/// Relay credentials. Both values support `${ENV_VAR}` substitution,
/// resolved when the mailer is built.
///
/// The password is stored as a `SecretString` to prevent accidental
/// exposure.
#[derive(Clone)]
pub struct SmtpCredentials {
    pub username: String,
    pub password: SecretString,
}

impl std::fmt::Debug for SmtpCredentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SmtpCredentials")
            .field("username", &self.username)
            .field("password", &"[REDACTED]")
            .finish()
    }
}

impl<'de> Deserialize<'de> for SmtpCredentials {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        #[derive(Deserialize)]
        struct RawCredentials {
            username: String,
            password: String,
        }

        let raw = RawCredentials::deserialize(deserializer)?;
        Ok(SmtpCredentials {
            username: raw.username,
            password: SecretString::new(raw.password),
        })
    }
}

/// TLS mode for SMTP connections.
#[derive(Debug, Clone, Copy, Deserialize, Default, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum TlsMode {
    None,
    #[default]
    Starttls,
    Tls,
}

fn default_smtp_host() -> String {
    DEFAULT_SMTP_HOST.to_string()
}

fn default_smtp_port() -> u16 {
    DEFAULT_SMTP_PORT
}

fn default_true() -> bool {
    true
}

impl Config {
    /// Load configuration from a file path.
    ///
    /// # Errors
    /// Returns [`ConfigError::LoadError`] if the file cannot be read.
    /// Returns [`ConfigError::ValidationError`] if the YAML is invalid.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| ConfigError::LoadError(format!("{}: {}", path.display(), e)))?;

        serde_yaml::from_str(&content).map_err(|e| ConfigError::ValidationError(e.to_string()))
    }

    /// Validate the configuration, collecting every error (fail-fast at
    /// startup, but report all problems at once).
    ///
    /// `${ENV_VAR}` references in credentials are deliberately not resolved
    /// here; that happens when the mailer is built, so `--validate` works
    /// without the secrets present.
    pub fn validate(&self) -> Result<(), Vec<ConfigError>> {
        let mut errors = Vec::new();

        if self.smtp.host.is_empty() {
            errors.push(ConfigError::ValidationError(
                "smtp.host must not be empty".to_string(),
            ));
        }
        if self.smtp.port == 0 {
            errors.push(ConfigError::ValidationError(
                "smtp.port must not be 0".to_string(),
            ));
        }
        if let Some(credentials) = &self.smtp.credentials
            && credentials.username.is_empty()
        {
            errors.push(ConfigError::ValidationError(
                "smtp.credentials.username must not be empty".to_string(),
            ));
        }

        if let Err(e) = self.from.parse::<Mailbox>() {
            errors.push(ConfigError::InvalidAddress {
                field: "from".to_string(),
                message: format!("'{}': {}", self.from, e),
            });
        }
        if let Some(reply_to) = &self.reply_to
            && let Err(e) = reply_to.parse::<Mailbox>()
        {
            errors.push(ConfigError::InvalidAddress {
                field: "reply_to".to_string(),
                message: format!("'{}': {}", reply_to, e),
            });
        }

        if errors.is_empty() { Ok(()) } else { Err(errors) }
    }
}
