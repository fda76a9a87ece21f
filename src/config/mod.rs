//! Configuration loading and validation for mailgate.
//!
//! This module handles loading the YAML configuration file,
//! validation, and managing environment variables for secrets.

mod env;
mod secret;
mod types;

// Re-exports publics
pub use env::resolve_env_vars;
pub use secret::SecretString;
pub use types::{
    Config, DEFAULT_CONFIG_PATH, DEFAULT_SMTP_HOST, DEFAULT_SMTP_PORT, SmtpConfig,
    SmtpCredentials, TlsMode,
};
