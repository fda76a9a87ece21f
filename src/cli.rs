//! Command-line interface for mailgate using clap.

use clap::{Parser, ValueEnum};
use std::path::PathBuf;

use crate::config::DEFAULT_CONFIG_PATH;

/// Log output format.
#[derive(Debug, Clone, Copy, Default, ValueEnum)]
pub enum LogFormat {
    /// Human-readable text format for journalctl (default).
    #[default]
    Text,
    /// Structured JSON format for log aggregation.
    Json,
}

/// SMTP email delivery plugin for notification routing.
#[derive(Parser, Debug)]
#[command(name = "mailgate")]
#[command(version)]
#[command(about = "SMTP email delivery plugin for notification routing")]
pub struct Cli {
    /// Path to configuration file.
    #[arg(short = 'c', long = "config", default_value = DEFAULT_CONFIG_PATH)]
    pub config: PathBuf,

    /// Validate configuration and exit.
    #[arg(long = "validate")]
    pub validate: bool,

    /// Print the plugin manifest as JSON and exit.
    #[arg(long = "manifest")]
    pub manifest: bool,

    /// Read a notification payload (JSON) from this file and deliver it.
    #[arg(long = "payload", value_name = "FILE")]
    pub payload: Option<PathBuf>,

    /// Log format: text or json.
    #[arg(long = "log-format", value_enum, default_value_t = LogFormat::Text, env = "LOG_FORMAT")]
    pub log_format: LogFormat,
}
