//! mailgate - SMTP email delivery plugin for notification routing.

use anyhow::Result;
use clap::Parser;
use tracing::{error, info};

use mailgate::cli::{Cli, LogFormat};
use mailgate::config::Config;
use mailgate::payload::Notification;
use mailgate::{Mailer, manifest};

/// Initialize the tracing subscriber with the specified log format.
fn init_logging(format: LogFormat) {
    let filter = tracing_subscriber::EnvFilter::from_default_env()
        .add_directive(tracing::Level::INFO.into());

    match format {
        LogFormat::Text => {
            tracing_subscriber::fmt()
                .with_writer(std::io::stderr)
                .with_env_filter(filter)
                .init();
        }
        LogFormat::Json => {
            tracing_subscriber::fmt()
                .with_writer(std::io::stderr)
                .json()
                .with_current_span(true)
                .with_span_list(false)
                .flatten_event(true)
                .with_env_filter(filter)
                .init();
        }
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    init_logging(cli.log_format);

    // The manifest needs no configuration; answer before touching the file.
    if cli.manifest {
        println!("{}", serde_json::to_string_pretty(&manifest())?);
        return Ok(());
    }

    info!(config_path = %cli.config.display(), "Loading configuration");

    let config = match Config::load(&cli.config) {
        Ok(c) => c,
        Err(e) => {
            error!(error = %e, path = %cli.config.display(), "Failed to load configuration");
            std::process::exit(1);
        }
    };

    // Fail-fast: report every validation error at once.
    if let Err(errors) = config.validate() {
        for e in &errors {
            error!(error = %e, "Configuration validation error");
        }
        error!(error_count = errors.len(), "Configuration validation failed");
        std::process::exit(1);
    }

    if cli.validate {
        println!("Configuration is valid: {}", cli.config.display());
        println!("  SMTP relay: {}:{}", config.smtp.host, config.smtp.port);
        println!("  From: {}", config.from);
        println!(
            "  Credentials: {}",
            if config.smtp.credentials.is_some() {
                "configured"
            } else {
                "none"
            }
        );
        return Ok(());
    }

    let Some(payload_path) = &cli.payload else {
        error!("nothing to do: pass --validate, --manifest, or --payload <FILE>");
        std::process::exit(2);
    };

    let raw = std::fs::read_to_string(payload_path).map_err(|e| {
        anyhow::anyhow!("failed to read payload file {}: {}", payload_path.display(), e)
    })?;
    let notification = match Notification::from_json(&raw) {
        Ok(n) => n,
        Err(e) => {
            error!(error = %e, path = %payload_path.display(), "Failed to parse payload");
            std::process::exit(1);
        }
    };
    if let Err(errors) = notification.validate() {
        for e in &errors {
            error!(error = %e, "Payload validation error");
        }
        std::process::exit(1);
    }

    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()?;

    runtime.block_on(run(config, notification))
}

/// Main async entry point: build the mailer and deliver one notification.
async fn run(config: Config, notification: Notification) -> Result<()> {
    let mailer = match Mailer::from_config(&config) {
        Ok(m) => m,
        Err(e) => {
            error!(error = %e, "Failed to build mailer");
            std::process::exit(1);
        }
    };

    match mailer.send(&notification).await {
        Ok(()) => {
            info!("Notification delivered");
            Ok(())
        }
        Err(e) => {
            error!(error = %e, "Delivery failed");
            Err(anyhow::anyhow!("delivery failed: {}", e))
        }
    }
}
