// src/lib.rs
//! mailgate - SMTP email delivery plugin for notification routing.
//!
//! Turns a notification payload (message template + variable mapping) into
//! a deliverable email: placeholders are substituted, HTML bodies have
//! their base64-embedded images lifted into `cid:`-referenced attachments,
//! and the result is handed to an SMTP transport (Gmail by default).

pub mod cli;
pub mod config;
pub mod deliver;
pub mod error;
pub mod manifest;
pub mod payload;
pub mod render;

// Re-export commonly used types
pub use cli::LogFormat;
pub use config::Config;
pub use deliver::{EmailTransport, Mailer, SmtpTransport};
pub use error::{ConfigError, DeliverError, PayloadError};
pub use manifest::{DEFAULT_RATE_LIMIT, PluginManifest, RateLimitDefaults, manifest};
pub use payload::Notification;
pub use render::{
    EmailBody, ExtractedHtml, InlineImage, extract_inline_images, looks_like_html, render_body,
    substitute_variables,
};
