//! Email delivery via SMTP.
//!
//! Implements the plugin's send operation: render the notification into a
//! deliverable body, build the MIME message with lettre, and hand it to the
//! transport exactly once. Retry/backoff orchestration and rate-limit
//! accounting live in the routing host, not here.
//!
//! # Testability
//!
//! The [`Mailer`] supports transport injection:
//! - Production: `AsyncSmtpTransport<Tokio1Executor>` built from config
//! - Testing: any [`EmailTransport`] implementation, no SMTP server needed

use crate::config::{Config, TlsMode, resolve_env_vars};
use crate::error::{ConfigError, DeliverError, PayloadError};
use crate::payload::Notification;
use crate::render::{EmailBody, render_body, substitute_variables};
use async_trait::async_trait;
use lettre::message::header::ContentType;
use lettre::message::{Attachment, Mailbox, MultiPart, SinglePart};
use lettre::transport::smtp::authentication::Credentials;
use lettre::transport::smtp::client::{Tls, TlsParameters};
use lettre::{AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor};
use std::sync::Arc;
use tracing::Instrument;

// =============================================================================
// EmailTransport trait
// =============================================================================

/// Async email transport abstraction for testability.
///
/// This trait allows injecting mock transports in tests while using
/// the real `AsyncSmtpTransport` in production.
#[async_trait]
pub trait EmailTransport: Send + Sync {
    /// Send an email message.
    ///
    /// # Returns
    ///
    /// * `Ok(())` - Email accepted by the relay
    /// * `Err(String)` - Error message describing the failure
    async fn send_email(&self, message: Message) -> Result<(), String>;
}

/// Real SMTP transport wrapper implementing `EmailTransport`.
pub struct SmtpTransport {
    inner: AsyncSmtpTransport<Tokio1Executor>,
}

impl SmtpTransport {
    /// Create a new SMTP transport wrapper.
    pub fn new(transport: AsyncSmtpTransport<Tokio1Executor>) -> Self {
        Self { inner: transport }
    }
}

#[async_trait]
impl EmailTransport for SmtpTransport {
    async fn send_email(&self, message: Message) -> Result<(), String> {
        self.inner
            .send(message)
            .await
            .map(|_| ())
            .map_err(|e| e.to_string())
    }
}

// =============================================================================
// Mailer
// =============================================================================

/// The plugin's delivery component.
///
/// Holds the configured transport and sender identity, and turns each
/// [`Notification`] into one message per recipient:
/// - Each recipient gets a separate email, so one rejected mailbox does not
///   sink the others
/// - Plain-text bodies go out as `text/plain`
/// - HTML bodies go out as `text/html`, or `multipart/related` when inline
///   images were extracted
pub struct Mailer {
    /// Email transport (abstracted for testability).
    transport: Arc<dyn EmailTransport>,
    /// Sender address.
    from: Mailbox,
    /// Optional Reply-To address.
    reply_to: Option<Mailbox>,
}

impl Mailer {
    /// Create a Mailer from configuration.
    ///
    /// Resolves `${ENV_VAR}` references in credentials and builds the SMTP
    /// transport according to the configured TLS mode.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] when credentials cannot be resolved, the TLS
    /// parameters cannot be built, or an address does not parse.
    pub fn from_config(config: &Config) -> Result<Self, ConfigError> {
        let transport = Self::build_transport(config)?;

        let from: Mailbox = config
            .from
            .parse()
            .map_err(|e| ConfigError::InvalidAddress {
                field: "from".to_string(),
                message: format!("'{}': {}", config.from, e),
            })?;

        let reply_to = config
            .reply_to
            .as_ref()
            .map(|addr| {
                addr.parse().map_err(|e| ConfigError::InvalidAddress {
                    field: "reply_to".to_string(),
                    message: format!("'{}': {}", addr, e),
                })
            })
            .transpose()?;

        Ok(Self {
            transport: Arc::new(SmtpTransport::new(transport)),
            from,
            reply_to,
        })
    }

    /// Create a Mailer with an injected transport.
    ///
    /// Used by tests and by hosts that manage their own transport.
    pub fn with_transport(
        transport: Arc<dyn EmailTransport>,
        from: Mailbox,
        reply_to: Option<Mailbox>,
    ) -> Self {
        Self {
            transport,
            from,
            reply_to,
        }
    }

    /// Build the SMTP transport based on TLS mode, credentials, and
    /// tls_verify setting.
    fn build_transport(
        config: &Config,
    ) -> Result<AsyncSmtpTransport<Tokio1Executor>, ConfigError> {
        let host = &config.smtp.host;
        let port = config.smtp.port;

        let tls_parameters = if config.smtp.tls != TlsMode::None {
            let mut tls_builder = TlsParameters::builder(host.clone());
            if !config.smtp.tls_verify {
                // Self-signed relay certificates.
                tls_builder = tls_builder.dangerous_accept_invalid_certs(true);
            }
            Some(tls_builder.build().map_err(|e| {
                ConfigError::ValidationError(format!("TLS configuration error: {}", e))
            })?)
        } else {
            None
        };

        let builder = match config.smtp.tls {
            TlsMode::None => {
                // No encryption - dangerous but allowed for local relays.
                AsyncSmtpTransport::<Tokio1Executor>::builder_dangerous(host).port(port)
            }
            TlsMode::Starttls => {
                let tls_params = tls_parameters.expect("TLS parameters required for STARTTLS");
                AsyncSmtpTransport::<Tokio1Executor>::builder_dangerous(host)
                    .port(port)
                    .tls(Tls::Required(tls_params))
            }
            TlsMode::Tls => {
                let tls_params = tls_parameters.expect("TLS parameters required for TLS");
                AsyncSmtpTransport::<Tokio1Executor>::builder_dangerous(host)
                    .port(port)
                    .tls(Tls::Wrapper(tls_params))
            }
        };

        let builder = match &config.smtp.credentials {
            Some(credentials) => {
                let username = resolve_env_vars(&credentials.username).map_err(|e| {
                    ConfigError::ValidationError(format!("smtp.credentials.username: {}", e))
                })?;
                let password =
                    resolve_env_vars(credentials.password.expose()).map_err(|e| {
                        ConfigError::ValidationError(format!("smtp.credentials.password: {}", e))
                    })?;
                builder.credentials(Credentials::new(username, password))
            }
            None => builder,
        };

        Ok(builder.build())
    }

    /// Deliver one notification.
    ///
    /// Renders subject and body once, then sends one message per recipient.
    /// If a recipient fails, the remaining recipients are still attempted;
    /// the call succeeds when at least one send was accepted and fails only
    /// when all of them were rejected.
    pub async fn send(&self, notification: &Notification) -> Result<(), DeliverError> {
        let span = tracing::info_span!("send_email", recipients = notification.to.len());
        self.send_inner(notification).instrument(span).await
    }

    async fn send_inner(&self, notification: &Notification) -> Result<(), DeliverError> {
        let recipients = Self::parse_recipients(notification)?;

        let subject = substitute_variables(&notification.subject, &notification.variables);
        let body = render_body(&notification.message, &notification.variables);

        tracing::debug!(
            subject_len = subject.len(),
            html = matches!(body, EmailBody::Html { .. }),
            attachments = body.images().len(),
            "Notification rendered"
        );

        let mut success_count = 0usize;
        let mut failures = Vec::new();

        for recipient in &recipients {
            let message = self.build_message(&subject, &body, recipient)?;
            match self.transport.send_email(message).await {
                Ok(()) => {
                    tracing::debug!(recipient = %recipient, "Email sent to recipient");
                    success_count += 1;
                }
                Err(error) => {
                    tracing::warn!(
                        recipient = %recipient,
                        error = %error,
                        "Failed to send email to recipient, continuing to next"
                    );
                    metrics::counter!("mailgate_recipient_errors_total").increment(1);
                    failures.push(format!("{}: {}", recipient, error));
                }
            }
        }

        tracing::info!(
            success = success_count,
            failed = failures.len(),
            total = recipients.len(),
            "Email send complete"
        );

        if success_count > 0 {
            metrics::counter!("mailgate_sent_total").increment(1);
            Ok(())
        } else {
            metrics::counter!("mailgate_send_errors_total").increment(1);
            Err(DeliverError::SendFailed(format!(
                "all {} recipients failed: {}",
                failures.len(),
                failures.join("; ")
            )))
        }
    }

    fn parse_recipients(notification: &Notification) -> Result<Vec<Mailbox>, DeliverError> {
        if notification.to.is_empty() {
            return Err(PayloadError::NoRecipients.into());
        }
        notification
            .to
            .iter()
            .map(|address| {
                address.parse().map_err(|e: lettre::address::AddressError| {
                    PayloadError::InvalidRecipient {
                        address: address.clone(),
                        message: e.to_string(),
                    }
                    .into()
                })
            })
            .collect()
    }

    /// Build the email message for a specific recipient.
    fn build_message(
        &self,
        subject: &str,
        body: &EmailBody,
        recipient: &Mailbox,
    ) -> Result<Message, DeliverError> {
        let mut builder = Message::builder()
            .from(self.from.clone())
            .to(recipient.clone())
            .subject(subject);
        if let Some(reply_to) = &self.reply_to {
            builder = builder.reply_to(reply_to.clone());
        }

        let message = match body {
            EmailBody::Text(text) => builder
                .header(ContentType::TEXT_PLAIN)
                .body(text.clone()),
            EmailBody::Html { html, images } if images.is_empty() => {
                builder.header(ContentType::TEXT_HTML).body(html.clone())
            }
            EmailBody::Html { html, images } => {
                // multipart/related: the HTML part first, then one inline
                // attachment per extracted image, in discovery order.
                let mut related = MultiPart::related().singlepart(SinglePart::html(html.clone()));
                for image in images {
                    let media_type = ContentType::parse(&image.media_type).map_err(|e| {
                        DeliverError::BuildFailed(format!(
                            "attachment '{}' media type '{}': {}",
                            image.filename, image.media_type, e
                        ))
                    })?;
                    related = related.singlepart(
                        Attachment::new_inline(image.content_id.clone())
                            .body(image.content.clone(), media_type),
                    );
                }
                builder.multipart(related)
            }
        }
        .map_err(|e| DeliverError::BuildFailed(e.to_string()))?;

        Ok(message)
    }
}

impl std::fmt::Debug for Mailer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        // Never expose transport internals or credentials.
        f.debug_struct("Mailer")
            .field("from", &self.from.to_string())
            .field("reply_to", &self.reply_to.as_ref().map(Mailbox::to_string))
            .finish()
    }
}
