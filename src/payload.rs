//! Notification payload handed over by the routing host.

use crate::error::PayloadError;
use lettre::message::Mailbox;
use serde::Deserialize;
use serde_json::{Map, Value};

/// One notification to deliver.
///
/// The host validates the payload against the schema declared in the
/// plugin manifest before handing it over; [`Notification::validate`] is
/// the plugin's own fail-fast re-check of the parts it cannot deliver
/// without.
///
/// `subject` and `message` are template strings; both go through the
/// placeholder substitutor with `variables` before delivery.
#[derive(Debug, Clone, Deserialize)]
pub struct Notification {
    /// Recipient addresses. At least one is required.
    pub to: Vec<String>,
    /// Subject line template.
    pub subject: String,
    /// Raw message template (plain text or HTML).
    pub message: String,
    /// Flat name-to-value mapping for placeholder substitution.
    #[serde(default)]
    pub variables: Map<String, Value>,
}

impl Notification {
    /// Parse a notification from the host's JSON.
    pub fn from_json(raw: &str) -> Result<Self, PayloadError> {
        serde_json::from_str(raw).map_err(|e| PayloadError::InvalidJson(e.to_string()))
    }

    /// Validate recipients, collecting every error.
    pub fn validate(&self) -> Result<(), Vec<PayloadError>> {
        let mut errors = Vec::new();

        if self.to.is_empty() {
            errors.push(PayloadError::NoRecipients);
        }
        for address in &self.to {
            if let Err(e) = address.parse::<Mailbox>() {
                errors.push(PayloadError::InvalidRecipient {
                    address: address.clone(),
                    message: e.to_string(),
                });
            }
        }

        if errors.is_empty() { Ok(()) } else { Err(errors) }
    }
}
