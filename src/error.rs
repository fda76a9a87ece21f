//! Centralized error types for mailgate using thiserror.
//!
//! The render pipeline itself is total and never reports errors here:
//! unresolved placeholders and non-decodable images are pass-through
//! conditions, not faults.

use thiserror::Error;

/// Errors related to configuration loading and validation.
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("failed to load config file: {0}")]
    LoadError(String),
    #[error("invalid configuration: {0}")]
    ValidationError(String),
    #[error("invalid address in '{field}': {message}")]
    InvalidAddress { field: String, message: String },
}

/// Errors related to the notification payload handed over by the host.
#[derive(Error, Debug)]
pub enum PayloadError {
    #[error("invalid payload JSON: {0}")]
    InvalidJson(String),
    #[error("payload has no recipients")]
    NoRecipients,
    #[error("invalid recipient address '{address}': {message}")]
    InvalidRecipient { address: String, message: String },
}

/// Errors related to building and handing a message to the SMTP transport.
#[derive(Error, Debug)]
pub enum DeliverError {
    #[error("failed to build email: {0}")]
    BuildFailed(String),
    #[error("failed to send email: {0}")]
    SendFailed(String),
    #[error(transparent)]
    Payload(#[from] PayloadError),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn config_error_display() {
        let err = ConfigError::LoadError("file not found".to_string());
        assert_eq!(
            err.to_string(),
            "failed to load config file: file not found"
        );

        let err = ConfigError::ValidationError("missing field".to_string());
        assert_eq!(err.to_string(), "invalid configuration: missing field");
    }

    #[test]
    fn config_error_invalid_address_display() {
        let err = ConfigError::InvalidAddress {
            field: "from".to_string(),
            message: "Missing domain".to_string(),
        };
        assert_eq!(err.to_string(), "invalid address in 'from': Missing domain");
    }

    #[test]
    fn payload_error_display() {
        let err = PayloadError::NoRecipients;
        assert_eq!(err.to_string(), "payload has no recipients");

        let err = PayloadError::InvalidRecipient {
            address: "not-an-email".to_string(),
            message: "Missing domain".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "invalid recipient address 'not-an-email': Missing domain"
        );
    }

    #[test]
    fn deliver_error_display() {
        let err = DeliverError::SendFailed("connection refused".to_string());
        assert_eq!(err.to_string(), "failed to send email: connection refused");

        let err = DeliverError::BuildFailed("bad header".to_string());
        assert_eq!(err.to_string(), "failed to build email: bad header");
    }

    #[test]
    fn deliver_error_wraps_payload_error() {
        let err = DeliverError::from(PayloadError::NoRecipients);
        assert_eq!(err.to_string(), "payload has no recipients");
    }
}
