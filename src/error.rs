//! Error types for the mailer.

use serde_json::json;
use thiserror::Error;

/// Common error type for the mailer.
#[derive(Error, Debug)]
pub enum MailerError {
    /// Mail is administratively disabled.
    #[error("mail is not enabled")]
    NotEnabled,

    /// Configuration error, e.g. an unknown active transport.
    #[error("configuration error: {0}")]
    Config(String),

    /// Mail data failed schema validation.
    #[error("validation error: {0}")]
    Validation(String),

    /// Delivery failure reported by a transport.
    #[error("transport error: {0}")]
    Transport(String),

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization error.
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Normalized failure of a send, wrapping the validation or delivery cause.
    #[error("mail send failed for {email}: {source}")]
    SendFailed {
        /// Recipient address of the failed message.
        email: String,
        /// Underlying cause.
        #[source]
        source: Box<MailerError>,
    },
}

impl MailerError {
    /// Wrap a validation or delivery failure for the given recipient.
    pub fn send_failed(email: impl Into<String>, source: MailerError) -> Self {
        MailerError::SendFailed {
            email: email.into(),
            source: Box::new(source),
        }
    }

    /// Structured diagnostic data attached to the error, if any.
    ///
    /// For `SendFailed` this is `{ "email": .., "error": .. }`.
    pub fn data(&self) -> Option<serde_json::Value> {
        match self {
            MailerError::SendFailed { email, source } => Some(json!({
                "email": email,
                "error": source.to_string(),
            })),
            _ => None,
        }
    }
}

/// Result type alias for mailer operations.
pub type Result<T> = std::result::Result<T, MailerError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_not_enabled_display() {
        assert_eq!(MailerError::NotEnabled.to_string(), "mail is not enabled");
    }

    #[test]
    fn test_config_error_display() {
        let err = MailerError::Config("no transport named 'ses'".to_string());
        assert_eq!(
            err.to_string(),
            "configuration error: no transport named 'ses'"
        );
    }

    #[test]
    fn test_io_error_conversion() {
        let io_err = std::io::Error::new(std::io::ErrorKind::PermissionDenied, "denied");
        let err: MailerError = io_err.into();
        assert!(matches!(err, MailerError::Io(_)));
        assert!(err.to_string().contains("denied"));
    }

    #[test]
    fn test_send_failed_data() {
        let err = MailerError::send_failed(
            "user@example.com",
            MailerError::Transport("connection refused".to_string()),
        );

        let data = err.data().unwrap();
        assert_eq!(data["email"], "user@example.com");
        assert_eq!(data["error"], "transport error: connection refused");
        assert!(err.to_string().contains("user@example.com"));
    }

    #[test]
    fn test_send_failed_source() {
        use std::error::Error as _;

        let err = MailerError::send_failed("a@b.com", MailerError::Validation("bad".to_string()));
        let source = err.source().unwrap();
        assert_eq!(source.to_string(), "validation error: bad");
    }

    #[test]
    fn test_data_absent_for_other_kinds() {
        assert!(MailerError::NotEnabled.data().is_none());
        assert!(MailerError::Transport("x".to_string()).data().is_none());
    }
}
