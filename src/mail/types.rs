//! Mail data types.

use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::schema::header_line;

/// One outbound message.
///
/// `from` may be omitted by callers; [`MailService::send`](super::MailService::send)
/// fills it with the configured default sender before dispatch.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize, Validate)]
pub struct MailData {
    /// Recipient address.
    #[validate(email(message = "Recipient must be a valid email address"))]
    pub to: String,
    /// Sender address.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[validate(email(message = "Sender must be a valid email address"))]
    pub from: Option<String>,
    /// Subject line.
    #[validate(custom(function = "header_line"))]
    pub subject: String,
    /// Plain text body.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
    /// HTML body.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub html: Option<String>,
}

impl MailData {
    /// Create a message with recipient and subject.
    pub fn new(to: impl Into<String>, subject: impl Into<String>) -> Self {
        Self {
            to: to.into(),
            subject: subject.into(),
            ..Default::default()
        }
    }

    /// Set the sender.
    pub fn from(mut self, address: impl Into<String>) -> Self {
        self.from = Some(address.into());
        self
    }

    /// Set the plain text body.
    pub fn text(mut self, body: impl Into<String>) -> Self {
        self.text = Some(body.into());
        self
    }

    /// Set the HTML body.
    pub fn html(mut self, body: impl Into<String>) -> Self {
        self.html = Some(body.into());
        self
    }
}

/// Options for [`MailService::send`](super::MailService::send).
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SendOptions {
    /// Fail with `NotEnabled` instead of silently skipping when mail is disabled.
    pub strict: bool,
}

impl SendOptions {
    /// Options for strict sending.
    pub fn strict() -> Self {
        Self { strict: true }
    }
}
