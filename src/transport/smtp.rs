//! SMTP mail transport using lettre.

use async_trait::async_trait;
use lettre::{
    message::{header::ContentType, Mailbox, MultiPart, SinglePart},
    AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor,
};

use crate::config::{validate_connection_url, ConfigStore};
use crate::mail::MailData;
use crate::{MailerError, Result};

use super::MailTransport;

/// Transport delivering through an SMTP server.
///
/// The lettre client is built from `mailer.connection_url` for every
/// operation, so a changed connection URL takes effect immediately.
pub struct SmtpTransport {
    config: ConfigStore,
}

impl SmtpTransport {
    /// Registry name of this transport.
    pub const NAME: &'static str = "smtp";

    /// Create the transport. No connection is made until the first send or test.
    pub fn new(config: &ConfigStore) -> Result<Self> {
        Ok(Self {
            config: config.clone(),
        })
    }

    /// Build a client for the currently configured connection URL.
    pub fn client(&self) -> Result<AsyncSmtpTransport<Tokio1Executor>> {
        let connection_url = self
            .get_config("connection_url")
            .and_then(|v| v.as_str().map(str::to_string))
            .unwrap_or_default();
        validate_connection_url(&connection_url)?;

        let builder = AsyncSmtpTransport::<Tokio1Executor>::from_url(&connection_url)
            .map_err(|e| MailerError::Config(format!("invalid connection_url: {e}")))?;
        Ok(builder.build())
    }
}

fn parse_mailbox(field: &str, address: &str) -> Result<Mailbox> {
    address
        .parse()
        .map_err(|e| MailerError::Transport(format!("invalid '{field}' address '{address}': {e}")))
}

/// Convert mail data into a lettre message.
fn build_message(data: &MailData) -> Result<Message> {
    let from = data
        .from
        .as_deref()
        .ok_or_else(|| MailerError::Transport("message has no 'from' address".to_string()))?;

    let builder = Message::builder()
        .from(parse_mailbox("from", from)?)
        .to(parse_mailbox("to", &data.to)?)
        .subject(&data.subject);

    let message = match (&data.text, &data.html) {
        (Some(text), Some(html)) => builder.multipart(
            MultiPart::alternative()
                .singlepart(
                    SinglePart::builder()
                        .header(ContentType::TEXT_PLAIN)
                        .body(text.clone()),
                )
                .singlepart(
                    SinglePart::builder()
                        .header(ContentType::TEXT_HTML)
                        .body(html.clone()),
                ),
        ),
        (None, Some(html)) => builder.header(ContentType::TEXT_HTML).body(html.clone()),
        (Some(text), None) => builder.header(ContentType::TEXT_PLAIN).body(text.clone()),
        (None, None) => builder.header(ContentType::TEXT_PLAIN).body(String::new()),
    };

    message.map_err(|e| MailerError::Transport(format!("failed to build message: {e}")))
}

#[async_trait]
impl MailTransport for SmtpTransport {
    fn name(&self) -> &str {
        Self::NAME
    }

    fn config(&self) -> &ConfigStore {
        &self.config
    }

    async fn send(&self, data: &MailData) -> Result<()> {
        let message = build_message(data)?;
        let response = self
            .client()?
            .send(message)
            .await
            .map_err(|e| MailerError::Transport(format!("SMTP send failed: {e}")))?;

        tracing::debug!("SMTP server accepted mail for {} ({})", data.to, response.code());
        Ok(())
    }

    async fn test(&self) -> Result<()> {
        let verified = self
            .client()?
            .test_connection()
            .await
            .map_err(|e| MailerError::Transport(format!("SMTP connection test failed: {e}")))?;

        if verified {
            Ok(())
        } else {
            Err(MailerError::Transport(
                "SMTP server did not respond to NOOP".to_string(),
            ))
        }
    }
}

impl std::fmt::Debug for SmtpTransport {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        // The connection URL carries credentials, so it is left out.
        f.debug_struct("SmtpTransport").finish_non_exhaustive()
    }
}
