//! Mail transports.
//!
//! A transport is one way of getting a message out of the process:
//! - `FilesystemTransport` - writes mail data to a local directory (development, diagnostics)
//! - `SmtpTransport` - delivers through an SMTP server using lettre
//!
//! Transports are registered with the [`MailService`](crate::mail::MailService)
//! and the one named by `mailer.transport` handles every send.

mod filesystem;
mod smtp;

pub use filesystem::{Filesystem, FilesystemTransport, LocalFilesystem};
pub use smtp::SmtpTransport;

use async_trait::async_trait;

use crate::config::ConfigStore;
use crate::mail::MailData;
use crate::Result;

/// Configuration namespace transports read their settings from.
pub const CONFIG_NAMESPACE: &str = "mailer";

/// Contract every delivery mechanism implements.
///
/// # Example
///
/// ```rust,ignore
/// use mailer::transport::MailTransport;
/// use mailer::{ConfigStore, MailData, Result};
/// use async_trait::async_trait;
///
/// struct LogTransport {
///     config: ConfigStore,
/// }
///
/// #[async_trait]
/// impl MailTransport for LogTransport {
///     fn name(&self) -> &str {
///         "log"
///     }
///
///     fn config(&self) -> &ConfigStore {
///         &self.config
///     }
///
///     async fn send(&self, data: &MailData) -> Result<()> {
///         tracing::info!("mail to {}: {}", data.to, data.subject);
///         Ok(())
///     }
/// }
/// ```
#[async_trait]
pub trait MailTransport: Send + Sync {
    /// Registry key of the transport. Must not be empty.
    fn name(&self) -> &str;

    /// Configuration store the transport reads its settings from.
    fn config(&self) -> &ConfigStore;

    /// Look up `key` in the mailer configuration namespace.
    fn get_config(&self, key: &str) -> Option<toml::Value> {
        self.config().get(&format!("{CONFIG_NAMESPACE}.{key}"))
    }

    /// Deliver a message.
    ///
    /// Errors must be returned to the caller, never swallowed.
    async fn send(&self, _data: &MailData) -> Result<()> {
        Ok(())
    }

    /// Check that the transport can deliver, without sending mail.
    async fn test(&self) -> Result<()> {
        Ok(())
    }
}

/// Constructor accepted by
/// [`MailService::register_transport`](crate::mail::MailService::register_transport).
///
/// Implemented for any `FnOnce(&ConfigStore) -> Result<T>` where `T` is a transport.
pub trait TransportFactory {
    /// Transport type produced by the factory.
    type Output: MailTransport + 'static;

    /// Build the transport.
    fn build(self, config: &ConfigStore) -> Result<Self::Output>;
}

impl<F, T> TransportFactory for F
where
    F: FnOnce(&ConfigStore) -> Result<T>,
    T: MailTransport + 'static,
{
    type Output = T;

    fn build(self, config: &ConfigStore) -> Result<T> {
        self(config)
    }
}
