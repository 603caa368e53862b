//! Mailer - outbound email for an authoring platform.
//!
//! Validates mail data, injects a default sender and hands messages to a
//! pluggable transport (filesystem for development, SMTP for delivery).

pub mod config;
pub mod error;
pub mod logging;
pub mod mail;
pub mod schema;
pub mod transport;
pub mod web;

pub use config::{Config, ConfigStore};
pub use error::{MailerError, Result};
pub use mail::{MailData, MailService, SendOptions, TransportRegistry, TEST_EMAIL_SUBJECT};
pub use schema::SchemaRegistry;
pub use transport::{FilesystemTransport, MailTransport, SmtpTransport, TransportFactory};
