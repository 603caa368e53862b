//! Test helpers for mailer integration tests.
//!
//! Provides stub transports that record what they are asked to send and a
//! builder for a `MailService` wired to them.

#![allow(dead_code)]

use std::sync::{Arc, Mutex};

use async_trait::async_trait;

use mailer::config::Config;
use mailer::{
    ConfigStore, MailData, MailService, MailTransport, MailerError, Result, SchemaRegistry,
};

/// Default sender configured for test services.
pub const DEFAULT_SENDER: &str = "default@example.com";

/// Messages handed to a stub transport.
pub type Outbox = Arc<Mutex<Vec<MailData>>>;

/// Transport that records every message and can be told to fail.
pub struct RecordingTransport {
    name: String,
    config: ConfigStore,
    outbox: Outbox,
    failure: Option<String>,
}

impl RecordingTransport {
    /// Factory for a transport that accepts everything.
    pub fn factory(
        name: &str,
        outbox: Outbox,
    ) -> impl FnOnce(&ConfigStore) -> Result<RecordingTransport> {
        let name = name.to_string();
        move |config: &ConfigStore| {
            Ok(RecordingTransport {
                name,
                config: config.clone(),
                outbox,
                failure: None,
            })
        }
    }

    /// Factory for a transport that records and then rejects every message.
    pub fn failing(
        name: &str,
        outbox: Outbox,
        failure: &str,
    ) -> impl FnOnce(&ConfigStore) -> Result<RecordingTransport> {
        let name = name.to_string();
        let failure = failure.to_string();
        move |config: &ConfigStore| {
            Ok(RecordingTransport {
                name,
                config: config.clone(),
                outbox,
                failure: Some(failure),
            })
        }
    }
}

#[async_trait]
impl MailTransport for RecordingTransport {
    fn name(&self) -> &str {
        &self.name
    }

    fn config(&self) -> &ConfigStore {
        &self.config
    }

    async fn send(&self, data: &MailData) -> Result<()> {
        self.outbox.lock().unwrap().push(data.clone());
        match &self.failure {
            Some(msg) => Err(MailerError::Transport(msg.clone())),
            None => Ok(()),
        }
    }

    async fn test(&self) -> Result<()> {
        match &self.failure {
            Some(msg) => Err(MailerError::Transport(msg.clone())),
            None => Ok(()),
        }
    }
}

/// Configuration for a test service using the given active transport.
pub fn create_test_config(enabled: bool, transport: &str) -> Config {
    let mut config = Config::default();
    config.mailer.is_enabled = enabled;
    config.mailer.transport = transport.to_string();
    config.mailer.default_sender_address = DEFAULT_SENDER.to_string();
    config.app.url = "https://authoring.example.com".to_string();
    config
}

/// Create a service whose active transport is a recording stub named `transport`.
pub fn create_test_service(enabled: bool, transport: &str) -> (MailService, Outbox) {
    let store = ConfigStore::new(&create_test_config(enabled, transport)).unwrap();
    let outbox = Outbox::default();
    let mut service = MailService::new(store, SchemaRegistry::with_defaults());
    service.register_transport(RecordingTransport::factory(transport, outbox.clone()));
    (service, outbox)
}

/// Create a service whose active transport rejects every message with `failure`.
pub fn create_failing_service(transport: &str, failure: &str) -> (MailService, Outbox) {
    let store = ConfigStore::new(&create_test_config(true, transport)).unwrap();
    let outbox = Outbox::default();
    let mut service = MailService::new(store, SchemaRegistry::with_defaults());
    service.register_transport(RecordingTransport::failing(
        transport,
        outbox.clone(),
        failure,
    ));
    (service, outbox)
}
