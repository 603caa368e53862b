//! Mail service.
//!
//! Orchestrates outbound mail: enablement checks, default sender injection,
//! schema validation, transport selection and error normalization.

use std::sync::Arc;

use tokio::task::JoinHandle;

use crate::config::ConfigStore;
use crate::schema::{SchemaRegistry, MAIL_DATA_SCHEMA};
use crate::transport::{FilesystemTransport, MailTransport, SmtpTransport, TransportFactory};
use crate::{MailerError, Result};

use super::registry::TransportRegistry;
use super::types::{MailData, SendOptions};

/// Subject of the operator test email.
pub const TEST_EMAIL_SUBJECT: &str = "Adapt authoring tool: email test";

/// Service for sending mail through the active transport.
#[derive(Debug)]
pub struct MailService {
    is_enabled: bool,
    config: ConfigStore,
    schemas: SchemaRegistry,
    transports: TransportRegistry,
}

impl MailService {
    /// Create a service with no transports registered.
    ///
    /// `mailer.is_enabled` is read once, here.
    pub fn new(config: ConfigStore, schemas: SchemaRegistry) -> Self {
        let is_enabled = config.get_bool("mailer.is_enabled").unwrap_or(false);
        Self {
            is_enabled,
            config,
            schemas,
            transports: TransportRegistry::new(),
        }
    }

    /// Create a service and, when mail is enabled, register the built-in transports.
    pub fn init(config: ConfigStore, schemas: SchemaRegistry) -> Self {
        let mut service = Self::new(config, schemas);
        if service.is_enabled {
            service.register_transport(FilesystemTransport::new);
            service.register_transport(SmtpTransport::new);
            tracing::info!(
                "Mail enabled, transports: {}",
                service.transports.names().join(", ")
            );
        } else {
            tracing::info!("Mail is not enabled");
        }
        service
    }

    /// Whether mail sending is enabled.
    pub fn is_enabled(&self) -> bool {
        self.is_enabled
    }

    /// Configuration store shared with the transports.
    pub fn config(&self) -> &ConfigStore {
        &self.config
    }

    /// Registered transports.
    pub fn transports(&self) -> &TransportRegistry {
        &self.transports
    }

    /// Register a transport. Failures are logged, never returned.
    pub fn register_transport<F: TransportFactory>(&mut self, factory: F) {
        self.transports.register(factory, &self.config);
    }

    /// The transport named by `mailer.transport`.
    ///
    /// The name is read on every call.
    ///
    /// # Errors
    ///
    /// Returns a configuration error naming the transport if nothing is
    /// registered under it.
    pub fn get_transport(&self) -> Result<Arc<dyn MailTransport>> {
        let name = self.config.get_str("mailer.transport").ok_or_else(|| {
            MailerError::Config("no active mail transport configured".to_string())
        })?;
        self.transports.get(&name)
    }

    /// Test the active transport. The outcome is logged only.
    pub async fn init_transports(&self) {
        let result = match self.get_transport() {
            Ok(transport) => transport
                .test()
                .await
                .map(|()| transport.name().to_string()),
            Err(e) => Err(e),
        };

        match result {
            Ok(name) => tracing::info!("Mail transport '{}' verified", name),
            Err(e) => tracing::warn!("Mail transport verification failed: {}", e),
        }
    }

    /// Run [`init_transports`](Self::init_transports) on a background task.
    pub fn spawn_init_transports(self: &Arc<Self>) -> JoinHandle<()> {
        let service = Arc::clone(self);
        tokio::spawn(async move { service.init_transports().await })
    }

    /// Send a message through the active transport.
    ///
    /// When `data.from` is `None` it is set to `mailer.default_sender_address`
    /// in place, so the caller observes the sender that was used.
    ///
    /// # Errors
    ///
    /// - `NotEnabled` if mail is disabled and `options.strict` is set
    ///   (without `strict` a disabled service logs a warning and returns `Ok`)
    /// - `SendFailed` carrying the recipient and the cause if no sender
    ///   resolves, or validation, transport lookup or delivery fails
    pub async fn send(&self, data: &mut MailData, options: SendOptions) -> Result<()> {
        if !self.is_enabled {
            if options.strict {
                return Err(MailerError::NotEnabled);
            }
            tracing::warn!("Mail is not enabled, message to {} was not sent", data.to);
            return Ok(());
        }

        if data.from.is_none() {
            data.from = self
                .config
                .get_str("mailer.default_sender_address")
                .filter(|address| !address.is_empty());
        }

        match self.dispatch(data).await {
            Ok(()) => {
                tracing::info!("Sent mail to {}", data.to);
                Ok(())
            }
            Err(e) => {
                tracing::error!("Failed to send mail to {}: {}", data.to, e);
                Err(MailerError::send_failed(data.to.clone(), e))
            }
        }
    }

    async fn dispatch(&self, data: &MailData) -> Result<()> {
        if data.from.is_none() {
            return Err(MailerError::Config(
                "no sender: message has no 'from' and mailer.default_sender_address is not set"
                    .to_string(),
            ));
        }
        self.schemas.validate(MAIL_DATA_SCHEMA, data)?;
        self.get_transport()?.send(data).await
    }

    /// Send the operator test email to `email` in strict mode.
    pub async fn test_email(&self, email: &str) -> Result<()> {
        if !self.is_enabled {
            return Err(MailerError::NotEnabled);
        }

        let mut data = test_email_data(email, &self.config.get_str("app.url").unwrap_or_default());
        self.send(&mut data, SendOptions::strict()).await
    }
}

fn test_email_data(email: &str, app_url: &str) -> MailData {
    MailData::new(email, TEST_EMAIL_SUBJECT)
        .text(format!(
            "This is a test email sent from {app_url}.\n\n\
             If you are reading this, outgoing mail is configured correctly."
        ))
        .html(format!(
            "<p>This is a test email sent from <a href=\"{app_url}\">{app_url}</a>.</p>\
             <p>If you are reading this, outgoing mail is configured correctly.</p>"
        ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;
    use crate::logging::CapturedLogs;
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Mutex;

    /// Transport that records every message and optionally fails.
    struct Recording {
        name: &'static str,
        config: ConfigStore,
        sent: Arc<Mutex<Vec<MailData>>>,
        checks: Arc<AtomicUsize>,
        fail_with: Option<&'static str>,
    }

    #[async_trait]
    impl MailTransport for Recording {
        fn name(&self) -> &str {
            self.name
        }

        fn config(&self) -> &ConfigStore {
            &self.config
        }

        async fn send(&self, data: &MailData) -> Result<()> {
            self.sent.lock().unwrap().push(data.clone());
            match self.fail_with {
                Some(msg) => Err(MailerError::Transport(msg.to_string())),
                None => Ok(()),
            }
        }

        async fn test(&self) -> Result<()> {
            self.checks.fetch_add(1, Ordering::SeqCst);
            match self.fail_with {
                Some(msg) => Err(MailerError::Transport(msg.to_string())),
                None => Ok(()),
            }
        }
    }

    fn store(enabled: bool, transport: &str) -> ConfigStore {
        let mut config = Config::default();
        config.mailer.is_enabled = enabled;
        config.mailer.transport = transport.to_string();
        config.mailer.default_sender_address = "default@example.com".to_string();
        config.app.url = "https://authoring.example.com".to_string();
        ConfigStore::new(&config).unwrap()
    }

    fn service_with(
        enabled: bool,
        fail_with: Option<&'static str>,
    ) -> (MailService, Arc<Mutex<Vec<MailData>>>) {
        let (service, sent, _checks) = counting_service(enabled, fail_with);
        (service, sent)
    }

    fn counting_service(
        enabled: bool,
        fail_with: Option<&'static str>,
    ) -> (MailService, Arc<Mutex<Vec<MailData>>>, Arc<AtomicUsize>) {
        let sent = Arc::new(Mutex::new(Vec::new()));
        let checks = Arc::new(AtomicUsize::new(0));
        let mut service = MailService::new(store(enabled, "recording"), SchemaRegistry::with_defaults());
        let recorded = sent.clone();
        let counted = checks.clone();
        service.register_transport(move |config: &ConfigStore| -> Result<Recording> {
            Ok(Recording {
                name: "recording",
                config: config.clone(),
                sent: recorded,
                checks: counted,
                fail_with,
            })
        });
        (service, sent, checks)
    }

    #[test]
    fn test_init_registers_defaults_when_enabled() {
        let service = MailService::init(store(true, "filesystem"), SchemaRegistry::with_defaults());
        assert_eq!(service.transports().names(), vec!["filesystem", "smtp"]);
        assert_eq!(service.get_transport().unwrap().name(), "filesystem");
    }

    #[test]
    fn test_init_registers_nothing_when_disabled() {
        let service = MailService::init(store(false, "filesystem"), SchemaRegistry::with_defaults());
        assert!(!service.is_enabled());
        assert!(service.transports().is_empty());
    }

    #[test]
    fn test_get_transport_rereads_config() {
        let service = MailService::init(store(true, "filesystem"), SchemaRegistry::with_defaults());
        service.config().set("mailer.transport", "smtp");
        assert_eq!(service.get_transport().unwrap().name(), "smtp");
    }

    #[test]
    fn test_get_transport_unregistered() {
        let service = MailService::init(store(true, "sendgrid"), SchemaRegistry::with_defaults());
        let err = service.get_transport().err().unwrap();
        assert!(err.to_string().contains("sendgrid"));
    }

    #[tokio::test]
    async fn test_send_fills_default_sender() {
        let (service, sent) = service_with(true, None);
        let mut data = MailData::new("user@example.com", "Hello").text("Hi");

        service.send(&mut data, SendOptions::default()).await.unwrap();

        assert_eq!(data.from.as_deref(), Some("default@example.com"));
        let sent = sent.lock().unwrap();
        assert_eq!(sent.len(), 1);
        assert_eq!(sent[0].from.as_deref(), Some("default@example.com"));
    }

    #[tokio::test]
    async fn test_send_fills_default_sender_on_failure() {
        let (service, _sent) = service_with(true, Some("relay down"));
        let mut data = MailData::new("user@example.com", "Hello");

        assert!(service.send(&mut data, SendOptions::default()).await.is_err());
        assert_eq!(data.from.as_deref(), Some("default@example.com"));
    }

    #[tokio::test]
    async fn test_send_keeps_caller_sender() {
        let (service, sent) = service_with(true, None);
        let mut data = MailData::new("user@example.com", "Hello").from("me@example.com");

        service.send(&mut data, SendOptions::default()).await.unwrap();

        assert_eq!(data.from.as_deref(), Some("me@example.com"));
        assert_eq!(sent.lock().unwrap()[0].from.as_deref(), Some("me@example.com"));
    }

    #[tokio::test]
    async fn test_send_disabled_non_strict() {
        let (service, sent) = service_with(false, None);
        let mut data = MailData::new("user@example.com", "Hello");

        assert!(service.send(&mut data, SendOptions::default()).await.is_ok());
        assert!(sent.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_send_disabled_strict() {
        let (service, sent) = service_with(false, None);
        let mut data = MailData::new("user@example.com", "Hello");

        let err = service.send(&mut data, SendOptions::strict()).await.unwrap_err();
        assert!(matches!(err, MailerError::NotEnabled));
        assert!(sent.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_send_transport_failure_is_normalized() {
        let (service, _sent) = service_with(true, Some("relay down"));
        let mut data = MailData::new("user@example.com", "Hello");

        let err = service.send(&mut data, SendOptions::default()).await.unwrap_err();
        assert!(matches!(err, MailerError::SendFailed { .. }));
        let details = err.data().unwrap();
        assert_eq!(details["email"], "user@example.com");
        assert!(details["error"].as_str().unwrap().contains("relay down"));
    }

    #[tokio::test]
    async fn test_send_validation_failure_is_normalized() {
        let (service, sent) = service_with(true, None);
        let mut data = MailData::new("not-an-address", "Hello");

        let err = service.send(&mut data, SendOptions::default()).await.unwrap_err();
        match err {
            MailerError::SendFailed { email, source } => {
                assert_eq!(email, "not-an-address");
                assert!(matches!(*source, MailerError::Validation(_)));
            }
            other => panic!("Expected SendFailed, got {other:?}"),
        }
        assert!(sent.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_send_unknown_transport_is_normalized() {
        let (service, _sent) = service_with(true, None);
        service.config().set("mailer.transport", "missing");
        let mut data = MailData::new("user@example.com", "Hello");

        let err = service.send(&mut data, SendOptions::default()).await.unwrap_err();
        assert!(err.data().unwrap()["error"]
            .as_str()
            .unwrap()
            .contains("missing"));
    }

    #[tokio::test]
    async fn test_init_transports_checks_active_transport() {
        let (service, _sent, checks) = counting_service(true, None);
        let logs = CapturedLogs::start();

        service.init_transports().await;

        assert_eq!(checks.load(Ordering::SeqCst), 1);
        assert!(logs.contents().contains("Mail transport 'recording' verified"));
    }

    #[tokio::test]
    async fn test_init_transports_logs_failed_check() {
        let (service, _sent, checks) = counting_service(true, Some("unreachable"));
        let logs = CapturedLogs::start();

        service.init_transports().await;

        assert_eq!(checks.load(Ordering::SeqCst), 1);
        let contents = logs.contents();
        assert!(contents.contains("WARN"));
        assert!(contents.contains("unreachable"));
    }

    #[tokio::test]
    async fn test_init_transports_logs_unknown_transport() {
        let (service, _sent, checks) = counting_service(true, None);
        service.config().set("mailer.transport", "missing");
        let logs = CapturedLogs::start();

        service.init_transports().await;

        assert_eq!(checks.load(Ordering::SeqCst), 0);
        let contents = logs.contents();
        assert!(contents.contains("WARN"));
        assert!(contents.contains("missing"));
    }

    #[tokio::test]
    async fn test_send_without_any_sender() {
        let (service, sent) = service_with(true, None);
        service.config().set("mailer.default_sender_address", 0i64);
        let mut data = MailData::new("user@example.com", "Hello");

        let err = service.send(&mut data, SendOptions::default()).await.unwrap_err();

        assert!(data.from.is_none());
        match err {
            MailerError::SendFailed { email, source } => {
                assert_eq!(email, "user@example.com");
                assert!(matches!(*source, MailerError::Config(ref msg) if msg.contains("default_sender_address")));
            }
            other => panic!("Expected SendFailed, got {other:?}"),
        }
        assert!(sent.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_send_empty_default_sender() {
        let (service, sent) = service_with(true, None);
        service.config().set("mailer.default_sender_address", "");
        let mut data = MailData::new("user@example.com", "Hello");

        let err = service.send(&mut data, SendOptions::default()).await.unwrap_err();

        assert!(err.data().unwrap()["error"]
            .as_str()
            .unwrap()
            .contains("default_sender_address"));
        assert!(sent.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_spawn_init_transports() {
        let (service, _sent, checks) = counting_service(true, None);
        let service = Arc::new(service);
        service.spawn_init_transports().await.unwrap();
        assert_eq!(checks.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_test_email() {
        let (service, sent) = service_with(true, None);

        service.test_email("u@x.com").await.unwrap();

        let sent = sent.lock().unwrap();
        assert_eq!(sent.len(), 1);
        assert_eq!(sent[0].to, "u@x.com");
        assert_eq!(sent[0].subject, TEST_EMAIL_SUBJECT);
        assert!(sent[0]
            .text
            .as_deref()
            .unwrap()
            .contains("https://authoring.example.com"));
    }

    #[tokio::test]
    async fn test_test_email_disabled() {
        let (service, sent) = service_with(false, None);

        let err = service.test_email("u@x.com").await.unwrap_err();
        assert!(matches!(err, MailerError::NotEnabled));
        assert!(sent.lock().unwrap().is_empty());
    }
}
