//! Transport registry.

use std::collections::HashMap;
use std::sync::Arc;

use crate::config::ConfigStore;
use crate::transport::{MailTransport, TransportFactory};
use crate::{MailerError, Result};

/// Registered transports, keyed by name.
#[derive(Default)]
pub struct TransportRegistry {
    transports: HashMap<String, Arc<dyn MailTransport>>,
}

impl TransportRegistry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a transport and add it under its name.
    ///
    /// A factory that fails, or a transport without a name, is logged and
    /// skipped; registration itself never fails. A transport whose name is
    /// already registered replaces the earlier one.
    pub fn register<F: TransportFactory>(&mut self, factory: F, config: &ConfigStore) {
        let transport = match factory.build(config) {
            Ok(transport) => transport,
            Err(e) => {
                tracing::error!("Failed to register mail transport: {}", e);
                return;
            }
        };

        let name = transport.name().to_string();
        if name.is_empty() {
            tracing::error!("Failed to register mail transport: transport has no name");
            return;
        }

        if self.transports.insert(name.clone(), Arc::new(transport)).is_some() {
            tracing::debug!("Replaced mail transport '{}'", name);
        } else {
            tracing::debug!("Registered mail transport '{}'", name);
        }
    }

    /// Look up a transport by name.
    pub fn get(&self, name: &str) -> Result<Arc<dyn MailTransport>> {
        self.transports.get(name).cloned().ok_or_else(|| {
            MailerError::Config(format!("no mail transport registered with name '{name}'"))
        })
    }

    /// Registered names, sorted.
    pub fn names(&self) -> Vec<String> {
        let mut names: Vec<_> = self.transports.keys().cloned().collect();
        names.sort();
        names
    }

    /// Number of registered transports.
    pub fn len(&self) -> usize {
        self.transports.len()
    }

    /// Whether no transport is registered.
    pub fn is_empty(&self) -> bool {
        self.transports.is_empty()
    }
}

impl std::fmt::Debug for TransportRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TransportRegistry")
            .field("transports", &self.names())
            .finish()
    }
}
