//! Named schema validation.
//!
//! Structured data is checked against a schema looked up by name. Schemas
//! wrap a type deriving `validator::Validate`: the data must deserialize into
//! that type and then pass its validation rules.

use std::collections::HashMap;
use std::marker::PhantomData;
use std::sync::Arc;

use serde::de::DeserializeOwned;
use serde::Serialize;
use validator::{Validate, ValidationErrors};

use crate::mail::MailData;
use crate::{MailerError, Result};

/// Name of the schema outbound mail is validated against.
pub const MAIL_DATA_SCHEMA: &str = "maildata";

/// A schema that structured data can be validated against.
pub trait Schema: Send + Sync {
    /// Validate the data, describing every failure in the error.
    fn validate(&self, data: &serde_json::Value) -> Result<()>;
}

/// Schema backed by a `Validate` type.
pub struct ValidatedSchema<T> {
    _marker: PhantomData<fn() -> T>,
}

impl<T> ValidatedSchema<T> {
    /// Create a schema for `T`.
    pub fn new() -> Self {
        Self {
            _marker: PhantomData,
        }
    }
}

impl<T> Default for ValidatedSchema<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> Schema for ValidatedSchema<T>
where
    T: DeserializeOwned + Validate,
{
    fn validate(&self, data: &serde_json::Value) -> Result<()> {
        let value: T = serde_json::from_value(data.clone())
            .map_err(|e| MailerError::Validation(e.to_string()))?;
        value
            .validate()
            .map_err(|e| MailerError::Validation(describe_errors(&e)))
    }
}

/// Registry of schemas by name.
#[derive(Clone, Default)]
pub struct SchemaRegistry {
    schemas: HashMap<String, Arc<dyn Schema>>,
}

impl SchemaRegistry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a registry holding the built-in schemas.
    pub fn with_defaults() -> Self {
        let mut registry = Self::new();
        registry.register(MAIL_DATA_SCHEMA, ValidatedSchema::<MailData>::new());
        registry
    }

    /// Register a schema, replacing any schema with the same name.
    pub fn register(&mut self, name: impl Into<String>, schema: impl Schema + 'static) {
        self.schemas.insert(name.into(), Arc::new(schema));
    }

    /// Fetch a schema by name.
    pub fn get_schema(&self, name: &str) -> Result<Arc<dyn Schema>> {
        self.schemas
            .get(name)
            .cloned()
            .ok_or_else(|| MailerError::Config(format!("no schema named '{name}'")))
    }

    /// Validate data against the named schema.
    pub fn validate<T: Serialize>(&self, name: &str, data: &T) -> Result<()> {
        let schema = self.get_schema(name)?;
        schema.validate(&serde_json::to_value(data)?)
    }
}

impl std::fmt::Debug for SchemaRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mut names: Vec<_> = self.schemas.keys().collect();
        names.sort();
        f.debug_struct("SchemaRegistry")
            .field("schemas", &names)
            .finish()
    }
}

/// Flatten field errors into `field: message; ...`, sorted by field.
fn describe_errors(errors: &ValidationErrors) -> String {
    let mut parts: Vec<String> = errors
        .field_errors()
        .into_iter()
        .flat_map(|(field, field_errors)| {
            field_errors.iter().map(move |e| {
                let message = e
                    .message
                    .as_ref()
                    .map(|m| m.to_string())
                    .unwrap_or_else(|| format!("invalid value ({})", e.code));
                format!("{field}: {message}")
            })
        })
        .collect();
    parts.sort();
    parts.join("; ")
}

// ============================================================================
// Custom Validators
// ============================================================================

/// Validate a single-line header value: not blank, no control characters.
///
/// CR and LF are rejected too, so values cannot smuggle extra headers.
pub fn header_line(value: &str) -> std::result::Result<(), validator::ValidationError> {
    if value.trim().is_empty() {
        return Err(validator::ValidationError::new("header_line")
            .with_message("Must not be empty".into()));
    }
    if value.chars().any(|c| c.is_control() && c != '\t') {
        return Err(validator::ValidationError::new("header_line")
            .with_message("Must not contain control characters or line breaks".into()));
    }
    Ok(())
}
