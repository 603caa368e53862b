//! Mail module.
//!
//! This module provides outbound mail functionality including:
//! - The mail data model and send options
//! - The transport registry
//! - The mail service (validation, default sender, dispatch, error normalization)

mod registry;
mod service;
mod types;

pub use registry::TransportRegistry;
pub use service::{MailService, TEST_EMAIL_SUBJECT};
pub use types::{MailData, SendOptions};
