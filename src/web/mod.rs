//! Web API module for the mailer.
//!
//! Exposes the operator test-email endpoint alongside a health check and
//! the OpenAPI document.

pub mod dto;
pub mod error;
pub mod handlers;
pub mod router;
pub mod server;

pub use error::ApiError;
pub use router::create_router;
pub use server::WebServer;
