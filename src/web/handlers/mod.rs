//! API handlers for the mailer Web API.

pub mod mailer;

pub use mailer::*;
