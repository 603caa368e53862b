//! Data Transfer Objects for Web API.

pub mod json;
pub mod request;

pub use json::ApiJson;
pub use request::*;
