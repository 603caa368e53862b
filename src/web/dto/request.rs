//! Request DTOs for Web API.

use serde::Deserialize;
use utoipa::ToSchema;

/// Test email request.
///
/// The address is validated by the mail service as part of the message, so
/// a disabled service reports that before any address problem.
#[derive(Debug, Deserialize, ToSchema)]
pub struct TestEmailRequest {
    /// Recipient of the test email.
    #[serde(default)]
    #[schema(example = "admin@example.com")]
    pub email: String,
}
