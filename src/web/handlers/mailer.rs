//! Mailer handlers for Web API.

use axum::{extract::State, http::StatusCode};
use std::sync::Arc;

use crate::mail::MailService;
use crate::web::dto::{ApiJson, TestEmailRequest};
use crate::web::error::ApiError;

/// POST /api/mailer/test - Send a test email.
///
/// Sends a message with a fixed subject to the given address through the
/// active transport. Responds with an empty `200` once the transport
/// accepts it. The enablement check comes first; the address is checked
/// with the rest of the message and fails like any other send.
#[utoipa::path(
    post,
    path = "/api/mailer/test",
    tag = "mailer",
    request_body = TestEmailRequest,
    responses(
        (status = 200, description = "Test email sent"),
        (status = 400, description = "Malformed request body"),
        (status = 500, description = "Invalid address or sending failed; details carry the recipient and cause"),
        (status = 503, description = "Mail is not enabled")
    )
)]
pub async fn send_test_email(
    State(service): State<Arc<MailService>>,
    ApiJson(req): ApiJson<TestEmailRequest>,
) -> Result<StatusCode, ApiError> {
    service.test_email(&req.email).await?;
    Ok(StatusCode::OK)
}
