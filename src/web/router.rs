//! Router configuration for Web API.

use axum::{
    routing::{get, post},
    Json, Router,
};
use std::sync::Arc;
use tower_http::trace::TraceLayer;
use utoipa::OpenApi;

use super::dto::TestEmailRequest;
use super::handlers::{self, send_test_email};
use crate::mail::MailService;

/// OpenAPI document for the Web API.
#[derive(OpenApi)]
#[openapi(
    paths(handlers::mailer::send_test_email),
    components(schemas(TestEmailRequest)),
    tags((name = "mailer", description = "Outbound mail"))
)]
pub struct ApiDoc;

/// Create the main API router.
pub fn create_router(service: Arc<MailService>) -> Router {
    let mailer_routes = Router::new().route("/test", post(send_test_email));

    let api_routes = Router::new().nest("/mailer", mailer_routes);

    Router::new()
        .nest("/api", api_routes)
        .layer(TraceLayer::new_for_http())
        .with_state(service)
}

/// Create a health check router.
pub fn create_health_router() -> Router {
    Router::new().route("/health", get(health_check))
}

/// Create a router serving the OpenAPI document.
pub fn create_openapi_router() -> Router {
    Router::new().route("/api-docs/openapi.json", get(openapi_json))
}

/// Health check handler.
async fn health_check() -> &'static str {
    "OK"
}

async fn openapi_json() -> Json<utoipa::openapi::OpenApi> {
    Json(ApiDoc::openapi())
}
