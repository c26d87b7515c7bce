// Middleware for authentication and error accounting

use axum::{
    extract::{Request, State},
    http::header,
    middleware::Next,
    response::Response,
};
use std::sync::Arc;

use super::handlers::AppError;
use super::WellnessServer;

/// Paths that stay reachable without an API key
const OPEN_PATHS: &[&str] = &["/health"];

/// Extract an API key from `Authorization: Bearer <key>` or `x-api-key`
fn presented_key(request: &Request) -> Option<&str> {
    let headers = request.headers();

    if let Some(value) = headers
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
    {
        if let Some(key) = value.strip_prefix("Bearer ") {
            return Some(key.trim());
        }
    }

    headers.get("x-api-key").and_then(|v| v.to_str().ok())
}

/// Reject requests without a configured API key when auth is enabled
pub async fn auth_middleware(
    State(server): State<Arc<WellnessServer>>,
    request: Request,
    next: Next,
) -> Result<Response, AppError> {
    let settings = &server.config().server;
    if !settings.auth_enabled || OPEN_PATHS.contains(&request.uri().path()) {
        return Ok(next.run(request).await);
    }

    let authorized = presented_key(&request)
        .map(|key| settings.api_keys.iter().any(|k| k == key))
        .unwrap_or(false);

    if !authorized {
        tracing::warn!(path = %request.uri().path(), "Rejected request without valid API key");
        return Err(AppError::Unauthorized);
    }

    Ok(next.run(request).await)
}

/// Count 4xx and 5xx responses in the service metrics
pub async fn track_errors(
    State(server): State<Arc<WellnessServer>>,
    request: Request,
    next: Next,
) -> Response {
    let response = next.run(request).await;
    let status = response.status();

    if status.is_client_error() {
        server.metrics().record_error("client");
    } else if status.is_server_error() {
        server.metrics().record_error("server");
    }

    response
}
