//! Logging middleware
//!
//! Records HTTP request and response information

use axum::{
    extract::Request,
    http::{Method, Uri},
    middleware::Next,
    response::Response,
};
use std::time::Instant;
use tracing::{info, warn};
use uuid::Uuid;

/// Request logging middleware
///
/// Tags each request with an id and records method, path, status, and duration
pub async fn request_logging_middleware(
    method: Method,
    uri: Uri,
    request: Request,
    next: Next,
) -> Response {
    let start_time = Instant::now();
    let request_id = Uuid::new_v4().to_string();

    let span = tracing::info_span!(
        "http_request",
        request_id = %request_id,
        method = %method,
        path = %uri.path(),
    );
    let _enter = span.enter();

    info!("Request started: {} {}", method, uri.path());

    let response = next.run(request).await;

    let duration = start_time.elapsed();
    let status = response.status();

    if status.is_success() {
        info!(
            "Request completed: {} - Duration: {:.2}ms",
            status,
            duration.as_secs_f64() * 1000.0
        );
    } else if status.is_client_error() {
        warn!(
            "Client error: {} - Duration: {:.2}ms",
            status,
            duration.as_secs_f64() * 1000.0
        );
    } else {
        warn!(
            "Server error: {} - Duration: {:.2}ms",
            status,
            duration.as_secs_f64() * 1000.0
        );
    }

    response
}
