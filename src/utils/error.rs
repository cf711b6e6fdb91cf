//! Error handling module
//!
//! Defines the error taxonomy used across the gateway

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Application error types
#[derive(Error, Debug)]
pub enum AppError {
    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(#[from] anyhow::Error),

    /// HTTP client error
    #[error("HTTP client error: {0}")]
    HttpClient(#[from] reqwest::Error),

    /// Serialization/deserialization error
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Request validation failed; detected before any provider call
    #[error("Request validation failed: {0}")]
    Validation(String),

    /// Payload exceeds the accepted size bound
    #[error("Payload too large")]
    PayloadTooLarge,

    /// Resource not found
    #[error("Resource not found: {0}")]
    NotFound(String),

    /// Every provider in the chain reported rate limiting
    #[error("Rate limit exceeded, please try again later")]
    RateLimit,

    /// Both primary and secondary providers exhausted
    #[error("Analysis failed: {0}")]
    AnalysisFailed(String),

    /// Service temporarily unavailable
    #[error("Service temporarily unavailable: {0}")]
    ServiceUnavailable(String),

    /// Internal server error
    #[error("Internal server error: {0}")]
    Internal(String),
}

/// Error response body returned to API clients
#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub success: bool,
    /// Error type
    #[serde(rename = "type")]
    pub error_type: String,
    /// Error message
    pub error: String,
}

impl AppError {
    /// Get HTTP status code
    pub fn status_code(&self) -> StatusCode {
        match self {
            AppError::Validation(_) => StatusCode::BAD_REQUEST,
            AppError::PayloadTooLarge => StatusCode::PAYLOAD_TOO_LARGE,
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::RateLimit => StatusCode::TOO_MANY_REQUESTS,
            AppError::ServiceUnavailable(_) => StatusCode::SERVICE_UNAVAILABLE,
            AppError::AnalysisFailed(_)
            | AppError::Config(_)
            | AppError::HttpClient(_)
            | AppError::Serialization(_)
            | AppError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Get error type string
    pub fn error_type(&self) -> &'static str {
        match self {
            AppError::Validation(_) => "invalid_request_error",
            AppError::PayloadTooLarge => "invalid_request_error",
            AppError::NotFound(_) => "not_found_error",
            AppError::RateLimit => "rate_limit_error",
            AppError::ServiceUnavailable(_) => "overloaded_error",
            AppError::AnalysisFailed(_) => "analysis_error",
            AppError::Config(_)
            | AppError::HttpClient(_)
            | AppError::Serialization(_)
            | AppError::Internal(_) => "api_error",
        }
    }

    /// Build the client-facing response body
    pub fn to_error_response(&self) -> ErrorResponse {
        ErrorResponse {
            success: false,
            error_type: self.error_type().to_string(),
            error: self.to_string(),
        }
    }
}

/// Allow errors to be returned directly as HTTP responses
impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status_code();

        if status.is_server_error() {
            tracing::error!("Application error: {} - Status code: {}", self, status);
        } else {
            tracing::warn!("Client error: {} - Status code: {}", self.error_type(), status);
        }

        (status, Json(self.to_error_response())).into_response()
    }
}

/// Result type alias
pub type AppResult<T> = Result<T, AppError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_status_codes() {
        assert_eq!(
            AppError::Validation("test".to_string()).status_code(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(AppError::PayloadTooLarge.status_code(), StatusCode::PAYLOAD_TOO_LARGE);
        assert_eq!(
            AppError::NotFound("item".to_string()).status_code(),
            StatusCode::NOT_FOUND
        );
        assert_eq!(AppError::RateLimit.status_code(), StatusCode::TOO_MANY_REQUESTS);
        assert_eq!(
            AppError::AnalysisFailed("test".to_string()).status_code(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn test_error_types() {
        assert_eq!(
            AppError::Validation("test".to_string()).error_type(),
            "invalid_request_error"
        );
        assert_eq!(AppError::RateLimit.error_type(), "rate_limit_error");
        assert_eq!(
            AppError::AnalysisFailed("test".to_string()).error_type(),
            "analysis_error"
        );
    }

    #[test]
    fn test_error_response_body() {
        let err = AppError::Validation("Invalid image".to_string());
        let body = err.to_error_response();

        assert!(!body.success);
        assert_eq!(body.error_type, "invalid_request_error");
        assert_eq!(body.error, "Request validation failed: Invalid image");
    }
}
