//! Provider module
//!
//! Defines the Provider trait and the transport-level outcome classification
//! shared by the concrete provider clients

pub mod gemini;
pub mod openrouter;

use crate::models::ChatMessage;
use async_trait::async_trait;
use thiserror::Error;

/// Media attachment: base64 payload plus MIME tag
#[derive(Debug, Clone)]
pub struct MediaPayload {
    pub mime_type: String,
    pub data: String,
}

/// One provider-agnostic generation request.
///
/// Each client adapts this into its own wire shape; the instruction
/// semantics stay identical across providers.
#[derive(Debug, Clone)]
pub struct GenerationRequest {
    /// Task instruction
    pub instruction: String,
    /// Optional assistant persona / system preamble
    pub system: Option<String>,
    /// Bounded conversation history, oldest first
    pub history: Vec<ChatMessage>,
    /// At most one media attachment
    pub media: Option<MediaPayload>,
    /// Output token cap
    pub max_tokens: u32,
    /// Sampling temperature
    pub temperature: f32,
}

impl GenerationRequest {
    /// Plain text request without media or history
    pub fn text(instruction: impl Into<String>, max_tokens: u32, temperature: f32) -> Self {
        Self {
            instruction: instruction.into(),
            system: None,
            history: Vec::new(),
            media: None,
            max_tokens,
            temperature,
        }
    }

    /// Request carrying a single media attachment
    pub fn with_media(
        instruction: impl Into<String>,
        media: MediaPayload,
        max_tokens: u32,
        temperature: f32,
    ) -> Self {
        Self {
            instruction: instruction.into(),
            system: None,
            history: Vec::new(),
            media: Some(media),
            max_tokens,
            temperature,
        }
    }
}

/// Transport-level provider failure.
///
/// A 2xx response whose text content is not parsable structured data is NOT
/// a failure at this layer; extraction is the orchestrator's concern.
#[derive(Error, Debug, Clone)]
pub enum ProviderError {
    /// Provider signaled quota exhaustion (HTTP 429 or a quota marker)
    #[error("Provider rate limited (retry after {retry_after_secs:?}s)")]
    RateLimited { retry_after_secs: Option<u64> },

    /// Network error, timeout, or non-2xx response
    #[error("Transient provider failure: {0}")]
    Transient(String),

    /// 2xx response whose envelope carried no usable text content
    #[error("Invalid provider response: {0}")]
    Invalid(String),
}

impl ProviderError {
    pub fn is_rate_limit(&self) -> bool {
        matches!(self, ProviderError::RateLimited { .. })
    }
}

/// Provider trait for the AI backends consulted in fallback order
#[async_trait]
pub trait Provider: Send + Sync {
    /// Provider name, used for breaker bookkeeping and logs
    fn name(&self) -> &str;

    /// Run one generation call; never panics, never returns a bare transport error
    async fn generate(&self, request: &GenerationRequest) -> Result<String, ProviderError>;
}

/// Whether an error body carries a quota/rate-limit marker
pub(crate) fn has_rate_limit_marker(body: &str) -> bool {
    let lower = body.to_lowercase();
    lower.contains("resource_exhausted")
        || lower.contains("rate limit")
        || lower.contains("rate_limit")
        || lower.contains("quota")
}

/// Parse a Retry-After header value in seconds, when present
pub(crate) fn parse_retry_after(response: &reqwest::Response) -> Option<u64> {
    response
        .headers()
        .get("retry-after")
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.trim().parse().ok())
}

/// Map a reqwest transport error into a ProviderError
pub(crate) fn transport_error(provider: &str, err: reqwest::Error) -> ProviderError {
    if err.is_timeout() {
        ProviderError::Transient(format!("{} request timed out", provider))
    } else {
        ProviderError::Transient(format!("{} request failed: {}", provider, err))
    }
}

pub use gemini::GeminiProvider;
pub use openrouter::OpenRouterProvider;
