//! Gemini provider implementation
//!
//! Primary vision/language backend, called through the generateContent API

use super::{
    has_rate_limit_marker, parse_retry_after, transport_error, GenerationRequest, Provider,
    ProviderError,
};
use crate::config::settings::GeminiConfig;
use crate::models::gemini::*;
use crate::utils::logging::truncate_content;
use anyhow::{Context, Result};
use async_trait::async_trait;
use reqwest::Client;
use std::time::Duration;
use tracing::{debug, warn};

/// Gemini provider client
pub struct GeminiProvider {
    client: Client,
    config: GeminiConfig,
}

impl GeminiProvider {
    /// Create a new Gemini client
    pub fn new(config: GeminiConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout))
            .user_agent(concat!("freshgate/", env!("CARGO_PKG_VERSION")))
            .build()
            .context("Failed to create Gemini HTTP client")?;

        Ok(Self { client, config })
    }

    /// Build the generateContent request URL
    fn build_url(&self) -> String {
        let base_url = self.config.base_url.trim_end_matches('/');
        format!(
            "{}/v1beta/models/{}:generateContent?key={}",
            base_url, self.config.model, self.config.api_key
        )
    }

    /// Flatten system preamble, history, and instruction into one text part.
    ///
    /// Gemini has no system role in this call shape, so conversational tasks
    /// send the dialogue as a role-labeled transcript followed by the turn.
    fn build_text(request: &GenerationRequest) -> String {
        if request.system.is_none() && request.history.is_empty() {
            return request.instruction.clone();
        }

        let mut lines = Vec::new();
        if let Some(system) = &request.system {
            lines.push(system.clone());
        }
        for message in &request.history {
            let role = if message.role == "assistant" { "Assistant" } else { "User" };
            lines.push(format!("{}: {}", role, message.content));
        }
        lines.push(format!("User: {}", request.instruction));
        lines.push("Assistant:".to_string());
        lines.join("\n")
    }
}

#[async_trait]
impl Provider for GeminiProvider {
    fn name(&self) -> &str {
        "gemini"
    }

    async fn generate(&self, request: &GenerationRequest) -> Result<String, ProviderError> {
        let mut parts = vec![GeminiPart::Text {
            text: Self::build_text(request),
        }];

        if let Some(media) = &request.media {
            parts.push(GeminiPart::InlineData {
                inline_data: GeminiInlineData {
                    mime_type: media.mime_type.clone(),
                    data: media.data.clone(),
                },
            });
        }

        let body = GeminiRequest {
            contents: vec![GeminiContent {
                role: Some("user".to_string()),
                parts,
            }],
            generation_config: Some(GeminiGenerationConfig {
                max_output_tokens: Some(request.max_tokens),
                temperature: Some(request.temperature),
            }),
        };

        debug!("Sending Gemini generateContent request (model: {})", self.config.model);

        let response = self
            .client
            .post(self.build_url())
            .header("Content-Type", "application/json")
            .json(&body)
            .send()
            .await
            .map_err(|e| transport_error("gemini", e))?;

        let status = response.status();
        let retry_after = parse_retry_after(&response);
        let text = response
            .text()
            .await
            .map_err(|e| transport_error("gemini", e))?;

        if status.is_success() {
            let parsed: GeminiResponse = serde_json::from_str(&text).map_err(|e| {
                ProviderError::Invalid(format!(
                    "unparsable Gemini envelope: {} - body: {}",
                    e,
                    truncate_content(&text, 200)
                ))
            })?;

            return parsed
                .first_text()
                .ok_or_else(|| ProviderError::Invalid("Gemini returned no text content".to_string()));
        }

        if status.as_u16() == 429 || has_rate_limit_marker(&text) {
            warn!("Gemini rate limited: {}", truncate_content(&text, 200));
            return Err(ProviderError::RateLimited {
                retry_after_secs: retry_after,
            });
        }

        let message = serde_json::from_str::<GeminiErrorResponse>(&text)
            .map(|e| e.error.message)
            .unwrap_or_else(|_| truncate_content(&text, 200));
        warn!("Gemini request failed ({}): {}", status, message);
        Err(ProviderError::Transient(format!(
            "Gemini API error ({}): {}",
            status, message
        )))
    }
}
