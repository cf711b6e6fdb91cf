//! OpenRouter provider implementation
//!
//! Fallback aggregator reached through an OpenAI-style chat completions API.
//! Media rides inside the message content array as a data-URI attachment
//! instead of a dedicated vision call.

use super::{
    has_rate_limit_marker, parse_retry_after, transport_error, GenerationRequest, Provider,
    ProviderError,
};
use crate::config::settings::OpenRouterConfig;
use crate::models::openrouter::*;
use crate::utils::logging::truncate_content;
use anyhow::{Context, Result};
use async_trait::async_trait;
use reqwest::Client;
use std::time::Duration;
use tracing::{debug, warn};

/// OpenRouter provider client
pub struct OpenRouterProvider {
    client: Client,
    config: OpenRouterConfig,
}

impl OpenRouterProvider {
    /// Create a new OpenRouter client
    pub fn new(config: OpenRouterConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout))
            .user_agent(concat!("freshgate/", env!("CARGO_PKG_VERSION")))
            .build()
            .context("Failed to create OpenRouter HTTP client")?;

        Ok(Self { client, config })
    }

    /// Build the chat completions request URL
    fn build_url(&self) -> String {
        let base_url = self.config.base_url.trim_end_matches('/');
        format!("{}/chat/completions", base_url)
    }

    /// Adapt the generation request into a chat message array
    fn build_messages(request: &GenerationRequest) -> Vec<OpenRouterMessage> {
        let mut messages = Vec::new();

        if let Some(system) = &request.system {
            messages.push(OpenRouterMessage {
                role: "system".to_string(),
                content: OpenRouterContent::Text(system.clone()),
            });
        }

        for message in &request.history {
            let role = if message.role == "assistant" { "assistant" } else { "user" };
            messages.push(OpenRouterMessage {
                role: role.to_string(),
                content: OpenRouterContent::Text(message.content.clone()),
            });
        }

        let content = match &request.media {
            Some(media) => OpenRouterContent::Parts(vec![
                OpenRouterContentPart::Text {
                    text: request.instruction.clone(),
                },
                OpenRouterContentPart::ImageUrl {
                    image_url: OpenRouterImageUrl {
                        url: format!("data:{};base64,{}", media.mime_type, media.data),
                    },
                },
            ]),
            None => OpenRouterContent::Text(request.instruction.clone()),
        };

        messages.push(OpenRouterMessage {
            role: "user".to_string(),
            content,
        });

        messages
    }
}

#[async_trait]
impl Provider for OpenRouterProvider {
    fn name(&self) -> &str {
        "openrouter"
    }

    async fn generate(&self, request: &GenerationRequest) -> Result<String, ProviderError> {
        let body = OpenRouterRequest {
            model: self.config.model.clone(),
            messages: Self::build_messages(request),
            max_tokens: Some(request.max_tokens),
            temperature: Some(request.temperature),
        };

        debug!("Sending OpenRouter chat completion request (model: {})", self.config.model);

        let response = self
            .client
            .post(self.build_url())
            .header("Authorization", format!("Bearer {}", self.config.api_key))
            .header("Content-Type", "application/json")
            .header("HTTP-Referer", &self.config.referer)
            .header("X-Title", &self.config.title)
            .json(&body)
            .send()
            .await
            .map_err(|e| transport_error("openrouter", e))?;

        let status = response.status();
        let retry_after = parse_retry_after(&response);
        let text = response
            .text()
            .await
            .map_err(|e| transport_error("openrouter", e))?;

        if status.is_success() {
            let parsed: OpenRouterResponse = serde_json::from_str(&text).map_err(|e| {
                ProviderError::Invalid(format!(
                    "unparsable OpenRouter envelope: {} - body: {}",
                    e,
                    truncate_content(&text, 200)
                ))
            })?;

            return parsed
                .first_content()
                .map(|content| content.trim().to_string())
                .filter(|content| !content.is_empty())
                .ok_or_else(|| {
                    ProviderError::Invalid("OpenRouter returned no message content".to_string())
                });
        }

        if status.as_u16() == 429 || has_rate_limit_marker(&text) {
            warn!("OpenRouter rate limited: {}", truncate_content(&text, 200));
            return Err(ProviderError::RateLimited {
                retry_after_secs: retry_after,
            });
        }

        let message = serde_json::from_str::<OpenRouterErrorResponse>(&text)
            .map(|e| e.error.message)
            .unwrap_or_else(|_| truncate_content(&text, 200));
        warn!("OpenRouter request failed ({}): {}", status, message);
        Err(ProviderError::Transient(format!(
            "OpenRouter API error ({}): {}",
            status, message
        )))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::ChatMessage;
    use crate::providers::MediaPayload;

    fn test_config() -> OpenRouterConfig {
        OpenRouterConfig {
            api_key: "test-key-12345".to_string(),
            base_url: "https://openrouter.ai/api/v1".to_string(),
            model: "google/gemini-2.5-flash-lite".to_string(),
            timeout: 30,
            referer: "https://freshgate.app".to_string(),
            title: "FreshGate Server".to_string(),
        }
    }

    #[test]
    fn test_build_url() {
        let provider = OpenRouterProvider::new(test_config()).unwrap();
        assert_eq!(provider.build_url(), "https://openrouter.ai/api/v1/chat/completions");
    }

    #[test]
    fn test_media_becomes_data_uri_part() {
        let media = MediaPayload {
            mime_type: "image/png".to_string(),
            data: "iVBORtest".to_string(),
        };
        let request = GenerationRequest::with_media("Analyze this", media, 400, 0.1);

        let messages = OpenRouterProvider::build_messages(&request);
        assert_eq!(messages.len(), 1);

        let json = serde_json::to_string(&messages[0]).unwrap();
        assert!(json.contains("data:image/png;base64,iVBORtest"));
        assert!(json.contains("Analyze this"));
    }

    #[test]
    fn test_system_and_history_precede_turn() {
        let mut request = GenerationRequest::text("What now?", 500, 0.7);
        request.system = Some("You are Chris.".to_string());
        request.history = vec![ChatMessage {
            role: "assistant".to_string(),
            content: "Hello!".to_string(),
        }];

        let messages = OpenRouterProvider::build_messages(&request);
        assert_eq!(messages.len(), 3);
        assert_eq!(messages[0].role, "system");
        assert_eq!(messages[1].role, "assistant");
        assert_eq!(messages[2].role, "user");
    }
}
