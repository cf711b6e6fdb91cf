//! OpenRouter chat completions API data models

use serde::{Deserialize, Serialize};

/// OpenRouter chat completion request
#[derive(Debug, Clone, Serialize)]
pub struct OpenRouterRequest {
    pub model: String,
    pub messages: Vec<OpenRouterMessage>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_tokens: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub temperature: Option<f32>,
}

/// Chat message; content is plain text or a multimodal part array
#[derive(Debug, Clone, Serialize)]
pub struct OpenRouterMessage {
    pub role: String,
    pub content: OpenRouterContent,
}

/// Message content shapes
#[derive(Debug, Clone, Serialize)]
#[serde(untagged)]
pub enum OpenRouterContent {
    Text(String),
    Parts(Vec<OpenRouterContentPart>),
}

/// One multimodal content part
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "type")]
pub enum OpenRouterContentPart {
    #[serde(rename = "text")]
    Text { text: String },
    #[serde(rename = "image_url")]
    ImageUrl { image_url: OpenRouterImageUrl },
}

/// Image attachment as a data URI
#[derive(Debug, Clone, Serialize)]
pub struct OpenRouterImageUrl {
    pub url: String,
}

/// OpenRouter chat completion response
#[derive(Debug, Clone, Deserialize)]
pub struct OpenRouterResponse {
    #[serde(default)]
    pub choices: Vec<OpenRouterChoice>,
}

/// One response choice
#[derive(Debug, Clone, Deserialize)]
pub struct OpenRouterChoice {
    pub message: OpenRouterResponseMessage,
}

/// Response message content
#[derive(Debug, Clone, Deserialize)]
pub struct OpenRouterResponseMessage {
    #[serde(default)]
    pub content: Option<String>,
}

impl OpenRouterResponse {
    /// Content of the first choice, if any
    pub fn first_content(&self) -> Option<&str> {
        self.choices
            .first()
            .and_then(|choice| choice.message.content.as_deref())
    }
}

/// OpenRouter error envelope
#[derive(Debug, Clone, Deserialize)]
pub struct OpenRouterErrorResponse {
    pub error: OpenRouterError,
}

/// Error detail
#[derive(Debug, Clone, Deserialize)]
pub struct OpenRouterError {
    #[serde(default)]
    pub message: String,
    #[serde(default)]
    pub code: Option<u16>,
}
