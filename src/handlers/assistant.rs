//! Voice assistant handlers
//!
//! Conversational voice/text chat with optional wake-word gating and TTS,
//! plus batch shopping guidance

use crate::handlers::AppState;
use crate::models::{ChatMessage, ShoppingGuidance};
use crate::providers::MediaPayload;
use crate::services::VoiceChatInput;
use crate::utils::error::{AppError, AppResult};
use axum::{extract::State, Json};
use base64::{engine::general_purpose, Engine};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{info, warn};

/// Characters of the reply forwarded to the speech sink
const SPEECH_PREVIEW_CHARS: usize = 500;

/// Voice chat request body
#[derive(Debug, Deserialize)]
pub struct VoiceChatRequest {
    pub audio: Option<String>,
    #[serde(alias = "mimeType")]
    pub mime_type: Option<String>,
    pub text: Option<String>,
    #[serde(default)]
    pub history: Vec<ChatMessage>,
    #[serde(alias = "wakeWord")]
    pub wake_word: Option<String>,
}

/// Voice chat response body
#[derive(Debug, Serialize)]
pub struct VoiceChatResponse {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub wake_word_detected: Option<bool>,
    pub transcript: String,
    pub response: String,
    /// Base64 audio of the reply, when the speech sink produced one
    pub audio: Option<String>,
}

/// Conversational voice assistant turn
///
/// POST /api/assistant/voice-chat
pub async fn voice_chat(
    State(state): State<Arc<AppState>>,
    Json(request): Json<VoiceChatRequest>,
) -> AppResult<Json<VoiceChatResponse>> {
    let audio = match (request.audio, request.mime_type) {
        (Some(data), Some(mime_type)) => Some(MediaPayload { mime_type, data }),
        (Some(_), None) => {
            return Err(AppError::Validation(
                "Audio input requires a mime_type".to_string(),
            ))
        }
        (None, _) => None,
    };

    let input = VoiceChatInput {
        audio,
        text: request.text,
        history: request.history,
        wake_word: request.wake_word,
    };

    let turn = state.analysis.voice_chat(input).await?;

    // Wake-word miss ends the turn without TTS
    if turn.wake_word_detected == Some(false) && turn.response.is_empty() {
        return Ok(Json(VoiceChatResponse {
            wake_word_detected: Some(false),
            transcript: String::new(),
            response: String::new(),
            audio: None,
        }));
    }

    info!(
        "Voice chat turn: transcript {} chars, response {} chars",
        turn.transcript.len(),
        turn.response.len()
    );

    // TTS is best effort; the text reply stands on its own
    let preview: String = turn.response.chars().take(SPEECH_PREVIEW_CHARS).collect();
    let audio = match state.speech.synthesize(&preview).await {
        Ok(Some(bytes)) => Some(general_purpose::STANDARD.encode(bytes)),
        Ok(None) => None,
        Err(err) => {
            warn!("TTS failed, returning text only: {}", err);
            None
        }
    };

    Ok(Json(VoiceChatResponse {
        wake_word_detected: turn.wake_word_detected,
        transcript: turn.transcript,
        response: turn.response,
        audio,
    }))
}

/// Shopping guidance request body
#[derive(Debug, Deserialize)]
pub struct ShoppingRequest {
    pub items: Option<Vec<String>>,
}

/// Batch produce picking tips
///
/// POST /api/assistant/shopping
pub async fn shopping_guidance(
    State(state): State<Arc<AppState>>,
    Json(request): Json<ShoppingRequest>,
) -> AppResult<Json<ShoppingGuidance>> {
    let items = request
        .items
        .filter(|items| !items.is_empty())
        .ok_or_else(|| AppError::Validation("Please provide an array of items".to_string()))?;

    let guidance = state.analysis.shopping_guidance(&items).await?;
    Ok(Json(guidance))
}
