//! Text assistant handler

use crate::handlers::AppState;
use crate::models::ChatMessage;
use crate::services::ChatContext;
use crate::utils::error::{AppError, AppResult};
use axum::{extract::State, Json};
use serde::Deserialize;
use serde_json::json;
use std::sync::Arc;

/// User data forwarded alongside the chat turn
#[derive(Debug, Deserialize, Default)]
pub struct ChatContextRequest {
    #[serde(default, alias = "collectionNames")]
    pub collection_names: String,
    #[serde(default, alias = "fridgeItems")]
    pub fridge_items: String,
}

/// Chat request body
#[derive(Debug, Deserialize)]
pub struct ChatRequest {
    pub message: Option<String>,
    #[serde(default, alias = "conversationHistory")]
    pub conversation_history: Vec<ChatMessage>,
    #[serde(default)]
    pub context: ChatContextRequest,
}

/// One text assistant turn with collection/fridge context
///
/// POST /api/chat
pub async fn chat(
    State(state): State<Arc<AppState>>,
    Json(request): Json<ChatRequest>,
) -> AppResult<Json<serde_json::Value>> {
    let message = request
        .message
        .ok_or_else(|| AppError::Validation("Message is required".to_string()))?;

    let context = ChatContext {
        collection_names: request.context.collection_names,
        fridge_items: request.context.fridge_items,
    };

    let reply = state
        .analysis
        .chat(&message, &request.conversation_history, &context)
        .await?;

    Ok(Json(json!({
        "success": true,
        "message": reply,
    })))
}
