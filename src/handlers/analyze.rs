//! Analysis handlers
//!
//! Freshness and packaged-item analysis endpoints. Each returns either the
//! normalized record or a category-mismatch verdict guiding the client to
//! retry under the other mode.

use crate::handlers::AppState;
use crate::models::{FreshnessOutcome, PackagedOutcome};
use crate::utils::error::{AppError, AppResult};
use axum::{extract::State, Json};
use serde::Deserialize;
use serde_json::json;
use std::sync::Arc;
use tracing::info;

/// Analysis request body
#[derive(Debug, Deserialize)]
pub struct AnalyzeImageRequest {
    #[serde(alias = "base64Image")]
    pub base64_image: Option<String>,
}

/// Freshness analysis of a single perishable item
///
/// POST /api/analyze/freshness
pub async fn analyze_freshness(
    State(state): State<Arc<AppState>>,
    Json(request): Json<AnalyzeImageRequest>,
) -> AppResult<Json<serde_json::Value>> {
    let image = request
        .base64_image
        .ok_or_else(|| AppError::Validation("Invalid or missing image".to_string()))?;

    match state.analysis.analyze_freshness(&image).await? {
        FreshnessOutcome::NotProduce { message } => Ok(Json(json!({
            "success": false,
            "not_produce": true,
            "message": message,
        }))),
        FreshnessOutcome::Analysis(analysis) => {
            info!("Freshness analysis: {}", analysis.item_name);
            Ok(Json(json!({
                "success": true,
                "data": *analysis,
            })))
        }
    }
}

/// Packaged-item analysis; the record carries no freshness fields
///
/// POST /api/analyze/barcode
pub async fn analyze_barcode(
    State(state): State<Arc<AppState>>,
    Json(request): Json<AnalyzeImageRequest>,
) -> AppResult<Json<serde_json::Value>> {
    let image = request
        .base64_image
        .ok_or_else(|| AppError::Validation("Invalid or missing image".to_string()))?;

    match state.analysis.analyze_packaged(&image).await? {
        PackagedOutcome::NotPackaged { message } => Ok(Json(json!({
            "success": false,
            "not_packaged": true,
            "message": message,
        }))),
        PackagedOutcome::Packaged(item) => {
            info!("Packaged-item analysis: {}", item.name);
            Ok(Json(json!({
                "success": true,
                "data": *item,
            })))
        }
    }
}
