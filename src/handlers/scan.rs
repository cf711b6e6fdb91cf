//! Scan handlers
//!
//! Full produce scan (analysis + carbon enrichment + persistence) and the
//! lightweight live multi-item detection endpoint

use crate::handlers::AppState;
use crate::models::{FreshnessOutcome, LiveScanResult};
use crate::services::carbon;
use crate::utils::error::{AppError, AppResult};
use axum::{extract::State, Json};
use serde::Deserialize;
use serde_json::json;
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Scan request body
#[derive(Debug, Deserialize)]
pub struct ScanRequest {
    pub image: Option<String>,
}

/// Analyze a produce image, enrich it with carbon data, and persist a copy
///
/// POST /api/scan
pub async fn scan_image(
    State(state): State<Arc<AppState>>,
    Json(request): Json<ScanRequest>,
) -> AppResult<Json<serde_json::Value>> {
    let image = request
        .image
        .ok_or_else(|| AppError::Validation("No image provided".to_string()))?;

    match state.analysis.analyze_freshness(&image).await? {
        FreshnessOutcome::NotProduce { message } => {
            info!("Scan classified as non-produce");
            Ok(Json(json!({
                "success": false,
                "not_produce": true,
                "message": message,
            })))
        }
        FreshnessOutcome::Analysis(analysis) => {
            let mut analysis = *analysis;
            info!(
                "Scan analyzed: {} (score: {})",
                analysis.item_name, analysis.freshness_score
            );

            analysis.carbon_footprint = carbon::lookup(&analysis.item_name);

            // Persistence is best effort; a scan is still useful unsaved
            let mut value = serde_json::to_value(&analysis)?;
            match state.scan_store.save(&analysis).await {
                Ok(id) => {
                    value["id"] = json!(id);
                }
                Err(err) => {
                    debug!("Scan persistence skipped: {}", err);
                }
            }

            Ok(Json(value))
        }
    }
}

/// Live multi-item detection.
///
/// POST /api/scan/live
/// Never surfaces an error to the caller: a camera preview polling this
/// endpoint treats every failure as "nothing detected".
pub async fn scan_live(
    State(state): State<Arc<AppState>>,
    Json(request): Json<ScanRequest>,
) -> Json<LiveScanResult> {
    let Some(image) = request.image else {
        return Json(LiveScanResult::default());
    };

    match state.analysis.detect_items(&image).await {
        Ok(result) => {
            debug!("Live detection found {} items", result.detections.len());
            Json(result)
        }
        Err(err) => {
            warn!("Live detection failed: {}", err);
            Json(LiveScanResult::default())
        }
    }
}
