//! Carbon footprint handlers

use crate::models::CarbonFootprint;
use crate::services::carbon;
use crate::utils::error::{AppError, AppResult};
use axum::{extract::Path, Json};
use tracing::debug;

/// Look up the carbon footprint of one item by name
///
/// GET /api/carbon/:item
pub async fn lookup_carbon(Path(item): Path<String>) -> AppResult<Json<CarbonFootprint>> {
    debug!("Carbon lookup for '{}'", item);

    carbon::lookup(&item).map(Json).ok_or_else(|| {
        AppError::NotFound(format!("'{}' is not in the carbon database", item))
    })
}

/// List the full emissions table
///
/// GET /api/carbon
pub async fn list_carbon() -> Json<Vec<CarbonFootprint>> {
    Json(carbon::all())
}
