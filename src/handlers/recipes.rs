//! Recipe generation handler

use crate::handlers::AppState;
use crate::models::RecipeSuggestion;
use crate::utils::error::{AppError, AppResult};
use axum::{extract::State, Json};
use serde::Deserialize;
use std::sync::Arc;
use tracing::info;

/// Recipe request body
#[derive(Debug, Deserialize)]
pub struct RecipesRequest {
    pub items: Option<Vec<String>>,
}

/// Generate recipes from expiring items
///
/// POST /api/recipes
pub async fn generate_recipes(
    State(state): State<Arc<AppState>>,
    Json(request): Json<RecipesRequest>,
) -> AppResult<Json<Vec<RecipeSuggestion>>> {
    let items = request
        .items
        .filter(|items| !items.is_empty())
        .ok_or_else(|| AppError::Validation("Please provide an array of items".to_string()))?;

    let recipes = state.analysis.generate_recipes(&items).await?;
    info!("Generated {} recipes from {} ingredients", recipes.len(), items.len());

    Ok(Json(recipes))
}
