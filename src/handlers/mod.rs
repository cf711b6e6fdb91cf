//! HTTP handlers module
//!
//! Contains all HTTP endpoint handling logic

pub mod analyze;
pub mod assistant;
pub mod carbon;
pub mod chat;
pub mod health;
pub mod recipes;
pub mod scan;

use crate::config::Settings;
use crate::middleware::logging::request_logging_middleware;
use crate::providers::{GeminiProvider, OpenRouterProvider, Provider};
use crate::services::{
    AnalysisService, DisabledSpeech, MemoryScanStore, ScanStore, SpeechSynthesizer, SystemClock,
};
use anyhow::Result;
use axum::{
    extract::DefaultBodyLimit,
    routing::{get, post},
    Router,
};
use std::sync::Arc;
use tower::ServiceBuilder;
use tower_http::{
    cors::{Any, CorsLayer},
    limit::RequestBodyLimitLayer,
    trace::TraceLayer,
};

/// Request bodies carry base64 media up to 5 MB plus JSON overhead
const MAX_BODY_BYTES: usize = 16 * 1024 * 1024;

/// Application state
pub struct AppState {
    pub settings: Settings,
    pub analysis: Arc<AnalysisService>,
    pub scan_store: Arc<dyn ScanStore>,
    pub speech: Arc<dyn SpeechSynthesizer>,
}

impl AppState {
    /// Build state with real providers in primary-then-fallback order
    pub fn from_settings(settings: Settings) -> Result<Self> {
        let gemini: Arc<dyn Provider> = Arc::new(GeminiProvider::new(settings.gemini.clone())?);
        let openrouter: Arc<dyn Provider> =
            Arc::new(OpenRouterProvider::new(settings.openrouter.clone())?);

        let clock = Arc::new(SystemClock::new());
        let analysis = Arc::new(AnalysisService::new(vec![gemini, openrouter], clock));

        Ok(Self {
            settings,
            analysis,
            scan_store: Arc::new(MemoryScanStore::new()),
            speech: Arc::new(DisabledSpeech),
        })
    }
}

/// Create application router
pub async fn create_router(settings: Settings) -> Result<Router> {
    let state = Arc::new(AppState::from_settings(settings)?);
    Ok(router_with_state(state))
}

/// Assemble routes and middleware around prepared state
pub fn router_with_state(state: Arc<AppState>) -> Router {
    let middleware_stack = ServiceBuilder::new()
        .layer(TraceLayer::new_for_http())
        // Raise axum's 2 MB default so 5 MB base64 media fits, then cap hard
        .layer(DefaultBodyLimit::max(MAX_BODY_BYTES))
        .layer(RequestBodyLimitLayer::new(MAX_BODY_BYTES))
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        );

    Router::new()
        .route("/api/scan", post(scan::scan_image))
        .route("/api/scan/live", post(scan::scan_live))
        .route("/api/analyze/freshness", post(analyze::analyze_freshness))
        .route("/api/analyze/barcode", post(analyze::analyze_barcode))
        .route("/api/recipes", post(recipes::generate_recipes))
        .route("/api/chat", post(chat::chat))
        .route("/api/assistant/voice-chat", post(assistant::voice_chat))
        .route("/api/assistant/shopping", post(assistant::shopping_guidance))
        .route("/api/carbon", get(carbon::list_carbon))
        .route("/api/carbon/:item", get(carbon::lookup_carbon))
        .route("/health", get(health::health_check))
        .route("/health/live", get(health::liveness_check))
        .layer(axum::middleware::from_fn(request_logging_middleware))
        .with_state(state)
        .layer(middleware_stack)
}
