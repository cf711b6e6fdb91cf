//! FreshGate Library
//!
//! AI analysis gateway for grocery freshness scanning: multi-provider
//! fallback, circuit breaking, tolerant model-output extraction, and
//! carbon-footprint enrichment

pub mod config;
pub mod handlers;
pub mod middleware;
pub mod models;
pub mod providers;
pub mod services;
pub mod utils;

// Re-export common types
pub use config::Settings;
pub use handlers::{create_router, AppState};
pub use providers::{GeminiProvider, OpenRouterProvider, Provider, ProviderError};
pub use services::{AnalysisService, CircuitBreaker, SystemClock};
pub use utils::error::{AppError, AppResult};

/// Library version information
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Library name
pub const NAME: &str = env!("CARGO_PKG_NAME");
