//! Application configuration settings
//!
//! Defines all configuration structures and loading logic

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

/// Main application configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Settings {
    /// Server configuration
    pub server: ServerConfig,
    /// Primary provider (Gemini) configuration
    pub gemini: GeminiConfig,
    /// Fallback provider (OpenRouter) configuration
    pub openrouter: OpenRouterConfig,
    /// Logging configuration
    pub logging: LoggingConfig,
}

/// Server configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    /// Listen host
    pub host: String,
    /// Listen port
    pub port: u16,
}

/// Gemini API configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GeminiConfig {
    /// API key
    pub api_key: String,
    /// API base URL
    pub base_url: String,
    /// Model name
    pub model: String,
    /// Request timeout in seconds
    pub timeout: u64,
}

/// OpenRouter API configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OpenRouterConfig {
    /// API key
    pub api_key: String,
    /// API base URL
    pub base_url: String,
    /// Model name
    pub model: String,
    /// Request timeout in seconds
    pub timeout: u64,
    /// Referer header OpenRouter asks integrators to send
    pub referer: String,
    /// Application title header
    pub title: String,
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Log level
    pub level: String,
    /// Log format (text/json)
    pub format: String,
}

impl Settings {
    /// Create a new configuration instance from the environment
    pub fn new() -> Result<Self> {
        // Load .env file if it exists
        dotenv::dotenv().ok();

        let settings = Self {
            server: ServerConfig {
                host: get_env_or_default("SERVER_HOST", "0.0.0.0"),
                port: get_env_or_default("SERVER_PORT", "3000")
                    .parse()
                    .context("Invalid port number")?,
            },
            gemini: GeminiConfig {
                api_key: std::env::var("GEMINI_API_KEY")
                    .context("GEMINI_API_KEY environment variable not set")?,
                base_url: get_env_or_default(
                    "GEMINI_BASE_URL",
                    "https://generativelanguage.googleapis.com",
                ),
                model: get_env_or_default("GEMINI_MODEL", "gemini-2.5-flash"),
                timeout: get_env_or_default("PROVIDER_TIMEOUT", "30")
                    .parse()
                    .context("Invalid timeout value")?,
            },
            openrouter: OpenRouterConfig {
                api_key: std::env::var("OPENROUTER_API_KEY")
                    .context("OPENROUTER_API_KEY environment variable not set")?,
                base_url: get_env_or_default("OPENROUTER_BASE_URL", "https://openrouter.ai/api/v1"),
                model: get_env_or_default("OPENROUTER_MODEL", "google/gemini-2.5-flash-lite"),
                timeout: get_env_or_default("PROVIDER_TIMEOUT", "30")
                    .parse()
                    .context("Invalid timeout value")?,
                referer: get_env_or_default("OPENROUTER_REFERER", "https://freshgate.app"),
                title: get_env_or_default("OPENROUTER_TITLE", "FreshGate Server"),
            },
            logging: LoggingConfig {
                level: get_env_or_default("RUST_LOG", "info"),
                format: get_env_or_default("LOG_FORMAT", "text"),
            },
        };

        settings.validate()?;

        Ok(settings)
    }

    /// Validate configuration validity
    fn validate(&self) -> Result<()> {
        if self.server.port == 0 {
            anyhow::bail!("Port number cannot be 0");
        }

        for (name, key) in [
            ("Gemini", &self.gemini.api_key),
            ("OpenRouter", &self.openrouter.api_key),
        ] {
            if key.is_empty() {
                anyhow::bail!("{} API key cannot be empty", name);
            }
            if key.contains(char::is_whitespace) {
                anyhow::bail!("{} API key cannot contain whitespace characters", name);
            }
            if key.len() < 8 {
                anyhow::bail!("{} API key must be at least 8 characters long", name);
            }
        }

        for (name, url) in [
            ("Gemini", &self.gemini.base_url),
            ("OpenRouter", &self.openrouter.base_url),
        ] {
            if !url.starts_with("http") {
                anyhow::bail!("Invalid {} base URL format, should start with 'http'", name);
            }
        }

        if self.gemini.timeout == 0 || self.openrouter.timeout == 0 {
            anyhow::bail!("Timeout values cannot be 0");
        }

        let valid_levels = ["trace", "debug", "info", "warn", "error"];
        if !valid_levels.contains(&self.logging.level.as_str()) {
            anyhow::bail!("Invalid log level: {}", self.logging.level);
        }

        let valid_formats = ["text", "json"];
        if !valid_formats.contains(&self.logging.format.as_str()) {
            anyhow::bail!("Invalid log format: {}", self.logging.format);
        }

        Ok(())
    }
}

/// Get environment variable or default value
fn get_env_or_default(key: &str, default: &str) -> String {
    std::env::var(key).unwrap_or_else(|_| default.to_string())
}
