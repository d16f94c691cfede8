//! services/chat/src/config.rs
//!
//! Defines the application's configuration structure and loading logic.
//!
//! All configuration is loaded from environment variables at startup. The `.env`
//! file is used for local development.

use std::net::SocketAddr;
use std::path::PathBuf;
use std::time::Duration;
use tracing::Level;

/// A custom error type for configuration loading failures.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Invalid value for the environment variable {0}: {1}")]
    InvalidValue(String, String),
}

/// How templates and static assets are treated.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum BuildMode {
    /// Production build: compiled templates are cached and assets may be
    /// cached by the browser.
    Embedded,
    /// Local development: templates are re-read on every render and assets
    /// are never cached.
    Development,
}

impl BuildMode {
    pub fn is_embedded(self) -> bool {
        self == BuildMode::Embedded
    }

    fn parse(value: &str) -> Result<Self, ConfigError> {
        match value.to_lowercase().as_str() {
            "dev" | "development" => Ok(BuildMode::Development),
            "prod" | "production" | "embedded" => Ok(BuildMode::Embedded),
            other => Err(ConfigError::InvalidValue(
                "APP_ENV".to_string(),
                format!("'{}' is not a known environment", other),
            )),
        }
    }
}

/// Holds all configuration loaded from the environment at startup.
#[derive(Clone, Debug)]
pub struct Config {
    pub bind_address: SocketAddr,
    pub log_level: Level,
    pub build_mode: BuildMode,
    pub build_version: String,
    pub templates_path: PathBuf,
    pub static_path: PathBuf,
    pub shared_path: PathBuf,
    pub shutdown_timeout: Duration,
    pub response_delay: Duration,
}

impl Config {
    /// Loads configuration from environment variables.
    ///
    /// It will look for a `.env` file in the current directory for development,
    /// but this is skipped in test environments to ensure tests are hermetic.
    pub fn from_env() -> Result<Self, ConfigError> {
        // Only load from .env in non-test mode to avoid contamination.
        if !cfg!(test) {
            dotenvy::dotenv().ok();
        }
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Builds the configuration from an arbitrary variable lookup.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let var_or = |key: &str, default: &str| lookup(key).unwrap_or_else(|| default.to_string());

        // --- Server Settings ---
        let bind_address_str = var_or("LISTEN_ADDR", "127.0.0.1:3000");
        let bind_address = bind_address_str
            .parse::<SocketAddr>()
            .map_err(|e| ConfigError::InvalidValue("LISTEN_ADDR".to_string(), e.to_string()))?;

        let log_level_str = var_or("RUST_LOG", "INFO");
        let log_level = log_level_str.parse::<Level>().map_err(|_| {
            ConfigError::InvalidValue(
                "RUST_LOG".to_string(),
                format!("'{}' is not a valid log level", log_level_str),
            )
        })?;

        let shutdown_timeout = millis(&var_or("SHUTDOWN_TIMEOUT_MS", "100"), "SHUTDOWN_TIMEOUT_MS")?;

        // --- Build Settings ---
        let build_mode = BuildMode::parse(&var_or("APP_ENV", "development"))?;
        let build_version = var_or("BUILD_VERSION", "local");

        // --- Asset Locations ---
        let templates_path = PathBuf::from(var_or("TEMPLATES_PATH", "./templates"));
        let static_path = PathBuf::from(var_or("STATIC_PATH", "./static"));
        let shared_path = PathBuf::from(var_or("SHARED_PATH", "./shared"));

        // --- Chat Settings ---
        let response_delay = millis(&var_or("RESPONSE_DELAY_MS", "2000"), "RESPONSE_DELAY_MS")?;

        Ok(Self {
            bind_address,
            log_level,
            build_mode,
            build_version,
            templates_path,
            static_path,
            shared_path,
            shutdown_timeout,
            response_delay,
        })
    }
}

fn millis(value: &str, key: &str) -> Result<Duration, ConfigError> {
    value
        .parse::<u64>()
        .map(Duration::from_millis)
        .map_err(|e| ConfigError::InvalidValue(key.to_string(), e.to_string()))
}
