//! Application configuration module
//!
//! This module provides type-safe configuration loading from environment variables
//! using the `config` and `dotenvy` crates. Configuration is loaded with the
//! `COUNTERPOINT` prefix and nested values use double underscores as separators.
//! Every section has defaults, so an empty environment loads.
//!
//! # Example
//!
//! ```no_run
//! use counterpoint::config::AppConfig;
//!
//! let config = AppConfig::load().expect("Failed to load configuration");
//! config.validate().expect("Invalid configuration");
//!
//! println!("Topics from {}", config.storage.topics_file.display());
//! ```

mod ai;
mod conversation;
mod error;
mod logging;
mod storage;

pub use ai::AiConfig;
pub use conversation::ConversationConfig;
pub use error::{ConfigError, ValidationError};
pub use logging::LoggingConfig;
pub use storage::StorageConfig;

use serde::Deserialize;

/// Root application configuration
#[derive(Debug, Clone, Default, Deserialize)]
pub struct AppConfig {
    /// Generation provider (OpenAI) and call limits
    #[serde(default)]
    pub ai: AiConfig,

    /// Stage thresholds, reply limits, history window, target stance
    #[serde(default)]
    pub conversation: ConversationConfig,

    /// Topic catalog and session archive locations
    #[serde(default)]
    pub storage: StorageConfig,

    /// Log level and format
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl AppConfig {
    /// Load configuration from environment variables
    ///
    /// This function:
    /// 1. Loads `.env` file if present (for development)
    /// 2. Reads environment variables with `COUNTERPOINT` prefix
    /// 3. Uses `__` (double underscore) to separate nested values
    /// 4. Deserializes into typed configuration structs
    ///
    /// # Environment Variable Format
    ///
    /// - `COUNTERPOINT__AI__TIMEOUT_SECS=20` -> `ai.timeout_secs = 20`
    /// - `COUNTERPOINT__CONVERSATION__TARGET_STANCE=anti` -> `conversation.target_stance = "anti"`
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if values cannot be parsed into expected types.
    pub fn load() -> Result<Self, ConfigError> {
        // Load .env file if present (development)
        dotenvy::dotenv().ok();

        let config = config::Config::builder()
            .add_source(
                config::Environment::default()
                    .prefix("COUNTERPOINT")
                    .separator("__"),
            )
            .build()?
            .try_deserialize()?;

        Ok(config)
    }

    /// Validate all configuration values
    ///
    /// # Errors
    ///
    /// Returns `ValidationError` if any configuration value is invalid.
    pub fn validate(&self) -> Result<(), ValidationError> {
        self.ai.validate()?;
        self.conversation.validate()?;
        self.storage.validate()?;
        self.logging.validate()?;
        Ok(())
    }
}
