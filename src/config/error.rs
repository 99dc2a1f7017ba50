//! Configuration error types

use thiserror::Error;

/// Errors that can occur during configuration loading
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Configuration loading failed: {0}")]
    LoadError(#[from] config::ConfigError),

    #[error("Validation failed: {0}")]
    ValidationFailed(#[from] ValidationError),
}

/// Errors that can occur during configuration validation
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ValidationError {
    #[error("Required configuration missing: {0}")]
    MissingRequired(&'static str),

    #[error("Invalid generation timeout (must be 1-300 seconds)")]
    InvalidTimeout,

    #[error("Invalid temperature (must be between 0.0 and 2.0)")]
    InvalidTemperature,

    #[error("Invalid base URL: {0}")]
    InvalidBaseUrl(String),

    #[error("explore_turns ({explore}) must not be below rapport_turns ({rapport})")]
    InvalidStageOrder { rapport: usize, explore: usize },

    #[error("min_readiness must be between 0 and 10, got {0}")]
    InvalidReadiness(u8),

    #[error("Invalid reply limits: {0}")]
    InvalidReplyLimits(&'static str),

    #[error("Invalid history window: {0}")]
    InvalidHistoryWindow(&'static str),

    #[error("Target stance must be 'pro' or 'anti', got '{0}'")]
    InvalidTargetStance(String),

    #[error("Invalid log level: {0}")]
    InvalidLogLevel(String),
}
