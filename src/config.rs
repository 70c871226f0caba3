//! Application configuration.
//!
//! This module provides configuration options for the analysis service,
//! including the HTTP bind address, discovery limits, pipeline concurrency,
//! per-stage timeouts, and aggregation settings.

use std::net::SocketAddr;
use std::time::Duration;
use thiserror::Error;

/// Errors that can occur during configuration operations.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// An environment variable has an invalid value.
    #[error("Invalid value for {key}: {message}")]
    InvalidValue { key: String, message: String },

    /// Configuration validation failed.
    #[error("Configuration validation failed: {0}")]
    ValidationFailed(String),
}

/// Configuration for the analysis service.
#[derive(Debug, Clone)]
pub struct AppConfig {
    // Server settings
    /// Address the HTTP server binds to.
    pub bind_addr: SocketAddr,

    // Discovery settings
    /// Maximum number of posts to take from a feed.
    pub max_posts: usize,
    /// Timeout for the discovery stage.
    pub discovery_timeout: Duration,

    // Pipeline settings
    /// Maximum number of documents analyzed concurrently.
    pub max_concurrent_extractions: usize,
    /// Timeout for analyzing a single document.
    pub extraction_timeout: Duration,
    /// Timeout for the aggregation stage.
    pub aggregation_timeout: Duration,

    // Aggregation settings
    /// Number of deduplicated themes kept in the final report.
    pub top_theme_count: usize,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            bind_addr: "0.0.0.0:8000".parse().unwrap(),
            max_posts: 10,
            discovery_timeout: Duration::from_secs(30),
            max_concurrent_extractions: 4,
            extraction_timeout: Duration::from_secs(120),
            aggregation_timeout: Duration::from_secs(120),
            top_theme_count: 5,
        }
    }
}

impl AppConfig {
    /// Creates a new configuration with default values.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates configuration from environment variables.
    ///
    /// # Environment Variables
    ///
    /// - `WRITERLENS_BIND_ADDR`: HTTP bind address (default: 0.0.0.0:8000)
    /// - `WRITERLENS_MAX_POSTS`: Maximum posts per feed (default: 10)
    /// - `WRITERLENS_DISCOVERY_TIMEOUT_SECS`: Discovery timeout (default: 30)
    /// - `WRITERLENS_MAX_CONCURRENT_EXTRACTIONS`: Fan-out width (default: 4)
    /// - `WRITERLENS_EXTRACTION_TIMEOUT_SECS`: Per-document timeout (default: 120)
    /// - `WRITERLENS_AGGREGATION_TIMEOUT_SECS`: Aggregation timeout (default: 120)
    /// - `WRITERLENS_TOP_THEME_COUNT`: Themes kept in the report (default: 5)
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if a variable has an invalid value.
    pub fn from_env() -> Result<Self, ConfigError> {
        let mut config = Self::default();

        if let Ok(val) = std::env::var("WRITERLENS_BIND_ADDR") {
            config.bind_addr = val.parse().map_err(|e| ConfigError::InvalidValue {
                key: "WRITERLENS_BIND_ADDR".to_string(),
                message: format!("{}", e),
            })?;
        }

        if let Ok(val) = std::env::var("WRITERLENS_MAX_POSTS") {
            config.max_posts = parse_env("WRITERLENS_MAX_POSTS", &val)?;
        }

        if let Ok(val) = std::env::var("WRITERLENS_DISCOVERY_TIMEOUT_SECS") {
            config.discovery_timeout =
                Duration::from_secs(parse_env("WRITERLENS_DISCOVERY_TIMEOUT_SECS", &val)?);
        }

        if let Ok(val) = std::env::var("WRITERLENS_MAX_CONCURRENT_EXTRACTIONS") {
            config.max_concurrent_extractions =
                parse_env("WRITERLENS_MAX_CONCURRENT_EXTRACTIONS", &val)?;
        }

        if let Ok(val) = std::env::var("WRITERLENS_EXTRACTION_TIMEOUT_SECS") {
            config.extraction_timeout =
                Duration::from_secs(parse_env("WRITERLENS_EXTRACTION_TIMEOUT_SECS", &val)?);
        }

        if let Ok(val) = std::env::var("WRITERLENS_AGGREGATION_TIMEOUT_SECS") {
            config.aggregation_timeout =
                Duration::from_secs(parse_env("WRITERLENS_AGGREGATION_TIMEOUT_SECS", &val)?);
        }

        if let Ok(val) = std::env::var("WRITERLENS_TOP_THEME_COUNT") {
            config.top_theme_count = parse_env("WRITERLENS_TOP_THEME_COUNT", &val)?;
        }

        config.validate()?;
        Ok(config)
    }

    /// Validates the configuration values.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.max_posts == 0 {
            return Err(ConfigError::ValidationFailed(
                "max_posts must be at least 1".to_string(),
            ));
        }
        if self.max_concurrent_extractions == 0 {
            return Err(ConfigError::ValidationFailed(
                "max_concurrent_extractions must be at least 1".to_string(),
            ));
        }
        if self.top_theme_count == 0 {
            return Err(ConfigError::ValidationFailed(
                "top_theme_count must be at least 1".to_string(),
            ));
        }
        Ok(())
    }
}

fn parse_env<T: std::str::FromStr>(key: &str, val: &str) -> Result<T, ConfigError>
where
    T::Err: std::fmt::Display,
{
    val.parse().map_err(|e: T::Err| ConfigError::InvalidValue {
        key: key.to_string(),
        message: e.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = AppConfig::default();
        assert_eq!(config.max_posts, 10);
        assert_eq!(config.max_concurrent_extractions, 4);
        assert_eq!(config.top_theme_count, 5);
        assert_eq!(config.discovery_timeout, Duration::from_secs(30));
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_validate_rejects_zero_concurrency() {
        let config = AppConfig {
            max_concurrent_extractions: 0,
            ..AppConfig::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_validate_rejects_zero_max_posts() {
        let config = AppConfig {
            max_posts: 0,
            ..AppConfig::default()
        };
        assert!(config.validate().is_err());
    }
}
