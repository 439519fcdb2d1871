//! Root configuration type.

use crate::{ConfigError, InclusionConfig, LoggingConfig, ServiceConfig};
use heron_telemetry::{create_env_filter, LogConfig, LogFormat};
use serde::{Deserialize, Serialize};

/// Complete Heron configuration.
///
/// # Example
///
/// ```
/// use heron_config::HeronConfig;
///
/// let config = HeronConfig::default();
/// assert_eq!(config.service.base_url, "http://localhost:8080");
/// assert_eq!(config.inclusion.max_depth, 42);
/// ```
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(deny_unknown_fields)]
pub struct HeronConfig {
    /// Service settings.
    #[serde(default)]
    pub service: ServiceConfig,

    /// Inclusion settings.
    #[serde(default)]
    pub inclusion: InclusionConfig,

    /// Logging settings.
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl HeronConfig {
    /// Pretty `debug` logging.
    #[must_use]
    pub fn development() -> Self {
        Self {
            logging: LoggingConfig {
                enabled: true,
                level: "debug".to_string(),
                format: LogFormat::Pretty,
            },
            ..Self::default()
        }
    }

    /// JSON `info` logging.
    #[must_use]
    pub fn production() -> Self {
        Self {
            logging: LoggingConfig {
                enabled: true,
                level: "info".to_string(),
                format: LogFormat::Json,
            },
            ..Self::default()
        }
    }

    /// Checks value constraints serde cannot express.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::InvalidValue` if:
    /// - `service.base_url` is empty or ends with `/`
    /// - `inclusion.max_depth` is 0
    /// - `logging.level` is not a valid filter directive while logging is enabled
    pub fn validate(&self) -> Result<(), ConfigError> {
        let base_url = &self.service.base_url;
        if base_url.is_empty() {
            return Err(ConfigError::invalid_value("service.base_url", "must not be empty"));
        }
        if base_url.ends_with('/') {
            return Err(ConfigError::invalid_value(
                "service.base_url",
                format!("must not end with '/': {base_url}"),
            ));
        }

        if self.inclusion.max_depth == 0 {
            return Err(ConfigError::invalid_value("inclusion.max_depth", "must be at least 1"));
        }

        if self.logging.enabled {
            create_env_filter(&self.logging.level)
                .map_err(|e| ConfigError::invalid_value("logging.level", e.to_string()))?;
        }

        Ok(())
    }

    /// Returns the telemetry configuration for [`heron_telemetry::init_logging`].
    #[must_use]
    pub fn log_config(&self) -> LogConfig {
        LogConfig::from(&self.logging)
    }
}
