//! Configuration sections.

use heron_telemetry::{LogConfig, LogFormat};
use serde::{Deserialize, Serialize};

/// Default service URL.
pub const DEFAULT_BASE_URL: &str = "http://localhost:8080";

/// Default cap for default-inclusion recursion.
pub const DEFAULT_MAX_DEPTH: usize = 42;

/// Service settings.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(deny_unknown_fields)]
pub struct ServiceConfig {
    /// URL prefix for every generated link, without a trailing `/`.
    #[serde(default = "default_base_url")]
    pub base_url: String,
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
        }
    }
}

fn default_base_url() -> String {
    DEFAULT_BASE_URL.to_string()
}

/// Inclusion settings.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(deny_unknown_fields)]
pub struct InclusionConfig {
    /// Maximum depth followed through `include_by_default` relationships.
    #[serde(default = "default_max_depth")]
    pub max_depth: usize,
}

impl Default for InclusionConfig {
    fn default() -> Self {
        Self {
            max_depth: DEFAULT_MAX_DEPTH,
        }
    }
}

fn default_max_depth() -> usize {
    DEFAULT_MAX_DEPTH
}

/// Logging settings.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(deny_unknown_fields)]
pub struct LoggingConfig {
    /// Install a subscriber.
    #[serde(default = "default_true")]
    pub enabled: bool,

    /// `EnvFilter` directive.
    #[serde(default = "default_log_level")]
    pub level: String,

    /// Output format.
    #[serde(default)]
    pub format: LogFormat,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            level: default_log_level(),
            format: LogFormat::default(),
        }
    }
}

impl From<&LoggingConfig> for LogConfig {
    fn from(config: &LoggingConfig) -> Self {
        let base = match config.format {
            LogFormat::Json => LogConfig::production(),
            LogFormat::Pretty => LogConfig::development(),
        };
        LogConfig {
            enabled: config.enabled,
            ..base.with_level(config.level.clone())
        }
    }
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_true() -> bool {
    true
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        assert_eq!(ServiceConfig::default().base_url, "http://localhost:8080");
        assert_eq!(InclusionConfig::default().max_depth, 42);
        let logging = LoggingConfig::default();
        assert!(logging.enabled);
        assert_eq!(logging.format, LogFormat::Json);
    }

    #[test]
    fn test_partial_section() {
        let config: InclusionConfig = toml::from_str("").unwrap();
        assert_eq!(config.max_depth, 42);

        let config: LoggingConfig = toml::from_str(r#"format = "pretty""#).unwrap();
        assert_eq!(config.format, LogFormat::Pretty);
        assert_eq!(config.level, "info");
    }

    #[test]
    fn test_unknown_field_rejected() {
        let result: Result<ServiceConfig, _> = toml::from_str(r#"base_uri = "http://x""#);
        assert!(result.is_err());
    }

    #[test]
    fn test_log_config_conversion() {
        let logging = LoggingConfig {
            enabled: false,
            level: "heron_dispatch=trace".to_string(),
            format: LogFormat::Pretty,
        };
        let config = LogConfig::from(&logging);
        assert!(!config.enabled);
        assert_eq!(config.level, "heron_dispatch=trace");
        assert_eq!(config.format, LogFormat::Pretty);
        assert!(config.span_events);
    }
}
