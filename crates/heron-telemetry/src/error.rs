//! Telemetry error types.

use thiserror::Error;

/// Errors raised while setting up logging.
#[derive(Debug, Error)]
pub enum TelemetryError {
    /// The filter directive could not be parsed.
    #[error("Invalid log filter '{directive}': {message}")]
    InvalidFilter {
        /// Directive as given.
        directive: String,
        /// Parser message.
        message: String,
    },

    /// A global subscriber is already installed, or installing it failed.
    #[error("Failed to initialize logging: {0}")]
    LoggingInit(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = TelemetryError::InvalidFilter {
            directive: "heron=loud".to_string(),
            message: "invalid level".to_string(),
        };
        assert_eq!(err.to_string(), "Invalid log filter 'heron=loud': invalid level");

        let err = TelemetryError::LoggingInit("already set".to_string());
        assert_eq!(err.to_string(), "Failed to initialize logging: already set");
    }
}
