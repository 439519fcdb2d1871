//! Structured logging for Heron.
//!
//! Heron logs through `tracing`. This crate installs the process-wide
//! subscriber: a `fmt` layer in JSON or pretty form behind an `EnvFilter`.
//!
//! # Example
//!
//! ```rust,no_run
//! use heron_telemetry::{init_logging, LogConfig};
//!
//! init_logging(&LogConfig::production()).expect("logging");
//! tracing::info!(resource_type = "tasks", "registry ready");
//! ```

#![doc(html_root_url = "https://docs.rs/heron-telemetry/0.1.0")]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

pub mod error;
pub mod logging;

pub use error::TelemetryError;
pub use logging::{create_env_filter, init_logging, LogConfig, LogFormat};

/// Result type for telemetry operations.
pub type TelemetryResult<T> = Result<T, TelemetryError>;
