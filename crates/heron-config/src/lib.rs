//! Layered configuration for Heron.
//!
//! - TOML and JSON files, merged key by key over defaults or a preset
//! - Environment overrides `PREFIX__SECTION__KEY`
//! - Strict parsing: unknown fields are rejected
//!
//! # Example
//!
//! ```no_run
//! use heron_config::{ConfigLoader, HeronConfig};
//!
//! # fn main() -> Result<(), heron_config::ConfigError> {
//! let config: HeronConfig = ConfigLoader::new()
//!     .with_production()
//!     .with_optional_file("heron.toml")?
//!     .with_env_prefix("HERON")
//!     .load()?;
//! # Ok(())
//! # }
//! ```
//!
//! # File Format
//!
//! ```toml
//! [service]
//! base_url = "https://api.example.com"
//!
//! [inclusion]
//! max_depth = 42
//!
//! [logging]
//! enabled = true
//! level = "info"
//! format = "json"
//! ```
//!
//! # Environment Variables
//!
//! - `HERON__SERVICE__BASE_URL`
//! - `HERON__INCLUSION__MAX_DEPTH`
//! - `HERON__LOGGING__ENABLED`, `HERON__LOGGING__LEVEL`, `HERON__LOGGING__FORMAT`

#![doc(html_root_url = "https://docs.rs/heron-config/0.1.0")]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

mod config;
mod error;
mod loader;
mod schema;

pub use config::HeronConfig;
pub use error::ConfigError;
pub use heron_telemetry::LogFormat;
pub use loader::ConfigLoader;
pub use schema::{
    InclusionConfig, LoggingConfig, ServiceConfig, DEFAULT_BASE_URL, DEFAULT_MAX_DEPTH,
};
