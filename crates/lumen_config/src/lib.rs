//! Service configuration for the Lumen analysis cache.
//!
//! Provides the typed [`ServiceConfig`] with its defaults, loading and
//! validation of `lumen.toml`, and humane duration parsing for the
//! dependency re-check interval.

#![warn(missing_docs)]

pub mod error;
pub mod loader;
pub mod types;

pub use error::ConfigError;
pub use loader::{load_config, load_config_from_str};
pub use types::ServiceConfig;
