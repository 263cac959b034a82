//! Configuration utilities.

/// `rentscout.toml` loading, validation and hot reload.
pub mod toml_config;

pub use toml_config::{ConfigError, ConfigManager, RentScoutConfig};
