//! Infrastructure layer: document store backends and process configuration.

pub mod config;
pub mod store;

pub use config::{AppConfig, ConfigError};
