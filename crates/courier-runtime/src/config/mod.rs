//! Configuration module for Courier.
//!
//! Loads logging, cloud event and sender settings from files and environment variables,
//! and validates them before anything is started.

pub mod error;
pub mod loader;
pub mod schema;
pub mod validation;

pub use error::{ConfigError, ConfigResult};
pub use loader::{ConfigLoader, Profile, load_config, load_config_from_file};
pub use schema::{
    CloudEventsConfig, CourierConfig, LogFormat, LogLevel, LogOutput, LogRotation, LoggingConfig,
};
pub use validation::validate_config;
