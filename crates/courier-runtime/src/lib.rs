//! Courier Runtime - configuration, logging and sender startup.
//!
//! This crate provides:
//! - Layered configuration loading (`ConfigLoader`, `CourierConfig`)
//! - Logging setup (`LoggingBuilder`, `logging::init_from_config`)
//! - Starting the configured named-channel senders (`CourierRuntime`)
//!
//! ```ignore
//! use courier_runtime::{CourierRuntime, config::load_config, logging};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = load_config()?;
//!     logging::init_from_config(&config.logging);
//!
//!     let runtime = CourierRuntime::from_config(config)?;
//!     // ...
//!     runtime.shutdown().await;
//!     Ok(())
//! }
//! ```

pub mod config;
pub mod error;
pub mod logging;
pub mod runtime;

pub use config::{ConfigError, ConfigLoader, ConfigResult, CourierConfig};
pub use error::{RuntimeError, RuntimeResult};
pub use logging::LoggingBuilder;
pub use runtime::{CourierRuntime, RuntimeBuilder};

// Re-export tracing for use by other crates
pub use tracing;
pub use tracing_subscriber;

/// Commonly used logging macros.
pub mod prelude {
    pub use tracing::{Level, debug, error, info, instrument, span, trace, warn};
}
