//! Configuration schema definitions.

use std::collections::BTreeMap;
use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;

use courier_cloudevents::BindingKind;
use courier_pipe::PipeSenderConfig;
use serde::{Deserialize, Serialize};

/// Root configuration structure.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CourierConfig {
    /// Logging settings.
    #[serde(default)]
    pub logging: LoggingConfig,

    /// Cloud event settings.
    #[serde(default)]
    pub cloud_events: CloudEventsConfig,

    /// Named-channel senders to start.
    #[serde(default)]
    pub senders: Vec<PipeSenderConfig>,
}

// =============================================================================
// Logging
// =============================================================================

/// Log verbosity.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    Trace,
    Debug,
    #[default]
    Info,
    Warn,
    Error,
}

impl LogLevel {
    /// Returns the level name as used in filter directives.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Trace => "trace",
            Self::Debug => "debug",
            Self::Info => "info",
            Self::Warn => "warn",
            Self::Error => "error",
        }
    }

    /// Converts to a `tracing` level.
    pub fn to_tracing_level(self) -> tracing::Level {
        match self {
            Self::Trace => tracing::Level::TRACE,
            Self::Debug => tracing::Level::DEBUG,
            Self::Info => tracing::Level::INFO,
            Self::Warn => tracing::Level::WARN,
            Self::Error => tracing::Level::ERROR,
        }
    }
}

impl fmt::Display for LogLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for LogLevel {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "trace" => Ok(Self::Trace),
            "debug" => Ok(Self::Debug),
            "info" => Ok(Self::Info),
            "warn" | "warning" => Ok(Self::Warn),
            "error" => Ok(Self::Error),
            other => Err(format!("unknown log level: {other}")),
        }
    }
}

/// Log line layout.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Compact,
    Full,
    Pretty,
    /// Requires the `json-log` feature; falls back to `Full` without it.
    Json,
}

/// Log destination.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogOutput {
    #[default]
    Stdout,
    Stderr,
    File,
}

/// How often file output starts a new file.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogRotation {
    #[default]
    Never,
    Hourly,
    Daily,
}

/// Logging configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Base level, applied when `RUST_LOG` is unset.
    #[serde(default)]
    pub level: LogLevel,

    #[serde(default)]
    pub format: LogFormat,

    #[serde(default)]
    pub output: LogOutput,

    /// Log file path, used when `output` is `file`.
    #[serde(default)]
    pub file_path: Option<PathBuf>,

    #[serde(default)]
    pub rotation: LogRotation,

    /// Include thread ids in each line.
    #[serde(default)]
    pub thread_ids: bool,

    /// Include source file and line in each line.
    #[serde(default)]
    pub file_location: bool,

    /// Per-target levels, e.g. `courier_pipe = "trace"`.
    #[serde(default)]
    pub filters: BTreeMap<String, LogLevel>,
}

// =============================================================================
// Cloud Events
// =============================================================================

/// Cloud event configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CloudEventsConfig {
    /// Binding installed as the process default at startup.
    #[serde(default)]
    pub binding: BindingKind,

    /// Run cloud event validation on every message sent through a configured sender.
    #[serde(default = "default_validate_on_send")]
    pub validate_on_send: bool,
}

impl Default for CloudEventsConfig {
    fn default() -> Self {
        Self {
            binding: BindingKind::default(),
            validate_on_send: default_validate_on_send(),
        }
    }
}

fn default_validate_on_send() -> bool {
    true
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = CourierConfig::default();
        assert_eq!(config.logging.level, LogLevel::Info);
        assert_eq!(config.cloud_events.binding, BindingKind::Identity);
        assert!(config.cloud_events.validate_on_send);
        assert!(config.senders.is_empty());
    }

    #[test]
    fn test_deserialize_full() {
        let config: CourierConfig = serde_json::from_str(
            r#"{
                "logging": { "level": "debug", "filters": { "courier_pipe": "trace" } },
                "cloud_events": { "binding": { "kind": "prefixed", "prefix": "x-ce-" } },
                "senders": [{ "name": "orders", "compressed": true }]
            }"#,
        )
        .unwrap();

        assert_eq!(config.logging.level, LogLevel::Debug);
        assert_eq!(config.logging.filters["courier_pipe"], LogLevel::Trace);
        assert_eq!(
            config.cloud_events.binding,
            BindingKind::Prefixed {
                prefix: "x-ce-".into()
            }
        );
        assert_eq!(config.senders[0].pipe_name(), "orders");
        assert!(config.senders[0].compressed);
    }

    #[test]
    fn test_log_level_from_str() {
        assert_eq!("WARNING".parse::<LogLevel>().unwrap(), LogLevel::Warn);
        assert!("loud".parse::<LogLevel>().is_err());
    }
}
