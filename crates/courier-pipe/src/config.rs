//! Pipe sender configuration.

use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Configuration for a [`PipeSender`](crate::PipeSender).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PipeSenderConfig {
    /// Name of the sender instance.
    pub name: String,

    /// Channel name; defaults to `name`.
    #[serde(default)]
    pub pipe_name: Option<String>,

    /// Whether payloads are compressed unless a message overrides it.
    #[serde(default)]
    pub compressed: bool,

    /// Value stamped into the originating-system header when the message has none.
    #[serde(default = "default_originating_system")]
    pub originating_system: String,

    /// How long to wait for a listener, in milliseconds. Zero probes without waiting.
    #[serde(default)]
    pub connect_timeout_ms: u64,
}

fn default_originating_system() -> String {
    "NamedPipe".to_string()
}

impl PipeSenderConfig {
    /// Creates a config whose channel name equals the sender name.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            pipe_name: None,
            compressed: false,
            originating_system: default_originating_system(),
            connect_timeout_ms: 0,
        }
    }

    /// Sets the channel name.
    pub fn with_pipe_name(mut self, pipe_name: impl Into<String>) -> Self {
        self.pipe_name = Some(pipe_name.into());
        self
    }

    /// Enables or disables compression by default.
    pub fn with_compression(mut self, compressed: bool) -> Self {
        self.compressed = compressed;
        self
    }

    /// Sets the originating-system marker.
    pub fn with_originating_system(mut self, system: impl Into<String>) -> Self {
        self.originating_system = system.into();
        self
    }

    /// Sets how long to wait for a listener.
    pub fn with_connect_timeout(mut self, timeout: Duration) -> Self {
        self.connect_timeout_ms = u64::try_from(timeout.as_millis()).unwrap_or(u64::MAX);
        self
    }

    /// Returns the effective channel name.
    pub fn pipe_name(&self) -> &str {
        self.pipe_name.as_deref().unwrap_or(&self.name)
    }

    /// Returns the connect timeout.
    pub fn connect_timeout(&self) -> Duration {
        Duration::from_millis(self.connect_timeout_ms)
    }
}
