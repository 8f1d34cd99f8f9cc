//! Starting and stopping the senders named in a [`CourierConfig`].

use std::collections::HashMap;
use std::sync::Arc;

use courier_cloudevents::{BindingKind, set_default_binding, with_cloud_event_validation};
use courier_core::BoxedSender;
use courier_pipe::{PipeSender, SenderStats};
use tracing::{debug, info};

use crate::config::{ConfigLoader, CourierConfig, validate_config};
use crate::error::{RuntimeError, RuntimeResult};

/// The configured senders of one process.
///
/// ```rust,ignore
/// let runtime = CourierRuntime::builder().profile("production").build()?;
/// runtime.sender("orders")?.send(message).await?;
/// runtime.shutdown().await;
/// ```
pub struct CourierRuntime {
    config: CourierConfig,
    senders: Vec<PipeSender>,
    lookup: HashMap<String, BoxedSender>,
}

impl CourierRuntime {
    /// Returns a builder that loads configuration before starting.
    pub fn builder() -> RuntimeBuilder {
        RuntimeBuilder::new()
    }

    /// Validates `config`, starts every sender and then installs the default binding.
    ///
    /// Must be called inside a tokio runtime. An `identity` binding leaves the process
    /// default untouched.
    pub fn from_config(config: CourierConfig) -> RuntimeResult<Self> {
        validate_config(&config)?;

        let mut senders = Vec::with_capacity(config.senders.len());
        let mut lookup = HashMap::with_capacity(config.senders.len());

        for sender_config in &config.senders {
            let sender = PipeSender::new(sender_config.clone())?;
            let handle = sender.handle();
            let boxed: BoxedSender = if config.cloud_events.validate_on_send {
                Arc::new(with_cloud_event_validation(handle, None))
            } else {
                Arc::new(handle)
            };
            lookup.insert(sender_config.name.clone(), boxed);
            senders.push(sender);
        }

        if config.cloud_events.binding != BindingKind::Identity {
            set_default_binding(config.cloud_events.binding.build())?;
            debug!(binding = ?config.cloud_events.binding, "Installed default binding");
        }

        info!(
            senders = senders.len(),
            validate_on_send = config.cloud_events.validate_on_send,
            "Courier runtime started"
        );

        Ok(Self {
            config,
            senders,
            lookup,
        })
    }

    /// Returns the configuration the runtime was started from.
    pub fn config(&self) -> &CourierConfig {
        &self.config
    }

    /// Returns the sender with the given name.
    pub fn sender(&self, name: &str) -> RuntimeResult<BoxedSender> {
        self.lookup
            .get(name)
            .cloned()
            .ok_or_else(|| RuntimeError::SenderNotFound(name.to_string()))
    }

    /// Returns the names of all senders, in configuration order.
    pub fn sender_names(&self) -> Vec<&str> {
        self.config.senders.iter().map(|s| s.name.as_str()).collect()
    }

    /// Returns delivery counters for the named sender.
    pub fn stats(&self, name: &str) -> Option<Arc<SenderStats>> {
        self.config
            .senders
            .iter()
            .position(|s| s.name == name)
            .map(|i| self.senders[i].stats())
    }

    /// Shuts down every sender, waiting for queued frames to be attempted.
    pub async fn shutdown(self) {
        for sender in self.senders {
            sender.shutdown().await;
        }
        info!("Courier runtime stopped");
    }
}

/// Builder that loads configuration and starts a [`CourierRuntime`].
#[derive(Default)]
pub struct RuntimeBuilder {
    loader: ConfigLoader,
}

impl RuntimeBuilder {
    /// Creates a builder with the default configuration loader.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets a specific configuration file.
    pub fn config_file<P: AsRef<std::path::Path>>(mut self, path: P) -> Self {
        self.loader = self.loader.file(path);
        self
    }

    /// Sets the configuration profile.
    pub fn profile(mut self, profile: impl AsRef<str>) -> Self {
        self.loader = self.loader.profile(profile);
        self
    }

    /// Adds a search path for configuration files.
    pub fn search_path<P: AsRef<std::path::Path>>(mut self, path: P) -> Self {
        self.loader = self.loader.search_path(path);
        self
    }

    /// Disables environment variable overrides.
    pub fn without_env(mut self) -> Self {
        self.loader = self.loader.without_env();
        self
    }

    /// Merges programmatic configuration below files and environment variables.
    pub fn merge(mut self, config: CourierConfig) -> Self {
        self.loader = self.loader.merge(config);
        self
    }

    /// Loads the configuration and starts the runtime.
    pub fn build(self) -> RuntimeResult<CourierRuntime> {
        CourierRuntime::from_config(self.loader.load()?)
    }
}
