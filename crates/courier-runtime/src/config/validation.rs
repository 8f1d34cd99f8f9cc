//! Configuration validation utilities.

use std::collections::HashSet;

use courier_cloudevents::BindingKind;
use courier_pipe::PipeSenderConfig;

use super::error::{ConfigError, ConfigResult};
use super::schema::{CourierConfig, LogOutput, LoggingConfig};

/// Validates the entire configuration.
pub fn validate_config(config: &CourierConfig) -> ConfigResult<()> {
    validate_logging_config(&config.logging)?;
    validate_binding(&config.cloud_events.binding)?;
    validate_senders_config(&config.senders)?;
    Ok(())
}

fn validate_logging_config(logging: &LoggingConfig) -> ConfigResult<()> {
    if logging.output == LogOutput::File && logging.file_path.is_none() {
        return Err(ConfigError::missing_field("logging.file_path"));
    }

    if logging.filters.keys().any(|target| target.trim().is_empty()) {
        return Err(ConfigError::validation("Log filter targets cannot be empty"));
    }

    Ok(())
}

fn validate_binding(binding: &BindingKind) -> ConfigResult<()> {
    if let BindingKind::Prefixed { prefix } = binding {
        if prefix.is_empty() {
            return Err(ConfigError::validation(
                "Prefixed binding requires a non-empty prefix",
            ));
        }
    }
    Ok(())
}

fn validate_senders_config(senders: &[PipeSenderConfig]) -> ConfigResult<()> {
    let mut names = HashSet::new();
    let mut pipes = HashSet::new();

    for sender in senders {
        validate_sender_config(sender)?;

        if !names.insert(sender.name.as_str()) {
            return Err(ConfigError::DuplicateSender(sender.name.clone()));
        }
        if !pipes.insert(sender.pipe_name()) {
            return Err(ConfigError::DuplicatePipe(sender.pipe_name().to_string()));
        }
    }

    Ok(())
}

fn validate_sender_config(sender: &PipeSenderConfig) -> ConfigResult<()> {
    if sender.name.is_empty() {
        return Err(ConfigError::missing_field("senders.name"));
    }

    if sender.pipe_name().is_empty() {
        return Err(ConfigError::validation(format!(
            "Sender '{}' has an empty pipe name",
            sender.name
        )));
    }

    if sender.pipe_name().contains('\0') {
        return Err(ConfigError::validation(format!(
            "Pipe name for sender '{}' contains a NUL byte",
            sender.name
        )));
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        assert!(validate_config(&CourierConfig::default()).is_ok());
    }

    #[test]
    fn test_duplicate_sender_names() {
        let config = CourierConfig {
            senders: vec![
                PipeSenderConfig::new("orders"),
                PipeSenderConfig::new("orders").with_pipe_name("other"),
            ],
            ..Default::default()
        };

        assert!(matches!(
            validate_config(&config),
            Err(ConfigError::DuplicateSender(name)) if name == "orders"
        ));
    }

    #[test]
    fn test_duplicate_pipe_names() {
        let config = CourierConfig {
            senders: vec![
                PipeSenderConfig::new("a").with_pipe_name("shared"),
                PipeSenderConfig::new("b").with_pipe_name("shared"),
            ],
            ..Default::default()
        };

        assert!(matches!(
            validate_config(&config),
            Err(ConfigError::DuplicatePipe(_))
        ));
    }

    #[test]
    fn test_empty_sender_name() {
        let config = CourierConfig {
            senders: vec![PipeSenderConfig::new("")],
            ..Default::default()
        };

        assert!(matches!(
            validate_config(&config),
            Err(ConfigError::MissingField { .. })
        ));
    }

    #[test]
    fn test_file_output_requires_path() {
        let mut config = CourierConfig::default();
        config.logging.output = LogOutput::File;

        assert!(validate_config(&config).is_err());

        config.logging.file_path = Some("courier.log".into());
        assert!(validate_config(&config).is_ok());
    }

    #[test]
    fn test_empty_prefix() {
        let mut config = CourierConfig::default();
        config.cloud_events.binding = BindingKind::Prefixed {
            prefix: String::new(),
        };

        assert!(validate_config(&config).is_err());
    }
}
