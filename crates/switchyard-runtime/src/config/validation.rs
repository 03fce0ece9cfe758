//! Configuration validation utilities.

use super::error::{ConfigError, ConfigResult};
use super::schema::{DispatcherConfig, LogOutput, LoggingConfig, SwitchyardConfig};

/// Validates the entire configuration.
pub fn validate_config(config: &SwitchyardConfig) -> ConfigResult<()> {
    validate_logging_config(&config.logging)?;
    validate_dispatcher_config(&config.dispatcher)?;
    Ok(())
}

/// Validates logging settings.
fn validate_logging_config(logging: &LoggingConfig) -> ConfigResult<()> {
    if logging.output == LogOutput::File && logging.file_path.is_none() {
        return Err(ConfigError::validation(
            "logging.output is 'file' but logging.file_path is not set",
        ));
    }

    if let Some(path) = &logging.file_path
        && path.file_name().is_none()
    {
        return Err(ConfigError::validation(format!(
            "logging.file_path must name a file: {}",
            path.display()
        )));
    }

    if let Some(module) = logging.filters.keys().find(|m| m.trim().is_empty()) {
        return Err(ConfigError::validation(format!(
            "Invalid module filter name: {module:?}"
        )));
    }

    Ok(())
}

/// Validates dispatcher settings.
fn validate_dispatcher_config(dispatcher: &DispatcherConfig) -> ConfigResult<()> {
    if dispatcher.channel_capacity == 0 {
        return Err(ConfigError::validation(
            "dispatcher.channel_capacity must be greater than 0",
        ));
    }

    Ok(())
}
