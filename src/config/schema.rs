//! Configuration validation
//!
//! This module provides validation logic for configuration files.

use crate::config::types::{Config, ConsoleConfig, DispatcherConfig};
use crate::error::{ConfigError, ConfigResult};
use globset::Glob;
use std::collections::HashSet;

/// Validate a complete configuration
pub fn validate_config(config: &Config) -> ConfigResult<()> {
    validate_dispatcher(&config.dispatcher)?;
    validate_console(&config.console)?;
    Ok(())
}

/// Validate dispatcher settings
pub fn validate_dispatcher(config: &DispatcherConfig) -> ConfigResult<()> {
    let mut seen = HashSet::new();

    for prefix in &config.prefixes {
        // A prefix that could start a command name would be stripped from it
        if prefix.is_whitespace() || prefix.is_alphanumeric() {
            return Err(ConfigError::Invalid(format!(
                "Invalid prefix '{}': must be a symbol",
                prefix.escape_default()
            )));
        }
        if !seen.insert(prefix) {
            return Err(ConfigError::Invalid(format!(
                "Duplicate prefix '{}'",
                prefix
            )));
        }
    }

    Ok(())
}

/// Validate console settings
pub fn validate_console(config: &ConsoleConfig) -> ConfigResult<()> {
    for pattern in &config.permissions {
        if pattern.trim().is_empty() {
            return Err(ConfigError::Invalid(
                "Permission pattern cannot be empty".to_string(),
            ));
        }
        Glob::new(pattern).map_err(|e| {
            ConfigError::Invalid(format!("Invalid permission pattern '{}': {}", pattern, e))
        })?;
    }
    Ok(())
}
