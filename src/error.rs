//! Error types for rdispatch

use std::io;
use thiserror::Error;

/// Result type alias for rdispatch operations
pub type Result<T> = std::result::Result<T, RdispatchError>;

/// Main error type for rdispatch
#[derive(Error, Debug)]
pub enum RdispatchError {
    /// Configuration-related errors
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Registration and dispatch errors
    #[error("Command error: {0}")]
    Command(#[from] CommandError),

    /// I/O errors
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// YAML parsing errors
    #[error("YAML parsing error: {0}")]
    Yaml(#[from] serde_yaml::Error),
}

/// Errors raised while registering or dispatching commands.
///
/// Argument parse failures are not errors: they are reported through
/// [`crate::command::ArgumentResult::Fail`] inside a normal
/// [`crate::command::CommandResult`].
#[derive(Error, Debug)]
pub enum CommandError {
    /// Malformed registration or call input
    #[error("{0}")]
    InvalidArgument(String),

    /// Registration of a command set without any action
    #[error("{0}")]
    IllegalState(String),

    /// No descriptor resolves for the given name/action
    #[error("Command not found")]
    NotFound,

    /// The sender is not allowed to use the resolved descriptor
    #[error("You don't have permission to use this command")]
    Access,

    /// The handler itself failed
    #[error("Command handler failed: {0}")]
    Handler(#[source] anyhow::Error),
}

/// Configuration parsing and validation errors
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to find config file (searched: {0})")]
    NotFound(String),

    #[error("Invalid configuration: {0}")]
    Invalid(String),
}

/// Specialized result type for registration and dispatch
pub type DispatchResult<T> = std::result::Result<T, CommandError>;

/// Specialized result type for configuration operations
pub type ConfigResult<T> = std::result::Result<T, ConfigError>;

impl CommandError {
    pub(crate) fn invalid(message: impl Into<String>) -> Self {
        CommandError::InvalidArgument(message.into())
    }

    /// Whether the error is an expected, user-facing outcome
    /// (unknown command or missing permission) rather than a caller bug.
    pub fn is_user_facing(&self) -> bool {
        matches!(self, CommandError::NotFound | CommandError::Access)
    }
}
