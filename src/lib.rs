//! rdispatch - command dispatch and typed argument parsing
//!
//! Resolves a raw text line such as `/region delete spawn` into a
//! registered handler and sub-action, converts the remaining tokens into
//! typed values with pluggable parsers, invokes the handler and reports a
//! structured [`CommandResult`]. The same resolution rules drive
//! completion of command names, sub-actions and argument values.

// Public modules
pub mod cli;
pub mod command;
pub mod config;
pub mod error;

// Re-export commonly used types
pub use command::{
    Action, Argument, ArgumentParser, ArgumentResult, Args, CommandContext, CommandDescriptor,
    CommandResult, CommandSender, CommandSet, Completer, Dispatcher, Registration, TypeParser,
};
pub use config::{DispatcherConfig, ParseFailurePolicy};
pub use error::{CommandError, DispatchResult, RdispatchError, Result};

/// Current version of rdispatch
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
