//! Command dispatch engine
//!
//! This module handles registering command descriptors, resolving raw
//! lines into handler invocations, typed argument parsing and completion.

pub mod argument;
pub mod completer;
pub mod completion;
pub mod context;
pub mod descriptor;
pub mod dispatcher;
pub mod parser;
pub mod registry;
pub mod sender;

// Re-export main types
pub use argument::*;
pub use completer::*;
pub use context::*;
pub use descriptor::*;
pub use dispatcher::Dispatcher;
pub use parser::*;
pub use registry::*;
pub use sender::*;
