//! CLI interface
//!
//! This module handles command-line argument parsing and the console
//! front-end that feeds lines into the dispatcher.

pub mod app;
pub mod console;

// Re-export main types
pub use app::*;
pub use console::*;
