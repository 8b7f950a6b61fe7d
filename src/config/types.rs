//! Core configuration types
//!
//! This module defines the data structures that represent an rdispatch.yml configuration file.

use serde::{Deserialize, Serialize};

/// Top-level configuration structure
#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct Config {
    /// Dispatcher behaviour
    pub dispatcher: DispatcherConfig,

    /// Console front-end settings
    pub console: ConsoleConfig,
}

/// Settings that change how lines are dispatched
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct DispatcherConfig {
    /// Leading characters stripped from a line before tokenizing (at most one is stripped)
    pub prefixes: Vec<char>,

    /// Treat tokens left over after the last positional parameter as a parse failure.
    ///
    /// Off by default: `/test hello` on a zero-parameter main action with no
    /// `hello` sub-action then succeeds and `hello` is ignored. Turn it on to
    /// make such a line report `success = false`.
    pub strict_arity: bool,

    /// What to do with the handler when an argument fails to parse
    pub on_parse_failure: ParseFailurePolicy,
}

impl Default for DispatcherConfig {
    fn default() -> Self {
        DispatcherConfig {
            prefixes: vec!['/', '!', '@'],
            strict_arity: false,
            on_parse_failure: ParseFailurePolicy::Invoke,
        }
    }
}

impl DispatcherConfig {
    /// Disable prefix stripping
    pub fn without_prefixes(mut self) -> Self {
        self.prefixes.clear();
        self
    }

    pub fn with_strict_arity(mut self, strict: bool) -> Self {
        self.strict_arity = strict;
        self
    }

    pub fn with_parse_failure_policy(mut self, policy: ParseFailurePolicy) -> Self {
        self.on_parse_failure = policy;
        self
    }
}

/// Handler invocation when at least one argument is FAIL or ABSENT.
///
/// Either way the call reports `success = false`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ParseFailurePolicy {
    /// Run the handler anyway; it sees `None` for the failed values
    #[default]
    Invoke,

    /// Do not run the handler
    Skip,
}

/// Console front-end settings
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct ConsoleConfig {
    /// Prompt printed before each line in interactive mode
    pub prompt: String,

    /// Glob patterns (`command` or `command.action`) granted to the console sender
    pub permissions: Vec<String>,
}

impl Default for ConsoleConfig {
    fn default() -> Self {
        ConsoleConfig {
            prompt: "> ".to_string(),
            permissions: Vec::new(),
        }
    }
}
