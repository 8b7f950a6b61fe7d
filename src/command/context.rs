//! Per-call context and result

use crate::command::Argument;

/// Immutable description of the command line being dispatched or completed.
///
/// Handed to argument parsers and completers so they can behave
/// differently per command or action.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandContext {
    command_name: String,
    action_name: Option<String>,
    tokens: Vec<String>,
    args_start: usize,
}

impl CommandContext {
    pub fn new(
        command_name: impl Into<String>,
        action_name: Option<String>,
        tokens: Vec<String>,
        args_start: usize,
    ) -> Self {
        let args_start = args_start.min(tokens.len());
        CommandContext {
            command_name: command_name.into(),
            action_name,
            tokens,
            args_start,
        }
    }

    /// Primary name of the resolved command (the first alias it was registered with)
    pub fn command_name(&self) -> &str {
        &self.command_name
    }

    /// Name of the sub-action, `None` when the main action was resolved
    pub fn action_name(&self) -> Option<&str> {
        self.action_name.as_deref()
    }

    /// Every token of the line, command name included
    pub fn tokens(&self) -> &[String] {
        &self.tokens
    }

    /// Tokens left for the handler parameters
    pub fn args(&self) -> &[String] {
        &self.tokens[self.args_start..]
    }
}

/// Outcome of one dispatched call
#[derive(Debug, Clone)]
pub struct CommandResult {
    success: bool,
    context: CommandContext,
    arguments: Vec<Argument>,
}

impl CommandResult {
    pub(crate) fn new(success: bool, context: CommandContext, arguments: Vec<Argument>) -> Self {
        CommandResult {
            success,
            context,
            arguments,
        }
    }

    pub fn is_success(&self) -> bool {
        self.success
    }

    pub fn context(&self) -> &CommandContext {
        &self.context
    }

    /// One entry per positional parameter, plus one per trailing collection element
    pub fn arguments(&self) -> &[Argument] {
        &self.arguments
    }

    /// First argument that vetoed success, for user feedback
    pub fn first_failure(&self) -> Option<&Argument> {
        self.arguments.iter().find(|a| a.vetoes_success())
    }
}
