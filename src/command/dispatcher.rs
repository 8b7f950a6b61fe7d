//! Dispatcher core
//!
//! Resolves a raw line into a descriptor, parses its arguments with the
//! bound parsers and invokes the handler.

use crate::command::{
    Args, Argument, ArgumentParser, BoundParser, CommandContext, CommandDescriptor, CommandResult,
    CommandSender, CommandSet, Completer, CompleterRegistry, HandlerRegistry, ParamKind,
    ParserRegistry, Registration, TypeParser,
};
use crate::config::{DispatcherConfig, ParseFailurePolicy};
use crate::error::{CommandError, DispatchResult};
use parking_lot::RwLock;
use std::any::Any;
use std::ops::Range;
use tracing::{debug, trace, warn};

/// Registries shared by `call` and `complete`
#[derive(Default)]
pub(crate) struct State {
    pub(crate) handlers: HandlerRegistry,
    pub(crate) parsers: ParserRegistry,
    pub(crate) completers: CompleterRegistry,
}

/// Entry point for registering commands, dispatching lines and completing them.
///
/// Registration and binding take the write lock; `call` and `complete`
/// resolve against one read snapshot and release it before running
/// handlers or completers. A handler that blocks blocks its caller only.
pub struct Dispatcher {
    pub(crate) state: RwLock<State>,
    pub(crate) config: DispatcherConfig,
}

impl Dispatcher {
    /// Create a dispatcher with the default configuration and primitive parsers
    pub fn new() -> Self {
        Self::with_config(DispatcherConfig::default())
    }

    pub fn with_config(config: DispatcherConfig) -> Self {
        Dispatcher {
            state: RwLock::new(State {
                handlers: HandlerRegistry::new(),
                parsers: ParserRegistry::with_defaults(),
                completers: CompleterRegistry::new(),
            }),
            config,
        }
    }

    pub fn config(&self) -> &DispatcherConfig {
        &self.config
    }

    /// Register a command set under one or more names.
    ///
    /// The first name becomes the command name reported in
    /// [`CommandContext::command_name`].
    pub fn register(&self, set: &CommandSet, names: &[&str]) -> DispatchResult<Registration> {
        let mut state = self.state.write();
        let State {
            handlers, parsers, ..
        } = &mut *state;
        handlers.register(set, names, parsers)
    }

    /// Remove everything created by one registration; returns the number of aliases dropped
    pub fn unregister(&self, registration: Registration) -> usize {
        self.state.write().handlers.unregister(registration)
    }

    /// Bind an argument parser for values of type `T`
    pub fn bind_parser<T, P>(&self, parser: P)
    where
        T: Any + Send + Sync,
        P: ArgumentParser<T> + 'static,
    {
        self.state.write().parsers.bind::<T, P>(parser);
    }

    /// Bind a legacy type parser for values of type `T`
    pub fn bind_type_parser<T, P>(&self, parser: P)
    where
        T: Any + Send + Sync,
        P: TypeParser<T> + 'static,
    {
        self.state.write().parsers.bind_legacy::<T, P>(parser);
    }

    /// Bind a completer for values of type `T`
    pub fn bind_completer<T, C>(&self, completer: C)
    where
        T: Any,
        C: Completer + 'static,
    {
        self.state.write().completers.bind::<T, C>(completer);
    }

    pub fn is_registered(&self, command: &str) -> bool {
        self.state.read().handlers.contains(command)
    }

    /// Every registered alias, in registration order
    pub fn command_names(&self) -> Vec<String> {
        self.state.read().handlers.names().map(String::from).collect()
    }

    /// Dispatch one line typed by `sender`.
    ///
    /// Unknown commands and denied access are errors; argument parse
    /// failures are not, they show up in the returned [`CommandResult`].
    pub fn call(&self, sender: &dyn CommandSender, line: &str) -> DispatchResult<CommandResult> {
        let tokens = tokenize(strip_prefix(line, &self.config.prefixes));
        if tokens.is_empty() {
            return Err(CommandError::NotFound);
        }

        let (descriptor, args_start, parsers) = {
            let state = self.state.read();
            let (descriptor, args_start) = state
                .handlers
                .resolve_tokens(tokens.as_slice())
                .ok_or(CommandError::NotFound)?;
            let parsers: Vec<Option<BoundParser>> = descriptor
                .params()
                .iter()
                .map(|param| state.parsers.resolve(&param.ty()))
                .collect();
            (descriptor, args_start, parsers)
        };

        if descriptor.requires_permission() && !sender.has_permission(&descriptor) {
            warn!(
                command = descriptor.command_name(),
                action = descriptor.action_name(),
                "access denied"
            );
            return Err(CommandError::Access);
        }

        let context = CommandContext::new(
            descriptor.command_name(),
            action_label(&descriptor),
            tokens,
            args_start,
        );
        debug!(
            command = context.command_name(),
            action = ?context.action_name(),
            args = context.args().len(),
            "dispatching"
        );

        let (arguments, slots, surplus) = parse_arguments(&descriptor, &parsers, &context);
        let vetoed = arguments.iter().any(Argument::vetoes_success)
            || (self.config.strict_arity && surplus > 0);

        if vetoed && self.config.on_parse_failure == ParseFailurePolicy::Skip {
            debug!(command = context.command_name(), "argument parsing failed, handler skipped");
            return Ok(CommandResult::new(false, context, arguments));
        }

        let returned = descriptor
            .invoke(sender, &Args::new(&arguments, &slots))
            .map_err(CommandError::Handler)?;
        let success = returned && !vetoed;

        debug!(command = context.command_name(), success, "dispatched");
        Ok(CommandResult::new(success, context, arguments))
    }
}

impl Default for Dispatcher {
    fn default() -> Self {
        Self::new()
    }
}

/// Parse every declared parameter; returns the arguments, the argument
/// range of each parameter and the number of unconsumed tokens.
fn parse_arguments(
    descriptor: &CommandDescriptor,
    parsers: &[Option<BoundParser>],
    context: &CommandContext,
) -> (Vec<Argument>, Vec<Range<usize>>, usize) {
    let args = context.args();
    let mut arguments = Vec::new();
    let mut slots = Vec::with_capacity(parsers.len());
    let mut cursor = 0;

    for (param, parser) in descriptor.params().iter().zip(parsers) {
        let start = arguments.len();
        match param.kind() {
            ParamKind::Trailing => {
                while let Some(token) = args.get(cursor) {
                    let argument = parse_one(parser.as_ref(), context, arguments.len(), Some(token));
                    arguments.push(argument);
                    cursor += 1;
                }
            }
            ParamKind::Positional => {
                let token = args.get(cursor).map(String::as_str);
                if token.is_some() {
                    cursor += 1;
                }
                let argument = parse_one(parser.as_ref(), context, arguments.len(), token);
                arguments.push(argument);
            }
        }
        slots.push(start..arguments.len());
    }

    (arguments, slots, args.len() - cursor)
}

fn parse_one(
    parser: Option<&BoundParser>,
    context: &CommandContext,
    index: usize,
    text: Option<&str>,
) -> Argument {
    let argument = match parser {
        Some(parser) => parser.parse(context, index, text),
        None => {
            let mut argument = Argument::fail();
            argument.fill_text(text);
            argument
        }
    };
    trace!(index, text = ?text, result = ?argument.result(), "parsed argument");
    argument
}

/// Action name reported in the context: `None` for the main action
pub(crate) fn action_label(descriptor: &CommandDescriptor) -> Option<String> {
    if descriptor.is_main() {
        None
    } else {
        Some(descriptor.action_name().to_string())
    }
}

/// Strip one leading prefix character, if it is a configured one
pub(crate) fn strip_prefix<'a>(line: &'a str, prefixes: &[char]) -> &'a str {
    let mut chars = line.chars();
    match chars.next() {
        Some(first) if prefixes.contains(&first) => chars.as_str(),
        _ => line,
    }
}

pub(crate) fn tokenize(line: &str) -> Vec<String> {
    line.split_whitespace().map(String::from).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_strip_prefix() {
        let prefixes = ['/', '!'];
        assert_eq!(strip_prefix("/test", &prefixes), "test");
        assert_eq!(strip_prefix("!test", &prefixes), "test");
        assert_eq!(strip_prefix("test", &prefixes), "test");
        assert_eq!(strip_prefix("/", &prefixes), "");
        assert_eq!(strip_prefix("", &prefixes), "");
        assert_eq!(strip_prefix("/test", &[]), "/test");
    }

    #[test]
    fn test_tokenize_collapses_whitespace() {
        assert_eq!(tokenize("test  integer\t36 "), vec!["test", "integer", "36"]);
        assert!(tokenize("   ").is_empty());
    }

    #[test]
    fn test_shared_across_threads() {
        fn assert_sync<T: Send + Sync>() {}
        assert_sync::<Dispatcher>();
    }
}
