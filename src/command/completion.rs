//! Completion engine
//!
//! Works on the same token stream as [`Dispatcher::call`]: the last token
//! is the one being typed, and a trailing separator starts a new, empty
//! token. Depending on how many tokens there are, the engine completes
//! command names, sub-action names or a parameter value.
//!
//! Candidates are gathered under the registry read lock; permission
//! checks and completers run after it is released.

use crate::command::dispatcher::{action_label, strip_prefix, State};
use crate::command::{
    prefix_matches, CommandContext, CommandDescriptor, CommandSender, Completer, Dispatcher, Param,
};
use std::sync::Arc;
use tracing::trace;

/// A parameter completion resolved under the lock, run once it is released
struct Delegate {
    descriptor: Arc<CommandDescriptor>,
    completer: Arc<dyn Completer>,
    context: CommandContext,
    partial: String,
}

impl Delegate {
    fn run(self, sender: &dyn CommandSender) -> Vec<String> {
        if !permitted(sender, &self.descriptor) {
            return Vec::new();
        }
        self.completer.complete(&self.context, &self.partial)
    }
}

/// Snapshot of what to complete, taken under the read lock
enum Plan {
    Names(Vec<String>),
    Second {
        actions: Vec<Arc<CommandDescriptor>>,
        partial: String,
        fallback: Option<Delegate>,
    },
    Argument(Option<Delegate>),
}

impl Dispatcher {
    /// Candidate completions for a partially typed line.
    ///
    /// Never fails and never invokes a handler: anything that cannot be
    /// resolved yields an empty list.
    pub fn complete(&self, sender: &dyn CommandSender, partial: &str) -> Vec<String> {
        let line = strip_prefix(partial, &self.config.prefixes);
        let mut tokens: Vec<String> = line.split_whitespace().map(String::from).collect();
        if tokens.is_empty() || line.ends_with(char::is_whitespace) {
            tokens.push(String::new());
        }

        let plan = {
            let state = self.state.read();
            match tokens.len() {
                1 => Plan::Names(prefix_matches(state.handlers.names(), &tokens[0])),
                2 => plan_second(&state, tokens),
                _ => Plan::Argument(plan_argument(&state, tokens)),
            }
        };

        let candidates = match plan {
            Plan::Names(names) => names,
            Plan::Second {
                actions,
                partial,
                fallback,
            } => complete_second(sender, &actions, &partial, fallback),
            Plan::Argument(delegate) => delegate.map(|d| d.run(sender)).unwrap_or_default(),
        };
        trace!(partial, candidates = candidates.len(), "completed");
        candidates
    }
}

/// Second token: a sub-action name, or the main action's first argument
/// when no permitted action name matches.
fn complete_second(
    sender: &dyn CommandSender,
    actions: &[Arc<CommandDescriptor>],
    partial: &str,
    fallback: Option<Delegate>,
) -> Vec<String> {
    let names: Vec<String> = actions
        .iter()
        .filter(|d| d.action_name().starts_with(partial) && permitted(sender, d))
        .map(|d| d.action_name().to_string())
        .collect();
    if !names.is_empty() {
        return names;
    }
    fallback.map(|d| d.run(sender)).unwrap_or_default()
}

fn plan_second(state: &State, tokens: Vec<String>) -> Plan {
    let command = tokens[0].as_str();
    let actions: Vec<Arc<CommandDescriptor>> = state
        .handlers
        .descriptors(command)
        .iter()
        .filter(|d| !d.is_main())
        .cloned()
        .collect();
    let partial = tokens[1].clone();

    let fallback = state.handlers.resolve(command, None).and_then(|main| {
        let first = main.params().first().copied();
        delegate_for(state, main, first.as_ref(), tokens, 1)
    });
    Plan::Second {
        actions,
        partial,
        fallback,
    }
}

/// Third token onwards: resolve the acting descriptor like `call` does and
/// complete the parameter the last token falls on.
fn plan_argument(state: &State, tokens: Vec<String>) -> Option<Delegate> {
    let (descriptor, args_start) = state.handlers.resolve_tokens(tokens.as_slice())?;
    let position = tokens.len() - 1 - args_start;
    let params = descriptor.params();
    let param = params
        .get(position)
        .or_else(|| params.last().filter(|p| p.is_trailing()))
        .copied();

    delegate_for(state, descriptor, param.as_ref(), tokens, args_start)
}

fn delegate_for(
    state: &State,
    descriptor: Arc<CommandDescriptor>,
    param: Option<&Param>,
    tokens: Vec<String>,
    args_start: usize,
) -> Option<Delegate> {
    let completer = state.completers.get(&param?.ty())?;
    let partial = tokens.last().cloned().unwrap_or_default();
    let context = CommandContext::new(
        descriptor.command_name(),
        action_label(&descriptor),
        tokens,
        args_start,
    );
    Some(Delegate {
        descriptor,
        completer,
        context,
        partial,
    })
}

fn permitted(sender: &dyn CommandSender, descriptor: &CommandDescriptor) -> bool {
    !descriptor.requires_permission() || sender.has_permission(descriptor)
}
