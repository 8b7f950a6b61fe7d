//! Handler registry: command names to ordered action descriptors

use crate::command::{CommandDescriptor, CommandSet, ParamKind, ParserRegistry};
use crate::error::{CommandError, DispatchResult};
use indexmap::IndexMap;
use std::collections::HashSet;
use std::sync::Arc;
use tracing::debug;

/// Opaque handle returned by a successful registration
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Registration(u64);

/// Command table keyed by alias, in registration order.
///
/// Every alias of one registration shares the same descriptors.
#[derive(Debug, Default)]
pub struct HandlerRegistry {
    commands: IndexMap<String, Vec<Arc<CommandDescriptor>>>,
    next_id: u64,
}

impl HandlerRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `set` under every name in `names`.
    ///
    /// Everything is validated before the table is touched, so a failed
    /// registration leaves earlier ones intact.
    pub fn register(
        &mut self,
        set: &CommandSet,
        names: &[&str],
        parsers: &ParserRegistry,
    ) -> DispatchResult<Registration> {
        self.validate_names(names)?;
        validate_set(set, parsers)?;

        let owner = Registration(self.next_id);
        self.next_id += 1;

        let command_name = names[0];
        let descriptors: Vec<Arc<CommandDescriptor>> = set
            .actions()
            .iter()
            .filter_map(|action| {
                action
                    .handler_fn()
                    .map(|handler| CommandDescriptor::new(names, action, Arc::clone(handler), owner))
            })
            .map(Arc::new)
            .collect();

        for name in names {
            self.commands.insert(name.to_string(), descriptors.clone());
        }

        debug!(
            command = command_name,
            aliases = names.len(),
            actions = descriptors.len(),
            "registered command"
        );
        Ok(owner)
    }

    /// Drop every descriptor created by `registration`.
    ///
    /// Returns the number of aliases removed; unknown handles remove nothing.
    pub fn unregister(&mut self, registration: Registration) -> usize {
        let before = self.commands.len();
        for descriptors in self.commands.values_mut() {
            descriptors.retain(|d| d.owner() != registration);
        }
        self.commands.retain(|_, descriptors| !descriptors.is_empty());

        let removed = before - self.commands.len();
        if removed > 0 {
            debug!(?registration, aliases = removed, "unregistered command");
        }
        removed
    }

    /// Resolve a descriptor by command name and optional action token.
    ///
    /// Without an action the main descriptor is returned. With one, only
    /// the descriptor of that name matches; falling back to the main
    /// descriptor is the caller's decision.
    pub fn resolve(&self, command: &str, action: Option<&str>) -> Option<Arc<CommandDescriptor>> {
        let descriptors = self.commands.get(command)?;
        let found = match action {
            None => descriptors.iter().find(|d| d.is_main()),
            Some(action) => descriptors.iter().find(|d| d.action_name() == action),
        };
        found.cloned()
    }

    /// Resolve a token stream into a descriptor and the index of its first argument token.
    pub fn resolve_tokens<S: AsRef<str>>(&self, tokens: &[S]) -> Option<(Arc<CommandDescriptor>, usize)> {
        let command = tokens.first()?.as_ref();
        if let Some(action) = tokens.get(1) {
            if let Some(descriptor) = self.resolve(command, Some(action.as_ref())) {
                return Some((descriptor, 2));
            }
        }
        self.resolve(command, None).map(|descriptor| (descriptor, 1))
    }

    /// Descriptors registered under a name, in declaration order
    pub fn descriptors(&self, command: &str) -> &[Arc<CommandDescriptor>] {
        self.commands.get(command).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn contains(&self, command: &str) -> bool {
        self.commands.contains_key(command)
    }

    /// Every registered alias, in registration order
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.commands.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.commands.len()
    }

    pub fn is_empty(&self) -> bool {
        self.commands.is_empty()
    }

    fn validate_names(&self, names: &[&str]) -> DispatchResult<()> {
        if names.is_empty() {
            return Err(CommandError::invalid("Please provide valid command name"));
        }

        let mut seen = HashSet::new();
        for name in names {
            if name.is_empty() {
                return Err(CommandError::invalid("Please provide valid command name"));
            }
            if name.chars().any(char::is_whitespace) {
                return Err(CommandError::invalid(
                    "Please provide command name with no whitespace",
                ));
            }
            if self.commands.contains_key(*name) || !seen.insert(*name) {
                return Err(CommandError::invalid(format!(
                    "Command with name {} already exists",
                    name
                )));
            }
        }
        Ok(())
    }
}

fn validate_set(set: &CommandSet, parsers: &ParserRegistry) -> DispatchResult<()> {
    if set.is_empty() {
        return Err(CommandError::IllegalState(
            "Not found any command action".to_string(),
        ));
    }

    let mut names = HashSet::new();
    let mut main: Option<&str> = None;

    for action in set.actions() {
        let name = action.name();

        if name.is_empty() || name.chars().any(char::is_whitespace) {
            return Err(CommandError::invalid(format!(
                "Please provide valid action name for '{}'",
                name
            )));
        }
        if !names.insert(name) {
            return Err(CommandError::invalid(format!(
                "Action with name {} already exists",
                name
            )));
        }
        if action.is_main() {
            if let Some(existing) = main {
                return Err(CommandError::invalid(format!(
                    "Both {} and {} are marked as main",
                    existing, name
                )));
            }
            main = Some(name);
        }
        if action.handler_fn().is_none() {
            return Err(CommandError::invalid(format!(
                "Please provide handler for {}",
                name
            )));
        }

        let params = action.params();
        for (i, param) in params.iter().enumerate() {
            if param.kind() == ParamKind::Trailing && i + 1 != params.len() {
                return Err(CommandError::invalid(format!(
                    "Trailing collection must be last parameter in {}",
                    name
                )));
            }
            if !parsers.contains(&param.ty()) {
                return Err(CommandError::invalid(format!(
                    "Please provide type parser for {}",
                    param.ty()
                )));
            }
        }
    }
    Ok(())
}
