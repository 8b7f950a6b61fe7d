//! Declarative command descriptors
//!
//! A [`CommandSet`] is the unit handed to
//! [`crate::command::Dispatcher::register`]: an ordered list of
//! [`Action`]s, each declaring its parameter types and its handler.

use crate::command::{Argument, CommandSender, Registration, TypeKey};
use std::any::Any;
use std::fmt;
use std::ops::Range;
use std::sync::Arc;

/// How a parameter consumes tokens
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParamKind {
    /// Exactly one token, or nothing when the line is exhausted
    Positional,
    /// Every remaining token, parsed one by one
    Trailing,
}

/// One declared handler parameter (the sender slot is implicit)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Param {
    kind: ParamKind,
    ty: TypeKey,
}

impl Param {
    pub fn kind(&self) -> ParamKind {
        self.kind
    }

    /// Value type, or element type for a trailing collection
    pub fn ty(&self) -> TypeKey {
        self.ty
    }

    pub fn is_trailing(&self) -> bool {
        self.kind == ParamKind::Trailing
    }
}

/// Return types a handler may declare: `()` always succeeds, `bool` decides.
pub trait HandlerReturn {
    fn into_success(self) -> bool;
}

impl HandlerReturn for () {
    fn into_success(self) -> bool {
        true
    }
}

impl HandlerReturn for bool {
    fn into_success(self) -> bool {
        self
    }
}

pub(crate) type HandlerFn =
    dyn Fn(&dyn CommandSender, &Args<'_>) -> anyhow::Result<bool> + Send + Sync;

/// Builder for one command action
#[derive(Clone)]
pub struct Action {
    name: String,
    main: bool,
    permission: bool,
    params: Vec<Param>,
    handler: Option<Arc<HandlerFn>>,
}

impl Action {
    /// A named sub-action, invoked as `<command> <name> args...`
    pub fn new(name: impl Into<String>) -> Self {
        Action {
            name: name.into(),
            main: false,
            permission: false,
            params: Vec::new(),
            handler: None,
        }
    }

    /// The action invoked when no sub-action name follows the command
    pub fn main(name: impl Into<String>) -> Self {
        Action {
            main: true,
            ..Action::new(name)
        }
    }

    /// Require [`CommandSender::has_permission`] before running
    pub fn permission(mut self) -> Self {
        self.permission = true;
        self
    }

    /// Declare a positional parameter of type `T`
    pub fn param<T: Any>(mut self) -> Self {
        self.params.push(Param {
            kind: ParamKind::Positional,
            ty: TypeKey::of::<T>(),
        });
        self
    }

    /// Declare a trailing collection of `T`; must be the last parameter
    pub fn rest<T: Any>(mut self) -> Self {
        self.params.push(Param {
            kind: ParamKind::Trailing,
            ty: TypeKey::of::<T>(),
        });
        self
    }

    pub fn handler<F, R>(mut self, handler: F) -> Self
    where
        F: Fn(&dyn CommandSender, &Args<'_>) -> anyhow::Result<R> + Send + Sync + 'static,
        R: HandlerReturn,
    {
        let wrapped = move |sender: &dyn CommandSender, args: &Args<'_>| {
            handler(sender, args).map(HandlerReturn::into_success)
        };
        self.handler = Some(Arc::new(wrapped));
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn is_main(&self) -> bool {
        self.main
    }

    pub fn params(&self) -> &[Param] {
        &self.params
    }

    pub(crate) fn handler_fn(&self) -> Option<&Arc<HandlerFn>> {
        self.handler.as_ref()
    }

    pub(crate) fn requires_permission(&self) -> bool {
        self.permission
    }
}

impl fmt::Debug for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Action")
            .field("name", &self.name)
            .field("main", &self.main)
            .field("permission", &self.permission)
            .field("params", &self.params)
            .field("handler", &self.handler.is_some())
            .finish()
    }
}

/// Ordered group of actions registered together under one or more names
#[derive(Debug, Clone, Default)]
pub struct CommandSet {
    actions: Vec<Action>,
}

impl CommandSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn action(mut self, action: Action) -> Self {
        self.actions.push(action);
        self
    }

    pub fn actions(&self) -> &[Action] {
        &self.actions
    }

    pub fn is_empty(&self) -> bool {
        self.actions.is_empty()
    }
}

/// Registered metadata and handler for one command action
pub struct CommandDescriptor {
    command_names: Vec<String>,
    action_name: String,
    main: bool,
    permission: bool,
    params: Vec<Param>,
    handler: Arc<HandlerFn>,
    owner: Registration,
}

impl CommandDescriptor {
    /// `names` must be non-empty; registration validates it first.
    pub(crate) fn new(
        names: &[&str],
        action: &Action,
        handler: Arc<HandlerFn>,
        owner: Registration,
    ) -> Self {
        CommandDescriptor {
            command_names: names.iter().map(|name| name.to_string()).collect(),
            action_name: action.name.clone(),
            main: action.main,
            permission: action.permission,
            params: action.params.clone(),
            handler,
            owner,
        }
    }

    /// First name the command was registered with
    pub fn command_name(&self) -> &str {
        self.command_names.first().map(String::as_str).unwrap_or_default()
    }

    /// Every alias the command was registered under, in registration order
    pub fn command_names(&self) -> &[String] {
        &self.command_names
    }

    pub fn action_name(&self) -> &str {
        &self.action_name
    }

    pub fn is_main(&self) -> bool {
        self.main
    }

    pub fn requires_permission(&self) -> bool {
        self.permission
    }

    pub fn params(&self) -> &[Param] {
        &self.params
    }

    pub fn owner(&self) -> Registration {
        self.owner
    }

    pub(crate) fn invoke(&self, sender: &dyn CommandSender, args: &Args<'_>) -> anyhow::Result<bool> {
        (self.handler)(sender, args)
    }
}

impl fmt::Debug for CommandDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CommandDescriptor")
            .field("command_names", &self.command_names)
            .field("action_name", &self.action_name)
            .field("main", &self.main)
            .field("permission", &self.permission)
            .field("params", &self.params)
            .field("owner", &self.owner)
            .finish()
    }
}

/// Parsed values handed to a handler, addressed by parameter index
/// (the sender slot is not counted).
#[derive(Debug, Clone, Copy)]
pub struct Args<'a> {
    arguments: &'a [Argument],
    slots: &'a [Range<usize>],
}

impl<'a> Args<'a> {
    pub(crate) fn new(arguments: &'a [Argument], slots: &'a [Range<usize>]) -> Self {
        Args { arguments, slots }
    }

    /// Number of declared parameters
    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    /// Every argument produced for a parameter: one for a positional
    /// parameter, one per element for a trailing collection.
    pub fn arguments(&self, param: usize) -> &'a [Argument] {
        match self.slots.get(param) {
            Some(range) => &self.arguments[range.clone()],
            None => &[],
        }
    }

    /// The argument of a positional parameter
    pub fn argument(&self, param: usize) -> Option<&'a Argument> {
        self.arguments(param).first()
    }

    /// Value of a positional parameter; `None` when parsing produced no value
    pub fn get<T: Any>(&self, param: usize) -> Option<&'a T> {
        self.argument(param).and_then(|a| a.value_as::<T>())
    }

    /// Values of a trailing collection in token order, skipping elements
    /// that produced no value
    pub fn values<T: Any>(&self, param: usize) -> Vec<&'a T> {
        self.arguments(param)
            .iter()
            .filter_map(|a| a.value_as::<T>())
            .collect()
    }
}
