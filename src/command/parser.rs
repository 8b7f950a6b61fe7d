//! Typed argument parsing
//!
//! Parsers are bound per value type and looked up by [`TypeKey`]. Two
//! forms coexist:
//!
//! - [`ArgumentParser`] yields an explicit [`Argument`] with a
//!   SUCCESS/FAIL/ABSENT outcome and sees the call context.
//! - [`TypeParser`] is the legacy form: it always yields a value and is
//!   expected to fall back to a default on bad input.
//!
//! When both are bound for a type the argument form wins.

use crate::command::{Argument, CommandContext, Completer, Value};
use std::any::{Any, TypeId};
use std::collections::HashMap;
use std::fmt;
use std::hash::{Hash, Hasher};
use std::marker::PhantomData;
use std::str::FromStr;
use std::sync::Arc;

/// Type-erased key identifying a parameter value type
#[derive(Debug, Clone, Copy)]
pub struct TypeKey {
    id: TypeId,
    name: &'static str,
}

impl TypeKey {
    pub fn of<T: Any>() -> Self {
        TypeKey {
            id: TypeId::of::<T>(),
            name: std::any::type_name::<T>(),
        }
    }

    pub fn name(&self) -> &'static str {
        self.name
    }
}

impl PartialEq for TypeKey {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for TypeKey {}

impl Hash for TypeKey {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.id.hash(state);
    }
}

impl fmt::Display for TypeKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name)
    }
}

/// Converts a raw token into an [`Argument`].
///
/// `text` is `None` when the line ran out of tokens for this parameter.
/// Returning `None` records an ABSENT argument, which is distinct from FAIL.
pub trait ArgumentParser<T>: Send + Sync {
    fn parse_argument(
        &self,
        context: &CommandContext,
        index: usize,
        text: Option<&str>,
    ) -> Option<Argument<T>>;
}

impl<T, F> ArgumentParser<T> for F
where
    F: Fn(&CommandContext, usize, Option<&str>) -> Option<Argument<T>> + Send + Sync,
{
    fn parse_argument(
        &self,
        context: &CommandContext,
        index: usize,
        text: Option<&str>,
    ) -> Option<Argument<T>> {
        self(context, index, text)
    }
}

/// Legacy parser: converts a raw token (or its absence) straight into a value.
///
/// Implementations must not fail; bad input maps to a default value.
pub trait TypeParser<T>: Send + Sync {
    fn parse(&self, text: Option<&str>) -> T;
}

impl<T, F> TypeParser<T> for F
where
    F: Fn(Option<&str>) -> T + Send + Sync,
{
    fn parse(&self, text: Option<&str>) -> T {
        self(text)
    }
}

type ErasedArgumentParser =
    dyn Fn(&CommandContext, usize, Option<&str>) -> Argument<Value> + Send + Sync;
type ErasedTypeParser = dyn Fn(Option<&str>) -> Value + Send + Sync;

/// A parser resolved for one parameter type
#[derive(Clone)]
pub enum BoundParser {
    Argument(Arc<ErasedArgumentParser>),
    Legacy(Arc<ErasedTypeParser>),
}

impl BoundParser {
    /// Parse one token, stamping it as the argument text when the parser did not.
    pub fn parse(&self, context: &CommandContext, index: usize, text: Option<&str>) -> Argument {
        let mut argument = match self {
            BoundParser::Argument(parser) => parser(context, index, text),
            BoundParser::Legacy(parser) => Argument::success(parser(text)),
        };
        argument.fill_text(text);
        argument
    }
}

impl fmt::Debug for BoundParser {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BoundParser::Argument(_) => f.write_str("BoundParser::Argument"),
            BoundParser::Legacy(_) => f.write_str("BoundParser::Legacy"),
        }
    }
}

/// Parsers keyed by value type
#[derive(Clone, Default)]
pub struct ParserRegistry {
    argument: HashMap<TypeKey, Arc<ErasedArgumentParser>>,
    legacy: HashMap<TypeKey, Arc<ErasedTypeParser>>,
}

impl ParserRegistry {
    /// Create an empty registry
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a registry with the primitive parsers bound
    pub fn with_defaults() -> Self {
        let mut registry = Self::new();
        registry.bind::<String, _>(FromStrParser::<String>::new());
        registry.bind::<i32, _>(FromStrParser::<i32>::new());
        registry.bind::<i64, _>(FromStrParser::<i64>::new());
        registry.bind::<u32, _>(FromStrParser::<u32>::new());
        registry.bind::<bool, _>(FromStrParser::<bool>::new());
        registry.bind::<f32, _>(FromStrParser::<f32>::new());
        registry.bind::<f64, _>(FromStrParser::<f64>::new());
        registry
    }

    /// Bind an argument parser for `T`, replacing any previous one
    pub fn bind<T, P>(&mut self, parser: P)
    where
        T: Any + Send + Sync,
        P: ArgumentParser<T> + 'static,
    {
        let erased = move |context: &CommandContext, index: usize, text: Option<&str>| {
            match parser.parse_argument(context, index, text) {
                Some(argument) => argument.erase(),
                None => Argument::absent(),
            }
        };
        self.argument.insert(TypeKey::of::<T>(), Arc::new(erased));
    }

    /// Bind a legacy type parser for `T`, replacing any previous one
    pub fn bind_legacy<T, P>(&mut self, parser: P)
    where
        T: Any + Send + Sync,
        P: TypeParser<T> + 'static,
    {
        let erased = move |text: Option<&str>| Value::new(parser.parse(text));
        self.legacy.insert(TypeKey::of::<T>(), Arc::new(erased));
    }

    /// Whether any parser form is bound for the type
    pub fn contains(&self, key: &TypeKey) -> bool {
        self.argument.contains_key(key) || self.legacy.contains_key(key)
    }

    /// Look up the parser for a type, preferring the argument form
    pub fn resolve(&self, key: &TypeKey) -> Option<BoundParser> {
        if let Some(parser) = self.argument.get(key) {
            return Some(BoundParser::Argument(Arc::clone(parser)));
        }
        self.legacy
            .get(key)
            .map(|parser| BoundParser::Legacy(Arc::clone(parser)))
    }
}

/// Argument parser for any [`FromStr`] type.
///
/// A missing token and an unparsable token both yield FAIL.
pub struct FromStrParser<T>(PhantomData<fn() -> T>);

impl<T> FromStrParser<T> {
    pub fn new() -> Self {
        FromStrParser(PhantomData)
    }
}

impl<T> Default for FromStrParser<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: FromStr> ArgumentParser<T> for FromStrParser<T> {
    fn parse_argument(
        &self,
        _context: &CommandContext,
        _index: usize,
        text: Option<&str>,
    ) -> Option<Argument<T>> {
        let argument = match text.map(str::parse::<T>) {
            Some(Ok(value)) => Argument::success(value),
            _ => Argument::fail(),
        };
        Some(argument)
    }
}

/// Legacy parser for any [`FromStr`] type, defaulting on bad or missing input
pub struct DefaultingParser<T>(PhantomData<fn() -> T>);

impl<T> DefaultingParser<T> {
    pub fn new() -> Self {
        DefaultingParser(PhantomData)
    }
}

impl<T> Default for DefaultingParser<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: FromStr + Default> TypeParser<T> for DefaultingParser<T> {
    fn parse(&self, text: Option<&str>) -> T {
        text.and_then(|t| t.parse().ok()).unwrap_or_default()
    }
}

/// Case-insensitive parser over a fixed table of names.
///
/// Doubles as a [`Completer`] offering the names that start with the
/// partial token.
#[derive(Debug, Clone)]
pub struct EnumArgumentParser<T> {
    variants: Vec<(String, T)>,
}

impl<T: Clone> EnumArgumentParser<T> {
    pub fn new<I, S>(variants: I) -> Self
    where
        I: IntoIterator<Item = (S, T)>,
        S: Into<String>,
    {
        EnumArgumentParser {
            variants: variants
                .into_iter()
                .map(|(name, value)| (name.into(), value))
                .collect(),
        }
    }

    /// Look a name up, ignoring ASCII case
    pub fn lookup(&self, name: &str) -> Option<&T> {
        self.variants
            .iter()
            .find(|(variant, _)| variant.eq_ignore_ascii_case(name))
            .map(|(_, value)| value)
    }
}

impl<T: Clone + Send + Sync> ArgumentParser<T> for EnumArgumentParser<T> {
    fn parse_argument(
        &self,
        _context: &CommandContext,
        _index: usize,
        text: Option<&str>,
    ) -> Option<Argument<T>> {
        let argument = match text.and_then(|t| self.lookup(t)) {
            Some(value) => Argument::success(value.clone()),
            None => Argument::fail(),
        };
        Some(argument)
    }
}

impl<T: Send + Sync> Completer for EnumArgumentParser<T> {
    fn complete(&self, _context: &CommandContext, partial: &str) -> Vec<String> {
        let partial = partial.to_ascii_lowercase();
        self.variants
            .iter()
            .filter(|(name, _)| name.to_ascii_lowercase().starts_with(&partial))
            .map(|(name, _)| name.clone())
            .collect()
    }
}
