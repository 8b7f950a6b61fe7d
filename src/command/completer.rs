//! Completion candidates per value type

use crate::command::{CommandContext, TypeKey};
use std::any::Any;
use std::collections::HashMap;
use std::sync::Arc;

/// Produces candidate completions for a partially typed token.
pub trait Completer: Send + Sync {
    fn complete(&self, context: &CommandContext, partial: &str) -> Vec<String>;
}

impl<F> Completer for F
where
    F: Fn(&CommandContext, &str) -> Vec<String> + Send + Sync,
{
    fn complete(&self, context: &CommandContext, partial: &str) -> Vec<String> {
        self(context, partial)
    }
}

/// Completer over a fixed list, keeping the list order
#[derive(Debug, Clone, Default)]
pub struct StaticCompleter {
    candidates: Vec<String>,
}

impl StaticCompleter {
    pub fn new<I, S>(candidates: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        StaticCompleter {
            candidates: candidates.into_iter().map(Into::into).collect(),
        }
    }
}

impl Completer for StaticCompleter {
    fn complete(&self, _context: &CommandContext, partial: &str) -> Vec<String> {
        prefix_matches(&self.candidates, partial)
    }
}

/// Candidates starting with `partial`, in input order
pub fn prefix_matches<I, S>(candidates: I, partial: &str) -> Vec<String>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    candidates
        .into_iter()
        .filter(|c| c.as_ref().starts_with(partial))
        .map(|c| c.as_ref().to_string())
        .collect()
}

/// Completers keyed by value type
#[derive(Clone, Default)]
pub struct CompleterRegistry {
    completers: HashMap<TypeKey, Arc<dyn Completer>>,
}

impl CompleterRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Bind a completer for `T`, replacing any previous one
    pub fn bind<T, C>(&mut self, completer: C)
    where
        T: Any,
        C: Completer + 'static,
    {
        self.completers.insert(TypeKey::of::<T>(), Arc::new(completer));
    }

    pub fn get(&self, key: &TypeKey) -> Option<Arc<dyn Completer>> {
        self.completers.get(key).cloned()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn context() -> CommandContext {
        CommandContext::new("region", None, vec!["region".to_string()], 1)
    }

    #[test]
    fn test_prefix_matches_keeps_order() {
        let names = ["spawn", "home", "spb", "spawn123"];
        assert_eq!(prefix_matches(names, "sp"), vec!["spawn", "spb", "spawn123"]);
        assert_eq!(prefix_matches(names, "").len(), 4);
        assert!(prefix_matches(names, "x").is_empty());
    }

    #[test]
    fn test_static_completer() {
        let completer = StaticCompleter::new(["home", "spawn"]);
        assert_eq!(completer.complete(&context(), "h"), vec!["home"]);
    }

    #[test]
    fn test_registry_bind_closure() {
        let mut registry = CompleterRegistry::new();
        registry.bind::<u8, _>(|ctx: &CommandContext, partial: &str| {
            vec![format!("{}:{}", ctx.command_name(), partial)]
        });

        let completer = registry.get(&TypeKey::of::<u8>()).unwrap();
        assert_eq!(completer.complete(&context(), "x"), vec!["region:x"]);
        assert!(registry.get(&TypeKey::of::<u16>()).is_none());
    }
}
