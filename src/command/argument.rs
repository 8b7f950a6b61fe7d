//! Parsed argument model
//!
//! Every token consumed by a handler parameter produces exactly one
//! [`Argument`], carrying the parse outcome, the typed value (if any) and
//! the raw token it came from.

use std::any::Any;
use std::fmt;
use std::sync::Arc;

/// Outcome of parsing one token
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ArgumentResult {
    /// The token was converted to a value
    Success,
    /// The token could not be converted (or a required token was missing)
    Fail,
    /// The parser declined to produce anything for this token
    Absent,
}

/// Type-erased parsed value, shared between the handler and the result
#[derive(Clone)]
pub struct Value(Arc<dyn Any + Send + Sync>);

impl Value {
    pub fn new<T: Any + Send + Sync>(value: T) -> Self {
        Value(Arc::new(value))
    }

    pub fn downcast_ref<T: Any>(&self) -> Option<&T> {
        self.0.downcast_ref::<T>()
    }

    pub fn is<T: Any>(&self) -> bool {
        self.0.is::<T>()
    }
}

impl fmt::Debug for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Value(..)")
    }
}

/// Parsed outcome for one consumed token or collection element
#[derive(Debug, Clone)]
pub struct Argument<T = Value> {
    result: ArgumentResult,
    value: Option<T>,
    text: Option<String>,
}

impl<T> Argument<T> {
    /// A successfully parsed value
    pub fn success(value: T) -> Self {
        Argument {
            result: ArgumentResult::Success,
            value: Some(value),
            text: None,
        }
    }

    /// A failed parse without a value
    pub fn fail() -> Self {
        Argument {
            result: ArgumentResult::Fail,
            value: None,
            text: None,
        }
    }

    /// A failed parse that still carries a fallback value
    pub fn fail_with(value: T) -> Self {
        Argument {
            result: ArgumentResult::Fail,
            value: Some(value),
            text: None,
        }
    }

    /// Nothing was produced for the token
    pub fn absent() -> Self {
        Argument {
            result: ArgumentResult::Absent,
            value: None,
            text: None,
        }
    }

    /// Set the raw text the argument was parsed from
    pub fn with_text(mut self, text: impl Into<String>) -> Self {
        self.text = Some(text.into());
        self
    }

    pub fn result(&self) -> ArgumentResult {
        self.result
    }

    pub fn value(&self) -> Option<&T> {
        self.value.as_ref()
    }

    pub fn into_value(self) -> Option<T> {
        self.value
    }

    /// Raw token this argument was parsed from, if there was one
    pub fn text(&self) -> Option<&str> {
        self.text.as_deref()
    }

    pub fn is_success(&self) -> bool {
        self.result == ArgumentResult::Success
    }

    /// FAIL and ABSENT outcomes both veto the overall command success.
    pub fn vetoes_success(&self) -> bool {
        self.result != ArgumentResult::Success
    }

    /// Records the raw token unless the parser already set one.
    pub(crate) fn fill_text(&mut self, text: Option<&str>) {
        if self.text.is_none() {
            self.text = text.map(str::to_string);
        }
    }
}

impl<T: Any + Send + Sync> Argument<T> {
    /// Erase the value type so arguments of different types can be
    /// stored side by side in a [`crate::command::CommandResult`].
    pub fn erase(self) -> Argument<Value> {
        Argument {
            result: self.result,
            value: self.value.map(Value::new),
            text: self.text,
        }
    }
}

impl Argument<Value> {
    /// Borrow the value as `T`, if present and of that type
    pub fn value_as<T: Any>(&self) -> Option<&T> {
        self.value.as_ref().and_then(|v| v.downcast_ref::<T>())
    }
}
