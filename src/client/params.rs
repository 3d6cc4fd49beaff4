//! Extra request parameters as an enumerated expression set
//!
//! Parameter values declared on the input element are never evaluated as
//! code. A value is either a literal string, a lookup into the caller's
//! evaluation context (`ctx:` prefix), or a call into a registry of pure
//! named functions (`fn:` prefix). An expression that cannot be resolved
//! degrades to its raw string form.

use std::collections::{BTreeMap, HashMap};
use std::fmt;
use std::sync::Arc;

/// One declared parameter value
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ParamExpr {
    /// Sent as-is.
    Literal(String),
    /// Looked up in the evaluation context's values.
    ContextValue(String),
    /// Resolved by calling a registered pure function.
    Function(String),
}

impl ParamExpr {
    /// Parse the markup form: `ctx:key`, `fn:name`, or a literal.
    pub fn parse(raw: &str) -> Self {
        if let Some(key) = raw.strip_prefix("ctx:") {
            Self::ContextValue(key.to_string())
        } else if let Some(name) = raw.strip_prefix("fn:") {
            Self::Function(name.to_string())
        } else {
            Self::Literal(raw.to_string())
        }
    }

    /// Resolve against the context; unresolvable expressions fall back to
    /// their raw string form.
    pub fn resolve(&self, context: &EvalContext) -> String {
        match self {
            Self::Literal(value) => value.clone(),
            Self::ContextValue(key) => context
                .value(key)
                .map(String::from)
                .unwrap_or_else(|| self.to_string()),
            Self::Function(name) => context.call(name).unwrap_or_else(|| self.to_string()),
        }
    }
}

impl fmt::Display for ParamExpr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Literal(value) => write!(f, "{}", value),
            Self::ContextValue(key) => write!(f, "ctx:{}", key),
            Self::Function(name) => write!(f, "fn:{}", name),
        }
    }
}

type ParamFn = Arc<dyn Fn() -> String + Send + Sync>;

/// Caller-supplied values and pure functions for parameter resolution
#[derive(Clone, Default)]
pub struct EvalContext {
    values: BTreeMap<String, String>,
    functions: HashMap<String, ParamFn>,
}

impl EvalContext {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_value(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.values.insert(key.into(), value.into());
        self
    }

    pub fn register_function<F>(mut self, name: impl Into<String>, f: F) -> Self
    where
        F: Fn() -> String + Send + Sync + 'static,
    {
        self.functions.insert(name.into(), Arc::new(f));
        self
    }

    pub fn value(&self, key: &str) -> Option<&str> {
        self.values.get(key).map(String::as_str)
    }

    pub fn call(&self, name: &str) -> Option<String> {
        self.functions.get(name).map(|f| f())
    }
}
