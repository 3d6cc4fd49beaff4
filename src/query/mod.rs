//! Suggestion request model and query builder
//!
//! A [`SuggestionRequest`] carries everything needed to answer one
//! as-you-type query: the partial term, an optional scope chain, ordering,
//! limit, equality filters, and the prefix/substring toggle. The builder
//! lowers a request into a backend-neutral [`QueryPlan`] using the
//! capability descriptor of the target backend variant.

mod builder;

pub use builder::{build, QueryPlan};

use crate::DEFAULT_LIMIT;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// One as-you-type suggestion query
#[derive(Debug, Clone)]
pub struct SuggestionRequest {
    /// The partial term being typed. May be empty; an empty term still
    /// executes and matches everything up to the limit.
    pub term: String,
    /// Named narrowing operations, applied in order. The last one is the
    /// terminal scope and receives the term as its argument.
    pub scope_chain: Vec<ScopeInvocation>,
    /// Explicit ordering; `None` falls back to ascending on the matched
    /// field (unless a scope chain is present, see the builder).
    pub order: Option<OrderSpec>,
    /// Maximum number of records returned. Must be positive.
    pub limit: usize,
    /// Equality filters, already reduced to the keys present in the
    /// incoming request.
    pub filters: BTreeMap<String, String>,
    /// Match the term anywhere in the value instead of as a prefix.
    pub full_text: bool,
}

impl SuggestionRequest {
    pub fn new(term: impl Into<String>) -> Self {
        Self {
            term: term.into(),
            scope_chain: Vec::new(),
            order: None,
            limit: DEFAULT_LIMIT,
            filters: BTreeMap::new(),
            full_text: false,
        }
    }

    pub fn with_scopes<I, S>(mut self, names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.scope_chain = names.into_iter().map(ScopeInvocation::new).collect();
        self
    }

    pub fn with_order(mut self, order: OrderSpec) -> Self {
        self.order = Some(order);
        self
    }

    pub fn with_limit(mut self, limit: usize) -> Self {
        self.limit = limit;
        self
    }

    pub fn with_filter(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.filters.insert(key.into(), value.into());
        self
    }

    pub fn full_text(mut self, full: bool) -> Self {
        self.full_text = full;
        self
    }
}

/// A named query-narrowing operation. At most one invocation in a chain
/// carries the term, and it is always the last one applied.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScopeInvocation {
    pub name: String,
    /// The search term, present only on the terminal scope of a built plan.
    pub argument: Option<String>,
}

impl ScopeInvocation {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            argument: None,
        }
    }

    pub fn with_argument(mut self, term: impl Into<String>) -> Self {
        self.argument = Some(term.into());
        self
    }
}

/// Sort direction
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    Asc,
    Desc,
}

impl Direction {
    /// SQL keyword form
    pub fn as_sql(&self) -> &'static str {
        match self {
            Self::Asc => "ASC",
            Self::Desc => "DESC",
        }
    }
}

/// Ordered `(field, direction)` pairs
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderSpec(pub Vec<(String, Direction)>);

impl OrderSpec {
    pub fn asc(field: impl Into<String>) -> Self {
        Self(vec![(field.into(), Direction::Asc)])
    }

    pub fn desc(field: impl Into<String>) -> Self {
        Self(vec![(field.into(), Direction::Desc)])
    }

    /// Default ordering: ascending on the matched field.
    pub fn default_for(field: &str) -> Self {
        Self::asc(field)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_request_defaults() {
        let request = SuggestionRequest::new("al");
        assert_eq!(request.term, "al");
        assert_eq!(request.limit, DEFAULT_LIMIT);
        assert!(request.scope_chain.is_empty());
        assert!(request.order.is_none());
        assert!(!request.full_text);
    }

    #[test]
    fn test_direction_sql() {
        assert_eq!(Direction::Asc.as_sql(), "ASC");
        assert_eq!(Direction::Desc.as_sql(), "DESC");
    }

    #[test]
    fn test_default_order() {
        let order = OrderSpec::default_for("name");
        assert_eq!(order.0, vec![("name".to_string(), Direction::Asc)]);
    }
}
