//! Backing-store abstraction
//!
//! A [`SuggestionBackend`] executes a built [`QueryPlan`] against one
//! store and returns raw records. Two variants exist: relational (SQLite)
//! and document (in-memory JSON collection). Each backend owns a registry
//! of named scopes declared in its source configuration.

pub mod capability;

mod document;
mod relational;

pub use capability::{
    descriptor, BackendVariant, CapabilityDescriptor, MatchPredicate, OrderDirective,
};
pub use document::{DocumentBackend, DocumentScope, DocumentSource};
pub use relational::{RelationalBackend, RelationalScope, RelationalSource};

use crate::error::SuggestError;
use crate::query::QueryPlan;
use serde_json::Value;
use std::collections::BTreeMap;

/// A raw backend record: identity key plus named field values
#[derive(Debug, Clone, PartialEq)]
pub struct Record {
    pub id: Value,
    pub fields: BTreeMap<String, Value>,
}

impl Record {
    pub fn field(&self, name: &str) -> Option<&Value> {
        self.fields.get(name)
    }
}

/// One backing store able to answer suggestion queries
pub trait SuggestionBackend: Send + Sync {
    fn variant(&self) -> BackendVariant;

    /// Execute a plan built for this backend's variant. Running a plan
    /// built for another variant fails with `UnsupportedBackend`.
    fn run(&self, plan: &QueryPlan) -> Result<Vec<Record>, SuggestError>;
}

/// Conservative identifier check for configuration-supplied table, column,
/// and field names. Term and filter values never pass through here; they
/// always travel as bound parameters or escaped patterns.
pub(crate) fn check_identifier(name: &str) -> Result<(), SuggestError> {
    let valid = !name.is_empty()
        && !name.starts_with(|c: char| c.is_ascii_digit())
        && name.chars().all(|c| c.is_ascii_alphanumeric() || c == '_');
    if valid {
        Ok(())
    } else {
        Err(SuggestError::MalformedRequest(format!(
            "invalid identifier: {:?}",
            name
        )))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_check_identifier() {
        assert!(check_identifier("movie_name").is_ok());
        assert!(check_identifier("Name2").is_ok());
        assert!(check_identifier("").is_err());
        assert!(check_identifier("1name").is_err());
        assert!(check_identifier("name; DROP TABLE movies").is_err());
    }
}
