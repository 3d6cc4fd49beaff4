//! Document backend over an in-memory JSON collection
//!
//! Substring matching is expressed as an anchored, case-insensitive
//! regular expression. Scopes are named document filters: an equality
//! narrowing filter, or a term-matching filter for the terminal position.

use super::capability::{BackendVariant, MatchPredicate, OrderDirective};
use super::Record;
use crate::error::SuggestError;
use crate::query::{Direction, QueryPlan};
use regex::{Regex, RegexBuilder};
use serde::Deserialize;
use serde_json::{Map, Value};
use std::cmp::Ordering;
use std::collections::HashMap;
use std::path::PathBuf;
use tracing::debug;

/// A named document filter
#[derive(Debug, Clone, Deserialize)]
pub struct DocumentScope {
    /// Field the filter inspects.
    pub field: String,
    /// Equality narrowing: keep documents whose field equals this value.
    #[serde(default)]
    pub equals: Option<Value>,
    /// Term matching: keep documents whose field matches the search term.
    /// Only valid in the terminal position of a scope chain.
    #[serde(default)]
    pub matches_term: bool,
    /// Match the term anywhere in the value instead of as a prefix.
    #[serde(default)]
    pub full: bool,
}

/// Source configuration for a document store
#[derive(Debug, Clone, Deserialize)]
pub struct DocumentSource {
    #[serde(default = "default_id_field")]
    pub id_field: String,
    /// Inline document collection.
    #[serde(default)]
    pub documents: Vec<Map<String, Value>>,
    /// JSON file holding an array of documents, loaded at startup.
    #[serde(default)]
    pub path: Option<PathBuf>,
    #[serde(default)]
    pub scopes: HashMap<String, DocumentScope>,
}

fn default_id_field() -> String {
    "id".to_string()
}

/// In-memory document suggestion store
pub struct DocumentBackend {
    id_field: String,
    documents: Vec<Map<String, Value>>,
    scopes: HashMap<String, DocumentScope>,
}

impl DocumentBackend {
    /// Load the collection (inline documents plus an optional JSON file).
    pub fn open(source: &DocumentSource) -> Result<Self, SuggestError> {
        let mut documents = source.documents.clone();

        if let Some(path) = &source.path {
            let text = std::fs::read_to_string(path).map_err(|e| {
                SuggestError::MalformedRequest(format!(
                    "cannot read document source {}: {}",
                    path.display(),
                    e
                ))
            })?;
            let loaded: Vec<Map<String, Value>> = serde_json::from_str(&text).map_err(|e| {
                SuggestError::MalformedRequest(format!(
                    "document source {} is not a JSON array of objects: {}",
                    path.display(),
                    e
                ))
            })?;
            documents.extend(loaded);
        }

        Ok(Self {
            id_field: source.id_field.clone(),
            documents,
            scopes: source.scopes.clone(),
        })
    }

    fn scope(&self, name: &str) -> Result<&DocumentScope, SuggestError> {
        self.scopes
            .get(name)
            .ok_or_else(|| SuggestError::UnknownScope(name.to_string()))
    }
}

impl super::SuggestionBackend for DocumentBackend {
    fn variant(&self) -> BackendVariant {
        BackendVariant::Document
    }

    fn run(&self, plan: &QueryPlan) -> Result<Vec<Record>, SuggestError> {
        if plan.variant != BackendVariant::Document {
            return Err(SuggestError::UnsupportedBackend(plan.variant.to_string()));
        }
        debug!(limit = plan.limit, "running document suggestion query");

        let mut docs: Vec<&Map<String, Value>> = self.documents.iter().collect();

        for invocation in &plan.scopes {
            let scope = self.scope(&invocation.name)?;
            if scope.matches_term {
                return Err(SuggestError::MalformedRequest(format!(
                    "scope {:?} consumes the term and must be last in the chain",
                    invocation.name
                )));
            }
            docs.retain(|doc| equals_filter(doc, scope));
        }

        if let Some(terminal) = &plan.terminal_scope {
            let scope = self.scope(&terminal.name)?;
            if scope.matches_term {
                let term = terminal.argument.as_deref().unwrap_or_default();
                let pattern = if scope.full {
                    format!(".*{}.*", regex::escape(term))
                } else {
                    format!("^{}.*", regex::escape(term))
                };
                let matcher = case_insensitive(&pattern)?;
                docs.retain(|doc| field_matches(doc, &scope.field, &matcher));
            } else {
                docs.retain(|doc| equals_filter(doc, scope));
            }
        }

        if let Some(predicate) = &plan.predicate {
            match predicate {
                MatchPredicate::Regex { field, pattern } => {
                    let matcher = case_insensitive(pattern)?;
                    docs.retain(|doc| field_matches(doc, field, &matcher));
                }
                MatchPredicate::Like { .. } => {
                    return Err(SuggestError::UnsupportedBackend(
                        "LIKE predicate on a document backend".to_string(),
                    ));
                }
            }
        }

        for (key, value) in &plan.filters {
            docs.retain(|doc| {
                doc.get(key)
                    .map(|v| text_of(v) == *value)
                    .unwrap_or(false)
            });
        }

        if let Some(order) = &plan.order {
            match order {
                OrderDirective::Keys(keys) => {
                    docs.sort_by(|a, b| compare_by_keys(a, b, keys));
                }
                OrderDirective::Clause(_) => {
                    return Err(SuggestError::UnsupportedBackend(
                        "SQL ordering on a document backend".to_string(),
                    ));
                }
            }
        }

        docs.truncate(plan.limit);

        Ok(docs
            .into_iter()
            .map(|doc| Record {
                id: doc.get(&self.id_field).cloned().unwrap_or(Value::Null),
                fields: doc.iter().map(|(k, v)| (k.clone(), v.clone())).collect(),
            })
            .collect())
    }
}

fn case_insensitive(pattern: &str) -> Result<Regex, SuggestError> {
    Ok(RegexBuilder::new(pattern).case_insensitive(true).build()?)
}

fn equals_filter(doc: &Map<String, Value>, scope: &DocumentScope) -> bool {
    match &scope.equals {
        Some(expected) => doc.get(&scope.field) == Some(expected),
        None => true,
    }
}

fn field_matches(doc: &Map<String, Value>, field: &str, matcher: &Regex) -> bool {
    doc.get(field)
        .map(|v| matcher.is_match(&text_of(v)))
        .unwrap_or(false)
}

/// Bare text of a JSON value: strings without quotes, everything else in
/// its JSON form.
pub(crate) fn text_of(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

fn compare_by_keys(
    a: &Map<String, Value>,
    b: &Map<String, Value>,
    keys: &[(String, Direction)],
) -> Ordering {
    for (field, direction) in keys {
        let ordering = compare_values(a.get(field), b.get(field));
        let ordering = match direction {
            Direction::Asc => ordering,
            Direction::Desc => ordering.reverse(),
        };
        if ordering != Ordering::Equal {
            return ordering;
        }
    }
    Ordering::Equal
}

fn compare_values(a: Option<&Value>, b: Option<&Value>) -> Ordering {
    match (a, b) {
        (Some(Value::Number(x)), Some(Value::Number(y))) => x
            .as_f64()
            .partial_cmp(&y.as_f64())
            .unwrap_or(Ordering::Equal),
        (Some(x), Some(y)) => text_of(x).cmp(&text_of(y)),
        (Some(_), None) => Ordering::Greater,
        (None, Some(_)) => Ordering::Less,
        (None, None) => Ordering::Equal,
    }
}
