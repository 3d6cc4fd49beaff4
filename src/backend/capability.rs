//! Capability descriptors for the supported backend variants
//!
//! A descriptor knows how its variant expresses a case-insensitive
//! substring match and how it represents ordering. Descriptors are
//! stateless; one shared instance exists per variant. The set of variants
//! is closed: anything else is an `UnsupportedBackend` configuration error.

use crate::error::SuggestError;
use crate::query::{Direction, OrderSpec};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Supported backend variants
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BackendVariant {
    Relational,
    Document,
}

impl BackendVariant {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Relational => "relational",
            Self::Document => "document",
        }
    }
}

impl fmt::Display for BackendVariant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for BackendVariant {
    type Err = SuggestError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "relational" | "sql" => Ok(Self::Relational),
            "document" | "doc" => Ok(Self::Document),
            other => Err(SuggestError::UnsupportedBackend(other.to_string())),
        }
    }
}

/// A variant-specific term-matching predicate
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MatchPredicate {
    /// `LOWER(column) LIKE pattern ESCAPE '\'` with the pattern bound as a
    /// parameter.
    Like { column: String, pattern: String },
    /// Case-insensitive regular expression over the field value.
    Regex { field: String, pattern: String },
}

/// A variant-specific ordering representation
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OrderDirective {
    /// SQL `ORDER BY` clause body, e.g. `"name ASC, year DESC"`.
    Clause(String),
    /// Sort keys for an in-process comparison.
    Keys(Vec<(String, Direction)>),
}

/// Variant-specific query syntax, isolated from the term-agnostic builder
pub trait CapabilityDescriptor: Send + Sync {
    fn variant(&self) -> BackendVariant;

    /// Build the case-insensitive substring/prefix predicate for `field`.
    /// The term must arrive unescaped; the descriptor escapes it for its
    /// own pattern syntax, never interpolating it raw.
    fn substring_predicate(&self, field: &str, term: &str, full_text: bool) -> MatchPredicate;

    /// Express an [`OrderSpec`] in the variant's own terms.
    fn order_directive(&self, order: &OrderSpec) -> OrderDirective;
}

/// Shared descriptor instance for a variant.
pub fn descriptor(variant: BackendVariant) -> &'static dyn CapabilityDescriptor {
    match variant {
        BackendVariant::Relational => &RelationalCapability,
        BackendVariant::Document => &DocumentCapability,
    }
}

/// SQL `LIKE` over a lowercased column
pub struct RelationalCapability;

impl CapabilityDescriptor for RelationalCapability {
    fn variant(&self) -> BackendVariant {
        BackendVariant::Relational
    }

    fn substring_predicate(&self, field: &str, term: &str, full_text: bool) -> MatchPredicate {
        let escaped = escape_like(&term.to_lowercase());
        let pattern = if full_text {
            format!("%{}%", escaped)
        } else {
            format!("{}%", escaped)
        };
        MatchPredicate::Like {
            column: field.to_string(),
            pattern,
        }
    }

    fn order_directive(&self, order: &OrderSpec) -> OrderDirective {
        let clause = order
            .0
            .iter()
            .map(|(field, dir)| format!("{} {}", field, dir.as_sql()))
            .collect::<Vec<_>>()
            .join(", ");
        OrderDirective::Clause(clause)
    }
}

/// Case-insensitive regular expression over a document field
pub struct DocumentCapability;

impl CapabilityDescriptor for DocumentCapability {
    fn variant(&self) -> BackendVariant {
        BackendVariant::Document
    }

    fn substring_predicate(&self, field: &str, term: &str, full_text: bool) -> MatchPredicate {
        let escaped = regex::escape(term);
        let pattern = if full_text {
            format!(".*{}.*", escaped)
        } else {
            format!("^{}.*", escaped)
        };
        MatchPredicate::Regex {
            field: field.to_string(),
            pattern,
        }
    }

    fn order_directive(&self, order: &OrderSpec) -> OrderDirective {
        OrderDirective::Keys(order.0.clone())
    }
}

/// Escape SQL `LIKE` wildcards in a term destined for a pattern with
/// `ESCAPE '\'`.
fn escape_like(term: &str) -> String {
    let mut out = String::with_capacity(term.len());
    for c in term.chars() {
        if matches!(c, '%' | '_' | '\\') {
            out.push('\\');
        }
        out.push(c);
    }
    out
}
