//! Suggestion wire types and record formatting
//!
//! The wire shape consumed by the input widget is a JSON array of
//! `{id, label, value}` objects, in backend result order.

mod format;

pub use format::format_records;

use serde::{Deserialize, Serialize};

/// One rendered suggestion
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Suggestion {
    /// Stringified identity key of the backing record.
    pub id: String,
    /// Display text. Equal to `value` unless a display projection is
    /// configured, in which case both reflect the projected attribute.
    pub label: String,
    /// Value written back into the input on selection.
    pub value: String,
}

impl Suggestion {
    pub fn new(
        id: impl Into<String>,
        label: impl Into<String>,
        value: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            label: label.into(),
            value: value.into(),
        }
    }
}
