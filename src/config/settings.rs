//! Settings structures for typeahead-rs configuration

use crate::backend::{BackendVariant, DocumentSource, RelationalSource};
use crate::error::SuggestError;
use crate::query::{Direction, OrderSpec, SuggestionRequest};
use crate::DEFAULT_LIMIT;
use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::Path;

/// Main settings structure
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub server: ServerSettings,
    /// Backing stores, referenced by fields via `source`.
    pub sources: Vec<SourceConfig>,
    /// Autocompleted fields exposed on the wire.
    pub fields: Vec<FieldConfig>,
}

impl Settings {
    /// Load settings from a YAML file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let settings: Settings = serde_yaml::from_str(&content)?;
        Ok(settings)
    }

    /// Merge with environment variables (TYPEAHEAD_* prefix)
    pub fn merge_env(&mut self) {
        if let Ok(val) = std::env::var("TYPEAHEAD_PORT") {
            if let Ok(port) = val.parse() {
                self.server.port = port;
            }
        }
        if let Ok(val) = std::env::var("TYPEAHEAD_BIND_ADDRESS") {
            self.server.bind_address = val;
        }
    }

    /// Validate cross-references and invariants. Configuration errors are
    /// fatal at startup rather than per-request surprises.
    pub fn validate(&self) -> Result<(), SuggestError> {
        for source in &self.sources {
            source.variant()?;
        }
        for field in &self.fields {
            if self.get_source(&field.source).is_none() {
                return Err(SuggestError::MalformedRequest(format!(
                    "field {:?} references unknown source {:?}",
                    field.name, field.source
                )));
            }
            if field.limit <= 0 {
                return Err(SuggestError::MalformedRequest(format!(
                    "field {:?} has non-positive limit {}",
                    field.name, field.limit
                )));
            }
        }
        Ok(())
    }

    /// Get source config by name
    pub fn get_source(&self, name: &str) -> Option<&SourceConfig> {
        self.sources.iter().find(|s| s.name == name)
    }

    /// Get field config by name
    pub fn get_field(&self, name: &str) -> Option<&FieldConfig> {
        self.fields.iter().find(|f| f.name == name)
    }
}

/// Server settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerSettings {
    pub port: u16,
    pub bind_address: String,
}

impl Default for ServerSettings {
    fn default() -> Self {
        Self {
            port: 8087,
            bind_address: "127.0.0.1".to_string(),
        }
    }
}

/// One backing store
#[derive(Debug, Clone, Deserialize)]
pub struct SourceConfig {
    /// Source name (unique identifier)
    pub name: String,
    /// Backend variant, one of the closed supported set.
    pub backend: String,
    #[serde(default)]
    pub relational: Option<RelationalSource>,
    #[serde(default)]
    pub document: Option<DocumentSource>,
}

impl SourceConfig {
    /// Resolve the declared variant; unknown names fail fast.
    pub fn variant(&self) -> Result<BackendVariant, SuggestError> {
        self.backend.parse()
    }
}

/// Per-field autocomplete configuration
#[derive(Debug, Clone, Deserialize)]
pub struct FieldConfig {
    /// Name used in the request path, e.g. `movie_name`.
    pub name: String,
    /// Backing source this field queries.
    pub source: String,
    /// Record field the match runs against.
    pub field: String,
    #[serde(default = "default_limit")]
    pub limit: i64,
    /// Substring-anywhere matching instead of prefix.
    #[serde(default)]
    pub full: bool,
    #[serde(default)]
    pub order: Option<Vec<OrderKey>>,
    /// Single named scope; shorthand for a one-element `scopes` chain.
    #[serde(default)]
    pub scope: Option<String>,
    #[serde(default)]
    pub scopes: Vec<String>,
    /// Declared filter keys; only those present in a request apply.
    #[serde(default)]
    pub filter_params: Vec<String>,
    /// Alternate display attribute for `label`/`value`.
    #[serde(default)]
    pub display_value: Option<String>,
}

fn default_limit() -> i64 {
    DEFAULT_LIMIT as i64
}

impl FieldConfig {
    /// The effective scope chain: `scope` then `scopes`, flattened.
    pub fn scope_chain(&self) -> Vec<String> {
        self.scope
            .iter()
            .cloned()
            .chain(self.scopes.iter().cloned())
            .collect()
    }

    /// Build a request from incoming query parameters. Declared filter
    /// keys absent from the parameters are skipped, not null-matched.
    pub fn request(&self, params: &HashMap<String, String>) -> SuggestionRequest {
        let term = params.get("term").cloned().unwrap_or_default();
        let mut request = SuggestionRequest::new(term)
            .with_scopes(self.scope_chain())
            .with_limit(self.limit.max(0) as usize)
            .full_text(self.full);

        if let Some(order) = &self.order {
            request = request.with_order(OrderSpec(
                order
                    .iter()
                    .map(|k| (k.field.clone(), k.direction))
                    .collect(),
            ));
        }

        for key in &self.filter_params {
            if let Some(value) = params.get(key) {
                request = request.with_filter(key.clone(), value.clone());
            }
        }

        request
    }
}

/// One ordering key in field configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OrderKey {
    pub field: String,
    #[serde(default = "default_direction")]
    pub direction: Direction,
}

fn default_direction() -> Direction {
    Direction::Asc
}
