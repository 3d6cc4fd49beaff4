//! Application state shared across handlers

use crate::backend::{BackendVariant, DocumentBackend, RelationalBackend, SuggestionBackend};
use crate::config::{FieldConfig, Settings};
use crate::error::SuggestError;
use crate::service::SuggestionService;
use std::collections::HashMap;
use std::sync::Arc;

/// One configured field with its ready-to-query service
pub struct FieldHandle {
    pub config: FieldConfig,
    pub service: SuggestionService,
}

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    /// Global settings
    pub settings: Arc<Settings>,
    /// Field name → suggestion service
    fields: Arc<HashMap<String, FieldHandle>>,
}

impl AppState {
    /// Validate settings, open every backing store, and wire one service
    /// per configured field. Configuration problems fail startup here.
    pub fn new(settings: Settings) -> Result<Self, SuggestError> {
        settings.validate()?;

        let mut backends: HashMap<String, Arc<dyn SuggestionBackend>> = HashMap::new();
        for source in &settings.sources {
            let backend: Arc<dyn SuggestionBackend> = match source.variant()? {
                BackendVariant::Relational => {
                    let relational = source.relational.as_ref().ok_or_else(|| {
                        SuggestError::MalformedRequest(format!(
                            "source {:?} declares a relational backend without a relational section",
                            source.name
                        ))
                    })?;
                    Arc::new(RelationalBackend::open(relational)?)
                }
                BackendVariant::Document => {
                    let document = source.document.as_ref().ok_or_else(|| {
                        SuggestError::MalformedRequest(format!(
                            "source {:?} declares a document backend without a document section",
                            source.name
                        ))
                    })?;
                    Arc::new(DocumentBackend::open(document)?)
                }
            };
            backends.insert(source.name.clone(), backend);
        }

        let mut fields = HashMap::new();
        for field in &settings.fields {
            let backend = backends
                .get(&field.source)
                .cloned()
                .ok_or_else(|| SuggestError::UnknownField(field.source.clone()))?;
            let service = SuggestionService::new(backend, field.field.clone())
                .with_display_field(field.display_value.clone());
            fields.insert(
                field.name.clone(),
                FieldHandle {
                    config: field.clone(),
                    service,
                },
            );
        }

        Ok(Self {
            settings: Arc::new(settings),
            fields: Arc::new(fields),
        })
    }

    pub fn field(&self, name: &str) -> Option<&FieldHandle> {
        self.fields.get(name)
    }

    pub fn field_names(&self) -> Vec<&str> {
        self.fields.keys().map(String::as_str).collect()
    }
}
