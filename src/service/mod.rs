//! Suggestion service: one query end to end
//!
//! Composes the query builder, the backend, and the result formatter.
//! Performs no I/O beyond the single backend call and never retries; a
//! backend failure propagates to the caller unchanged.

use crate::backend::{descriptor, SuggestionBackend};
use crate::error::SuggestError;
use crate::query::{self, SuggestionRequest};
use crate::results::{format_records, Suggestion};
use std::sync::Arc;
use tracing::debug;

/// Answers suggestion queries for one configured field
pub struct SuggestionService {
    backend: Arc<dyn SuggestionBackend>,
    /// Field the substring match runs against.
    field: String,
    /// Field projected into `label`/`value`, unless overridden per call.
    label_field: String,
    display_field: Option<String>,
}

impl SuggestionService {
    pub fn new(backend: Arc<dyn SuggestionBackend>, field: impl Into<String>) -> Self {
        let field = field.into();
        Self {
            backend,
            label_field: field.clone(),
            field,
            display_field: None,
        }
    }

    /// Configure an alternate display attribute.
    pub fn with_display_field(mut self, display_field: Option<String>) -> Self {
        self.display_field = display_field;
        self
    }

    /// Answer one request: build the plan, run the backend, format.
    pub fn answer(&self, request: &SuggestionRequest) -> Result<Vec<Suggestion>, SuggestError> {
        let plan = query::build(request, &self.field, descriptor(self.backend.variant()))?;
        let records = self.backend.run(&plan)?;
        debug!(
            field = %self.field,
            term = %request.term,
            matches = records.len(),
            "answered suggestion query"
        );
        Ok(format_records(
            &records,
            &self.label_field,
            self.display_field.as_deref(),
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::{DocumentBackend, DocumentSource};
    use serde_json::{json, Map, Value};
    use std::collections::HashMap;

    fn service(display_field: Option<String>) -> SuggestionService {
        let documents: Vec<Map<String, Value>> = [
            json!({"id": 1, "name": "Alpha", "display_name": "Alpha (1990)"}),
            json!({"id": 2, "name": "Alzpha", "display_name": "Alzpha (1942)"}),
            json!({"id": 3, "name": "Beta", "display_name": "Beta (2001)"}),
        ]
        .into_iter()
        .map(|v| match v {
            Value::Object(map) => map,
            other => panic!("expected object, got {:?}", other),
        })
        .collect();

        let backend = DocumentBackend::open(&DocumentSource {
            id_field: "id".to_string(),
            documents,
            path: None,
            scopes: HashMap::new(),
        })
        .unwrap();

        SuggestionService::new(Arc::new(backend), "name").with_display_field(display_field)
    }

    #[test]
    fn test_answer_formats_matches() {
        let suggestions = service(None).answer(&SuggestionRequest::new("Al")).unwrap();
        assert_eq!(suggestions.len(), 2);
        assert_eq!(suggestions[0], Suggestion::new("1", "Alpha", "Alpha"));
        assert_eq!(suggestions[1], Suggestion::new("2", "Alzpha", "Alzpha"));
    }

    #[test]
    fn test_answer_with_empty_term_succeeds() {
        let suggestions = service(None).answer(&SuggestionRequest::new("")).unwrap();
        assert_eq!(suggestions.len(), 3);
    }

    #[test]
    fn test_display_field_changes_label_and_value_but_not_id() {
        let suggestions = service(Some("display_name".to_string()))
            .answer(&SuggestionRequest::new("Al"))
            .unwrap();
        assert_eq!(suggestions[0].id, "1");
        assert_eq!(suggestions[0].label, "Alpha (1990)");
        assert_eq!(suggestions[0].value, "Alpha (1990)");
    }

    #[test]
    fn test_malformed_limit_propagates() {
        let err = service(None)
            .answer(&SuggestionRequest::new("Al").with_limit(0))
            .unwrap_err();
        assert!(matches!(err, SuggestError::MalformedRequest(_)));
    }
}
