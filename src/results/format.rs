//! Projection of raw backend records into suggestions

use super::Suggestion;
use crate::backend::Record;
use serde_json::Value;

/// Project records into suggestions, preserving backend order.
///
/// `id` is the record's identity key stringified; `label` and `value` are
/// the display attribute (`display_field` when configured, otherwise
/// `label_field`) stringified. Pure and total over well-formed records.
pub fn format_records(
    records: &[Record],
    label_field: &str,
    display_field: Option<&str>,
) -> Vec<Suggestion> {
    let shown = display_field.unwrap_or(label_field);
    records
        .iter()
        .map(|record| {
            let text = record.field(shown).map(text_of).unwrap_or_default();
            Suggestion {
                id: text_of(&record.id),
                label: text.clone(),
                value: text,
            }
        })
        .collect()
}

fn text_of(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Null => String::new(),
        other => other.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::collections::BTreeMap;

    fn record(id: Value, name: &str, display: &str) -> Record {
        let mut fields = BTreeMap::new();
        fields.insert("name".to_string(), json!(name));
        fields.insert("display_name".to_string(), json!(display));
        Record { id, fields }
    }

    #[test]
    fn test_label_equals_value() {
        let records = vec![record(json!(1), "Alpha", "Al pha")];
        let suggestions = format_records(&records, "name", None);

        assert_eq!(suggestions.len(), 1);
        assert_eq!(suggestions[0].id, "1");
        assert_eq!(suggestions[0].label, "Alpha");
        assert_eq!(suggestions[0].value, "Alpha");
    }

    #[test]
    fn test_display_field_projects_label_and_value() {
        let records = vec![record(json!(1), "Alpha", "Al pha")];
        let suggestions = format_records(&records, "name", Some("display_name"));

        assert_eq!(suggestions[0].id, "1");
        assert_eq!(suggestions[0].label, "Al pha");
        assert_eq!(suggestions[0].value, "Al pha");
    }

    #[test]
    fn test_order_preserved() {
        let records = vec![
            record(json!(2), "Beta", "x"),
            record(json!(1), "Alpha", "y"),
        ];
        let suggestions = format_records(&records, "name", None);
        assert_eq!(suggestions[0].label, "Beta");
        assert_eq!(suggestions[1].label, "Alpha");
    }

    #[test]
    fn test_string_ids_pass_through() {
        let records = vec![record(json!("6543f1b2"), "Alpha", "x")];
        let suggestions = format_records(&records, "name", None);
        assert_eq!(suggestions[0].id, "6543f1b2");
    }
}
