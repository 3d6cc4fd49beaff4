//! Relational backend over SQLite
//!
//! Substring matching is expressed as `LOWER(column) LIKE ? ESCAPE '\'`
//! with the pattern bound as a parameter. Scopes are named WHERE fragments
//! declared in the source configuration; a fragment with `binds_term` set
//! binds the search term to its single `?` placeholder and is only valid
//! in the terminal position of a scope chain.

use super::capability::{BackendVariant, MatchPredicate, OrderDirective};
use super::{check_identifier, Record};
use crate::error::SuggestError;
use crate::query::QueryPlan;
use rusqlite::types::{Value as SqlValue, ValueRef};
use rusqlite::Connection;
use serde::Deserialize;
use serde_json::Value;
use std::collections::{BTreeMap, HashMap};
use std::path::PathBuf;
use std::sync::Mutex;
use tracing::debug;

/// A named WHERE fragment
#[derive(Debug, Clone, Deserialize)]
pub struct RelationalScope {
    /// SQL fragment, e.g. `"featured = 1"` or
    /// `"LOWER(name) LIKE '%' || LOWER(?) || '%'"`.
    pub clause: String,
    /// Whether the fragment's `?` placeholder receives the search term.
    #[serde(default)]
    pub binds_term: bool,
}

/// Source configuration for a relational store
#[derive(Debug, Clone, Deserialize)]
pub struct RelationalSource {
    pub table: String,
    #[serde(default = "default_id_column")]
    pub id_column: String,
    /// Database file; in-memory when absent.
    #[serde(default)]
    pub path: Option<PathBuf>,
    /// DDL executed once at startup.
    #[serde(default)]
    pub schema: Option<String>,
    /// Rows inserted once at startup, keyed by column name.
    #[serde(default)]
    pub fixtures: Vec<BTreeMap<String, Value>>,
    #[serde(default)]
    pub scopes: HashMap<String, RelationalScope>,
}

fn default_id_column() -> String {
    "id".to_string()
}

/// SQLite-backed suggestion store
pub struct RelationalBackend {
    conn: Mutex<Connection>,
    table: String,
    id_column: String,
    scopes: HashMap<String, RelationalScope>,
}

impl RelationalBackend {
    /// Open the database, run the schema, and insert fixtures.
    pub fn open(source: &RelationalSource) -> Result<Self, SuggestError> {
        check_identifier(&source.table)?;
        check_identifier(&source.id_column)?;

        let conn = match &source.path {
            Some(path) => Connection::open(path)?,
            None => Connection::open_in_memory()?,
        };

        if let Some(schema) = &source.schema {
            conn.execute_batch(schema)?;
        }

        for row in &source.fixtures {
            insert_row(&conn, &source.table, row)?;
        }

        Ok(Self {
            conn: Mutex::new(conn),
            table: source.table.clone(),
            id_column: source.id_column.clone(),
            scopes: source.scopes.clone(),
        })
    }

    fn scope(&self, name: &str) -> Result<&RelationalScope, SuggestError> {
        self.scopes
            .get(name)
            .ok_or_else(|| SuggestError::UnknownScope(name.to_string()))
    }

    /// Compose the SELECT for a plan. Identifiers come from server-side
    /// configuration; every request-supplied value is bound.
    fn compose(&self, plan: &QueryPlan) -> Result<(String, Vec<SqlValue>), SuggestError> {
        let mut clauses: Vec<String> = Vec::new();
        let mut binds: Vec<SqlValue> = Vec::new();

        for invocation in &plan.scopes {
            let scope = self.scope(&invocation.name)?;
            if scope.binds_term {
                return Err(SuggestError::MalformedRequest(format!(
                    "scope {:?} consumes the term and must be last in the chain",
                    invocation.name
                )));
            }
            clauses.push(format!("({})", scope.clause));
        }

        if let Some(terminal) = &plan.terminal_scope {
            let scope = self.scope(&terminal.name)?;
            clauses.push(format!("({})", scope.clause));
            if scope.binds_term {
                let term = terminal.argument.clone().unwrap_or_default();
                binds.push(SqlValue::Text(term));
            }
        }

        if let Some(predicate) = &plan.predicate {
            match predicate {
                MatchPredicate::Like { column, pattern } => {
                    check_identifier(column)?;
                    clauses.push(format!("LOWER({}) LIKE ? ESCAPE '\\'", column));
                    binds.push(SqlValue::Text(pattern.clone()));
                }
                MatchPredicate::Regex { .. } => {
                    return Err(SuggestError::UnsupportedBackend(
                        "regex predicate on a relational backend".to_string(),
                    ));
                }
            }
        }

        for (key, value) in &plan.filters {
            check_identifier(key)?;
            clauses.push(format!("{} = ?", key));
            binds.push(SqlValue::Text(value.clone()));
        }

        let mut sql = format!("SELECT * FROM {}", self.table);
        if !clauses.is_empty() {
            sql.push_str(" WHERE ");
            sql.push_str(&clauses.join(" AND "));
        }

        if let Some(order) = &plan.order {
            match order {
                OrderDirective::Clause(clause) => {
                    sql.push_str(" ORDER BY ");
                    sql.push_str(clause);
                }
                OrderDirective::Keys(_) => {
                    return Err(SuggestError::UnsupportedBackend(
                        "key ordering on a relational backend".to_string(),
                    ));
                }
            }
        }

        sql.push_str(" LIMIT ?");
        binds.push(SqlValue::Integer(plan.limit as i64));

        Ok((sql, binds))
    }
}

impl super::SuggestionBackend for RelationalBackend {
    fn variant(&self) -> BackendVariant {
        BackendVariant::Relational
    }

    fn run(&self, plan: &QueryPlan) -> Result<Vec<Record>, SuggestError> {
        if plan.variant != BackendVariant::Relational {
            return Err(SuggestError::UnsupportedBackend(plan.variant.to_string()));
        }

        let (sql, binds) = self.compose(plan)?;
        debug!(sql = %sql, "running relational suggestion query");

        let conn = match self.conn.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        };

        let mut stmt = conn.prepare(&sql)?;
        let columns: Vec<String> = stmt.column_names().iter().map(|c| c.to_string()).collect();

        let rows = stmt.query_map(rusqlite::params_from_iter(binds.iter()), |row| {
            let mut fields = BTreeMap::new();
            for (idx, name) in columns.iter().enumerate() {
                fields.insert(name.clone(), json_from_sql(row.get_ref(idx)?));
            }
            Ok(fields)
        })?;

        let mut records = Vec::new();
        for fields in rows {
            let fields = fields?;
            let id = fields.get(&self.id_column).cloned().unwrap_or(Value::Null);
            records.push(Record { id, fields });
        }
        Ok(records)
    }
}

fn insert_row(
    conn: &Connection,
    table: &str,
    row: &BTreeMap<String, Value>,
) -> Result<(), SuggestError> {
    let mut columns = Vec::with_capacity(row.len());
    let mut binds = Vec::with_capacity(row.len());
    for (column, value) in row {
        check_identifier(column)?;
        columns.push(column.as_str());
        binds.push(sql_from_json(value));
    }

    let placeholders = vec!["?"; columns.len()].join(", ");
    let sql = format!(
        "INSERT INTO {} ({}) VALUES ({})",
        table,
        columns.join(", "),
        placeholders
    );
    conn.execute(&sql, rusqlite::params_from_iter(binds.iter()))?;
    Ok(())
}

fn json_from_sql(value: ValueRef<'_>) -> Value {
    match value {
        ValueRef::Null => Value::Null,
        ValueRef::Integer(i) => Value::from(i),
        ValueRef::Real(f) => Value::from(f),
        ValueRef::Text(bytes) => Value::from(String::from_utf8_lossy(bytes).into_owned()),
        ValueRef::Blob(_) => Value::Null,
    }
}

fn sql_from_json(value: &Value) -> SqlValue {
    match value {
        Value::Null => SqlValue::Null,
        Value::Bool(b) => SqlValue::Integer(*b as i64),
        Value::Number(n) => {
            if let Some(i) = n.as_i64() {
                SqlValue::Integer(i)
            } else {
                SqlValue::Real(n.as_f64().unwrap_or(0.0))
            }
        }
        Value::String(s) => SqlValue::Text(s.clone()),
        other => SqlValue::Text(other.to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::{descriptor, SuggestionBackend};
    use crate::query::{build, OrderSpec, SuggestionRequest};
    use serde_json::json;

    fn movie_source() -> RelationalSource {
        RelationalSource {
            table: "movies".to_string(),
            id_column: "id".to_string(),
            path: None,
            schema: Some(
                "CREATE TABLE movies (id INTEGER PRIMARY KEY, name TEXT, \
                 display_name TEXT, movie_type TEXT, year INTEGER, featured INTEGER)"
                    .to_string(),
            ),
            fixtures: vec![
                fixture(1, "Alpha", "Al pha", "Comedy", 1990, 1),
                fixture(2, "Alzpha", "Alz pha", "Drama", 1942, 0),
                fixture(3, "Beta", "Be ta", "Comedy", 2001, 1),
            ],
            scopes: scopes(),
        }
    }

    fn fixture(
        id: i64,
        name: &str,
        display: &str,
        movie_type: &str,
        year: i64,
        featured: i64,
    ) -> BTreeMap<String, Value> {
        let mut row = BTreeMap::new();
        row.insert("id".to_string(), json!(id));
        row.insert("name".to_string(), json!(name));
        row.insert("display_name".to_string(), json!(display));
        row.insert("movie_type".to_string(), json!(movie_type));
        row.insert("year".to_string(), json!(year));
        row.insert("featured".to_string(), json!(featured));
        row
    }

    fn scopes() -> HashMap<String, RelationalScope> {
        let mut scopes = HashMap::new();
        scopes.insert(
            "featured".to_string(),
            RelationalScope {
                clause: "featured = 1".to_string(),
                binds_term: false,
            },
        );
        scopes.insert(
            "by_name".to_string(),
            RelationalScope {
                clause: "LOWER(name) LIKE '%' || LOWER(?) || '%'".to_string(),
                binds_term: true,
            },
        );
        scopes
    }

    fn backend() -> RelationalBackend {
        RelationalBackend::open(&movie_source()).unwrap()
    }

    fn run(backend: &RelationalBackend, request: &SuggestionRequest) -> Vec<Record> {
        let plan = build(
            request,
            "name",
            descriptor(BackendVariant::Relational),
        )
        .unwrap();
        backend.run(&plan).unwrap()
    }

    fn names(records: &[Record]) -> Vec<String> {
        records
            .iter()
            .map(|r| r.field("name").and_then(Value::as_str).unwrap().to_string())
            .collect()
    }

    #[test]
    fn test_empty_term_matches_everything() {
        let records = run(&backend(), &SuggestionRequest::new(""));
        assert_eq!(records.len(), 3);
    }

    #[test]
    fn test_default_order_is_ascending() {
        let records = run(&backend(), &SuggestionRequest::new("Al"));
        assert_eq!(names(&records), vec!["Alpha", "Alzpha"]);
    }

    #[test]
    fn test_explicit_descending_order() {
        let request = SuggestionRequest::new("Al").with_order(OrderSpec::desc("name"));
        let records = run(&backend(), &request);
        assert_eq!(names(&records), vec!["Alzpha", "Alpha"]);
    }

    #[test]
    fn test_limit_truncates() {
        let request = SuggestionRequest::new("Al").with_limit(1);
        let records = run(&backend(), &request);
        assert_eq!(records.len(), 1);
    }

    #[test]
    fn test_case_insensitive_match() {
        let mut source = movie_source();
        source.fixtures.push(fixture(4, "aLpHa", "x", "Comedy", 2010, 0));
        let backend = RelationalBackend::open(&source).unwrap();

        let records = run(&backend, &SuggestionRequest::new("Al"));
        assert_eq!(records.len(), 3);
        assert!(names(&records).contains(&"aLpHa".to_string()));
    }

    #[test]
    fn test_prefix_match_by_default() {
        let records = run(&backend(), &SuggestionRequest::new("ph"));
        assert!(records.is_empty());
    }

    #[test]
    fn test_full_text_matches_mid_word() {
        let request = SuggestionRequest::new("ph").full_text(true);
        let records = run(&backend(), &request);
        assert_eq!(names(&records), vec!["Alpha", "Alzpha"]);
    }

    #[test]
    fn test_filters_narrow_results() {
        let request = SuggestionRequest::new("Al")
            .with_filter("movie_type", "Drama")
            .with_filter("year", "1942");
        let records = run(&backend(), &request);
        assert_eq!(names(&records), vec!["Alzpha"]);
    }

    #[test]
    fn test_like_wildcard_in_term_is_literal() {
        let records = run(&backend(), &SuggestionRequest::new("%"));
        assert!(records.is_empty());
    }

    #[test]
    fn test_scope_chain_applies_term_to_terminal_scope() {
        // Scope chain present: the request's order is skipped and the
        // terminal scope receives the term.
        let request = SuggestionRequest::new("al")
            .with_scopes(["featured", "by_name"])
            .with_order(OrderSpec::desc("name"));
        let records = run(&backend(), &request);
        assert_eq!(names(&records), vec!["Alpha"]);
    }

    #[test]
    fn test_scope_chain_without_term_binding() {
        let request = SuggestionRequest::new("irrelevant").with_scopes(["featured"]);
        let records = run(&backend(), &request);
        assert_eq!(names(&records), vec!["Alpha", "Beta"]);
    }

    #[test]
    fn test_unknown_scope_rejected() {
        let request = SuggestionRequest::new("al").with_scopes(["missing"]);
        let plan = build(
            &request,
            "name",
            descriptor(BackendVariant::Relational),
        )
        .unwrap();
        let err = backend().run(&plan).unwrap_err();
        assert!(matches!(err, SuggestError::UnknownScope(name) if name == "missing"));
    }

    #[test]
    fn test_term_binding_scope_must_be_terminal() {
        let request = SuggestionRequest::new("al").with_scopes(["by_name", "featured"]);
        let plan = build(
            &request,
            "name",
            descriptor(BackendVariant::Relational),
        )
        .unwrap();
        let err = backend().run(&plan).unwrap_err();
        assert!(matches!(err, SuggestError::MalformedRequest(_)));
    }

    #[test]
    fn test_document_plan_rejected() {
        let request = SuggestionRequest::new("al");
        let plan = build(&request, "name", descriptor(BackendVariant::Document)).unwrap();
        let err = backend().run(&plan).unwrap_err();
        assert!(matches!(err, SuggestError::UnsupportedBackend(_)));
    }
}
