//! Lowering a request into a backend-neutral query plan

use super::{OrderSpec, ScopeInvocation, SuggestionRequest};
use crate::backend::capability::{
    BackendVariant, CapabilityDescriptor, MatchPredicate, OrderDirective,
};
use crate::error::SuggestError;
use std::collections::BTreeMap;

/// A built suggestion query, ready for a backend of the matching variant
#[derive(Debug, Clone)]
pub struct QueryPlan {
    /// Variant the plan was built for. Running it against a different
    /// backend is a configuration error.
    pub variant: BackendVariant,
    /// Narrowing scopes, applied in order, none receiving the term.
    pub scopes: Vec<ScopeInvocation>,
    /// The final scope, carrying the term as its argument.
    pub terminal_scope: Option<ScopeInvocation>,
    /// Substring predicate; present only when the scope chain is empty.
    pub predicate: Option<MatchPredicate>,
    /// Equality constraints.
    pub filters: BTreeMap<String, String>,
    /// Ordering; absent when a scope chain controls its own ordering.
    pub order: Option<OrderDirective>,
    pub limit: usize,
}

/// Build a query plan for one request.
///
/// When a scope chain is present, the last scope receives the term and the
/// explicit or default order is deliberately not applied: ordering is the
/// scope's responsibility. This is documented policy, not an omission —
/// downstream scopes may depend on controlling their own ordering.
pub fn build(
    request: &SuggestionRequest,
    field: &str,
    descriptor: &dyn CapabilityDescriptor,
) -> Result<QueryPlan, SuggestError> {
    if request.limit == 0 {
        return Err(SuggestError::MalformedRequest(
            "limit must be positive".to_string(),
        ));
    }

    if !request.scope_chain.is_empty() {
        let mut scopes = request.scope_chain.clone();
        let terminal = scopes
            .pop()
            .map(|s| ScopeInvocation::new(s.name).with_argument(request.term.clone()));

        return Ok(QueryPlan {
            variant: descriptor.variant(),
            scopes,
            terminal_scope: terminal,
            predicate: None,
            filters: BTreeMap::new(),
            order: None,
            limit: request.limit,
        });
    }

    let predicate = descriptor.substring_predicate(field, &request.term, request.full_text);
    let order = request
        .order
        .clone()
        .unwrap_or_else(|| OrderSpec::default_for(field));

    Ok(QueryPlan {
        variant: descriptor.variant(),
        scopes: Vec::new(),
        terminal_scope: None,
        predicate: Some(predicate),
        filters: request.filters.clone(),
        order: Some(descriptor.order_directive(&order)),
        limit: request.limit,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::capability::descriptor;
    use crate::query::Direction;

    fn relational() -> &'static dyn CapabilityDescriptor {
        descriptor(BackendVariant::Relational)
    }

    #[test]
    fn test_zero_limit_rejected() {
        let request = SuggestionRequest::new("al").with_limit(0);
        let err = build(&request, "name", relational()).unwrap_err();
        assert!(matches!(err, SuggestError::MalformedRequest(_)));
    }

    #[test]
    fn test_predicate_branch_defaults_order_ascending() {
        let request = SuggestionRequest::new("al");
        let plan = build(&request, "name", relational()).unwrap();

        assert!(plan.terminal_scope.is_none());
        assert!(plan.predicate.is_some());
        match plan.order {
            Some(OrderDirective::Clause(clause)) => assert_eq!(clause, "name ASC"),
            other => panic!("unexpected order: {:?}", other),
        }
    }

    #[test]
    fn test_explicit_order_wins() {
        let request = SuggestionRequest::new("al").with_order(OrderSpec::desc("name"));
        let plan = build(&request, "name", relational()).unwrap();
        match plan.order {
            Some(OrderDirective::Clause(clause)) => assert_eq!(clause, "name DESC"),
            other => panic!("unexpected order: {:?}", other),
        }
    }

    #[test]
    fn test_terminal_scope_receives_term() {
        let request = SuggestionRequest::new("al").with_scopes(["featured", "by_name"]);
        let plan = build(&request, "name", relational()).unwrap();

        assert_eq!(plan.scopes.len(), 1);
        assert_eq!(plan.scopes[0].name, "featured");
        assert!(plan.scopes[0].argument.is_none());

        let terminal = plan.terminal_scope.unwrap();
        assert_eq!(terminal.name, "by_name");
        assert_eq!(terminal.argument.as_deref(), Some("al"));
        assert!(plan.predicate.is_none());
    }

    #[test]
    fn test_scope_chain_skips_order() {
        // Explicit order is dropped when a scope chain is present: the
        // scope controls its own ordering.
        let request = SuggestionRequest::new("al")
            .with_scopes(["by_name"])
            .with_order(OrderSpec::desc("name"));
        let plan = build(&request, "name", relational()).unwrap();
        assert!(plan.order.is_none());
    }

    #[test]
    fn test_scope_chain_skips_filters() {
        let request = SuggestionRequest::new("al")
            .with_scopes(["by_name"])
            .with_filter("year", "1942");
        let plan = build(&request, "name", relational()).unwrap();
        assert!(plan.filters.is_empty());
    }

    #[test]
    fn test_filters_carried_on_predicate_branch() {
        let request = SuggestionRequest::new("al").with_filter("year", "1942");
        let plan = build(&request, "name", relational()).unwrap();
        assert_eq!(plan.filters.get("year").map(String::as_str), Some("1942"));
    }

    #[test]
    fn test_empty_term_builds() {
        let request = SuggestionRequest::new("");
        let plan = build(&request, "name", relational()).unwrap();
        match plan.predicate {
            Some(MatchPredicate::Like { pattern, .. }) => assert_eq!(pattern, "%"),
            other => panic!("unexpected predicate: {:?}", other),
        }
    }

    #[test]
    fn test_document_plan_orders_by_keys() {
        let request = SuggestionRequest::new("al");
        let plan = build(
            &request,
            "name",
            descriptor(BackendVariant::Document),
        )
        .unwrap();

        assert_eq!(plan.variant, BackendVariant::Document);
        match plan.order {
            Some(OrderDirective::Keys(keys)) => {
                assert_eq!(keys, vec![("name".to_string(), Direction::Asc)])
            }
            other => panic!("unexpected order: {:?}", other),
        }
    }
}
