//! HTTP request handlers

use super::state::AppState;
use crate::error::SuggestError;
use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use std::collections::HashMap;

/// Suggestion handler: `GET /suggest/{field}?term=...` plus any declared
/// filter parameters. Responds with a JSON array of
/// `{id, label, value}` objects in backend result order.
pub async fn suggest(
    State(state): State<AppState>,
    Path(field): Path<String>,
    Query(params): Query<HashMap<String, String>>,
) -> Response {
    let handle = match state.field(&field) {
        Some(handle) => handle,
        None => {
            return error_response(&SuggestError::UnknownField(field));
        }
    };

    let request = handle.config.request(&params);
    match handle.service.answer(&request) {
        Ok(suggestions) => Json(suggestions).into_response(),
        Err(err) => error_response(&err),
    }
}

/// Health check handler
pub async fn health() -> impl IntoResponse {
    Json(serde_json::json!({
        "status": "ok",
        "version": crate::VERSION
    }))
}

fn error_response(err: &SuggestError) -> Response {
    let status = match err {
        SuggestError::UnknownField(_) => StatusCode::NOT_FOUND,
        SuggestError::MalformedRequest(_) => StatusCode::BAD_REQUEST,
        _ => StatusCode::INTERNAL_SERVER_ERROR,
    };
    if status.is_server_error() {
        tracing::error!("suggestion query failed: {}", err);
    }
    (status, Json(serde_json::json!({ "error": err.to_string() }))).into_response()
}
