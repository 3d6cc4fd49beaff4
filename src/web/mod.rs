//! Web server module
//!
//! Thin axum glue over the suggestion services: routing, shared state,
//! and the JSON wire protocol.

mod handlers;
mod routes;
mod state;

pub use routes::create_router;
pub use state::AppState;
