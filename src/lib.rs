//! Typeahead-RS: incremental search suggestions over pluggable backing stores
//!
//! Serves as-you-type suggestion queries against structurally different
//! storage engines (relational, document) while keeping matching semantics
//! equivalent, and ships the client-side half of the protocol: term
//! extraction from delimited input, request debouncing, and stale-response
//! discard.

pub mod backend;
pub mod client;
pub mod config;
pub mod error;
pub mod query;
pub mod results;
pub mod service;
pub mod term;
pub mod web;

pub use backend::{BackendVariant, SuggestionBackend};
pub use config::Settings;
pub use error::SuggestError;
pub use query::{OrderSpec, SuggestionRequest};
pub use results::Suggestion;
pub use service::SuggestionService;

/// Application version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Default maximum number of suggestions per response
pub const DEFAULT_LIMIT: usize = 10;

/// Default minimum typed characters before a request is issued
pub const DEFAULT_MIN_CHARS: usize = 2;

/// Default debounce delay in milliseconds
pub const DEFAULT_DELAY_MS: u64 = 300;
