//! Client-side incremental matching protocol
//!
//! The controller owns one input element's suggestion lifecycle:
//! debouncing keystrokes, extracting the active term from delimited
//! input, issuing requests through a transport, discarding stale
//! responses, and rewriting the input when a suggestion is selected.

mod controller;
mod options;
mod params;
mod transport;

pub use controller::{Controller, Phase, SelectHooks, Ui};
pub use options::{ClientOptions, ResultListStyle};
pub use params::{EvalContext, ParamExpr};
pub use transport::{HttpTransport, SuggestionTransport};
