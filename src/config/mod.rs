//! Configuration module
//!
//! Loading and validating settings from YAML files and environment
//! variables. Settings flow explicitly through `AppState`; there is no
//! process-global registry.

mod settings;

pub use settings::*;
