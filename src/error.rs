//! Error taxonomy for the suggestion pipeline
//!
//! `UnsupportedBackend` and `MalformedRequest` are configuration-time
//! failures; backend and transport errors are propagated to the caller
//! without retrying. A stale response is not an error (it is a designed
//! discard in the client controller) and has no variant here.

use thiserror::Error;

/// Errors surfaced by the query builder, backends, service, and client
#[derive(Debug, Error)]
pub enum SuggestError {
    /// The configured backend variant is not one of the supported set.
    /// Fatal and not retried.
    #[error("unsupported backend variant: {0}")]
    UnsupportedBackend(String),

    /// A request or field configuration violated an invariant
    /// (e.g. a non-positive limit). Rejected, not clamped.
    #[error("malformed request: {0}")]
    MalformedRequest(String),

    /// A scope chain referenced a scope the backend does not declare.
    #[error("unknown scope: {0}")]
    UnknownScope(String),

    /// The requested suggestion field has no server-side configuration.
    #[error("unknown suggestion field: {0}")]
    UnknownField(String),

    /// The backend failed while executing a query. Never swallowed.
    #[error("backend query failed: {0}")]
    Backend(#[from] rusqlite::Error),

    /// A term-matching pattern failed to compile.
    #[error("invalid match pattern: {0}")]
    Pattern(#[from] regex::Error),

    /// The client transport failed; the caller may wrap its own retry.
    #[error("transport failure: {0}")]
    Transport(String),
}

impl SuggestError {
    /// Configuration-time errors are fatal rather than per-request.
    pub fn is_fatal(&self) -> bool {
        matches!(self, Self::UnsupportedBackend(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display() {
        let err = SuggestError::UnsupportedBackend("graph".to_string());
        assert_eq!(err.to_string(), "unsupported backend variant: graph");
        assert!(err.is_fatal());

        let err = SuggestError::MalformedRequest("limit must be positive".to_string());
        assert!(err.to_string().contains("limit must be positive"));
        assert!(!err.is_fatal());
    }
}
