//! Request transport for the client controller

use crate::error::SuggestError;
use crate::results::Suggestion;
use async_trait::async_trait;
use std::collections::BTreeMap;

/// One suggestion round-trip. Implementations perform no retries; a
/// failure surfaces to the controller, whose caller may wrap its own
/// retry policy.
#[async_trait]
pub trait SuggestionTransport: Send + Sync {
    async fn fetch(
        &self,
        endpoint: &str,
        params: &BTreeMap<String, String>,
    ) -> Result<Vec<Suggestion>, SuggestError>;
}

/// HTTP GET transport speaking the JSON wire protocol
#[derive(Clone)]
pub struct HttpTransport {
    client: reqwest::Client,
}

impl HttpTransport {
    pub fn new() -> Result<Self, SuggestError> {
        let client = reqwest::Client::builder()
            .build()
            .map_err(|e| SuggestError::Transport(e.to_string()))?;
        Ok(Self { client })
    }
}

#[async_trait]
impl SuggestionTransport for HttpTransport {
    async fn fetch(
        &self,
        endpoint: &str,
        params: &BTreeMap<String, String>,
    ) -> Result<Vec<Suggestion>, SuggestError> {
        let response = self
            .client
            .get(endpoint)
            .query(params)
            .send()
            .await
            .map_err(|e| SuggestError::Transport(e.to_string()))?;

        let response = response
            .error_for_status()
            .map_err(|e| SuggestError::Transport(e.to_string()))?;

        response
            .json::<Vec<Suggestion>>()
            .await
            .map_err(|e| SuggestError::Transport(e.to_string()))
    }
}
