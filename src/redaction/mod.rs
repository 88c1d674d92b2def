pub mod types;

pub use types::{
    Document, DocumentResult, Entity, PiiEntityRecognitionRequest, PiiEntityRecognitionResults,
};

use async_trait::async_trait;
use thiserror::Error;
use tracing::debug;

use crate::config::LanguageSettings;

/// API version of the analyze-text endpoint this client speaks.
pub const API_VERSION: &str = "2022-05-01";

#[derive(Debug, Error)]
pub enum RedactionError {
    #[error("Language service request failed: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("Failed to decode language service response: {0}")]
    Decode(#[from] serde_json::Error),
}

/// A classifier that detects and redacts PII in a batch of documents.
#[async_trait]
pub trait PiiRecognizer: Send + Sync {
    async fn recognize(
        &self,
        request: &PiiEntityRecognitionRequest,
    ) -> Result<PiiEntityRecognitionResults, RedactionError>;
}

/// Azure AI Language client for the synchronous analyze-text endpoint.
pub struct LanguageClient {
    client: reqwest::Client,
    url: String,
    key: String,
}

impl LanguageClient {
    pub fn new(settings: &LanguageSettings) -> Self {
        Self {
            client: reqwest::Client::new(),
            url: analyze_url(&settings.endpoint),
            key: settings.key.clone(),
        }
    }

    /// The analyze-text POST for `request`, ready to send.
    fn request(&self, request: &PiiEntityRecognitionRequest) -> reqwest::RequestBuilder {
        self.client
            .post(&self.url)
            .header("User-Agent", crate::USER_AGENT)
            .header("Ocp-Apim-Subscription-Key", &self.key)
            .json(request)
    }
}

#[async_trait]
impl PiiRecognizer for LanguageClient {
    async fn recognize(
        &self,
        request: &PiiEntityRecognitionRequest,
    ) -> Result<PiiEntityRecognitionResults, RedactionError> {
        debug!(documents = request.documents().len(), "posting analyze-text request");
        let body = self
            .request(request)
            .send()
            .await?
            .error_for_status()?
            .text()
            .await?;
        debug!(response_bytes = body.len(), "received analyze-text response");

        decode_results(&body)
    }
}

/// Build the analyze-text URL for a resource endpoint.
pub fn analyze_url(endpoint: &str) -> String {
    format!(
        "{}/language/:analyze-text?api-version={}",
        endpoint.trim_end_matches('/'),
        API_VERSION
    )
}

/// Decode an analyze-text response body.
pub fn decode_results(body: &str) -> Result<PiiEntityRecognitionResults, RedactionError> {
    Ok(serde_json::from_str(body)?)
}
