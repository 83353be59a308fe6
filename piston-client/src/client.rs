use async_trait::async_trait;
use reqwest::Client;
use tracing::debug;

use crate::{
    config::ClientConfig,
    error::Error,
    types::{ExecutionRequest, ExecutionResult, PistonResponse},
};

/// Anything that can turn an [`ExecutionRequest`] into an [`ExecutionResult`].
///
/// Implementations never fail: transport and protocol problems are reported
/// as [`ExecutionResult::BackendError`].
#[async_trait]
pub trait Executor: Send + Sync {
    async fn execute(&self, request: &ExecutionRequest) -> ExecutionResult;
}

/// Client for the Piston execute endpoint
#[derive(Debug, Clone)]
pub struct PistonClient {
    client: Client,
    config: ClientConfig,
}

impl PistonClient {
    /// Create a new PistonClient with the given configuration
    pub fn new(config: ClientConfig) -> Result<Self, Error> {
        config.validate()?;

        let mut builder = Client::builder();
        if let Some(timeout) = config.timeout {
            builder = builder.timeout(timeout);
        }
        let client = builder.build().map_err(Error::HttpClient)?;

        Ok(Self { client, config })
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    /// Submit the request once and return the decoded response body.
    pub async fn submit(&self, request: &ExecutionRequest) -> Result<PistonResponse, Error> {
        debug!(
            language = %request.language,
            version = %request.version,
            source_len = request.source.len(),
            "Submitting program"
        );

        let response = self
            .client
            .post(&self.config.api_url)
            .header("Content-Type", "application/json")
            .json(&request.to_payload())
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(Error::Api {
                status_code: status.as_u16(),
                message: rejection_message(&body),
            });
        }

        let body = response.text().await?;
        debug!("Response from execution backend: {}", body);

        serde_json::from_str(&body).map_err(|e| Error::InvalidResponse(e.to_string()))
    }
}

#[async_trait]
impl Executor for PistonClient {
    async fn execute(&self, request: &ExecutionRequest) -> ExecutionResult {
        // Outcomes are logged once, by the caller that records them
        match self.submit(request).await {
            Ok(response) => response.into_result(),
            Err(e) => e.into(),
        }
    }
}

/// Extract the backend's `message` from an error body, falling back to the
/// raw text (or a placeholder when the body is empty).
fn rejection_message(body: &str) -> String {
    serde_json::from_str::<PistonResponse>(body)
        .ok()
        .and_then(|response| response.message)
        .filter(|message| !message.trim().is_empty())
        .unwrap_or_else(|| {
            let body = body.trim();
            if body.is_empty() {
                "empty response body".to_string()
            } else {
                body.to_string()
            }
        })
}
