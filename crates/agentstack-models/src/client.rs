//! HTTP client for the Ollama API.

use std::time::Duration;

use async_trait::async_trait;
use serde::Serialize;
use tracing::{debug, error};

use crate::config::ProvisionConfig;
use crate::endpoint::Endpoint;
use crate::error::ProvisionError;
use crate::inventory::{ModelInventory, TagsResponse};
use crate::pull::{decode_stream, PullStream};

/// Timeout for inventory queries.
const TAGS_TIMEOUT_SECS: u64 = 30;

/// The inference-server calls the provisioning workflow depends on.
#[async_trait]
pub trait InferenceApi: Send + Sync {
    /// Endpoint the calls go to.
    fn endpoint(&self) -> &Endpoint;

    /// Lightweight reachability check. Any transport failure or non-success
    /// status is an error.
    async fn check_status(&self) -> Result<(), ProvisionError>;

    /// Query installed models.
    async fn list_models(&self) -> Result<ModelInventory, ProvisionError>;

    /// Start a pull and return its live event stream.
    async fn pull(&self, name: &str) -> Result<PullStream, ProvisionError>;
}

/// Request body for `/api/pull`.
#[derive(Debug, Serialize)]
struct PullRequest<'a> {
    name: &'a str,
    stream: bool,
}

/// Client for a single Ollama server.
pub struct OllamaClient {
    client: reqwest::Client,
    endpoint: Endpoint,
    probe_timeout: Duration,
    pull_timeout: Duration,
}

impl OllamaClient {
    /// Create a client with default timeouts.
    pub fn new(endpoint: Endpoint) -> Result<Self, ProvisionError> {
        let defaults = ProvisionConfig::default();
        Self::with_timeouts(endpoint, defaults.probe_timeout, defaults.pull_timeout)
    }

    /// Create a client from a provisioning configuration.
    pub fn from_config(config: &ProvisionConfig) -> Result<Self, ProvisionError> {
        Self::with_timeouts(
            config.endpoint.clone(),
            config.probe_timeout,
            config.pull_timeout,
        )
    }

    /// Create a client with explicit timeouts.
    pub fn with_timeouts(
        endpoint: Endpoint,
        probe_timeout: Duration,
        pull_timeout: Duration,
    ) -> Result<Self, ProvisionError> {
        let client = reqwest::Client::builder()
            .build()
            .map_err(|e| ProvisionError::Config(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self {
            client,
            endpoint,
            probe_timeout,
            pull_timeout,
        })
    }

    /// Get the base URL.
    pub fn base_url(&self) -> &str {
        self.endpoint.as_str()
    }

    fn connection_error(&self, err: reqwest::Error) -> ProvisionError {
        ProvisionError::from_reqwest(self.endpoint.as_str(), err)
    }
}

#[async_trait]
impl InferenceApi for OllamaClient {
    fn endpoint(&self) -> &Endpoint {
        &self.endpoint
    }

    async fn check_status(&self) -> Result<(), ProvisionError> {
        let url = self.endpoint.api("/");

        let response = self
            .client
            .get(&url)
            .timeout(self.probe_timeout)
            .send()
            .await
            .map_err(|e| ProvisionError::Connection {
                endpoint: self.endpoint.to_string(),
                message: e.to_string(),
            })?;

        if response.status().is_success() {
            debug!(endpoint = %self.endpoint, "Inference server is up");
            Ok(())
        } else {
            Err(ProvisionError::Connection {
                endpoint: self.endpoint.to_string(),
                message: format!("HTTP {}", response.status()),
            })
        }
    }

    async fn list_models(&self) -> Result<ModelInventory, ProvisionError> {
        let url = self.endpoint.api("/api/tags");

        let response = self
            .client
            .get(&url)
            .timeout(Duration::from_secs(TAGS_TIMEOUT_SECS))
            .send()
            .await
            .map_err(|e| self.connection_error(e))?;

        let status = response.status();
        if !status.is_success() {
            let text = response.text().await.unwrap_or_default();
            error!("Failed to list models: {}", text);
            return Err(ProvisionError::InventoryQuery(format!(
                "HTTP {}: {}",
                status, text
            )));
        }

        let body = response.text().await.map_err(|e| self.connection_error(e))?;
        let tags: TagsResponse = serde_json::from_str(&body)
            .map_err(|e| ProvisionError::InventoryQuery(format!("malformed tags response: {}", e)))?;

        let inventory = ModelInventory::from(tags);
        debug!("Listed {} models", inventory.len());
        Ok(inventory)
    }

    async fn pull(&self, name: &str) -> Result<PullStream, ProvisionError> {
        if name.trim().is_empty() {
            return Err(ProvisionError::InvalidModelName(
                "Model name cannot be empty".to_string(),
            ));
        }

        let url = self.endpoint.api("/api/pull");
        debug!(model = %name, url = %url, "Starting pull");

        let response = self
            .client
            .post(&url)
            .timeout(self.pull_timeout)
            .json(&PullRequest { name, stream: true })
            .send()
            .await
            .map_err(|e| ProvisionError::PullTransport(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let text = response.text().await.unwrap_or_default();
            error!("Failed to pull model {}: {}", name, text);
            return Err(ProvisionError::PullTransport(format!(
                "HTTP {}: {}",
                status, text
            )));
        }

        Ok(decode_stream(response.bytes_stream()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_client() {
        let client = OllamaClient::new(Endpoint::default()).unwrap();
        assert_eq!(client.base_url(), "http://localhost:11434");
    }

    #[test]
    fn test_from_config() {
        let config = ProvisionConfig::builder()
            .endpoint(Endpoint::parse("http://192.168.1.100:11434").unwrap())
            .pull_timeout(Duration::from_secs(10))
            .build();
        let client = OllamaClient::from_config(&config).unwrap();
        assert_eq!(client.endpoint().as_str(), "http://192.168.1.100:11434");
        assert_eq!(client.pull_timeout, Duration::from_secs(10));
    }

    #[tokio::test]
    async fn test_pull_rejects_empty_name() {
        let client = OllamaClient::new(Endpoint::default()).unwrap();
        let result = client.pull("").await;
        assert!(matches!(result, Err(ProvisionError::InvalidModelName(_))));
    }

    #[test]
    fn test_pull_request_body() {
        let body = serde_json::to_value(PullRequest {
            name: "llava",
            stream: true,
        })
        .unwrap();
        assert_eq!(body, serde_json::json!({"name": "llava", "stream": true}));
    }
}
