//! Error types for model provisioning.

use thiserror::Error;

/// Errors that can occur while talking to the inference server.
#[derive(Debug, Error)]
pub enum ProvisionError {
    /// Transport failure or timeout while probing or querying.
    #[error("Cannot reach inference server at {endpoint}: {message}")]
    Connection { endpoint: String, message: String },

    /// The tags endpoint answered with a bad status or an undecodable body.
    #[error("Failed to query installed models: {0}")]
    InventoryQuery(String),

    /// The pull request failed, or its stream broke before `success`.
    #[error("Model pull failed: {0}")]
    PullTransport(String),

    /// The server reported a successful pull but the model is still missing.
    #[error("Model '{0}' not found after pull. Check the server logs")]
    VerificationGap(String),

    /// The endpoint is not a usable http(s) URL.
    #[error("Invalid endpoint '{url}': {reason}")]
    InvalidEndpoint { url: String, reason: String },

    /// Empty or otherwise unusable model name.
    #[error("Invalid model name: {0}")]
    InvalidModelName(String),

    /// HTTP client could not be built.
    #[error("Configuration error: {0}")]
    Config(String),
}

impl ProvisionError {
    /// Classify a reqwest error raised against `endpoint`.
    pub(crate) fn from_reqwest(endpoint: &str, err: reqwest::Error) -> Self {
        if err.is_decode() {
            ProvisionError::InventoryQuery(err.to_string())
        } else {
            ProvisionError::Connection {
                endpoint: endpoint.to_string(),
                message: err.to_string(),
            }
        }
    }

    /// Whether this error came from the transport rather than the payload.
    pub fn is_connection(&self) -> bool {
        matches!(self, ProvisionError::Connection { .. })
    }
}
