//! Validated base URL of the inference-server API.

use std::fmt;
use std::str::FromStr;

use reqwest::Url;

use crate::error::ProvisionError;
use crate::{DEFAULT_ENDPOINT, DEFAULT_PORT};

/// Base URL of the inference server, e.g. `http://localhost:11434`.
///
/// Always http or https, stored without a trailing slash so API paths can be
/// appended directly.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Endpoint {
    url: Url,
    base: String,
}

impl Endpoint {
    /// Parse and validate an endpoint URL.
    pub fn parse(raw: &str) -> Result<Self, ProvisionError> {
        let invalid = |reason: String| ProvisionError::InvalidEndpoint {
            url: raw.to_string(),
            reason,
        };

        // `OLLAMA_HOST` is commonly set as bare `host` or `host:port`
        let raw_trimmed = raw.trim();
        let has_scheme = raw_trimmed.contains("://");
        let mut url = if has_scheme {
            Url::parse(raw_trimmed)
        } else {
            Url::parse(&format!("http://{}", raw_trimmed))
        }
        .map_err(|e| invalid(e.to_string()))?;

        if !has_scheme && !names_port(raw_trimmed) {
            url.set_port(Some(DEFAULT_PORT))
                .map_err(|_| invalid("cannot set port".to_string()))?;
        }

        match url.scheme() {
            "http" | "https" => {}
            other => return Err(invalid(format!("unsupported scheme '{}'", other))),
        }
        if url.host_str().is_none() {
            return Err(invalid("missing host".to_string()));
        }

        let base = url.as_str().trim_end_matches('/').to_string();
        Ok(Self { url, base })
    }

    /// The endpoint without trailing slash.
    pub fn as_str(&self) -> &str {
        &self.base
    }

    /// The parsed URL.
    pub fn url(&self) -> &Url {
        &self.url
    }

    /// Full URL for an API path such as `/api/tags`.
    pub fn api(&self, path: &str) -> String {
        format!("{}/{}", self.base, path.trim_start_matches('/'))
    }
}

/// Whether a scheme-less `host[:port][/path]` carries an explicit port.
///
/// `Url::port` hides a literal `:80`, so the authority text is checked instead.
fn names_port(raw: &str) -> bool {
    let authority = raw.split('/').next().unwrap_or_default();
    match authority.rsplit_once(':') {
        Some((_, port)) => !port.is_empty() && port.bytes().all(|b| b.is_ascii_digit()),
        None => false,
    }
}

impl Default for Endpoint {
    fn default() -> Self {
        Self::parse(DEFAULT_ENDPOINT).expect("default endpoint is a valid URL")
    }
}

impl FromStr for Endpoint {
    type Err = ProvisionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl fmt::Display for Endpoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.base)
    }
}
