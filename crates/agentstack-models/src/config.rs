//! Provisioning configuration.

use std::time::Duration;

use crate::endpoint::Endpoint;
use crate::error::ProvisionError;
use crate::DEFAULT_MODEL;

/// Configuration for one provisioning run.
#[derive(Debug, Clone)]
pub struct ProvisionConfig {
    /// Inference server base URL
    pub endpoint: Endpoint,
    /// Model to provision (prefix-matched against installed names)
    pub model: String,
    /// Total probe attempts, first one included
    pub max_attempts: u32,
    /// Constant delay between probe attempts
    pub retry_delay: Duration,
    /// Wait after a successful pull before re-checking the inventory
    pub settle_delay: Duration,
    /// Per-request timeout for the status probe
    pub probe_timeout: Duration,
    /// Timeout for the whole pull request
    pub pull_timeout: Duration,
}

impl Default for ProvisionConfig {
    fn default() -> Self {
        Self {
            endpoint: Endpoint::default(),
            model: DEFAULT_MODEL.to_string(),
            max_attempts: 3,
            retry_delay: Duration::from_secs(5),
            settle_delay: Duration::from_secs(2),
            probe_timeout: Duration::from_secs(5),
            pull_timeout: Duration::from_secs(60 * 60),
        }
    }
}

impl ProvisionConfig {
    /// Create config from environment variables.
    ///
    /// Unset or unparseable numeric values keep their defaults. A malformed
    /// endpoint URL is an error.
    pub fn from_env() -> Result<Self, ProvisionError> {
        let defaults = Self::default();

        let endpoint = match std::env::var("AGENTSTACK_OLLAMA_URL")
            .or_else(|_| std::env::var("OLLAMA_HOST"))
        {
            Ok(url) => Endpoint::parse(&url)?,
            Err(_) => defaults.endpoint,
        };

        let model = std::env::var("AGENTSTACK_MODEL")
            .ok()
            .filter(|m| !m.trim().is_empty())
            .unwrap_or(defaults.model);

        let max_attempts = env_parse("AGENTSTACK_MAX_ATTEMPTS").unwrap_or(defaults.max_attempts);

        let retry_delay = env_parse("AGENTSTACK_RETRY_DELAY_SECS")
            .map(Duration::from_secs)
            .unwrap_or(defaults.retry_delay);

        let settle_delay = env_parse("AGENTSTACK_SETTLE_DELAY_SECS")
            .map(Duration::from_secs)
            .unwrap_or(defaults.settle_delay);

        let pull_timeout = env_parse("AGENTSTACK_PULL_TIMEOUT_SECS")
            .map(Duration::from_secs)
            .unwrap_or(defaults.pull_timeout);

        Ok(Self {
            endpoint,
            model,
            max_attempts,
            retry_delay,
            settle_delay,
            probe_timeout: defaults.probe_timeout,
            pull_timeout,
        })
    }

    /// Check the model name is usable.
    pub fn validate(&self) -> Result<(), ProvisionError> {
        if self.model.trim().is_empty() {
            return Err(ProvisionError::InvalidModelName(
                "Model name cannot be empty".to_string(),
            ));
        }
        Ok(())
    }

    /// Create a builder for configuration.
    pub fn builder() -> ProvisionConfigBuilder {
        ProvisionConfigBuilder::default()
    }
}

fn env_parse<T: std::str::FromStr>(key: &str) -> Option<T> {
    std::env::var(key).ok().and_then(|v| v.trim().parse().ok())
}

/// Builder for provisioning configuration.
#[derive(Debug, Default)]
pub struct ProvisionConfigBuilder {
    config: ProvisionConfig,
}

impl ProvisionConfigBuilder {
    /// Start from an existing configuration, e.g. one read from the environment.
    pub fn from_config(config: ProvisionConfig) -> Self {
        Self { config }
    }

    pub fn endpoint(mut self, endpoint: Endpoint) -> Self {
        self.config.endpoint = endpoint;
        self
    }

    pub fn model(mut self, model: impl Into<String>) -> Self {
        self.config.model = model.into();
        self
    }

    pub fn max_attempts(mut self, attempts: u32) -> Self {
        self.config.max_attempts = attempts;
        self
    }

    pub fn retry_delay(mut self, delay: Duration) -> Self {
        self.config.retry_delay = delay;
        self
    }

    pub fn settle_delay(mut self, delay: Duration) -> Self {
        self.config.settle_delay = delay;
        self
    }

    pub fn probe_timeout(mut self, timeout: Duration) -> Self {
        self.config.probe_timeout = timeout;
        self
    }

    pub fn pull_timeout(mut self, timeout: Duration) -> Self {
        self.config.pull_timeout = timeout;
        self
    }

    pub fn build(self) -> ProvisionConfig {
        self.config
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = ProvisionConfig::default();
        assert_eq!(config.endpoint.as_str(), "http://localhost:11434");
        assert_eq!(config.model, DEFAULT_MODEL);
        assert_eq!(config.max_attempts, 3);
        assert_eq!(config.retry_delay, Duration::from_secs(5));
        assert_eq!(config.pull_timeout, Duration::from_secs(3600));
    }

    #[test]
    fn test_builder_overrides() {
        let config = ProvisionConfig::builder()
            .endpoint(Endpoint::parse("http://ollama:11434").unwrap())
            .model("llama3.1")
            .max_attempts(7)
            .retry_delay(Duration::from_millis(10))
            .settle_delay(Duration::ZERO)
            .build();

        assert_eq!(config.endpoint.as_str(), "http://ollama:11434");
        assert_eq!(config.model, "llama3.1");
        assert_eq!(config.max_attempts, 7);
        assert_eq!(config.retry_delay, Duration::from_millis(10));
        assert_eq!(config.settle_delay, Duration::ZERO);
    }

    #[test]
    fn test_builder_from_existing_config() {
        let base = ProvisionConfig::builder().model("mistral").build();
        let config = ProvisionConfigBuilder::from_config(base).max_attempts(1).build();
        assert_eq!(config.model, "mistral");
        assert_eq!(config.max_attempts, 1);
    }

    const ENV_KEYS: [&str; 7] = [
        "AGENTSTACK_OLLAMA_URL",
        "OLLAMA_HOST",
        "AGENTSTACK_MODEL",
        "AGENTSTACK_MAX_ATTEMPTS",
        "AGENTSTACK_RETRY_DELAY_SECS",
        "AGENTSTACK_SETTLE_DELAY_SECS",
        "AGENTSTACK_PULL_TIMEOUT_SECS",
    ];

    fn clear_env() {
        for key in ENV_KEYS {
            std::env::remove_var(key);
        }
    }

    // Process environment is shared, so every env case lives in this one test.
    #[test]
    fn test_from_env() {
        let saved: Vec<_> = ENV_KEYS
            .iter()
            .map(|key| (*key, std::env::var(key).ok()))
            .collect();
        clear_env();

        let config = ProvisionConfig::from_env().unwrap();
        assert_eq!(config.endpoint.as_str(), "http://localhost:11434");
        assert_eq!(config.model, DEFAULT_MODEL);

        // OLLAMA_HOST alone, in its bare-host form
        std::env::set_var("OLLAMA_HOST", "ollama");
        let config = ProvisionConfig::from_env().unwrap();
        assert_eq!(config.endpoint.as_str(), "http://ollama:11434");

        // the dedicated variable wins
        std::env::set_var("AGENTSTACK_OLLAMA_URL", "http://gpu-box:8080/");
        let config = ProvisionConfig::from_env().unwrap();
        assert_eq!(config.endpoint.as_str(), "http://gpu-box:8080");

        std::env::set_var("AGENTSTACK_MODEL", "   ");
        std::env::set_var("AGENTSTACK_MAX_ATTEMPTS", "many");
        std::env::set_var("AGENTSTACK_RETRY_DELAY_SECS", "-1");
        std::env::set_var("AGENTSTACK_SETTLE_DELAY_SECS", "");
        std::env::set_var("AGENTSTACK_PULL_TIMEOUT_SECS", "1h");
        let config = ProvisionConfig::from_env().unwrap();
        let defaults = ProvisionConfig::default();
        assert_eq!(config.model, DEFAULT_MODEL);
        assert_eq!(config.max_attempts, defaults.max_attempts);
        assert_eq!(config.retry_delay, defaults.retry_delay);
        assert_eq!(config.settle_delay, defaults.settle_delay);
        assert_eq!(config.pull_timeout, defaults.pull_timeout);

        std::env::set_var("AGENTSTACK_MODEL", "mistral");
        std::env::set_var("AGENTSTACK_MAX_ATTEMPTS", " 9 ");
        std::env::set_var("AGENTSTACK_RETRY_DELAY_SECS", "1");
        let config = ProvisionConfig::from_env().unwrap();
        assert_eq!(config.model, "mistral");
        assert_eq!(config.max_attempts, 9);
        assert_eq!(config.retry_delay, Duration::from_secs(1));

        std::env::set_var("AGENTSTACK_OLLAMA_URL", "ftp://ollama:11434");
        assert!(matches!(
            ProvisionConfig::from_env(),
            Err(ProvisionError::InvalidEndpoint { .. })
        ));

        clear_env();
        for (key, value) in saved {
            if let Some(value) = value {
                std::env::set_var(key, value);
            }
        }
    }

    #[test]
    fn test_validate_rejects_empty_model() {
        let config = ProvisionConfig::builder().model("  ").build();
        assert!(matches!(
            config.validate(),
            Err(ProvisionError::InvalidModelName(_))
        ));
        assert!(ProvisionConfig::default().validate().is_ok());
    }
}
